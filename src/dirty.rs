//! Per-block dirty tracking
//!
//! Each framebuffer block carries a [`DirtyMark`]: clean, dirty in full, or
//! dirty only in its first `n` bytes. Marks only ever widen until the block
//! is sent and cleared.

/// Dirty state of one block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirtyMark {
    /// Panel matches the framebuffer
    #[default]
    Clean,
    /// Every byte must be sent
    Full,
    /// The first `n` bytes must be sent
    Prefix(usize),
}

impl DirtyMark {
    /// Mark covering bytes `0..stop`; `None` means the whole block
    pub fn through(stop: Option<usize>) -> Self {
        match stop {
            None => Self::Full,
            Some(0) => Self::Clean,
            Some(n) => Self::Prefix(n),
        }
    }

    /// Whether anything must be sent
    pub fn is_dirty(self) -> bool {
        self != Self::Clean
    }

    /// Smallest mark covering both
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Clean, mark) | (mark, Self::Clean) => mark,
            (Self::Full, _) | (_, Self::Full) => Self::Full,
            (Self::Prefix(a), Self::Prefix(b)) => Self::Prefix(a.max(b)),
        }
    }

    /// Number of bytes to send from a block of `block_size` bytes
    pub fn byte_count(self, block_size: usize) -> usize {
        match self {
            Self::Clean => 0,
            Self::Full => block_size,
            Self::Prefix(n) => n.min(block_size),
        }
    }
}

/// Dirty marks for every framebuffer block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyState {
    marks: Vec<DirtyMark>,
    zones: usize,
}

impl DirtyState {
    /// All blocks clean
    pub fn new(rows: usize, zones: usize) -> Self {
        Self {
            marks: vec![DirtyMark::Clean; rows * zones],
            zones,
        }
    }

    /// Number of tracked blocks
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether no blocks are tracked
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Current mark of a block; out-of-range blocks read as clean
    pub fn mark(&self, block: usize) -> DirtyMark {
        self.marks.get(block).copied().unwrap_or_default()
    }

    /// Whether a block needs sending
    pub fn is_dirty(&self, block: usize) -> bool {
        self.mark(block).is_dirty()
    }

    /// Widen the mark of a block; returns false for out-of-range blocks
    pub fn mark_dirty(&mut self, block: usize, mark: DirtyMark) -> bool {
        match self.marks.get_mut(block) {
            Some(slot) => {
                *slot = slot.merge(mark);
                true
            }
            None => false,
        }
    }

    /// Reset a block to clean
    pub fn mark_clean(&mut self, block: usize) {
        if let Some(slot) = self.marks.get_mut(block) {
            *slot = DirtyMark::Clean;
        }
    }

    /// Mark every block fully dirty
    pub fn mark_all(&mut self) {
        self.marks.fill(DirtyMark::Full);
    }

    /// Blocks that currently need sending, in index order
    pub fn dirty_blocks(&self) -> impl Iterator<Item = (usize, DirtyMark)> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, mark)| mark.is_dirty())
            .map(|(index, mark)| (index, *mark))
    }

    /// Mark a region of (row, zone) pairs dirty
    ///
    /// An even zone whose odd partner is also listed is dropped, since sending
    /// the odd zone retransmits the even one. The last pair visited receives
    /// `stop`; every earlier pair is marked in full. `None` selects every
    /// row or zone.
    pub fn mark_region(&mut self, rows: Option<&[usize]>, zones: Option<&[usize]>, stop: DirtyMark) {
        let row_count = if self.zones == 0 {
            0
        } else {
            self.marks.len() / self.zones
        };
        let rows: Vec<usize> = match rows {
            Some(rows) => dedup_in_order(rows.iter().copied().filter(|r| *r < row_count)),
            None => (0..row_count).collect(),
        };
        let listed: Vec<usize> = match zones {
            Some(zones) => dedup_in_order(zones.iter().copied().filter(|z| *z < self.zones)),
            None => (0..self.zones).collect(),
        };
        let zones: Vec<usize> = listed
            .iter()
            .copied()
            .filter(|zone| zone % 2 == 1 || !listed.contains(&(zone + 1)))
            .collect();

        let total = rows.len() * zones.len();
        let mut visited = 0;
        for row in &rows {
            for zone in &zones {
                visited += 1;
                let mark = if visited == total { stop } else { DirtyMark::Full };
                self.mark_dirty(row * self.zones + zone, mark);
            }
        }
    }
}

fn dedup_in_order(values: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
