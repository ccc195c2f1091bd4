//! Output report encoders
//!
//! Pure functions turning framebuffer blocks and settings into report byte
//! vectors. Nothing here touches the transport.
//!
//! A graphics chip is split into an even and an odd zone. The even zone is
//! written with a long report carrying a page address header. The odd zone
//! can only be reached by a short data report that continues after a long
//! report, so refreshing an odd zone always resends its even partner first.

use crate::command::*;
use crate::dirty::DirtyMark;

/// Bytes before the payload in a long graphics report
pub const LONG_HEADER_LEN: usize = 12;

/// Bytes before the payload in a short graphics report
pub const SHORT_HEADER_LEN: usize = 5;

/// Chip select byte for a zone
pub fn chip_select(zone: usize) -> u8 {
    ((zone / 2) as u8) << CHIP_SELECT_SHIFT
}

/// Long report: page address header followed by `data`
pub fn graphics_long(zone: usize, row: usize, data: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(LONG_HEADER_LEN + data.len());
    report.extend_from_slice(&[
        OUT_REPORT_CMD_DATA,
        chip_select(zone),
        0x02,
        0x00,
        0x00,
        SET_PAGE_ADDRESS | row as u8,
        0x00,
        0x00,
        SET_COLUMN_ADDRESS,
        0x00,
        0x00,
        data.len() as u8,
    ]);
    report.extend_from_slice(data);
    report
}

/// Short report continuing into the odd half of a chip
pub fn graphics_short(zone: usize, data: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(SHORT_HEADER_LEN + data.len());
    report.extend_from_slice(&[
        OUT_REPORT_DATA,
        chip_select(zone) | ODD_ZONE_SELECT,
        0x00,
        0x00,
        data.len() as u8,
    ]);
    report.extend_from_slice(data);
    report
}

/// Reports needed to bring one block up to date
///
/// `block` is the block being refreshed and `even_partner` the block of
/// the even zone sharing its chip (only read for odd zones). Returns no
/// reports for a clean mark.
pub fn block_reports(
    zone: usize,
    row: usize,
    block: &[u8],
    even_partner: &[u8],
    mark: DirtyMark,
) -> Vec<Vec<u8>> {
    let count = mark.byte_count(block.len());
    if count == 0 {
        return Vec::new();
    }
    if zone % 2 == 0 {
        vec![graphics_long(zone, row, &block[..count])]
    } else {
        vec![
            graphics_long(zone, row, even_partner),
            graphics_short(zone, &block[..count]),
        ]
    }
}

/// Backlight report
pub fn backlight(level: u8) -> Vec<u8> {
    vec![OUT_REPORT_LCD_BACKLIGHT, level]
}

/// Contrast report
pub fn contrast(level: u8) -> Vec<u8> {
    vec![OUT_REPORT_LCD_CONTRAST, level]
}

/// LED state report
pub fn leds(state: u8) -> Vec<u8> {
    vec![OUT_REPORT_LED_STATE, state]
}

/// Character controller instruction report
pub fn text_instruction(instruction: u8) -> Vec<u8> {
    vec![
        OUT_REPORT_LCD_CLEAR,
        0x00,
        0x01,
        0x00,
        TEXT_INSTRUCTION_DELAY,
        instruction,
    ]
}

/// Move the character cursor; `None` if the row does not exist
pub fn text_set_address(row: usize, column: usize) -> Option<Vec<u8>> {
    let base = TEXT_ROW_ADDRESSES.get(row)?;
    Some(text_instruction(
        TEXT_SET_ADDRESS | base.wrapping_add(column as u8),
    ))
}

/// Write characters at the cursor
pub fn text_write(text: &[u8]) -> Vec<u8> {
    let mut report = Vec::with_capacity(5 + text.len());
    report.extend_from_slice(&[OUT_REPORT_DATA, 0x01, 0x00, 0x01, text.len() as u8]);
    report.extend_from_slice(text);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_select() {
        assert_eq!(chip_select(0), 0x00);
        assert_eq!(chip_select(1), 0x00);
        assert_eq!(chip_select(2), 0x04);
        assert_eq!(chip_select(7), 0x0C);
    }

    #[test]
    fn test_even_zone_full_block() {
        let block = [0xAB; 32];
        let reports = block_reports(4, 3, &block, &[], DirtyMark::Full);
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report.len(), LONG_HEADER_LEN + 32);
        assert_eq!(
            &report[..LONG_HEADER_LEN],
            &[0x96, 0x08, 0x02, 0x00, 0x00, 0xBB, 0x00, 0x00, 0x40, 0x00, 0x00, 32]
        );
        assert!(report[LONG_HEADER_LEN..].iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn test_even_zone_prefix() {
        let block: Vec<u8> = (0..32).collect();
        let reports = block_reports(0, 0, &block, &[], DirtyMark::Prefix(3));
        assert_eq!(reports[0][LONG_HEADER_LEN - 1], 3);
        assert_eq!(&reports[0][LONG_HEADER_LEN..], &[0, 1, 2]);
    }

    #[test]
    fn test_odd_zone_resends_even_partner() {
        let even = [0x11; 32];
        let odd: Vec<u8> = (0..32).collect();
        let reports = block_reports(3, 0, &odd, &even, DirtyMark::Prefix(5));
        assert_eq!(reports.len(), 2);

        let long = &reports[0];
        assert_eq!(long.len(), LONG_HEADER_LEN + 32);
        assert_eq!(long[0], 0x96);
        assert_eq!(long[1], 0x04);
        assert_eq!(long[5], 0xB8);
        assert_eq!(long[LONG_HEADER_LEN - 1], 32);
        assert!(long[LONG_HEADER_LEN..].iter().all(|b| *b == 0x11));

        let short = &reports[1];
        assert_eq!(short, &vec![0x95, 0x05, 0x00, 0x00, 5, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clean_mark_sends_nothing() {
        assert!(block_reports(1, 0, &[0; 32], &[0; 32], DirtyMark::Clean).is_empty());
    }

    #[test]
    fn test_settings_reports() {
        assert_eq!(backlight(0x80), vec![0x91, 0x80]);
        assert_eq!(contrast(0x10), vec![0x92, 0x10]);
        assert_eq!(leds(0x03), vec![0x81, 0x03]);
    }

    #[test]
    fn test_text_reports() {
        assert_eq!(
            text_set_address(2, 3),
            Some(vec![0x94, 0x00, 0x01, 0x00, 0x64, 0x97])
        );
        assert_eq!(text_set_address(4, 0), None);
        assert_eq!(text_write(b"hi"), vec![0x95, 0x01, 0x00, 0x01, 2, b'h', b'i']);
        assert_eq!(text_instruction(TEXT_CLEAR_DISPLAY)[5], 0x01);
    }
}
