//! picoLCD output report definitions
//!
//! Every transfer to the panel is a single HID output report whose first
//! byte is one of the report ids below. Graphics memory writes additionally
//! carry an embedded controller header, built by [`crate::frame`].
//!
//! ## Report Structure
//!
//! ```text
//! [report id] [payload ...]
//! ```
//!
//! ## Example
//!
//! ```
//! use picolcd::command;
//!
//! let backlight = [command::OUT_REPORT_LCD_BACKLIGHT, 0x80];
//! assert_eq!(backlight[0], 0x91);
//! ```

// Indicator and panel control reports

/// Set the state of the front panel LEDs (0x81)
///
/// Payload: one byte, one bit per LED.
pub const OUT_REPORT_LED_STATE: u8 = 0x81;

/// Set the backlight level (0x91)
///
/// Payload: one byte, 0 (off) to 255 (full).
pub const OUT_REPORT_LCD_BACKLIGHT: u8 = 0x91;

/// Set the contrast level (0x92)
pub const OUT_REPORT_LCD_CONTRAST: u8 = 0x92;

/// Raw controller control line access (0x93)
pub const OUT_REPORT_LCD_CONTROL: u8 = 0x93;

/// Character controller instruction write (0x94)
///
/// Shares its value with the clear report used by early firmware. On text
/// panels the payload is `[0x00, 0x01, 0x00, delay, instruction]`.
pub const OUT_REPORT_LCD_CLEAR: u8 = 0x94;

// Memory write reports

/// Data write to the panel controller (0x95)
pub const OUT_REPORT_DATA: u8 = 0x95;

/// Instruction sequence followed by data (0x96)
pub const OUT_REPORT_CMD_DATA: u8 = 0x96;

/// Text write (0x98)
pub const OUT_REPORT_LCD_TEXT: u8 = 0x98;

/// Custom character upload (0x9C)
pub const OUT_REPORT_LCD_FONT: u8 = 0x9C;

// Graphics controller instructions embedded in 0x96 headers

/// Set page (block row) address; OR the row index in the low bits
pub const SET_PAGE_ADDRESS: u8 = 0xB8;

/// Set column address zero
pub const SET_COLUMN_ADDRESS: u8 = 0x40;

/// Chip select flag for the odd half of a chip
pub const ODD_ZONE_SELECT: u8 = 0x01;

/// Shift applied to the chip number in the chip select byte
pub const CHIP_SELECT_SHIFT: u8 = 2;

// Character controller instructions

/// Clear the character display
pub const TEXT_CLEAR_DISPLAY: u8 = 0x01;

/// Set the character memory address; OR the address in
pub const TEXT_SET_ADDRESS: u8 = 0x80;

/// Execution delay passed with character instructions
pub const TEXT_INSTRUCTION_DELAY: u8 = 0x64;

/// Start address of each character row on the 20x4 panel
pub const TEXT_ROW_ADDRESSES: [u8; 4] = [0x00, 0x40, 0x14, 0x54];
