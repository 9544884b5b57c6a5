//! https://www.sensorwatch.net/docs/wig/display/
//!
//! Each segment of the glass is addressed by a common line and an LCD segment pin. The LCD
//! segment pins are wired to the MCU's segment outputs in no particular order, so they're mapped
//! with [`lcd_to_mcu`].

/// The segments are stored in a 96 bit integer, 32 bits for each common line
///
/// # Memory map
///
/// ```txt
///       ----------
/// 0x60 | u32 COM2 |
///      | u32 COM1 |
/// 0x00 | u32 COM0 |
///       ----------
/// ```
pub type Segments = u128;

/// Turn off all segments
pub const BLANK: Segments = 0;

/// Convert an LCD segment pin number to an MCU LCD segment number
const fn lcd_to_mcu(seg: usize) -> usize {
    match seg {
        13 => 13,
        17 => 12,
        18 => 11,
        19 => 10,
        20 => 6,
        21 => 5,
        22 => 4,
        23 => 3,
        _ => panic!("Invalid segment number"),
    }
}

/// Create a segment from an LCD common and segment line
const fn build_segment(com: usize, seg: usize) -> Segments {
    1 << (lcd_to_mcu(seg) + (com * 32))
}

/// The A to G segments of one seven segment digit
pub type Digit = [Segments; 7];

/// The three right hand digits of the glass, left to right. These show the humidity.
pub const DIGITS: [Digit; 3] = [
    // A, B, C, D, E, F, G
    [
        build_segment(0, 22),
        build_segment(0, 13),
        build_segment(2, 22),
        build_segment(2, 23),
        build_segment(1, 23),
        build_segment(0, 23),
        build_segment(1, 22),
    ],
    [
        build_segment(0, 21),
        build_segment(0, 20),
        build_segment(2, 19),
        build_segment(2, 20),
        build_segment(2, 21),
        build_segment(1, 21),
        build_segment(1, 20),
    ],
    [
        build_segment(0, 19),
        build_segment(0, 18),
        build_segment(1, 17),
        build_segment(2, 17),
        build_segment(2, 18),
        build_segment(1, 19),
        build_segment(1, 18),
    ],
];
