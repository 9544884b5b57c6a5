//! Seven segment glyphs
//!
//! A glyph is a bit pattern with bit 0 for segment A through to bit 6 for segment G.

use crate::lcd::segment::{Segments, BLANK, DIGITS};

const NUMERALS: [u8; 10] = [
    0b011_1111, // 0
    0b000_0110, // 1
    0b101_1011, // 2
    0b100_1111, // 3
    0b110_0110, // 4
    0b110_1101, // 5
    0b111_1101, // 6
    0b000_0111, // 7
    0b111_1111, // 8
    0b110_1111, // 9
];

const LETTER_E: u8 = 0b111_1001;
const LETTER_R: u8 = 0b101_0000;

/// Light up `glyph` on the digit at `position`
const fn glyph(position: usize, glyph: u8) -> Segments {
    let digit = &DIGITS[position];
    let mut segments = BLANK;
    let mut seg = 0;

    while seg < 7 {
        if glyph & (1 << seg) != 0 {
            segments |= digit[seg];
        }
        seg += 1;
    }

    segments
}

/// A right aligned percentage without leading zeros
pub const fn percent(value: u8) -> Segments {
    let mut segments = glyph(2, NUMERALS[(value % 10) as usize]);

    if value >= 10 {
        segments |= glyph(1, NUMERALS[(value / 10 % 10) as usize]);
    }

    if value >= 100 {
        segments |= glyph(0, NUMERALS[(value / 100 % 10) as usize]);
    }

    segments
}

/// "Err"
pub const ERROR: Segments = glyph(0, LETTER_E) | glyph(1, LETTER_R) | glyph(2, LETTER_R);
