//! Codewords to bar/space patterns, row by row.

mod bitfield;
mod row;

pub use bitfield::{Bitfield, Bits};
pub use row::{Pdf417Row, Pdf417Rows, RowIndicators};

pub const START_PAT: Bitfield = Bitfield::new(0b11111111010101000, 17);
pub const END_PAT: Bitfield = Bitfield::new(0b111111101000101001, 18);
