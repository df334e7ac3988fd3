//! PDF417 encoder.
//!
//! The payload is split into numeric, text and byte segments, compacted into
//! codewords, padded to a rectangle chosen from the requested aspect ratio and
//! protected with Reed-Solomon codewords over GF(929). Each row is then drawn
//! from one of the three codeword clusters, between the start and stop
//! patterns.
//!
//! ```
//! let grid = barcode2d::pdf417::encode(b"Hello, World!").unwrap();
//! assert_eq!(grid.num_rows() % 4, 0);
//! ```

pub mod ecc;
pub mod generators;
pub mod geometry;
pub mod high_level;
pub mod macro_block;
mod tables;

use crate::{Error, Result, SymbolGrid};
use generators::{Pdf417Row, Pdf417Rows};
use geometry::Dimensions;
use high_level::CW_PADDING;
pub use macro_block::MacroBlock;

/// Minimum number of rows in a PDF417 barcode.
pub const MIN_ROWS: u8 = 3;
/// Maximum number of rows in a PDF417 barcode.
pub const MAX_ROWS: u8 = 90;
/// Minimum number of data columns in a PDF417 barcode.
pub const MIN_COLS: u8 = 1;
/// Maximum number of data columns in a PDF417 barcode.
pub const MAX_COLS: u8 = 30;
/// Maximum number of codewords in a symbol, error correction included.
pub const MAX_CODEWORDS: usize = 928;
/// Maximum number of data codewords (macro block included), leaving room
/// for the length descriptor and the smallest error correction.
pub const MAX_DATA_CODEWORDS: usize = 925;

/// Default height of a row, in modules.
pub const ROW_HEIGHT: usize = 4;
/// Default horizontal quiet zone, in modules.
pub const QUIET_H: usize = 2;
/// Default vertical quiet zone, in modules.
pub const QUIET_V: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Pdf417Options {
    ec_level: Option<u8>,
    aspect_ratio: f64,
    row_height: usize,
    quiet_zone: (usize, usize),
    macro_block: Option<MacroBlock>,
}

impl Default for Pdf417Options {
    fn default() -> Self {
        Self {
            ec_level: None,
            aspect_ratio: 2.0,
            row_height: ROW_HEIGHT,
            quiet_zone: (QUIET_H, QUIET_V),
            macro_block: None,
        }
    }
}

impl Pdf417Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error correction level. Any value outside 0..=8 (usually -1)
    /// selects the level from the amount of data.
    pub fn ec_level(mut self, level: i8) -> Self {
        self.ec_level = u8::try_from(level).ok().filter(|&l| l <= ecc::MAX_LEVEL);
        self
    }

    /// Sets the targeted width over height ratio of the symbol.
    pub fn aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Sets the height of a row in modules.
    pub fn row_height(mut self, height: usize) -> Self {
        self.row_height = height;
        self
    }

    /// Sets the horizontal and vertical quiet zones in modules.
    pub fn quiet_zone(mut self, horizontal: usize, vertical: usize) -> Self {
        self.quiet_zone = (horizontal, vertical);
        self
    }

    pub fn macro_block(mut self, block: MacroBlock) -> Self {
        self.macro_block = Some(block);
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(Error::InvalidParameter("aspect ratio must be a positive number"));
        }
        if self.row_height == 0 {
            return Err(Error::InvalidParameter("row height must be at least one module"));
        }
        Ok(())
    }
}

/// Every codeword of a symbol (length descriptor, data, padding, macro
/// block and error correction) laid out in rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf417Symbol {
    codewords: Vec<u16>,
    dimensions: Dimensions,
    level: u8,
}

impl Pdf417Symbol {
    /// Runs the high level encoding, the layout and the error correction.
    pub fn new(data: &[u8], options: &Pdf417Options) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidInput);
        }
        options.validate()?;

        let payload = high_level::encode(data)?;
        let macro_cws = match &options.macro_block {
            Some(block) => block.codewords()?,
            None => Vec::new(),
        };

        let n = payload.len() + macro_cws.len();
        if n > MAX_DATA_CODEWORDS {
            return Err(Error::CapacityExceeded { needed: n, capacity: MAX_DATA_CODEWORDS });
        }

        let level = ecc::auto_level(options.ec_level, n + 1);
        let ecc_count = ecc::ecc_count(level);
        let layout = geometry::layout(n + 1 + ecc_count, options.aspect_ratio, options.row_height);
        let size = layout.dimensions.capacity();
        tracing::debug!(
            data = n,
            level,
            rows = layout.dimensions.rows,
            cols = layout.dimensions.cols,
            "pdf417 symbol"
        );

        let mut codewords = Vec::with_capacity(size);
        codewords.push((size - ecc_count) as u16);
        codewords.extend_from_slice(&payload);
        codewords.resize(codewords.len() + layout.padding, CW_PADDING);
        codewords.extend_from_slice(&macro_cws);
        codewords.resize(size, 0);
        ecc::generate_ecc(&mut codewords, level);

        Ok(Self { codewords, dimensions: layout.dimensions, level })
    }

    /// Get the number of rows of the PDF417.
    #[inline]
    pub const fn rows(&self) -> u8 {
        self.dimensions.rows
    }

    /// Get the number of data columns of the PDF417.
    #[inline]
    pub const fn cols(&self) -> u8 {
        self.dimensions.cols
    }

    #[inline]
    pub const fn level(&self) -> u8 {
        self.level
    }

    pub fn codewords(&self) -> &[u16] {
        &self.codewords
    }

    pub fn iter(&self) -> Pdf417Rows<'_> {
        Pdf417Rows::new(&self.codewords, self.dimensions.as_pair(), self.level)
    }

    /// Modules of every row, one row after the other, without quiet zones.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.iter()
            .flatten() // rows -> bitfields
            .flatten() // bitfield -> bits
    }

    /// Draws the symbol, each row repeated `row_height` times, surrounded by
    /// the given quiet zones.
    pub fn to_grid(&self, row_height: usize, (quiet_h, quiet_v): (usize, usize)) -> SymbolGrid {
        let width = Pdf417Row::width(self.cols() as usize);
        let num_cols = width + 2 * quiet_h;
        let num_rows = self.rows() as usize * row_height + 2 * quiet_v;

        let mut modules = vec![false; num_rows * num_cols];
        let mut line = vec![false; width];
        for (r, row) in self.iter().enumerate() {
            for (target, bit) in line.iter_mut().zip(row.flatten()) {
                *target = bit;
            }

            for k in 0..row_height {
                let start = (quiet_v + r * row_height + k) * num_cols + quiet_h;
                modules[start..start + width].copy_from_slice(&line);
            }
        }

        SymbolGrid::new(num_rows, num_cols, modules)
    }
}

/// Encodes `data` with the default options.
pub fn encode(data: &[u8]) -> Result<SymbolGrid> {
    encode_with(data, &Pdf417Options::default())
}

pub fn encode_with(data: &[u8], options: &Pdf417Options) -> Result<SymbolGrid> {
    let symbol = Pdf417Symbol::new(data, options)?;
    Ok(symbol.to_grid(options.row_height, options.quiet_zone))
}
