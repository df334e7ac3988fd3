//! Data Matrix ECC 200 encoder.
//!
//! The payload is turned into codewords by the high level encoder, padded to
//! the capacity of the smallest fitting symbol, extended with Reed-Solomon
//! codewords over GF(256) and placed in the module grid along the diagonal
//! sweep, surrounded by the finder pattern of every data region.
//!
//! ```
//! let grid = barcode2d::datamatrix::encode(b"123456").unwrap();
//! assert_eq!((grid.num_rows(), grid.num_cols()), (10, 10));
//! ```

pub mod ecc;
pub mod high_level;
pub mod look_ahead;
pub mod placement;
pub mod profile;

use crate::{Error, Result, SymbolGrid};
use high_level::{Mode, PAD, UNLATCH};
use placement::MatrixMap;
use profile::SymbolProfile;

/// Symbol sizes considered when picking the smallest fitting symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SymbolShape {
    #[default]
    Square,
    Rectangle,
    /// Every size, square or not.
    Any,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataMatrixOptions {
    shape: SymbolShape,
}

impl DataMatrixOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: SymbolShape) -> Self {
        self.shape = shape;
        self
    }
}

/// 253-state randomization of a pad codeword, `position` being 1-based.
#[inline]
fn randomize_253(position: usize) -> u8 {
    let v = PAD as usize + (149 * position) % 253 + 1;
    (if v > 254 { v - 254 } else { v }) as u8
}

/// Fills `codewords` up to the data capacity of `profile`. A C40, Text or X12
/// encoder is unlatched first; EDIFACT only when more than two codewords
/// remain, the end of the symbol closing it otherwise.
pub fn pad(codewords: &mut Vec<u8>, mode: Mode, profile: &SymbolProfile) {
    let capacity = profile.data_codewords;
    debug_assert!(codewords.len() <= capacity);

    if codewords.len() < capacity {
        match mode {
            Mode::C40 | Mode::Text | Mode::X12 => codewords.push(UNLATCH),
            Mode::Edifact if capacity - codewords.len() > 2 => codewords.push(0x1F << 2),
            _ => {}
        }
    }
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        codewords.push(randomize_253(codewords.len() + 1));
    }
}

/// Data and error correction codewords of a symbol with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataMatrixSymbol {
    profile: &'static SymbolProfile,
    codewords: Vec<u8>,
}

impl DataMatrixSymbol {
    /// Runs the high level encoding, picks the symbol size, pads and appends
    /// the error correction.
    pub fn new(data: &[u8], options: &DataMatrixOptions) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidInput);
        }

        let high_level = high_level::encode(data, options.shape)?;
        let n = high_level.codewords.len();
        let profile = profile::select(n, options.shape).ok_or(Error::CapacityExceeded {
            needed: n,
            capacity: profile::max_capacity(options.shape),
        })?;
        tracing::debug!(
            data = n,
            rows = profile.rows,
            cols = profile.cols,
            padding = profile.data_codewords - n,
            mode = high_level.mode.name(),
            "datamatrix symbol"
        );

        let mut codewords = high_level.codewords;
        pad(&mut codewords, high_level.mode, profile);
        let codewords = ecc::encode_blocks(&codewords, profile);

        Ok(Self { profile, codewords })
    }

    pub fn profile(&self) -> &'static SymbolProfile {
        self.profile
    }

    /// Every codeword, data first then interleaved error correction.
    pub fn codewords(&self) -> &[u8] {
        &self.codewords
    }

    pub fn data_codewords(&self) -> &[u8] {
        &self.codewords[..self.profile.data_codewords]
    }

    pub fn to_grid(&self) -> SymbolGrid {
        let map = MatrixMap::for_profile(self.profile);
        placement::assemble(self.profile, &map, &self.codewords)
    }
}

/// Encodes `data` in the smallest square symbol.
pub fn encode(data: &[u8]) -> Result<SymbolGrid> {
    encode_with(data, &DataMatrixOptions::default())
}

pub fn encode_with(data: &[u8], options: &DataMatrixOptions) -> Result<SymbolGrid> {
    Ok(DataMatrixSymbol::new(data, options)?.to_grid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use high_level::LATCH_C40;
    use profile::PROFILES;

    #[test]
    fn test_reference_symbol() {
        let symbol = DataMatrixSymbol::new(b"123456", &DataMatrixOptions::default()).unwrap();
        assert_eq!((symbol.profile().rows, symbol.profile().cols), (10, 10));
        assert_eq!(symbol.codewords(), &[142, 164, 186, 114, 25, 5, 88, 102]);
    }

    #[test]
    fn test_digits_stay_in_ascii() {
        let symbol = DataMatrixSymbol::new(b"12345678", &DataMatrixOptions::default()).unwrap();
        assert_eq!(symbol.data_codewords(), &[142, 164, 186, 208, PAD]);
        assert_eq!(symbol.profile().rows, 12);
    }

    #[test]
    fn test_pad() {
        let profile = &PROFILES[1];
        let mut cws = vec![50];
        pad(&mut cws, Mode::Ascii, profile);
        assert_eq!(cws, [50, 129, 70, 220, 115]);

        let mut cws = vec![LATCH_C40, 89, 233];
        pad(&mut cws, Mode::C40, profile);
        assert_eq!(cws, [LATCH_C40, 89, 233, UNLATCH, 129]);
    }

    #[test]
    fn test_pad_after_edifact() {
        // two codewords left: no unlatch
        let mut cws = vec![240, 1, 2];
        pad(&mut cws, Mode::Edifact, &PROFILES[1]);
        assert_eq!(cws, [240, 1, 2, 129, 115]);

        let mut cws = vec![240, 1, 2, 3];
        pad(&mut cws, Mode::Edifact, &PROFILES[2]);
        assert_eq!(cws, [240, 1, 2, 3, 124, 129, 161, 56]);
    }

    #[test]
    fn test_full_text_symbol() {
        // ends in Text with the symbol full: no unlatch
        let options = DataMatrixOptions::default();
        let symbol = DataMatrixSymbol::new(b"Hello, World!", &options).unwrap();
        assert_eq!((symbol.profile().rows, symbol.profile().cols), (16, 16));
        assert_eq!(
            symbol.data_codewords(),
            &[73, 239, 116, 130, 175, 52, 19, 40, 179, 242, 106, 105]
        );
    }

    #[test]
    fn test_capacity_boundary() {
        let data = vec![b'0'; 3116];
        let symbol = DataMatrixSymbol::new(&data, &DataMatrixOptions::default()).unwrap();
        assert_eq!(symbol.profile().rows, 144);
        assert!(symbol.data_codewords().iter().all(|&c| c == 130));

        let data = vec![b'0'; 3117];
        assert_eq!(encode(&data), Err(Error::CapacityExceeded { needed: 1559, capacity: 1558 }));
    }

    #[test]
    fn test_grid_matches_profile() {
        for p in PROFILES.iter() {
            let shape = if p.is_square() { SymbolShape::Square } else { SymbolShape::Rectangle };
            // digit pairs fill the capacity exactly
            let data = vec![b'7'; 2 * p.data_codewords];
            let grid = encode_with(&data, &DataMatrixOptions::new().shape(shape)).unwrap();
            assert_eq!((grid.num_rows(), grid.num_cols()), (p.rows, p.cols));
        }
    }

    #[test]
    fn test_rectangle_shape() {
        let options = DataMatrixOptions::new().shape(SymbolShape::Rectangle);
        let symbol = DataMatrixSymbol::new(b"ABCDEFGHIJKLMNOP", &options).unwrap();
        assert_eq!((symbol.profile().rows, symbol.profile().cols), (12, 26));
        // no room for the last letter alone: unlatch then ASCII
        assert_eq!(symbol.data_codewords()[11..13], [UNLATCH, b'P' + 1]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(encode(b""), Err(Error::InvalidInput));
        let options = DataMatrixOptions::new().shape(SymbolShape::Rectangle);
        assert!(matches!(
            encode_with(&[0xAB; 60], &options),
            Err(Error::CapacityExceeded { capacity: 49, .. })
        ));
    }
}
