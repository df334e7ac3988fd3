//! ECC 200 symbol sizes and capacities.

use crate::datamatrix::SymbolShape;

/// Geometry and codeword capacity of one symbol size. Region sizes include
/// their finder pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolProfile {
    /// Total rows, finder patterns included.
    pub rows: usize,
    /// Total columns, finder patterns included.
    pub cols: usize,
    /// Rows of the placement matrix (finder patterns removed).
    pub data_rows: usize,
    /// Columns of the placement matrix (finder patterns removed).
    pub data_cols: usize,
    pub region_rows: usize,
    pub region_cols: usize,
    /// Number of regions stacked vertically.
    pub regions_v: usize,
    /// Number of regions side by side.
    pub regions_h: usize,
    pub data_codewords: usize,
    pub ecc_codewords: usize,
    /// Number of interleaved Reed-Solomon blocks.
    pub blocks: usize,
    /// Error correction codewords of each block.
    pub block_ecc: usize,
}

impl SymbolProfile {
    const fn new(
        size: (usize, usize),
        region: (usize, usize),
        data_codewords: usize,
        ecc_codewords: usize,
        blocks: usize,
    ) -> Self {
        let (rows, cols) = size;
        let (region_rows, region_cols) = region;
        let regions_v = rows / region_rows;
        let regions_h = cols / region_cols;
        Self {
            rows,
            cols,
            data_rows: rows - 2 * regions_v,
            data_cols: cols - 2 * regions_h,
            region_rows,
            region_cols,
            regions_v,
            regions_h,
            data_codewords,
            ecc_codewords,
            blocks,
            block_ecc: ecc_codewords / blocks,
        }
    }

    #[inline]
    pub const fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    pub const fn regions(&self) -> usize {
        self.regions_v * self.regions_h
    }

    /// Data and error correction codewords together.
    #[inline]
    pub const fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_codewords
    }

    /// Data codewords of block `b`. The first blocks take one more codeword
    /// when the data does not split evenly.
    pub const fn block_data(&self, b: usize) -> usize {
        self.data_codewords / self.blocks + (b < self.data_codewords % self.blocks) as usize
    }

    pub fn matches(&self, shape: SymbolShape) -> bool {
        match shape {
            SymbolShape::Square => self.is_square(),
            SymbolShape::Rectangle => !self.is_square(),
            SymbolShape::Any => true,
        }
    }
}

#[rustfmt::skip]
pub const PROFILES: [SymbolProfile; 30] = [
    // square
    SymbolProfile::new((10, 10), (10, 10), 3, 5, 1),
    SymbolProfile::new((12, 12), (12, 12), 5, 7, 1),
    SymbolProfile::new((14, 14), (14, 14), 8, 10, 1),
    SymbolProfile::new((16, 16), (16, 16), 12, 12, 1),
    SymbolProfile::new((18, 18), (18, 18), 18, 14, 1),
    SymbolProfile::new((20, 20), (20, 20), 22, 18, 1),
    SymbolProfile::new((22, 22), (22, 22), 30, 20, 1),
    SymbolProfile::new((24, 24), (24, 24), 36, 24, 1),
    SymbolProfile::new((26, 26), (26, 26), 44, 28, 1),
    SymbolProfile::new((32, 32), (16, 16), 62, 36, 1),
    SymbolProfile::new((36, 36), (18, 18), 86, 42, 1),
    SymbolProfile::new((40, 40), (20, 20), 114, 48, 1),
    SymbolProfile::new((44, 44), (22, 22), 144, 56, 1),
    SymbolProfile::new((48, 48), (24, 24), 174, 68, 1),
    SymbolProfile::new((52, 52), (26, 26), 204, 84, 2),
    SymbolProfile::new((64, 64), (16, 16), 280, 112, 2),
    SymbolProfile::new((72, 72), (18, 18), 368, 144, 4),
    SymbolProfile::new((80, 80), (20, 20), 456, 192, 4),
    SymbolProfile::new((88, 88), (22, 22), 576, 224, 4),
    SymbolProfile::new((96, 96), (24, 24), 696, 272, 4),
    SymbolProfile::new((104, 104), (26, 26), 816, 336, 6),
    SymbolProfile::new((120, 120), (20, 20), 1050, 408, 6),
    SymbolProfile::new((132, 132), (22, 22), 1304, 496, 8),
    SymbolProfile::new((144, 144), (24, 24), 1558, 620, 10),
    // rectangle
    SymbolProfile::new((8, 18), (8, 18), 5, 7, 1),
    SymbolProfile::new((8, 32), (8, 16), 10, 11, 1),
    SymbolProfile::new((12, 26), (12, 26), 16, 14, 1),
    SymbolProfile::new((12, 36), (12, 18), 22, 18, 1),
    SymbolProfile::new((16, 36), (16, 18), 32, 24, 1),
    SymbolProfile::new((16, 48), (16, 24), 49, 28, 1),
];

/// Smallest profile of the given shape holding `data_codewords`.
pub fn select(data_codewords: usize, shape: SymbolShape) -> Option<&'static SymbolProfile> {
    PROFILES.iter()
        .filter(|p| p.matches(shape) && p.data_codewords >= data_codewords)
        .min_by_key(|p| p.data_codewords)
}

/// Largest data capacity available for `shape`.
pub fn max_capacity(shape: SymbolShape) -> usize {
    PROFILES.iter()
        .filter(|p| p.matches(shape))
        .map(|p| p.data_codewords)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_profiles_are_consistent() {
        for p in PROFILES.iter() {
            assert_eq!(p.rows % p.region_rows, 0, "{p:?}");
            assert_eq!(p.cols % p.region_cols, 0, "{p:?}");
            assert_eq!(p.ecc_codewords % p.blocks, 0, "{p:?}");
            assert_eq!((0..p.blocks).map(|b| p.block_data(b)).sum::<usize>(), p.data_codewords);
            // every module of the placement matrix holds a bit, except the
            // 2x2 fixed corner of some sizes
            let modules = p.data_rows * p.data_cols;
            assert!(modules - 8 * p.total_codewords() < 8, "{p:?}");
        }
    }

    #[test_case(1, SymbolShape::Square, (10, 10))]
    #[test_case(3, SymbolShape::Square, (10, 10))]
    #[test_case(4, SymbolShape::Square, (12, 12))]
    #[test_case(1558, SymbolShape::Square, (144, 144))]
    #[test_case(1, SymbolShape::Rectangle, (8, 18))]
    #[test_case(33, SymbolShape::Rectangle, (16, 48))]
    #[test_case(5, SymbolShape::Any, (12, 12))]
    #[test_case(9, SymbolShape::Any, (8, 32))]
    #[test_case(45, SymbolShape::Any, (16, 48))]
    #[test_case(50, SymbolShape::Any, (32, 32))]
    fn test_select(needed: usize, shape: SymbolShape, size: (usize, usize)) {
        let p = select(needed, shape).unwrap();
        assert_eq!((p.rows, p.cols), size);
    }

    #[test]
    fn test_select_too_big() {
        assert_eq!(select(1559, SymbolShape::Square), None);
        assert_eq!(select(50, SymbolShape::Rectangle), None);
        assert_eq!(max_capacity(SymbolShape::Rectangle), 49);
        assert_eq!(max_capacity(SymbolShape::Any), 1558);
    }

    #[test]
    fn test_largest_symbol_blocks() {
        let p = select(1558, SymbolShape::Square).unwrap();
        assert_eq!(p.block_data(0), 156);
        assert_eq!(p.block_data(9), 155);
        assert_eq!(p.block_ecc, 62);
        assert_eq!(p.regions(), 36);
    }
}
