//! Symbol dimensions from the codeword count and the requested aspect ratio.

use crate::pdf417::{MAX_CODEWORDS, MAX_COLS, MAX_ROWS, MIN_COLS, MIN_ROWS};

/// Number of rows and data columns (in codewords) of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: u8,
    pub cols: u8,
}

impl Dimensions {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// Codewords held by the symbol, row indicators excluded.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub(crate) const fn as_pair(&self) -> (u8, u8) {
        (self.rows, self.cols)
    }
}

/// Chosen dimensions and the number of 900 filler codewords to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub dimensions: Dimensions,
    pub padding: usize,
}

// The two 928 codewords geometries, as (rows, cols).
const TALL: (u8, u8) = (58, 16);
const WIDE: (u8, u8) = (32, 29);

/// Lays out `required` codewords (length descriptor, data, macro block and
/// error correction) so that the symbol's width over height is close to
/// `aspect_ratio`, a row being `row_height` modules tall.
pub fn layout(required: usize, aspect_ratio: f64, row_height: usize) -> Layout {
    debug_assert!(required <= MAX_CODEWORDS);

    let area = 68.0 * aspect_ratio * row_height as f64 * required as f64;
    let cols = ((4761.0 + area).sqrt() - 69.0) / 34.0;
    let mut cols = (cols.round().max(0.0) as usize).clamp(MIN_COLS as usize, MAX_COLS as usize);
    let mut rows = required.div_ceil(cols);
    let mut size = rows * cols;

    if rows < MIN_ROWS as usize || rows > MAX_ROWS as usize {
        rows = rows.clamp(MIN_ROWS as usize, MAX_ROWS as usize);
        cols = size.div_ceil(rows);
        size = rows * cols;
    }

    if size > MAX_CODEWORDS {
        let wide_ratio = 17.0 * WIDE.1 as f64 / WIDE.0 as f64;
        let tall_ratio = 17.0 * TALL.1 as f64 / TALL.0 as f64;
        let wide_is_closer = (aspect_ratio - wide_ratio).abs() < (aspect_ratio - tall_ratio).abs();
        let (r, c) = if wide_is_closer { WIDE } else { TALL };
        rows = r as usize;
        cols = c as usize;
        size = rows * cols;
    }

    let mut padding = size - required;
    if padding > 0 && padding == cols && rows > MIN_ROWS as usize {
        rows -= 1;
        padding = 0;
    }

    tracing::debug!(rows, cols, padding, "pdf417 layout");
    Layout { dimensions: Dimensions::new(rows as u8, cols as u8), padding }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(3, 2.0, 4, 3, 1, 0 ; "tiny payload gets one column")]
    #[test_case(25, 2.0, 4, 13, 2, 1 ; "small payload")]
    #[test_case(100, 2.0, 4, 20, 5, 0 ; "medium payload")]
    #[test_case(100, 0.5, 4, 50, 2, 0 ; "tall ratio")]
    #[test_case(920, 12.0, 4, 32, 29, 8 ; "wide maximum geometry")]
    #[test_case(912, 0.5, 4, 57, 16, 0 ; "one row of padding is dropped")]
    fn test_layout(
        required: usize,
        ratio: f64,
        row_height: usize,
        rows: u8,
        cols: u8,
        padding: usize,
    ) {
        let l = layout(required, ratio, row_height);
        assert_eq!(l.dimensions, Dimensions::new(rows, cols));
        assert_eq!(l.padding, padding);
        assert_eq!(l.dimensions.capacity(), required + l.padding);
    }

    #[test]
    fn test_layout_always_fits() {
        for required in 1..=MAX_CODEWORDS {
            for ratio in [0.1, 1.0, 2.0, 5.0, 40.0] {
                let l = layout(required, ratio, 4);
                let d = l.dimensions;
                assert!((MIN_ROWS..=MAX_ROWS).contains(&d.rows), "{required} {ratio} {d:?}");
                assert!((MIN_COLS..=MAX_COLS).contains(&d.cols), "{required} {ratio} {d:?}");
                assert_eq!(d.capacity(), required + l.padding, "{required} {ratio}");
            }
        }
    }

    #[test]
    fn test_maximum_capacity_geometries() {
        // 31 rows of 30 columns would go over 928 codewords
        let wide = layout(928, 12.0, 4);
        assert_eq!(wide.dimensions, Dimensions::new(32, 29));
        assert_eq!(wide.padding, 0);

        let tall = layout(928, 3.0, 4);
        assert_eq!(tall.dimensions, Dimensions::new(58, 16));
    }
}
