use core::iter;

use crate::pdf417::generators::bitfield::Bitfield;
use crate::pdf417::generators::{END_PAT, START_PAT};

/// Values shared by the left and right indicators of every row, before the
/// per-row offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIndicators {
    rows_val: u16,
    cols_val: u16,
    level_val: u16,
}

impl RowIndicators {
    pub const fn new(rows: u8, cols: u8, level: u8) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        Self {
            rows_val: (rows as u16 - 1) / 3,
            cols_val: cols as u16 - 1,
            level_val: level as u16 * 3 + (rows as u16 - 1) % 3,
        }
    }

    /// (left, right) indicator codewords of `row`.
    pub const fn for_row(&self, row: u8) -> (u16, u16) {
        let row_id = (row / 3) as u16 * 30;
        let (left, right) = match row % 3 {
            0 => (self.rows_val, self.cols_val),
            1 => (self.level_val, self.rows_val),
            _ => (self.cols_val, self.level_val),
        };
        (left + row_id, right + row_id)
    }
}

#[derive(Debug, Clone, Copy)]
enum RowPattern {
    Start,
    Left,
    Data,
    Right,
    End,
    None,
}

/// Bar patterns of one row: start, left indicator, data, right indicator
/// and stop.
#[derive(Debug, Clone)]
pub struct Pdf417Row<'a> {
    codewords: &'a [u16],
    next_pat: RowPattern,
    table: u8,
    /// (left, right)
    markers: (u16, u16),
}

impl<'a> Pdf417Row<'a> {
    pub fn new(codewords: &'a [u16], row: u8, indicators: RowIndicators) -> Self {
        debug_assert!(!codewords.is_empty());
        Self {
            codewords,
            table: row % 3,
            markers: indicators.for_row(row),
            next_pat: RowPattern::Start,
        }
    }

    /// Cluster of this row (0, 1 or 2 for clusters 0, 3 and 6).
    #[inline]
    pub const fn table(&self) -> u8 {
        self.table
    }

    /// Width in modules of a row holding `cols` data codewords.
    pub const fn width(cols: usize) -> usize {
        (cols + 2) * 17 + START_PAT.width() as usize + END_PAT.width() as usize
    }
}

impl<'a> iter::Iterator for Pdf417Row<'a> {
    type Item = Bitfield;

    fn next(&mut self) -> Option<Self::Item> {
        let (item, next) = match self.next_pat {
            RowPattern::Start => (Some(START_PAT), RowPattern::Left),
            RowPattern::Left => {
                (Some(Bitfield::codeword(self.table, self.markers.0)), RowPattern::Data)
            }
            RowPattern::Data => {
                let cw = self.codewords[0];
                self.codewords = &self.codewords[1..];

                let next = if self.codewords.is_empty() {
                    RowPattern::Right
                } else {
                    RowPattern::Data
                };

                (Some(Bitfield::codeword(self.table, cw)), next)
            }
            RowPattern::Right => {
                (Some(Bitfield::codeword(self.table, self.markers.1)), RowPattern::End)
            }
            RowPattern::End => (Some(END_PAT), RowPattern::None),
            RowPattern::None => (None, RowPattern::None),
        };

        self.next_pat = next;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = match self.next_pat {
            RowPattern::Start => self.codewords.len() + 4,
            RowPattern::Left => self.codewords.len() + 3,
            RowPattern::Data => self.codewords.len() + 2,
            RowPattern::Right => 2,
            RowPattern::End => 1,
            RowPattern::None => 0,
        };
        (count, Some(count))
    }
}

impl<'a> ExactSizeIterator for Pdf417Row<'a> {}
impl<'a> iter::FusedIterator for Pdf417Row<'a> {}

/// Splits a full codeword matrix into its rows.
#[derive(Debug, Clone)]
pub struct Pdf417Rows<'a> {
    codewords: &'a [u16],
    cols: usize,
    indicators: RowIndicators,
    row: u8,
}

impl<'a> Pdf417Rows<'a> {
    pub fn new(codewords: &'a [u16], (rows, cols): (u8, u8), level: u8) -> Self {
        assert_eq!(
            codewords.len(),
            rows as usize * cols as usize,
            "codewords do not fill the symbol"
        );
        Self {
            codewords,
            cols: cols as usize,
            indicators: RowIndicators::new(rows, cols, level),
            row: 0,
        }
    }
}

impl<'a> iter::Iterator for Pdf417Rows<'a> {
    type Item = Pdf417Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.codewords.is_empty() {
            return None;
        }

        let (current, rest) = self.codewords.split_at(self.cols);
        self.codewords = rest;
        let row = Pdf417Row::new(current, self.row, self.indicators);

        self.row += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.codewords.len() / self.cols;
        (count, Some(count))
    }
}

impl<'a> ExactSizeIterator for Pdf417Rows<'a> {}
impl<'a> iter::FusedIterator for Pdf417Rows<'a> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicators_per_cluster() {
        // 10 rows, 4 columns, level 2
        let ind = RowIndicators::new(10, 4, 2);
        assert_eq!(ind.for_row(0), (3, 3));
        assert_eq!(ind.for_row(1), (2 * 3 + 0, 3));
        assert_eq!(ind.for_row(2), (3, 6));
        assert_eq!(ind.for_row(3), (30 + 3, 30 + 3));
        assert_eq!(ind.for_row(9), (90 + 3, 90 + 3));
    }

    #[test]
    fn test_row_layout() {
        let cws = [1, 2, 3];
        let row = Pdf417Row::new(&cws, 4, RowIndicators::new(6, 3, 1));
        assert_eq!(row.len(), 3 + 4);
        assert_eq!(row.table(), 1);

        let fields: Vec<Bitfield> = row.collect();
        assert_eq!(fields[0], START_PAT);
        assert_eq!(fields[6], END_PAT);
        assert!(fields[1..6].iter().all(|f| f.width() == 17));
        // every codeword pattern starts with a bar and ends with a space
        assert!(fields[1..6].iter().all(|f| f.bits() >> 16 == 1 && f.bits() & 1 == 0));

        let modules: usize = fields.iter().map(|f| f.width() as usize).sum();
        assert_eq!(modules, Pdf417Row::width(3));
    }

    #[test]
    fn test_rows_iterator() {
        let cws: Vec<u16> = (0..12).collect();
        let rows: Vec<_> = Pdf417Rows::new(&cws, (4, 3), 0).collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows.iter().map(|r| r.table()).collect::<Vec<_>>(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_clusters_differ() {
        let a: Vec<_> = Pdf417Row::new(&[100], 0, RowIndicators::new(3, 1, 0)).collect();
        let b: Vec<_> = Pdf417Row::new(&[100], 1, RowIndicators::new(3, 1, 0)).collect();
        assert_ne!(a[2], b[2]);
    }
}
