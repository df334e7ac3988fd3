//! Module placement: the diagonal "utah" sweep over the placement matrix and
//! the assembly of the finder patterns around every data region.

use crate::datamatrix::profile::SymbolProfile;
use crate::SymbolGrid;

/// Content of one module of the placement matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    /// Fixed module of the lower right corner, never carrying data.
    Fixed(bool),
    /// Bit `bit` (1 is the most significant) of codeword `codeword`.
    Data { codeword: u16, bit: u8 },
}

/// Placement matrix of one symbol size: which codeword bit every module
/// carries, finder patterns excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixMap {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    /// Next codeword to place during the sweep.
    next: u16,
}

impl MatrixMap {
    /// Runs the sweep on a `rows` x `cols` placement matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut map = Self { rows, cols, cells: vec![Cell::Empty; rows * cols], next: 0 };
        map.sweep();
        map
    }

    pub fn for_profile(profile: &SymbolProfile) -> Self {
        Self::new(profile.data_rows, profile.data_cols)
    }

    #[inline]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Number of codewords the matrix holds.
    #[inline]
    pub const fn codewords(&self) -> usize {
        self.next as usize
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn is_empty(&self, row: isize, col: isize) -> bool {
        self.cells[row as usize * self.cols + col as usize] == Cell::Empty
    }

    /// Places one bit, wrapping negative coordinates around the matrix.
    fn module(&mut self, mut row: isize, mut col: isize, codeword: u16, bit: u8) {
        let (nrow, ncol) = (self.rows as isize, self.cols as isize);
        if row < 0 {
            row += nrow;
            col += 4 - ((nrow + 4) % 8);
        }
        if col < 0 {
            col += ncol;
            row += 4 - ((ncol + 4) % 8);
        }
        self.cells[row as usize * self.cols + col as usize] = Cell::Data { codeword, bit };
    }

    /// Places the 8 bits of the next codeword, given as (row, col) offsets.
    fn place(&mut self, positions: [(isize, isize); 8]) {
        let codeword = self.next;
        for (k, (row, col)) in positions.into_iter().enumerate() {
            self.module(row, col, codeword, k as u8 + 1);
        }
        self.next += 1;
    }

    fn utah(&mut self, r: isize, c: isize) {
        self.place([
            (r - 2, c - 2), (r - 2, c - 1),
            (r - 1, c - 2), (r - 1, c - 1), (r - 1, c),
            (r, c - 2), (r, c - 1), (r, c),
        ]);
    }

    fn corner_a(&mut self) {
        let (nr, nc) = (self.rows as isize, self.cols as isize);
        self.place([
            (nr - 1, 0), (nr - 1, 1), (nr - 1, 2),
            (0, nc - 2), (0, nc - 1), (1, nc - 1), (2, nc - 1), (3, nc - 1),
        ]);
    }

    fn corner_b(&mut self) {
        let (nr, nc) = (self.rows as isize, self.cols as isize);
        self.place([
            (nr - 3, 0), (nr - 2, 0), (nr - 1, 0),
            (0, nc - 4), (0, nc - 3), (0, nc - 2), (0, nc - 1), (1, nc - 1),
        ]);
    }

    fn corner_c(&mut self) {
        let (nr, nc) = (self.rows as isize, self.cols as isize);
        self.place([
            (nr - 3, 0), (nr - 2, 0), (nr - 1, 0),
            (0, nc - 2), (0, nc - 1), (1, nc - 1), (2, nc - 1), (3, nc - 1),
        ]);
    }

    fn corner_d(&mut self) {
        let (nr, nc) = (self.rows as isize, self.cols as isize);
        self.place([
            (nr - 1, 0), (nr - 1, nc - 1),
            (0, nc - 3), (0, nc - 2), (0, nc - 1), (1, nc - 3), (1, nc - 2), (1, nc - 1),
        ]);
    }

    fn sweep(&mut self) {
        let (nrow, ncol) = (self.rows as isize, self.cols as isize);
        let (mut row, mut col): (isize, isize) = (4, 0);

        loop {
            // corner cases are checked before each pair of diagonals
            if row == nrow && col == 0 {
                self.corner_a();
            }
            if row == nrow - 2 && col == 0 && ncol % 4 != 0 {
                self.corner_b();
            }
            if row == nrow - 2 && col == 0 && ncol % 8 == 4 {
                self.corner_c();
            }
            if row == nrow + 4 && col == 2 && ncol % 8 == 0 {
                self.corner_d();
            }

            // up and right
            loop {
                if row < nrow && col >= 0 && self.is_empty(row, col) {
                    self.utah(row, col);
                }
                row -= 2;
                col += 2;
                if row < 0 || col >= ncol {
                    break;
                }
            }
            row += 1;
            col += 3;

            // down and left
            loop {
                if row >= 0 && col < ncol && self.is_empty(row, col) {
                    self.utah(row, col);
                }
                row += 2;
                col -= 2;
                if row >= nrow || col < 0 {
                    break;
                }
            }
            row += 3;
            col += 1;

            if row >= nrow && col >= ncol {
                break;
            }
        }

        let (r, c) = (self.rows - 1, self.cols - 1);
        if self.cells[r * self.cols + c] == Cell::Empty {
            self.cells[r * self.cols + c] = Cell::Fixed(true);
            self.cells[r * self.cols + c - 1] = Cell::Fixed(false);
            self.cells[(r - 1) * self.cols + c] = Cell::Fixed(false);
            self.cells[(r - 1) * self.cols + c - 1] = Cell::Fixed(true);
        }
    }

    /// Resolves every cell against `codewords`, row-major.
    pub fn resolve(&self, codewords: &[u8]) -> Vec<bool> {
        self.cells.iter().map(|cell| match *cell {
            Cell::Empty => false,
            Cell::Fixed(on) => on,
            Cell::Data { codeword, bit } => (codewords[codeword as usize] >> (8 - bit)) & 1 != 0,
        }).collect()
    }
}

/// Lays the placement matrix out in its data regions and draws the finder
/// pattern around each of them: solid left and bottom edges, alternating top
/// and right edges.
pub fn assemble(profile: &SymbolProfile, map: &MatrixMap, codewords: &[u8]) -> SymbolGrid {
    debug_assert_eq!((map.rows(), map.cols()), (profile.data_rows, profile.data_cols));

    let bits = map.resolve(codewords);
    let (rr, rc) = (profile.region_rows, profile.region_cols);
    let mut modules = Vec::with_capacity(profile.rows * profile.cols);

    for row in 0..profile.rows {
        let (vr, r) = (row / rr, row % rr);
        for col in 0..profile.cols {
            let (hr, c) = (col / rc, col % rc);
            let on = if r == 0 {
                c % 2 == 0
            } else if r == rr - 1 || c == 0 {
                true
            } else if c == rc - 1 {
                r % 2 == 1
            } else {
                let data_row = vr * (rr - 2) + r - 1;
                let data_col = hr * (rc - 2) + c - 1;
                bits[data_row * map.cols() + data_col]
            };
            modules.push(on);
        }
    }

    SymbolGrid::new(profile.rows, profile.cols, modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamatrix::profile::PROFILES;

    #[test]
    fn test_every_codeword_bit_placed_once() {
        for p in PROFILES.iter() {
            let map = MatrixMap::for_profile(p);
            assert_eq!(map.codewords(), p.total_codewords(), "{}x{}", p.rows, p.cols);
            assert!(map.cells().iter().all(|&c| c != Cell::Empty), "{}x{}", p.rows, p.cols);

            let mut seen = vec![0u8; p.total_codewords()];
            for cell in map.cells() {
                if let Cell::Data { codeword, bit } = *cell {
                    seen[codeword as usize] |= 1 << (bit - 1);
                }
            }
            assert!(seen.iter().all(|&s| s == 0xFF), "{}x{}", p.rows, p.cols);
        }
    }

    #[test]
    fn test_fixed_corner() {
        // 12x12 leaves 4 modules
        let map = MatrixMap::new(10, 10);
        assert_eq!(map.get(9, 9), Cell::Fixed(true));
        assert_eq!(map.get(8, 8), Cell::Fixed(true));
        assert_eq!(map.get(9, 8), Cell::Fixed(false));
        assert_eq!(map.get(8, 9), Cell::Fixed(false));

        let map = MatrixMap::new(8, 8);
        assert!(matches!(map.get(7, 7), Cell::Data { .. }));
    }

    #[test]
    fn test_first_codeword_utah() {
        let map = MatrixMap::new(8, 8);
        // the first utah sits at row 4, col 0, wrapped to the right edge
        assert_eq!(map.get(4, 0), Cell::Data { codeword: 0, bit: 8 });
        assert_eq!(map.get(2, 6), Cell::Data { codeword: 0, bit: 1 });
    }

    #[test]
    fn test_finder_pattern() {
        let p = &PROFILES[0];
        let map = MatrixMap::for_profile(p);
        let grid = assemble(p, &map, &[0; 8]);
        assert_eq!((grid.num_rows(), grid.num_cols()), (10, 10));

        let rows = grid.to_rows();
        let top: Vec<bool> = (0..10).map(|c| c % 2 == 0).collect();
        assert_eq!(rows[0], top);
        assert!(rows[9].iter().all(|&m| m));
        assert!(rows.iter().all(|r| r[0]));
        let right: Vec<bool> = rows.iter().map(|r| r[9]).collect();
        assert_eq!(right, (0..10).map(|r| r % 2 == 1 || r == 9).collect::<Vec<_>>());
        // all zero codewords leave the data area light
        assert!(rows[1..9].iter().all(|r| r[1..9].iter().all(|&m| !m)));
    }

    #[test]
    fn test_regions_of_rectangle() {
        let p = PROFILES.iter().find(|p| (p.rows, p.cols) == (8, 32)).unwrap();
        let map = MatrixMap::for_profile(p);
        let grid = assemble(p, &map, &vec![0xFF; p.total_codewords()]);
        assert_eq!((grid.num_rows(), grid.num_cols()), (8, 32));
        // the second region starts with a solid left edge at column 16
        assert!((0..8).all(|r| grid.get(r, 16)));
        assert!(!grid.get(0, 15));
        // every data module is dark
        assert!((1..7).all(|r| (1..15).chain(17..31).all(|c| grid.get(r, c))));
    }
}
