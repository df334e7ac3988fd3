use core::fmt;

/// Final artifact of an encode call: a matrix of dark (`true`) and light
/// (`false`) modules handed over to a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolGrid {
    num_rows: usize,
    num_cols: usize,
    modules: Vec<bool>,
}

impl SymbolGrid {
    /// Wraps a row-major module buffer. `modules.len()` must be
    /// `num_rows * num_cols`.
    pub(crate) fn new(num_rows: usize, num_cols: usize, modules: Vec<bool>) -> Self {
        assert_eq!(
            modules.len(),
            num_rows * num_cols,
            "module buffer does not match the grid size"
        );
        Self { num_rows, num_cols, modules }
    }

    #[inline]
    pub const fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub const fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Returns the module at (`row`, `col`), `true` meaning dark.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.num_rows && col < self.num_cols, "module ({row}, {col}) out of bounds");
        self.modules[row * self.num_cols + col]
    }

    /// Row-major view of every module.
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[bool]> + '_ {
        self.modules.chunks_exact(self.num_cols)
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows().map(<[bool]>::to_vec).collect()
    }

    /// Number of dark modules, handy to compare two symbols at a glance.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

impl fmt::Display for SymbolGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &on in row {
                f.write_str(if on { "#" } else { " " })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolGrid;

    #[test]
    fn test_rows_and_get() {
        let grid = SymbolGrid::new(2, 3, vec![true, false, true, false, false, true]);
        assert_eq!(grid.num_rows(), 2);
        assert_eq!(grid.num_cols(), 3);
        assert!(grid.get(1, 2));
        assert!(!grid.get(1, 0));
        assert_eq!(grid.to_rows(), vec![vec![true, false, true], vec![false, false, true]]);
        assert_eq!(grid.dark_count(), 3);
        assert_eq!(grid.to_string(), "# #\n  #\n");
    }

    #[test]
    #[should_panic]
    fn test_size_mismatch() {
        SymbolGrid::new(2, 2, vec![true; 3]);
    }
}
