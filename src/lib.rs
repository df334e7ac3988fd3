//! Data Matrix (ECC 200) and PDF417 encoders.
//!
//! Both symbologies turn a byte payload into a [`SymbolGrid`], a matrix of
//! dark and light modules. Rendering the grid (pixels, SVG, terminal) is left
//! to the caller.
//!
//! ```
//! use barcode2d::{datamatrix, pdf417};
//!
//! let dm = datamatrix::encode(b"Hello, World!").unwrap();
//! assert_eq!((dm.num_rows(), dm.num_cols()), (16, 16));
//!
//! let pdf = pdf417::encode(b"Hello, World!").unwrap();
//! assert!(pdf.get(2, 2)); // first module of the start pattern
//! ```

pub mod datamatrix;
pub mod pdf417;

mod error;
mod grid;

pub use error::{Error, Result};
pub use grid::SymbolGrid;
