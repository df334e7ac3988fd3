//! Prints a Data Matrix and a PDF417 symbol in the terminal.
//!
//! Run with: cargo run --example terminal -- "some text"
//! Pass `-v` for debug logs, `-vv` for trace logs.

mod utils;

use barcode2d::datamatrix::{self, DataMatrixOptions, SymbolShape};
use barcode2d::pdf417::{self, Pdf417Options};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let level = match args.iter().position(|a| a == "-v" || a == "-vv") {
        Some(i) => match args.remove(i).as_str() {
            "-vv" => tracing::Level::TRACE,
            _ => tracing::Level::DEBUG,
        },
        None => tracing::Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let text = args.first().map(String::as_str).unwrap_or("Hello, world from *rust* !");

    let grid = datamatrix::encode(text.as_bytes())?;
    println!("Data Matrix {}x{}", grid.num_rows(), grid.num_cols());
    utils::display_grid(&grid);

    let options = DataMatrixOptions::new().shape(SymbolShape::Rectangle);
    match datamatrix::encode_with(text.as_bytes(), &options) {
        Ok(grid) => {
            println!("Data Matrix {}x{}", grid.num_rows(), grid.num_cols());
            utils::display_grid(&grid);
        }
        Err(e) => println!("no rectangular symbol: {e}"),
    }

    let options = Pdf417Options::new().aspect_ratio(4.0).row_height(2).quiet_zone(0, 0);
    let grid = pdf417::encode_with(text.as_bytes(), &options)?;
    println!("PDF417 {} modules wide", grid.num_cols());
    utils::display_grid(&grid);

    Ok(())
}
