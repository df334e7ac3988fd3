use barcode2d::SymbolGrid;

const WHITE: &str = "\x1B[38;2;255;255;255m█";
const BLACK: &str = "\x1B[38;2;0;0;0m█";
const PADDING: usize = 4;

/// Prints `grid` with true color blocks, two characters per module so that
/// modules look square, inside a white margin of `PADDING` modules.
pub fn display_grid(grid: &SymbolGrid) {
    let width = 2 * (grid.num_cols() + PADDING * 2);
    let quiet_zone_v = str::repeat(WHITE, width);
    let quiet_zone_h = str::repeat(WHITE, 2 * PADDING);

    for _ in 0..PADDING / 2 {
        println!("{quiet_zone_v}");
    }
    for row in grid.rows() {
        print!("{quiet_zone_h}");
        for &on in row {
            let block = if on { BLACK } else { WHITE };
            print!("{block}{block}");
        }
        println!("{quiet_zone_h}");
    }
    for _ in 0..PADDING / 2 {
        println!("{quiet_zone_v}");
    }
    println!("\x1B[0m");
}
