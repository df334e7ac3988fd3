#[cfg(test)]
mod pdf417_proptests {
    use proptest::prelude::*;

    use barcode2d::pdf417::{ecc, high_level, Pdf417Options, Pdf417Symbol};
    use barcode2d::pdf417::{MAX_COLS, MAX_ROWS, QUIET_H, QUIET_V, ROW_HEIGHT};
    use barcode2d::Error;

    /// Data codewords, length descriptor and padding excluded.
    fn payload(symbol: &Pdf417Symbol) -> Vec<u16> {
        let cws = symbol.codewords();
        let end = cws[0] as usize;
        let mut data = cws[1..end].to_vec();
        while data.last() == Some(&high_level::CW_PADDING) {
            data.pop();
        }
        data
    }

    fn decode_bytes(latch: u16, cws: &[u16]) -> Vec<u8> {
        let tail = match latch {
            high_level::M_LATCH_BYTE_M6 => 0,
            _ if cws.len() % 5 == 0 => 5,
            _ => cws.len() % 5,
        };
        let (groups, rest) = cws.split_at(cws.len() - tail);

        let mut out = Vec::new();
        for group in groups.chunks(5) {
            let v = group.iter().fold(0u64, |acc, &c| acc * 900 + c as u64);
            out.extend_from_slice(&v.to_be_bytes()[2..]);
        }
        out.extend(rest.iter().map(|&c| c as u8));
        out
    }

    fn decode_numeric(cws: &[u16]) -> String {
        let v = cws.iter().fold(0u128, |acc, &c| acc * 900 + c as u128);
        v.to_string()[1..].to_string()
    }

    proptest! {
        #[test]
        fn proptest_binary(data in prop::collection::vec(0x80u8..=0xFF, 1..300)) {
            let symbol = Pdf417Symbol::new(&data, &Pdf417Options::default()).unwrap();
            let cws = payload(&symbol);
            prop_assert!(matches!(cws[0], high_level::M_LATCH_BYTE | high_level::M_LATCH_BYTE_M6));
            prop_assert_eq!(decode_bytes(cws[0], &cws[1..]), data);
        }

        #[test]
        fn proptest_numeric(data in "[0-9]{13,30}") {
            let symbol = Pdf417Symbol::new(data.as_bytes(), &Pdf417Options::default()).unwrap();
            let cws = payload(&symbol);
            prop_assert_eq!(cws[0], high_level::M_LATCH_NUMERIC);
            prop_assert_eq!(decode_numeric(&cws[1..]), data);
        }

        #[test]
        fn proptest_layout(
            data in prop::collection::vec(any::<u8>(), 1..1200),
            ratio in 0.5f64..8.0,
        ) {
            let options = Pdf417Options::new().aspect_ratio(ratio);
            let symbol = match Pdf417Symbol::new(&data, &options) {
                Ok(symbol) => symbol,
                Err(Error::CapacityExceeded { capacity, .. }) => {
                    prop_assert_eq!(capacity, 925);
                    return Ok(());
                }
                Err(e) => return Err(TestCaseError::fail(e.to_string())),
            };

            let (rows, cols) = (symbol.rows() as usize, symbol.cols() as usize);
            prop_assert!((3..=MAX_ROWS as usize).contains(&rows));
            prop_assert!((1..=MAX_COLS as usize).contains(&cols));

            let cws = symbol.codewords();
            prop_assert_eq!(cws.len(), rows * cols);
            prop_assert_eq!(cws[0] as usize + ecc::ecc_count(symbol.level()), cws.len());
            prop_assert!(cws.iter().all(|&c| c < 929));

            let grid = barcode2d::pdf417::encode_with(&data, &options).unwrap();
            prop_assert_eq!(grid.num_cols(), (cols + 2) * 17 + 35 + 2 * QUIET_H);
            prop_assert_eq!(grid.num_rows(), rows * ROW_HEIGHT + 2 * QUIET_V);
        }

        #[test]
        fn proptest_deterministic(data in prop::collection::vec(any::<u8>(), 1..300)) {
            let options = Pdf417Options::default();
            prop_assert_eq!(Pdf417Symbol::new(&data, &options), Pdf417Symbol::new(&data, &options));
        }
    }
}

#[cfg(test)]
mod pdf417_tests {
    use test_case::test_case;

    use barcode2d::pdf417::{self, MacroBlock, Pdf417Options, Pdf417Symbol};
    use barcode2d::Error;

    #[test_case(-1, 2 ; "automatic")]
    #[test_case(0, 0 ; "lowest")]
    #[test_case(8, 8 ; "highest")]
    #[test_case(9, 2 ; "out of range")]
    fn test_ec_level(requested: i8, expected: u8) {
        let options = Pdf417Options::new().ec_level(requested);
        assert_eq!(Pdf417Symbol::new(b"Test!", &options).unwrap().level(), expected);
    }

    #[test]
    fn test_wider_ratio_gives_more_columns() {
        let data = vec![b'x'; 200];
        let narrow = Pdf417Symbol::new(&data, &Pdf417Options::new().aspect_ratio(1.0)).unwrap();
        let wide = Pdf417Symbol::new(&data, &Pdf417Options::new().aspect_ratio(8.0)).unwrap();
        assert!(wide.cols() > narrow.cols());
        assert!(wide.rows() < narrow.rows());
    }

    #[test]
    fn test_structured_append() {
        let data = b"first part of the file";
        let alone = Pdf417Symbol::new(data, &Pdf417Options::default()).unwrap();
        let block = MacroBlock::new(0, 2, "017053").file_name("report.txt").segment_count(2);
        let part = Pdf417Symbol::new(data, &Pdf417Options::new().macro_block(block)).unwrap();
        assert!(part.codewords()[0] > alone.codewords()[0]);
    }

    #[test]
    fn test_custom_geometry() {
        let options = Pdf417Options::new().row_height(1).quiet_zone(0, 0);
        let symbol = Pdf417Symbol::new(b"Hello", &options).unwrap();
        let grid = pdf417::encode_with(b"Hello", &options).unwrap();
        assert_eq!(grid.num_rows(), symbol.rows() as usize);
        assert_eq!(grid.modules(), symbol.bits().collect::<Vec<_>>());
    }

    #[test]
    fn test_errors() {
        assert_eq!(pdf417::encode(b""), Err(Error::InvalidInput));
        let options = Pdf417Options::new().row_height(0);
        assert!(matches!(pdf417::encode_with(b"abc", &options), Err(Error::InvalidParameter(_))));
    }
}
