//! Reed-Solomon error correction over the prime field GF(929).

use crate::pdf417::tables::*;
use crate::pdf417::MAX_CODEWORDS;

/// Highest error correction level.
pub const MAX_LEVEL: u8 = 8;

/// Number of error correction codewords for `level`.
pub const fn ecc_count(level: u8) -> usize {
    assert!(level <= MAX_LEVEL, "ECC level must be between 0 and 8 inclusive");
    1 << (level as usize + 1)
}

const fn factors(level: u8) -> &'static [u16] {
    match level {
        0 => &ECC_L0,
        1 => &ECC_L1,
        2 => &ECC_L2,
        3 => &ECC_L3,
        4 => &ECC_L4,
        5 => &ECC_L5,
        6 => &ECC_L6,
        7 => &ECC_L7,
        8 => &ECC_L8,
        _ => panic!("ECC level must be between 0 and 8 inclusive"),
    }
}

/// Picks the error correction level for `data` codewords (length descriptor
/// included). A `requested` level is honored when it fits; otherwise the
/// level is chosen from the recommended thresholds. Either way the result is
/// capped so that data and ECC stay within [MAX_CODEWORDS].
pub fn auto_level(requested: Option<u8>, data: usize) -> u8 {
    let mut max_level = MAX_LEVEL;
    while max_level > 0 && data + ecc_count(max_level) > MAX_CODEWORDS {
        max_level -= 1;
    }

    // thresholds are expressed on the payload, without the length descriptor
    let payload = data.saturating_sub(1);
    let level = match requested {
        Some(level) if level <= MAX_LEVEL => level,
        _ if payload < 41 => 2,
        _ if payload < 161 => 3,
        _ if payload < 321 => 4,
        _ if payload < 864 => 5,
        _ => max_level,
    };

    level.min(max_level)
}

/// Fills the last [ecc_count] slots of `codewords` with the error correction
/// codewords of everything before them.
pub fn generate_ecc(codewords: &mut [u16], level: u8) {
    let factors = factors(level);
    let k = factors.len();

    assert!(codewords.len() >= k);
    let (data, ecc) = codewords.split_at_mut(codewords.len() - k);
    ecc.fill(0);

    // ecc holds the remainder, highest degree last
    for &cw in data.iter() {
        let t = (cw as u32 + ecc[k - 1] as u32) % 929;

        for i in (1..k).rev() {
            let factor = (t * factors[i] as u32) % 929;
            ecc[i] = ((ecc[i - 1] as u32 + 929 - factor) % 929) as u16;
        }
        ecc[0] = ((929 - (t * factors[0] as u32) % 929) % 929) as u16;
    }

    for e in ecc.iter_mut() {
        if *e != 0 {
            *e = 929 - *e;
        }
    }
    ecc.reverse();
}

#[cfg(test)]
mod tests {
    use super::{auto_level, ecc_count, generate_ecc};
    use proptest::prelude::*;

    const INPUT_DATA: [u16; 16] = [
        16, 902, 1, 278, 827, 900, 295, 902, 2, 326, 823, 544, 900, 149, 900, 900,
    ];

    fn with_ecc(data: &[u16], level: u8) -> Vec<u16> {
        let mut out = data.to_vec();
        out.resize(data.len() + ecc_count(level), 0);
        generate_ecc(&mut out, level);
        out
    }

    /// Evaluates the codeword polynomial at 3^1..3^k, the roots of the
    /// generator polynomial.
    fn syndromes(codewords: &[u16], k: usize) -> Vec<u32> {
        let mut root = 1u32;
        (0..k).map(|_| {
            root = root * 3 % 929;
            codewords.iter().fold(0u32, |acc, &c| (acc * root + c as u32) % 929)
        }).collect()
    }

    #[test]
    fn test_ecc_l0() {
        let expected: [u16; 2] = [156, 765];
        assert_eq!(with_ecc(&INPUT_DATA, 0)[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_ecc_l1() {
        let expected: [u16; 4] = [168, 875, 63, 355];
        assert_eq!(with_ecc(&INPUT_DATA, 1)[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_ecc_l2() {
        let expected: [u16; 8] = [628, 715, 393, 299, 863, 601, 169, 708];
        assert_eq!(with_ecc(&INPUT_DATA, 2)[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_ecc_l3() {
        let expected: [u16; 16] = [
            232, 176, 793, 616, 476, 406, 855, 445, 84, 518, 522, 721, 607, 2, 42, 578,
        ];
        assert_eq!(with_ecc(&INPUT_DATA, 3)[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_ecc_l4() {
        let expected: [u16; 32] = [
            281, 156, 276, 668, 44, 252, 877, 30, 549, 856, 773, 639, 420, 330, 693, 329, 283, 723,
            480, 482, 102, 925, 535, 892, 374, 472, 837, 331, 343, 608, 390, 364,
        ];
        assert_eq!(with_ecc(&INPUT_DATA, 4)[INPUT_DATA.len()..], expected);
    }

    #[test]
    fn test_zero_syndrome_every_level() {
        for level in 0..=8 {
            let full = with_ecc(&INPUT_DATA, level);
            assert!(syndromes(&full, ecc_count(level)).iter().all(|&s| s == 0), "level {level}");
        }
    }

    #[test]
    fn test_auto_level_thresholds() {
        assert_eq!(auto_level(None, 1 + 10), 2);
        assert_eq!(auto_level(None, 1 + 40), 2);
        assert_eq!(auto_level(None, 1 + 41), 3);
        assert_eq!(auto_level(None, 1 + 160), 3);
        assert_eq!(auto_level(None, 1 + 161), 4);
        assert_eq!(auto_level(None, 1 + 320), 4);
        assert_eq!(auto_level(None, 1 + 321), 5);
        assert_eq!(auto_level(None, 1 + 863), 5);
        // 865 data codewords leave room for 32 ECC codewords at most
        assert_eq!(auto_level(None, 1 + 864), 4);
        assert_eq!(auto_level(None, 1 + 925), 0);
    }

    #[test]
    fn test_requested_level_is_capped() {
        assert_eq!(auto_level(Some(8), 10), 8);
        assert_eq!(auto_level(Some(8), 500), 7);
        assert_eq!(auto_level(Some(0), 500), 0);
        // out of range requests fall back to the automatic choice
        assert_eq!(auto_level(Some(12), 11), 2);
    }

    proptest! {
        #[test]
        fn proptest_zero_syndrome(
            data in prop::collection::vec(0u16..929, 1..200),
            level in 0u8..6,
        ) {
            let full = with_ecc(&data, level);
            prop_assert!(syndromes(&full, ecc_count(level)).iter().all(|&s| s == 0));
        }
    }
}
