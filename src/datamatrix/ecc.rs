//! Reed-Solomon error correction over GF(256), primitive polynomial 301.

use crate::datamatrix::profile::SymbolProfile;

const PRIMITIVE: u16 = 301;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut log = [0u8; 256];
    let mut alog = [0u8; 256];
    let mut v: u16 = 1;
    let mut i = 0;
    while i < 255 {
        alog[i] = v as u8;
        log[v as usize] = i as u8;
        v <<= 1;
        if v >= 256 {
            v ^= PRIMITIVE;
        }
        i += 1;
    }
    alog[255] = alog[0];
    (log, alog)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();
/// Discrete logarithm of every non zero element.
pub const LOG: [u8; 256] = TABLES.0;
/// Powers of 2.
pub const ALOG: [u8; 256] = TABLES.1;

#[inline]
pub fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    ALOG[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
}

/// Coefficients of (x - 2)(x - 2^2)...(x - 2^n), lowest degree first. The
/// polynomial is monic, so the last coefficient is always 1.
pub fn generator_polynomial(n: usize) -> Vec<u8> {
    let mut c = vec![0u8; n + 1];
    c[0] = 1;
    for i in 1..=n {
        let root = ALOG[i % 255];
        c[i] = c[i - 1];
        for j in (1..i).rev() {
            c[j] = c[j - 1] ^ gf_mul(c[j], root);
        }
        c[0] = gf_mul(c[0], root);
    }
    c
}

/// Error correction codewords of one block.
pub fn reed_solomon(block: &[u8], generator: &[u8]) -> Vec<u8> {
    let n = generator.len() - 1;
    let mut we = vec![0u8; n + 1];
    for &d in block {
        let k = we[0] ^ d;
        for j in 0..n {
            we[j] = we[j + 1] ^ gf_mul(k, generator[n - j - 1]);
        }
    }
    we.truncate(n);
    we
}

/// Appends the error correction codewords of `profile` to `data`. The data
/// is split into interleaved blocks (block `b` holds codewords `b`,
/// `b + blocks`, ...) and the error codewords are interleaved the same way.
pub fn encode_blocks(data: &[u8], profile: &SymbolProfile) -> Vec<u8> {
    assert_eq!(data.len(), profile.data_codewords, "data must fill the symbol");

    let nb = profile.blocks;
    let generator = generator_polynomial(profile.block_ecc);
    let mut out = data.to_vec();
    out.resize(profile.total_codewords(), 0);

    for b in 0..nb {
        let block: Vec<u8> = data.iter().skip(b).step_by(nb).copied().collect();
        debug_assert_eq!(block.len(), profile.block_data(b));

        for (j, e) in reed_solomon(&block, &generator).into_iter().enumerate() {
            out[data.len() + b + j * nb] = e;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamatrix::profile::PROFILES;
    use proptest::prelude::*;

    /// Evaluates the block (highest degree first) at 2^1..2^n.
    fn syndromes(codewords: &[u8], n: usize) -> Vec<u8> {
        (1..=n).map(|i| {
            codewords.iter().fold(0u8, |acc, &c| gf_mul(acc, ALOG[i]) ^ c)
        }).collect()
    }

    #[test]
    fn test_tables() {
        assert_eq!(ALOG[0], 1);
        assert_eq!(ALOG[8], 45); // 256 ^ 301
        assert_eq!(LOG[45], 8);
        for a in 1..=255u8 {
            assert_eq!(ALOG[LOG[a as usize] as usize], a);
        }
    }

    #[test]
    fn test_gf_mul() {
        assert_eq!(gf_mul(0, 7), 0);
        assert_eq!(gf_mul(1, 7), 7);
        assert_eq!(gf_mul(2, 128), 45);
        for a in 1..=255u8 {
            assert_eq!(gf_mul(a, ALOG[255 - LOG[a as usize] as usize]), 1);
        }
    }

    #[test]
    fn test_generator_is_monic() {
        let g = generator_polynomial(5);
        assert_eq!(g.len(), 6);
        assert_eq!(g[5], 1);
    }

    #[test]
    fn test_reference_symbol() {
        // "123456" in a 10x10 symbol
        let profile = &PROFILES[0];
        let out = encode_blocks(&[142, 164, 186], profile);
        assert_eq!(out, &[142, 164, 186, 114, 25, 5, 88, 102]);
    }

    #[test]
    fn test_interleaved_blocks() {
        let profile = PROFILES.iter().find(|p| p.rows == 144).unwrap();
        let data: Vec<u8> = (0..profile.data_codewords).map(|i| (i * 7) as u8).collect();
        let out = encode_blocks(&data, profile);
        assert_eq!(out.len(), 1558 + 620);

        for b in 0..profile.blocks {
            let mut block: Vec<u8> = data.iter().skip(b).step_by(10).copied().collect();
            block.extend(out[1558..].iter().skip(b).step_by(10));
            assert!(syndromes(&block, profile.block_ecc).iter().all(|&s| s == 0), "block {b}");
        }
    }

    proptest! {
        #[test]
        fn proptest_zero_syndrome(
            data in prop::collection::vec(any::<u8>(), 1..100),
            n in 5usize..69,
        ) {
            let mut block = data.clone();
            block.extend(reed_solomon(&data, &generator_polynomial(n)));
            prop_assert!(syndromes(&block, n).iter().all(|&s| s == 0));
        }
    }
}
