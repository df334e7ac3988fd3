use core::iter;

use crate::pdf417::tables::HL_TO_LL;

/// Modules of one codeword or guard pattern, most significant bit drawn
/// first. A set bit is a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitfield {
    bits: u32,
    width: u8,
}

impl Bitfield {
    pub const fn new(bits: u32, width: u8) -> Self {
        debug_assert!(width <= 32, "pattern wider than 32 modules");
        debug_assert!(width == 32 || bits >> width == 0, "bits beyond the pattern width");

        Self { bits, width }
    }

    /// 17 module pattern of `value` in the cluster of table `table` (0, 1 or
    /// 2 for clusters 0, 3 and 6). The tables omit the leading bar.
    pub fn codeword(table: u8, value: u16) -> Self {
        debug_assert!(table < 3 && value < 929);
        Self::new((1 << 16) | HL_TO_LL[table as usize][value as usize] as u32, 17)
    }

    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of bar/space alternations, 8 elements for a codeword.
    pub fn elements(&self) -> usize {
        let mut count = 0;
        let mut prev = None;
        for module in *self {
            if prev != Some(module) {
                count += 1;
                prev = Some(module);
            }
        }
        count
    }
}

impl iter::IntoIterator for Bitfield {
    type Item = bool;
    type IntoIter = Bits;

    fn into_iter(self) -> Self::IntoIter {
        Bits { bits: self.bits, front: self.width, back: 0 }
    }
}

/// Modules of a [Bitfield]; bits `back..front` are still to be drawn.
#[derive(Debug, Clone)]
pub struct Bits {
    bits: u32,
    front: u8,
    back: u8,
}

impl iter::Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.front -= 1;
        Some(self.bits & (1 << self.front) != 0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.front - self.back) as usize;
        (n, Some(n))
    }
}

impl iter::DoubleEndedIterator for Bits {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let on = self.bits & (1 << self.back) != 0;
        self.back += 1;
        Some(on)
    }
}

impl iter::ExactSizeIterator for Bits {}
impl iter::FusedIterator for Bits {}

#[cfg(test)]
mod tests {
    use super::Bitfield;

    #[test]
    fn test_bits_msb_first() {
        let bits: Vec<bool> = Bitfield::new(0b1101, 4).into_iter().collect();
        assert_eq!(bits, &[true, true, false, true]);
    }

    #[test]
    fn test_bits_reversed() {
        let bits: Vec<bool> = Bitfield::new(0b1101, 4).into_iter().rev().collect();
        assert_eq!(bits, &[true, false, true, true]);
    }

    #[test]
    fn test_both_ends_meet() {
        let mut bits = Bitfield::new(0b100, 3).into_iter();
        assert_eq!(bits.next(), Some(true));
        assert_eq!(bits.next_back(), Some(false));
        assert_eq!(bits.len(), 1);
        assert_eq!(bits.next(), Some(false));
        assert_eq!(bits.next_back(), None);
    }

    #[test]
    fn test_leading_zeros_are_kept() {
        let field = Bitfield::new(0b01, 3);
        assert_eq!(field.width(), 3);
        assert_eq!(field.bits(), 1);
        assert_eq!(field.into_iter().len(), 3);
        assert_eq!(field.into_iter().collect::<Vec<_>>(), &[false, false, true]);
    }

    #[test]
    fn test_codeword_patterns() {
        for table in 0..3 {
            for value in [0, 1, 450, 900, 928] {
                let field = Bitfield::codeword(table, value);
                assert_eq!(field.width(), 17);
                // four bars and four spaces, starting with a bar
                assert_eq!(field.elements(), 8, "cluster {table} value {value}");
                assert_eq!(field.into_iter().next(), Some(true));
                assert_eq!(field.into_iter().last(), Some(false));
            }
        }
    }
}
