//! Look-ahead test choosing the encodation mode of the next characters.
//!
//! Costs are tracked in twelfths of a codeword so that every increment
//! (1/2 for an ASCII digit, 2/3 for a C40 value, 3/4 for an EDIFACT value)
//! stays an integer.

use crate::datamatrix::high_level::Mode;

/// One codeword, in twelfths.
const CW: u32 = 12;

#[inline]
pub(crate) const fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub(crate) const fn is_extended(c: u8) -> bool {
    c >= 128
}

/// Space, digits and upper case letters.
#[inline]
pub(crate) const fn is_c40_basic(c: u8) -> bool {
    c == b' ' || c.is_ascii_digit() || c.is_ascii_uppercase()
}

/// Space, digits and lower case letters.
#[inline]
pub(crate) const fn is_text_basic(c: u8) -> bool {
    c == b' ' || c.is_ascii_digit() || c.is_ascii_lowercase()
}

/// Segment terminator and separators of ANSI X12.
#[inline]
pub(crate) const fn is_x12_terminator(c: u8) -> bool {
    matches!(c, b'\r' | b'*' | b'>')
}

#[inline]
pub(crate) const fn is_x12(c: u8) -> bool {
    is_x12_terminator(c) || is_c40_basic(c)
}

#[inline]
pub(crate) const fn is_edifact(c: u8) -> bool {
    matches!(c, 32..=94)
}

/// Function characters (FNC1, structured append, reader programming, ECI),
/// cheap only in Base 256.
#[inline]
const fn is_function(c: u8) -> bool {
    matches!(c, 232 | 233 | 234 | 241)
}

#[inline]
const fn ceil(v: u32) -> u32 {
    v.div_ceil(CW) * CW
}

/// Estimated cost of the characters scanned so far, per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Costs([u32; 6]);

/// Outcome of the early decision rule after a scanned character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Select(Mode),
    /// C40 and X12 cost the same: the rest of the data decides.
    C40OrX12,
}

impl Costs {
    /// Starting costs when the encoder is in `mode`: switching to any other
    /// mode costs its latch.
    pub fn initial(mode: Mode) -> Self {
        if mode == Mode::Ascii {
            Self([0, CW, CW, CW, CW, CW + 3])
        } else {
            let mut costs = [CW, 2 * CW, 2 * CW, 2 * CW, 2 * CW, 2 * CW + 3];
            costs[mode as usize] = 0;
            Self(costs)
        }
    }

    #[inline]
    pub fn get(&self, mode: Mode) -> u32 {
        self.0[mode as usize]
    }

    /// Smallest cost among the modes not in `excluded`.
    fn min_without(&self, excluded: &[Mode]) -> u32 {
        Mode::ALL.iter()
            .filter(|m| !excluded.contains(m))
            .map(|&m| self.get(m))
            .min()
            .unwrap_or(u32::MAX)
    }

    /// Accounts for one more character.
    pub fn add(&mut self, c: u8) {
        let [ascii, c40, text, x12, edifact, base256] = &mut self.0;

        if is_digit(c) {
            *ascii += CW / 2;
        } else if is_extended(c) {
            *ascii = ceil(*ascii) + 2 * CW;
        } else {
            *ascii = ceil(*ascii) + CW;
        }

        *c40 += if is_c40_basic(c) { 8 } else if is_extended(c) { 32 } else { 16 };
        *text += if is_text_basic(c) { 8 } else if is_extended(c) { 32 } else { 16 };
        *x12 += if is_x12(c) { 8 } else if is_extended(c) { 52 } else { 40 };
        *edifact += if is_edifact(c) { 9 } else if is_extended(c) { 51 } else { 39 };
        *base256 += if is_function(c) { 4 * CW } else { CW };
    }

    /// Mode picked once the end of the data is reached.
    pub fn at_end(&self) -> Mode {
        use Mode::*;

        if self.get(Ascii) <= ceil(self.min_without(&[Ascii])) {
            return Ascii;
        }
        for mode in [Base256, Edifact, Text, X12] {
            if self.get(mode) < ceil(self.min_without(&[mode])) {
                return mode;
            }
        }
        C40
    }

    /// Early decision, valid after at least 4 characters.
    pub fn early(&self) -> Decision {
        use Mode::*;

        let cost = |m| self.get(m);
        if cost(Ascii) + CW <= self.min_without(&[Ascii]) {
            return Decision::Select(Ascii);
        }
        if cost(Base256) + CW <= cost(Ascii)
            || cost(Base256) + CW < self.min_without(&[Ascii, Base256])
        {
            return Decision::Select(Base256);
        }
        for mode in [Edifact, Text, X12] {
            if cost(mode) + CW < self.min_without(&[mode]) {
                return Decision::Select(mode);
            }
        }
        if cost(C40) + CW < self.min_without(&[C40, X12]) {
            if cost(C40) < cost(X12) {
                return Decision::Select(C40);
            }
            if cost(C40) == cost(X12) {
                return Decision::C40OrX12;
            }
        }
        Decision::Continue
    }
}

/// Scans `data` from `pos` and returns the mode the next characters should
/// be encoded in, the encoder being currently in `mode`.
pub fn select_mode(data: &[u8], pos: usize, mode: Mode) -> Mode {
    if pos >= data.len() {
        return mode;
    }

    let mut costs = Costs::initial(mode);
    let mut scanned = 0;
    loop {
        let Some(&c) = data.get(pos + scanned) else {
            return costs.at_end();
        };
        costs.add(c);
        scanned += 1;

        if scanned < 4 {
            continue;
        }
        match costs.early() {
            Decision::Continue => {}
            Decision::Select(selected) => return selected,
            Decision::C40OrX12 => return c40_or_x12(&data[(pos + scanned + 1).min(data.len())..]),
        }
    }
}

/// X12 wins if a terminator shows up before the first character X12 cannot
/// encode.
fn c40_or_x12(rest: &[u8]) -> Mode {
    for &c in rest {
        if is_x12_terminator(c) {
            return Mode::X12;
        }
        if !is_c40_basic(c) {
            break;
        }
    }
    Mode::C40
}
