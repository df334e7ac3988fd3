//! User data to Data Matrix codewords.
//!
//! The encoder starts in ASCII and, at every point where a switch is
//! possible, asks the look-ahead test for the cheapest mode of the rest of
//! the data.

use crate::datamatrix::look_ahead::{is_digit, is_edifact, is_extended, is_x12, select_mode};
use crate::datamatrix::{profile, SymbolShape};
use crate::{Error, Result};

/// Latch to C40 from ASCII.
pub const LATCH_C40: u8 = 230;
/// Latch to Base 256 from ASCII.
pub const LATCH_BASE256: u8 = 231;
/// Next codeword is an extended ASCII byte minus 128.
pub const UPPER_SHIFT: u8 = 235;
pub const LATCH_X12: u8 = 238;
pub const LATCH_TEXT: u8 = 239;
pub const LATCH_EDIFACT: u8 = 240;
/// Back to ASCII from C40, Text and X12.
pub const UNLATCH: u8 = 254;
/// First padding codeword.
pub const PAD: u8 = 129;

/// EDIFACT value switching back to ASCII.
const EDIFACT_UNLATCH: u8 = 0x1F;
/// Longest Base 256 field.
const MAX_BASE256: usize = 1555;

/// Encodation modes, in the order of the look-ahead cost vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Ascii,
    C40,
    Text,
    X12,
    Edifact,
    Base256,
}

impl Mode {
    pub const ALL: [Mode; 6] =
        [Mode::Ascii, Mode::C40, Mode::Text, Mode::X12, Mode::Edifact, Mode::Base256];

    /// Codeword switching from ASCII to this mode.
    pub const fn latch(self) -> u8 {
        match self {
            Mode::Ascii => UNLATCH,
            Mode::C40 => LATCH_C40,
            Mode::Text => LATCH_TEXT,
            Mode::X12 => LATCH_X12,
            Mode::Edifact => LATCH_EDIFACT,
            Mode::Base256 => LATCH_BASE256,
        }
    }

    /// Whether a run in this mode can start with `c`.
    pub const fn accepts(self, c: u8) -> bool {
        match self {
            Mode::X12 => is_x12(c),
            Mode::Edifact => is_edifact(c),
            _ => true,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Mode::Ascii => "ASCII",
            Mode::C40 => "C40",
            Mode::Text => "Text",
            Mode::X12 => "X12",
            Mode::Edifact => "EDIFACT",
            Mode::Base256 => "Base256",
        }
    }
}

/// Data codewords and the mode the encoder ended in, which drives padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighLevel {
    pub codewords: Vec<u8>,
    pub mode: Mode,
}

/// Number of ASCII codewords needed for `data`.
pub fn ascii_len(data: &[u8]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < data.len() {
        if i + 1 < data.len() && is_digit(data[i]) && is_digit(data[i + 1]) {
            i += 2;
            len += 1;
        } else {
            len += if is_extended(data[i]) { 2 } else { 1 };
            i += 1;
        }
    }
    len
}

/// Appends the values of `c` in C40, Text or X12. `false` when X12 cannot
/// encode an ASCII character, which ends the X12 run.
fn c40_values(mode: Mode, c: u8, out: &mut Vec<u8>) -> Result<bool> {
    if mode == Mode::X12 {
        let v = match c {
            b'\r' => 0,
            b'*' => 1,
            b'>' => 2,
            b' ' => 3,
            b'0'..=b'9' => c - b'0' + 4,
            b'A'..=b'Z' => c - b'A' + 14,
            _ if is_extended(c) => {
                return Err(Error::UnencodableCharacter { byte: c, mode: mode.name() })
            }
            _ => return Ok(false),
        };
        out.push(v);
        return Ok(true);
    }

    let c = if is_extended(c) {
        // shift 2, upper shift
        out.extend([1, 30]);
        c & 0x7F
    } else {
        c
    };
    match c {
        b' ' => out.push(3),
        b'0'..=b'9' => out.push(c - b'0' + 4),
        b'A'..=b'Z' if mode == Mode::C40 => out.push(c - b'A' + 14),
        b'a'..=b'z' if mode == Mode::Text => out.push(c - b'a' + 14),
        0..=31 => out.extend([0, c]),
        33..=47 => out.extend([1, c - 33]),
        58..=64 => out.extend([1, c - 58 + 15]),
        91..=95 => out.extend([1, c - 91 + 22]),
        _ if mode == Mode::C40 => out.extend([2, c - 96]),
        96 => out.extend([2, 0]),
        b'A'..=b'Z' => out.extend([2, c - 64]),
        _ => out.extend([2, c - 123 + 27]),
    }
    Ok(true)
}

/// Base 256 randomization, `position` being 1-based.
#[inline]
fn randomize_255(value: u8, position: usize) -> u8 {
    let pseudo = (149 * position) % 255 + 1;
    ((value as usize + pseudo) % 256) as u8
}

struct Encoder<'a> {
    data: &'a [u8],
    pos: usize,
    mode: Mode,
    shape: SymbolShape,
    codewords: Vec<u8>,
}

impl<'a> Encoder<'a> {
    fn new(data: &'a [u8], shape: SymbolShape) -> Self {
        Self { data, pos: 0, mode: Mode::Ascii, shape, codewords: Vec::with_capacity(data.len()) }
    }

    #[inline]
    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    #[inline]
    fn push(&mut self, cw: u8) {
        self.codewords.push(cw);
    }

    /// Codewords left in the smallest symbol holding `extra` more codewords.
    /// `usize::MAX` when no symbol is large enough.
    fn available(&self, extra: usize) -> usize {
        let len = self.codewords.len();
        profile::select(len + extra, self.shape).map_or(usize::MAX, |p| p.data_codewords - len)
    }

    /// Mode of the characters from `pos`. A mode that cannot encode the next
    /// character would be left right away, ASCII takes it instead.
    fn next_mode(&self, current: Mode) -> Mode {
        let mode = select_mode(self.data, self.pos, current);
        match self.data.get(self.pos) {
            Some(&c) if !mode.accepts(c) => Mode::Ascii,
            _ => mode,
        }
    }

    /// Enters `next`, the previous mode being already closed.
    fn switch(&mut self, next: Mode) {
        tracing::trace!(
            from = self.mode.name(),
            to = next.name(),
            pos = self.pos,
            "datamatrix mode switch"
        );
        if next != Mode::Ascii {
            self.push(next.latch());
        }
        self.mode = next;
    }

    fn push_ascii_char(&mut self, c: u8) {
        if is_extended(c) {
            self.push(UPPER_SHIFT);
            self.push(c - 127);
        } else {
            self.push(c + 1);
        }
    }

    /// Encodes `data` in ASCII, digit pairs included, without any look-ahead.
    fn push_ascii(&mut self, data: &[u8]) {
        let mut i = 0;
        while i < data.len() {
            if i + 1 < data.len() && is_digit(data[i]) && is_digit(data[i + 1]) {
                self.push((data[i] - b'0') * 10 + (data[i + 1] - b'0') + 130);
                i += 2;
            } else {
                self.push_ascii_char(data[i]);
                i += 1;
            }
        }
    }

    fn encode_ascii(&mut self) {
        let rest = self.rest();
        if rest.len() >= 2 && is_digit(rest[0]) && is_digit(rest[1]) {
            self.push_ascii(&rest[..2]);
            self.pos += 2;
            return;
        }

        let next = self.next_mode(Mode::Ascii);
        if next != Mode::Ascii {
            self.switch(next);
            return;
        }

        self.push_ascii_char(rest[0]);
        self.pos += 1;
    }

    fn push_triplets(&mut self, values: &[u8]) {
        debug_assert_eq!(values.len() % 3, 0);
        for t in values.chunks_exact(3) {
            let v = 1600 * t[0] as u16 + 40 * t[1] as u16 + t[2] as u16 + 1;
            self.push((v >> 8) as u8);
            self.push((v & 0xFF) as u8);
        }
    }

    /// C40, Text and X12: three values in two codewords. `counts` keeps the
    /// number of values of every buffered character so that whole characters
    /// can be given back at the end of the data.
    fn encode_c40(&mut self) -> Result<()> {
        let mode = self.mode;
        let mut values = Vec::with_capacity(6);
        let mut counts = Vec::with_capacity(3);

        while let Some(&c) = self.data.get(self.pos) {
            let before = values.len();
            if !c40_values(mode, c, &mut values)? {
                self.leave_x12(&values);
                return Ok(());
            }
            counts.push(values.len() - before);
            self.pos += 1;

            if values.len() % 3 == 0 {
                self.push_triplets(&values);
                values.clear();
                counts.clear();

                let next = self.next_mode(mode);
                if next != mode {
                    self.push(UNLATCH);
                    self.switch(next);
                    return Ok(());
                }
            }
        }

        if values.is_empty() {
            // padding closes the mode
            return Ok(());
        }
        if mode == Mode::X12 {
            self.leave_x12(&values);
            return Ok(());
        }
        self.finish_c40(values, counts);
        Ok(())
    }

    /// End of data with a partial triplet in C40 or Text.
    fn finish_c40(&mut self, mut values: Vec<u8>, mut counts: Vec<usize>) {
        if values.len() % 3 == 2 {
            // shift 1 as filler, stay in the mode
            values.push(0);
            self.push_triplets(&values);
            return;
        }

        let groups = 2 * (values.len() / 3);
        if counts.last() == Some(&1) && self.available(groups + 1) == groups + 1 {
            // one codeword left for one character: ASCII without unlatch
            values.pop();
            self.push_triplets(&values);
            let c = self.data[self.pos - 1];
            self.push_ascii_char(c);
            self.mode = Mode::Ascii;
            return;
        }

        while values.len() % 3 != 0 {
            let n = counts.pop().unwrap_or(values.len());
            values.truncate(values.len() - n);
            self.pos -= 1;
        }
        self.push_triplets(&values);
        self.push(UNLATCH);
        self.mode = Mode::Ascii;
        let rest = self.rest();
        self.push_ascii(rest);
        self.pos = self.data.len();
    }

    /// Leaves X12 on a character it cannot encode or at the end of the data.
    /// Characters of an incomplete triplet are encoded again in ASCII.
    fn leave_x12(&mut self, values: &[u8]) {
        let leftover = values.len() % 3;
        let done = values.len() - leftover;
        self.pos -= leftover;
        self.push_triplets(&values[..done]);

        let data = self.data;
        let tail = &data[self.pos..(self.pos + leftover)];
        let at_end = self.pos + leftover == data.len();
        if at_end && leftover == 1 && self.available(1) == 1 {
            self.push_ascii_char(tail[0]);
        } else {
            self.push(UNLATCH);
            self.push_ascii(tail);
        }
        self.pos += leftover;
        self.mode = Mode::Ascii;
    }

    /// Packs up to 4 EDIFACT values, most significant bits first, into
    /// `len` codewords.
    fn push_edifact(&mut self, values: &[u8], len: usize) {
        let mut bits: u32 = 0;
        for k in 0..4 {
            bits = (bits << 6) | values.get(k).copied().unwrap_or(0) as u32;
        }
        for k in 0..len {
            self.push((bits >> (16 - 8 * k)) as u8);
        }
    }

    /// EDIFACT: four 6-bit values in three codewords.
    fn encode_edifact(&mut self) {
        let mut values = Vec::with_capacity(4);

        loop {
            match self.data.get(self.pos) {
                Some(&c) if is_edifact(c) => {
                    values.push(c & 0x3F);
                    self.pos += 1;
                }
                _ => return self.leave_edifact(values),
            }

            if values.len() < 4 {
                continue;
            }
            self.push_edifact(&values, 3);
            values.clear();

            let rest = self.rest();
            let k = ascii_len(rest);
            if k <= 2 && self.available(k) <= 2 {
                // the end of the symbol closes EDIFACT
                tracing::trace!(pos = self.pos, "datamatrix edifact implicit unlatch");
                self.mode = Mode::Ascii;
                return;
            }

            let next = self.next_mode(Mode::Edifact);
            if next != Mode::Edifact {
                self.push_edifact(&[EDIFACT_UNLATCH], 1);
                self.switch(next);
                return;
            }
        }
    }

    fn leave_edifact(&mut self, mut values: Vec<u8>) {
        let n = values.len();
        if self.pos == self.data.len() {
            if n == 0 {
                return;
            }
            let data = self.data;
            let pending = &data[self.pos - n..];
            let k = ascii_len(pending);
            if self.available(k) <= 2 {
                self.mode = Mode::Ascii;
                self.push_ascii(pending);
                return;
            }
        }

        values.push(EDIFACT_UNLATCH);
        self.push_edifact(&values, (6 * (n + 1)).div_ceil(8));
        tracing::trace!(from = "EDIFACT", to = "ASCII", pos = self.pos, "datamatrix mode switch");
        self.mode = Mode::Ascii;
    }

    /// Base 256: a length field then the raw bytes, everything randomized.
    fn encode_base256(&mut self) {
        let start = self.pos;
        let mut next = Mode::Ascii;
        loop {
            self.pos += 1;
            if self.pos == self.data.len() || self.pos - start == MAX_BASE256 {
                break;
            }
            let mode = self.next_mode(Mode::Base256);
            if mode != Mode::Base256 {
                next = mode;
                break;
            }
        }

        let data = self.data;
        let field = &data[start..self.pos];
        let len = field.len();
        if len <= 249 {
            self.push_randomized(len as u8);
        } else {
            self.push_randomized((len / 250 + 249) as u8);
            self.push_randomized((len % 250) as u8);
        }
        for &b in field {
            self.push_randomized(b);
        }

        // the field length ends the mode
        self.mode = Mode::Ascii;
        if next != Mode::Ascii {
            self.switch(next);
        }
    }

    fn push_randomized(&mut self, value: u8) {
        let position = self.codewords.len() + 1;
        self.push(randomize_255(value, position));
    }
}

/// Encodes `data` into data codewords, before padding. `shape` restricts the
/// symbols considered when the end of the data depends on the space left.
pub fn encode(data: &[u8], shape: SymbolShape) -> Result<HighLevel> {
    // two digits per codeword is the best any mode achieves
    let capacity = profile::max_capacity(shape);
    let lower_bound = data.len().div_ceil(2);
    if lower_bound > capacity {
        return Err(Error::CapacityExceeded { needed: lower_bound, capacity });
    }

    let mut encoder = Encoder::new(data, shape);
    while encoder.pos < data.len() {
        match encoder.mode {
            Mode::Ascii => encoder.encode_ascii(),
            Mode::C40 | Mode::Text | Mode::X12 => encoder.encode_c40()?,
            Mode::Edifact => encoder.encode_edifact(),
            Mode::Base256 => encoder.encode_base256(),
        }
    }

    Ok(HighLevel { codewords: encoder.codewords, mode: encoder.mode })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn encode_square(data: &[u8]) -> HighLevel {
        encode(data, SymbolShape::Square).unwrap()
    }

    #[test]
    fn test_digit_pairs() {
        let hl = encode_square(b"12345678");
        assert_eq!(hl.codewords, [142, 164, 186, 208]);
        assert_eq!(hl.mode, Mode::Ascii);

        // odd digit count: the last one alone
        assert_eq!(encode_square(b"123").codewords, [142, 52]);
    }

    #[test]
    fn test_ascii() {
        assert_eq!(encode_square(b"Ab").codewords, [66, 99]);
        assert_eq!(encode_square(&[b'a', 0xE9]).codewords, [98, UPPER_SHIFT, 0xE9 - 127]);
    }

    #[test_case(b'A', Mode::C40, &[14])]
    #[test_case(b'a', Mode::C40, &[2, 1])]
    #[test_case(b'a', Mode::Text, &[14])]
    #[test_case(b'A', Mode::Text, &[2, 1])]
    #[test_case(b' ', Mode::Text, &[3])]
    #[test_case(b'7', Mode::C40, &[11])]
    #[test_case(b'\n', Mode::C40, &[0, 10])]
    #[test_case(b'!', Mode::C40, &[1, 0])]
    #[test_case(b'@', Mode::Text, &[1, 21])]
    #[test_case(b'_', Mode::C40, &[1, 26])]
    #[test_case(b'`', Mode::Text, &[2, 0])]
    #[test_case(b'}', Mode::Text, &[2, 29])]
    #[test_case(b'~', Mode::C40, &[2, 30])]
    #[test_case(0xC1, Mode::C40, &[1, 30, 14])]
    #[test_case(b'*', Mode::X12, &[1])]
    #[test_case(b'Z', Mode::X12, &[39])]
    fn test_c40_values(c: u8, mode: Mode, expected: &[u8]) {
        let mut values = Vec::new();
        assert_eq!(c40_values(mode, c, &mut values), Ok(true));
        assert_eq!(values, expected);
    }

    #[test]
    fn test_x12_rejects() {
        let mut values = Vec::new();
        assert_eq!(c40_values(Mode::X12, b'a', &mut values), Ok(false));
        assert_eq!(
            c40_values(Mode::X12, 0xC1, &mut values),
            Err(Error::UnencodableCharacter { byte: 0xC1, mode: "X12" })
        );
        assert!(values.is_empty());
    }

    #[test]
    fn test_c40_run() {
        // A 14, B 15, C 16: 1600*14 + 40*15 + 16 + 1 = 23017
        let hl = encode_square(b"ABCDEFGHIJKLMNOP");
        assert_eq!(hl.codewords[..3], [LATCH_C40, 89, 233]);
        assert_eq!(hl.mode, Mode::Ascii);
    }

    #[test]
    fn test_text_run() {
        let hl = encode_square(b"abcdefghijklmnop");
        assert_eq!(hl.codewords[..3], [LATCH_TEXT, 89, 233]);
    }

    #[test]
    fn test_c40_two_leftover_values() {
        // 8 values: two triplets and a pair padded with shift 1
        let hl = encode_square(b"abcdefgh");
        assert_eq!(hl.codewords[0], LATCH_TEXT);
        assert_eq!(hl.codewords.len(), 7);
        assert_eq!(hl.mode, Mode::Text);
        // g 20, h 21, shift 1 0
        let v = 1600 * 20 + 40 * 21 + 1;
        assert_eq!(hl.codewords[5..], [(v >> 8) as u8, (v & 0xFF) as u8]);
    }

    #[test]
    fn test_x12_run() {
        let hl = encode_square(b"ABC*DEF>GHI\r");
        assert_eq!(hl.codewords[0], LATCH_X12);
        assert_eq!(hl.codewords.len(), 9);
        assert_eq!(hl.mode, Mode::X12);
    }

    #[test]
    fn test_edifact_run() {
        let hl = encode_square(b"!!!!!!!!!!!!");
        assert_eq!(hl.codewords[0], LATCH_EDIFACT);
        // '!' is 0b100001
        assert_eq!(hl.codewords[1..4], [0x86, 0x18, 0x61]);
    }

    #[test]
    fn test_base256_field() {
        let hl = encode_square(&[0xC0; 6]);
        assert_eq!(hl.codewords[0], LATCH_BASE256);
        assert_eq!(hl.codewords.len(), 8);
        assert_eq!(hl.codewords[1], randomize_255(6, 2));
        assert_eq!(hl.codewords[2], randomize_255(0xC0, 3));
        assert_eq!(hl.mode, Mode::Ascii);
    }

    #[test]
    fn test_base256_long_field() {
        let data = vec![0xC0; 300];
        let hl = encode_square(&data);
        assert_eq!(hl.codewords.len(), 1 + 2 + 300);
        assert_eq!(hl.codewords[1], randomize_255(250, 2));
        assert_eq!(hl.codewords[2], randomize_255(50, 3));
    }

    #[test]
    fn test_randomize_255() {
        assert_eq!(randomize_255(4, 5), 240);
        // 255 + 150 wraps around
        assert_eq!(randomize_255(255, 1), 149);
    }

    #[test]
    fn test_ascii_len() {
        assert_eq!(ascii_len(b""), 0);
        assert_eq!(ascii_len(b"12a"), 2);
        assert_eq!(ascii_len(b"1a2"), 3);
        assert_eq!(ascii_len(&[0xFF, b'1', b'2']), 3);
    }

    #[test]
    fn test_x12_never_latched_on_foreign_character() {
        // the look-ahead favors X12 at '!', which X12 cannot encode
        let hl = encode_square(b"0ABa!0BC0>0B\rC\r*\rA");
        assert_eq!(
            hl.codewords,
            [49, 66, 67, 98, 34, 238, 27, 105, 25, 85, 93, 209, 0, 41, 254, 66]
        );
        assert_eq!(hl.mode, Mode::Ascii);
    }

    #[test]
    fn test_x12_extended_byte() {
        let mut data = vec![b'*'; 16];
        data.push(0xE9);
        data.extend_from_slice(b"*******");
        assert_eq!(
            encode(&data, SymbolShape::Square),
            Err(Error::UnencodableCharacter { byte: 0xE9, mode: "X12" })
        );
    }

    #[test]
    fn test_capacity_lower_bound() {
        let data = vec![b'0'; 3118];
        assert_eq!(
            encode(&data, SymbolShape::Square),
            Err(Error::CapacityExceeded { needed: 1559, capacity: 1558 })
        );
        assert!(matches!(
            encode(&data[..100], SymbolShape::Rectangle),
            Err(Error::CapacityExceeded { capacity: 49, .. })
        ));
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(
            Mode::ALL.map(Mode::name),
            ["ASCII", "C40", "Text", "X12", "EDIFACT", "Base256"]
        );
        assert_eq!(Mode::ALL.map(Mode::latch), [UNLATCH, 230, 239, 238, 240, 231]);
    }
}
