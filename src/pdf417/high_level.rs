//! User data to high level encoding conversion functions

use crate::{Error, Result};

use awint_core::{InlAwi, Bits};
type U160 = InlAwi<160, { Bits::unstable_raw_digits(160) }>;

/// Codeword used to latch to text mode
pub const M_LATCH_TEXT: u16 = 900;
/// Codeword used to latch to byte mode (if length is multiple of 6 use
/// M_LATCH_BYTE_M6).
pub const M_LATCH_BYTE: u16 = 901;
/// Codeword used to latch to numeric mode
pub const M_LATCH_NUMERIC: u16 = 902;

// 903 to 912: reserved for future use

/// Codeword used to switch to byte mode for next codedword (usable only if
/// the current mode is text).
pub const M_SHIFT_BYTE: u16 = 913;

// 914 to 920: reserved for future use
// 921: used for reader initialization or programming (barcode used to
// enable/disable specific features of the reader).

/// Terminator of the macro control block (last segment only).
pub const MACRO_TERMINATOR: u16 = 922;
/// Tag introducing an optional field of the macro control block.
pub const MACRO_OPTIONAL_FIELD: u16 = 923;

/// Codeword used to latch to byte mode (if length is multiple of 6 use
/// M_LATCH_BYTE_M6).
pub const M_LATCH_BYTE_M6: u16 = 924;
/// Block start for PDF macro
pub const MACRO_MARKER: u16 = 928;

/// Codeword used as padding at the end of the data section
pub const CW_PADDING: u16 = M_LATCH_TEXT;

/// Shortest digit run worth a numeric segment.
pub const MIN_NUMERIC_RUN: usize = 13;
/// Shortest printable run worth a text segment.
pub const MIN_TEXT_RUN: usize = 5;
/// Digits packed per numeric group.
const NUMERIC_GROUP: usize = 44;

const SUBMODE_CHARS: [[u8; 30]; 4] = [
    // Alpha
    [
        b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'J', b'K', b'L', b'M', b'N', b'O',
        b'P', b'Q', b'R', b'S', b'T', b'U', b'V', b'W', b'X', b'Y', b'Z', b' ', 0xFD, 0xFE, 0xFF
    ],
    // Lower
    [
        b'a', b'b', b'c', b'd', b'e', b'f', b'g', b'h', b'i', b'j', b'k', b'l', b'm', b'n', b'o',
        b'p', b'q', b'r', b's', b't', b'u', b'v', b'w', b'x', b'y', b'z', b' ', 0xFD, 0xFE, 0xFF
    ],
    // Mixed
    [
        b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'&', b'\r', b'\t', b',', b':',
        b'#', b'-', b'.', b'$', b'/', b'+', b'%', b'*', b'=', b'^', 0xFB, b' ', 0xFD, 0xFE, 0xFF
    ],
    // Punctuation
    [
        b';', b'<', b'>', b'@', b'[', b'\\', b']', b'_', b'`', b'~', b'!', b'\r', b'\t', b',', b':',
        b'\n', b'-', b'.', b'$', b'/', b'"', b'|', b'*', b'(', b')', b'?', b'{', b'}', b'\'', 0xFF
    ],
];

/// Punctuation shift in Alpha, Lower and Mixed; also the pad value of an odd
/// trailing half codeword.
const PS: u8 = 29;
/// Alpha shift, from Lower only.
const AS: u8 = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Submode {
    Alpha = 0,
    Lower = 1,
    Mixed = 2,
    Punctuation = 3,
}

impl Submode {
    const ALL: [Submode; 4] =
        [Submode::Alpha, Submode::Lower, Submode::Mixed, Submode::Punctuation];

    /// Index of `c` in this submode. The switch slots (0xFB-0xFF) never match.
    fn position(self, c: u8) -> Option<u8> {
        if !c.is_ascii() {
            return None;
        }
        SUBMODE_CHARS[self as usize].iter().position(|&r| r == c).map(|p| p as u8)
    }

    fn latch(self, to: Submode) -> &'static [u8] {
        use Submode::*;
        match (self, to) {
            (Alpha, Lower) => &[27],
            (Alpha, Mixed) => &[28],
            (Alpha, Punctuation) => &[28, 25],
            (Lower, Alpha) => &[28, 28],
            (Lower, Mixed) => &[28],
            (Lower, Punctuation) => &[28, 25],
            (Mixed, Alpha) => &[28],
            (Mixed, Lower) => &[27],
            (Mixed, Punctuation) => &[25],
            (Punctuation, Alpha) => &[29],
            (Punctuation, Lower) => &[29, 27],
            (Punctuation, Mixed) => &[29, 28],
            _ => &[],
        }
    }
}

macro_rules! push {
    ($cws:ident, $half:ident, $($cw:expr),+) => {{
        $( push!(@one $cws, $half, $cw); )+
    }};
    (@one $cws:ident, $half:ident, $cw:expr) => {{
        let cw = $cw as u16;
        match $half.take() {
            Some(high) => $cws.push(high * 30 + cw),
            None => $half = Some(cw),
        }
    }};
}

/// Kind of a contiguous run of the payload, each one compacted with its own
/// mode latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Text,
    Byte,
    /// A single byte following a text segment, shifted instead of latched.
    ByteShift,
    Numeric,
    /// Macro control block, appended after the padded data.
    Macro,
}

impl SegmentKind {
    /// Mode codeword announcing a segment of this kind holding `len` bytes.
    pub const fn latch(self, len: usize) -> u16 {
        match self {
            SegmentKind::Text => M_LATCH_TEXT,
            SegmentKind::Byte if len % 6 == 0 => M_LATCH_BYTE_M6,
            SegmentKind::Byte => M_LATCH_BYTE,
            SegmentKind::ByteShift => M_SHIFT_BYTE,
            SegmentKind::Numeric => M_LATCH_NUMERIC,
            SegmentKind::Macro => MACRO_MARKER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub data: &'a [u8],
}

impl<'a> Segment<'a> {
    pub const fn new(kind: SegmentKind, data: &'a [u8]) -> Self {
        Self { kind, data }
    }

    /// Appends the mode codeword and the compacted data to `out`.
    pub fn compact(&self, out: &mut Vec<u16>) -> Result<()> {
        match self.kind {
            SegmentKind::Macro => Err(MACRO_SEGMENT),
            kind => {
                out.push(kind.latch(self.data.len()));
                compact_raw(kind, self.data, out)
            }
        }
    }
}

const MACRO_SEGMENT: Error = Error::InvalidParameter("macro segments are built by MacroBlock");

/// Compacts `data` according to `kind` without any mode codeword.
pub fn compact_raw(kind: SegmentKind, data: &[u8], out: &mut Vec<u16>) -> Result<()> {
    match kind {
        SegmentKind::Text => encode_text(data, out),
        SegmentKind::Byte | SegmentKind::ByteShift => {
            encode_bytes(data, out);
            Ok(())
        }
        SegmentKind::Numeric => encode_numeric(data, out),
        SegmentKind::Macro => Err(MACRO_SEGMENT),
    }
}

#[inline]
fn is_printable(c: u8) -> bool {
    matches!(c, b'\t' | b'\n' | b'\r' | 0x20..=0x7E)
}

/// Maximal runs of at least `min` bytes matching `pred`, as (start, end).
fn runs<'a>(
    data: &'a [u8],
    min: usize,
    pred: impl Fn(u8) -> bool + 'a,
) -> impl Iterator<Item = (usize, usize)> + 'a {
    let mut k = 0;
    core::iter::from_fn(move || {
        while k < data.len() {
            if !pred(data[k]) {
                k += 1;
                continue;
            }
            let start = k;
            while k < data.len() && pred(data[k]) {
                k += 1;
            }
            if k - start >= min {
                return Some((start, k));
            }
        }
        None
    })
}

/// Splits the payload into numeric, text and byte segments: digit runs of
/// at least 13 first, then printable runs of at least 5 in what is left,
/// everything else being bytes.
pub fn segments(data: &[u8]) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut offset = 0;

    let numeric = runs(data, MIN_NUMERIC_RUN, |c| c.is_ascii_digit())
        .chain(Some((data.len(), data.len())));
    for (start, end) in numeric {
        if start > offset {
            split_text(&data[offset..start], &mut out);
        }
        if end > start {
            out.push(Segment::new(SegmentKind::Numeric, &data[start..end]));
        }
        offset = end;
    }

    out
}

fn split_text<'a>(chunk: &'a [u8], out: &mut Vec<Segment<'a>>) {
    let mut offset = 0;
    let text = runs(chunk, MIN_TEXT_RUN, is_printable).chain(Some((chunk.len(), chunk.len())));
    for (start, end) in text {
        if start > offset {
            let bytes = &chunk[offset..start];
            let after_text = matches!(out.last(), Some(s) if s.kind == SegmentKind::Text);
            let kind = if bytes.len() == 1 && after_text {
                SegmentKind::ByteShift
            } else {
                SegmentKind::Byte
            };
            out.push(Segment::new(kind, bytes));
        }
        if end > start {
            out.push(Segment::new(SegmentKind::Text, &chunk[start..end]));
        }
        offset = end;
    }
}

/// Text compaction. Starts in the Alpha submode; characters of another
/// submode are either shifted (punctuation, or alpha from lower, when the
/// following character stays in the current submode) or latched.
pub fn encode_text(s: &[u8], out: &mut Vec<u16>) -> Result<()> {
    let mut mode = Submode::Alpha;
    let mut half: Option<u16> = None; // pending high value of a codeword

    for (k, &c) in s.iter().enumerate() {
        if let Some(p) = mode.position(c) {
            push!(out, half, p);
            continue;
        }

        let (target, p) = Submode::ALL.iter()
            .filter(|&&m| m != mode)
            .find_map(|&m| m.position(c).map(|p| (m, p)))
            .ok_or(Error::UnencodableCharacter { byte: c, mode: "text" })?;

        let next_stays = s.get(k + 1).map_or(true, |&n| mode.position(n).is_some());
        let shiftable = target == Submode::Punctuation
            || (target == Submode::Alpha && mode == Submode::Lower);
        if next_stays && shiftable {
            push!(out, half, if target == Submode::Punctuation { PS } else { AS });
        } else {
            for &l in mode.latch(target) {
                push!(out, half, l);
            }
            mode = target;
        }
        push!(out, half, p);
    }

    // an odd number of values is completed with a punctuation shift
    if let Some(high) = half {
        out.push(high * 30 + PS as u16);
    }
    Ok(())
}

/// Byte compaction: every group of six bytes becomes five base 900
/// codewords, the remaining bytes are stored one per codeword.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u16>) {
    let mut groups = bytes.chunks_exact(6);
    for group in &mut groups {
        // 48 bits always fit in a u64
        let mut s = group.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64);
        let mut cws = [0u16; 5];
        for n in 0..5 {
            cws[4 - n] = (s % 900) as u16;
            s /= 900;
        }
        out.extend_from_slice(&cws);
    }

    out.extend(groups.remainder().iter().map(|&b| b as u16));
}

/// Numeric compaction: groups of up to 44 digits, each prefixed with a `1`
/// and converted to base 900, most significant codeword first.
pub fn encode_numeric(digits: &[u8], out: &mut Vec<u16>) -> Result<()> {
    if let Some(&c) = digits.iter().find(|c| !c.is_ascii_digit()) {
        return Err(Error::UnencodableCharacter { byte: c, mode: "numeric" });
    }

    for group in digits.chunks(NUMERIC_GROUP) {
        let mut buf = [b'1'; NUMERIC_GROUP + 1];
        buf[1..=group.len()].copy_from_slice(group);

        let mut b = U160::zero();
        {
            let mut p0 = U160::zero();
            let mut p1 = U160::zero();
            b.bytes_radix_(None, &buf[..=group.len()], 10, &mut p0, &mut p1)
                .expect("45 digits base 10 should fit in 160 bits");
        }

        let mut cws = [0u16; NUMERIC_GROUP / 3 + 1];
        let mut count = 0;
        while !b.is_zero() {
            let r = b.digit_udivide_inplace_(900).expect("900 > 0");
            cws[count] = r as u16;
            count += 1;
        }

        out.extend(cws[..count].iter().rev());
    }

    Ok(())
}

/// Compacts every segment of `data`, without the leading text latch (Alpha
/// text is the default mode).
pub fn encode(data: &[u8]) -> Result<Vec<u16>> {
    let mut out = Vec::with_capacity(data.len());
    for segment in segments(data) {
        tracing::trace!(kind = ?segment.kind, len = segment.data.len(), "pdf417 segment");
        segment.compact(&mut out)?;
    }

    if out.first() == Some(&M_LATCH_TEXT) {
        out.remove(0);
    }
    Ok(out)
}
