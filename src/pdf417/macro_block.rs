//! Macro PDF417 control block, used to spread one file over several symbols.

use crate::pdf417::high_level::{compact_raw, SegmentKind, MACRO_OPTIONAL_FIELD, MACRO_TERMINATOR};
use crate::{Error, Result};

/// Highest segment index encodable on five digits (99 999 is reserved).
pub const MAX_SEGMENT_INDEX: u32 = 99_998;
const MAX_TIME_STAMP: u64 = 9_999_999_999;

/// Describes where a symbol sits in a multi-symbol file. Optional fields
/// map to the option numbers 0 to 6 of the control block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroBlock {
    pub segment_index: u32,
    pub segment_total: u32,
    pub file_id: String,
    /// Option 0.
    pub file_name: Option<String>,
    /// Option 1.
    pub segment_count: Option<u32>,
    /// Option 2, seconds since the Unix epoch.
    pub time_stamp: Option<u64>,
    /// Option 3.
    pub sender: Option<String>,
    /// Option 4.
    pub addressee: Option<String>,
    /// Option 5, in bytes.
    pub file_size: Option<u64>,
    /// Option 6.
    pub checksum: Option<u16>,
}

impl MacroBlock {
    pub fn new(segment_index: u32, segment_total: u32, file_id: impl Into<String>) -> Self {
        Self { segment_index, segment_total, file_id: file_id.into(), ..Self::default() }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn segment_count(mut self, count: u32) -> Self {
        self.segment_count = Some(count);
        self
    }

    pub fn time_stamp(mut self, seconds: u64) -> Self {
        self.time_stamp = Some(seconds);
        self
    }

    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn addressee(mut self, addressee: impl Into<String>) -> Self {
        self.addressee = Some(addressee.into());
        self
    }

    pub fn file_size(mut self, bytes: u64) -> Self {
        self.file_size = Some(bytes);
        self
    }

    pub fn checksum(mut self, checksum: u16) -> Self {
        self.checksum = Some(checksum);
        self
    }

    /// Returns `true` if this block closes the file.
    pub const fn is_last(&self) -> bool {
        self.segment_index + 1 == self.segment_total
    }

    fn validate(&self) -> Result<()> {
        if self.segment_index > MAX_SEGMENT_INDEX {
            return Err(Error::InvalidParameter("segment index must be at most 99998"));
        }
        if self.segment_index >= self.segment_total {
            return Err(Error::InvalidParameter(
                "segment index must be lower than the segment total",
            ));
        }
        if self.file_id.is_empty() {
            return Err(Error::InvalidParameter("file id must not be empty"));
        }
        if matches!(self.segment_count, Some(c) if c > 99_999) {
            return Err(Error::InvalidParameter("segment count must fit on five digits"));
        }
        if matches!(self.time_stamp, Some(t) if t > MAX_TIME_STAMP) {
            return Err(Error::InvalidParameter("time stamp must fit on ten digits"));
        }
        Ok(())
    }

    /// Optional fields as (option number, compaction, value).
    fn options(&self) -> Vec<(u16, SegmentKind, String)> {
        let text = |n: u16, v: &Option<String>| {
            v.as_ref().map(|v| (n, SegmentKind::Text, v.clone()))
        };
        [
            text(0, &self.file_name),
            self.segment_count.map(|c| (1, SegmentKind::Numeric, format!("{c:05}"))),
            self.time_stamp.map(|t| (2, SegmentKind::Numeric, format!("{t:010}"))),
            text(3, &self.sender),
            text(4, &self.addressee),
            self.file_size.map(|s| (5, SegmentKind::Numeric, s.to_string())),
            self.checksum.map(|c| (6, SegmentKind::Numeric, format!("{c:05}"))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Codewords of the control block, appended after the padded data.
    pub fn codewords(&self) -> Result<Vec<u16>> {
        self.validate()?;

        let mut out = vec![SegmentKind::Macro.latch(0)];
        let index = format!("{:05}", self.segment_index);
        compact_raw(SegmentKind::Numeric, index.as_bytes(), &mut out)?;
        compact_raw(SegmentKind::Text, self.file_id.as_bytes(), &mut out)?;

        for (n, kind, value) in self.options() {
            out.extend_from_slice(&[MACRO_OPTIONAL_FIELD, n]);
            compact_raw(kind, value.as_bytes(), &mut out)?;
        }

        if self.is_last() {
            out.push(MACRO_TERMINATOR);
        }

        tracing::debug!(
            index = self.segment_index,
            total = self.segment_total,
            len = out.len(),
            "macro block"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf417::high_level::MACRO_MARKER;

    #[test]
    fn test_minimal_block() {
        let cws = MacroBlock::new(0, 2, "AB").codewords().unwrap();
        // "100000" in base 900 is 111, 100
        assert_eq!(cws, &[MACRO_MARKER, 111, 100, 0 * 30 + 1]);
    }

    #[test]
    fn test_last_segment_is_terminated() {
        let cws = MacroBlock::new(1, 2, "AB").codewords().unwrap();
        // "100001"
        assert_eq!(cws, &[MACRO_MARKER, 111, 101, 0 * 30 + 1, MACRO_TERMINATOR]);
    }

    #[test]
    fn test_optional_fields() {
        let cws = MacroBlock::new(0, 3, "AB")
            .segment_count(3)
            .file_name("X")
            .codewords()
            .unwrap();
        assert_eq!(cws, &[
            MACRO_MARKER, 111, 100, 0 * 30 + 1,
            // option 0, text "X" padded
            MACRO_OPTIONAL_FIELD, 0, 23 * 30 + 29,
            // option 1, "100003"
            MACRO_OPTIONAL_FIELD, 1, 111, 103,
        ]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(MacroBlock::new(2, 2, "AB").codewords(), Err(Error::InvalidParameter(_))));
        assert!(matches!(MacroBlock::new(0, 1, "").codewords(), Err(Error::InvalidParameter(_))));
        assert!(matches!(
            MacroBlock::new(99_999, 100_000, "A").codewords(),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            MacroBlock::new(0, 1, "A").time_stamp(10_000_000_000).codewords(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_unencodable_file_id() {
        assert_eq!(
            MacroBlock::new(0, 1, "\u{1}").codewords(),
            Err(Error::UnencodableCharacter { byte: 0x01, mode: "text" })
        );
    }
}
