//! Error types for decoding SCTE-35 payloads.

use crate::types::SpliceInfoSection;
use std::fmt;
use thiserror::Error;

/// The closed set of fault kinds a decode can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CueError {
    /// The input is not valid base64 or hex.
    #[error("unsupported encoding")]
    UnsupportedEncoding,

    /// The decoder reached the end of the input before completing a
    /// structure.
    #[error("buffer overflow")]
    BufferOverflow,

    /// The decoder has trailing bytes it cannot account for.
    #[error("buffer underflow")]
    BufferUnderflow,

    /// The computed CRC-32 does not match the section trailer.
    #[error("invalid CRC_32")]
    Crc32Invalid,
}

/// A decode fault, carrying the name of the innermost structure being decoded
/// and, where anything was parsed, the best-effort populated section.
///
/// The section is always attached for [`CueError::Crc32Invalid`], so callers
/// that accept known-corrupted signals can keep the value:
///
/// ```
/// use scte35_codec::{decode_base64, CueError};
///
/// let bad_crc = "/DA4AAAAAAAAAP/wFAUABDEAf+//mWEhzP4Azf5gAQAAAAATAhFDVUVJAAAAAX+/AQIwNAEAAKeYO3Q=";
/// let err = decode_base64(bad_crc).unwrap_err();
/// assert_eq!(err.kind(), CueError::Crc32Invalid);
/// assert!(err.section().is_some());
/// ```
#[derive(Debug)]
pub struct DecodeError {
    kind: CueError,
    structure: &'static str,
    section: Option<Box<SpliceInfoSection>>,
}

impl DecodeError {
    pub(crate) fn new(kind: CueError, structure: &'static str) -> Self {
        Self {
            kind,
            structure,
            section: None,
        }
    }

    pub(crate) fn with_section(
        kind: CueError,
        structure: &'static str,
        section: SpliceInfoSection,
    ) -> Self {
        Self {
            kind,
            structure,
            section: Some(Box::new(section)),
        }
    }

    /// The fault kind.
    pub fn kind(&self) -> CueError {
        self.kind
    }

    /// Name of the innermost structure being decoded when the fault was
    /// detected, e.g. `"splice_info_section"` or `"splice_insert"`. Empty for
    /// framing faults.
    pub fn structure(&self) -> &'static str {
        self.structure
    }

    /// The best-effort decoded section, populated with whatever was
    /// successfully parsed before the fault.
    pub fn section(&self) -> Option<&SpliceInfoSection> {
        self.section.as_deref()
    }

    /// Consumes the error, returning the best-effort decoded section.
    pub fn into_section(self) -> Option<SpliceInfoSection> {
        self.section.map(|s| *s)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.structure.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.structure, self.kind)
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wraps_structure_name() {
        let err = DecodeError::new(CueError::BufferOverflow, "splice_info_section");
        assert_eq!(err.to_string(), "splice_info_section: buffer overflow");

        let err = DecodeError::new(CueError::UnsupportedEncoding, "");
        assert_eq!(err.to_string(), "unsupported encoding");
    }
}
