//! Segmentation UPID types and the type-dispatched value codec.
//!
//! A segmentation descriptor names the entity it refers to with a UPID: an
//! 8-bit type plus a variable-length value. The byte-level representation of
//! the value depends on the type, so this module converts between raw wire
//! bytes and the canonical textual form used by the structured model and the
//! XML/JSON documents.

use ascii::AsciiChar;
use data_encoding::BASE64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The registered `segmentation_upid_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentationUpidType {
    /// No UPID is used (0x00)
    NotUsed,
    /// User-defined UPID, deprecated (0x01)
    UserDefinedDeprecated,
    /// Industry Standard Commercial Identifier (0x02)
    ISCI,
    /// Ad-ID (0x03)
    AdID,
    /// Unique Material Identifier (0x04)
    UMID,
    /// ISAN, deprecated short form (0x05)
    ISANDeprecated,
    /// International Standard Audiovisual Number (0x06)
    ISAN,
    /// Turner Identifier (0x07)
    TID,
    /// Transport Identifier, an AiringID (0x08)
    TI,
    /// Advertising Digital Identification (0x09)
    ADI,
    /// Entertainment Identifier Registry (0x0A)
    EIDR,
    /// ATSC Content Identifier (0x0B)
    ATSCContentIdentifier,
    /// Managed Private UPID (0x0C)
    MPU,
    /// Multiple UPID container (0x0D)
    MID,
    /// ADS Information (0x0E)
    ADSInformation,
    /// Uniform Resource Identifier (0x0F)
    URI,
    /// Universally Unique Identifier (0x10)
    UUID,
    /// Subscriber Company Reporting (0x11)
    SCR,
    /// Reserved or unknown type
    Reserved(u8),
}

impl Default for SegmentationUpidType {
    fn default() -> Self {
        SegmentationUpidType::NotUsed
    }
}

impl From<SegmentationUpidType> for u8 {
    fn from(s: SegmentationUpidType) -> Self {
        use SegmentationUpidType::*;
        match s {
            NotUsed => 0x00,
            UserDefinedDeprecated => 0x01,
            ISCI => 0x02,
            AdID => 0x03,
            UMID => 0x04,
            ISANDeprecated => 0x05,
            ISAN => 0x06,
            TID => 0x07,
            TI => 0x08,
            ADI => 0x09,
            EIDR => 0x0A,
            ATSCContentIdentifier => 0x0B,
            MPU => 0x0C,
            MID => 0x0D,
            ADSInformation => 0x0E,
            URI => 0x0F,
            UUID => 0x10,
            SCR => 0x11,
            Reserved(x) => x,
        }
    }
}

impl From<u8> for SegmentationUpidType {
    fn from(value: u8) -> Self {
        use SegmentationUpidType::*;
        match value {
            0x00 => NotUsed,
            0x01 => UserDefinedDeprecated,
            0x02 => ISCI,
            0x03 => AdID,
            0x04 => UMID,
            0x05 => ISANDeprecated,
            0x06 => ISAN,
            0x07 => TID,
            0x08 => TI,
            0x09 => ADI,
            0x0A => EIDR,
            0x0B => ATSCContentIdentifier,
            0x0C => MPU,
            0x0D => MID,
            0x0E => ADSInformation,
            0x0F => URI,
            0x10 => UUID,
            0x11 => SCR,
            x => Reserved(x),
        }
    }
}

impl Serialize for SegmentationUpidType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for SegmentationUpidType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(SegmentationUpidType::from(u8::deserialize(deserializer)?))
    }
}

impl fmt::Display for SegmentationUpidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SegmentationUpidType::*;
        let name = match self {
            NotUsed => "Not Used",
            UserDefinedDeprecated => "User Defined (Deprecated)",
            ISCI => "ISCI",
            AdID => "Ad-ID",
            UMID => "UMID",
            ISANDeprecated => "ISAN (Deprecated)",
            ISAN => "ISAN",
            TID => "TID",
            TI => "TI",
            ADI => "ADI",
            EIDR => "EIDR",
            ATSCContentIdentifier => "ATSC Content Identifier",
            MPU => "MPU()",
            MID => "MID()",
            ADSInformation => "ADS Information",
            URI => "URI",
            UUID => "UUID",
            SCR => "SCR",
            Reserved(_) => "Reserved",
        };
        f.write_str(name)
    }
}

/// A single segmentation UPID with its decoded textual value.
///
/// `value` holds the canonical text form for the type: decimal for TI,
/// `10.<dec>/<hex groups>` for EIDR, base64 for ISAN and the MPU payload,
/// US-ASCII text for everything else. It is always valid UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentationUpid {
    /// The `segmentation_upid_type`.
    #[serde(rename = "segmentationUpidType")]
    pub upid_type: SegmentationUpidType,
    /// MPU format identifier (first four payload bytes), MPU only.
    #[serde(
        rename = "formatIdentifier",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub format_identifier: Option<u32>,
    /// Canonical textual value.
    #[serde(default)]
    pub value: String,
}

impl SegmentationUpid {
    /// Constructs a UPID of the given type with a textual value.
    pub fn new<T: Into<String>>(upid_type: SegmentationUpidType, value: T) -> Self {
        Self {
            upid_type,
            format_identifier: None,
            value: value.into(),
        }
    }

    /// Decodes raw wire bytes into the canonical textual value for
    /// `upid_type`. Pure; MID is handled one level up, in the segmentation
    /// descriptor codec.
    pub fn decode(upid_type: SegmentationUpidType, buf: &[u8]) -> Self {
        use SegmentationUpidType::*;
        match upid_type {
            EIDR => Self::new(upid_type, canonical_eidr(buf)),
            ISAN | ISANDeprecated => Self::new(upid_type, BASE64.encode(buf)),
            MPU if buf.len() >= 4 => Self {
                upid_type,
                format_identifier: Some(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])),
                value: BASE64.encode(&buf[4..]),
            },
            TI => {
                let mut raw = [0u8; 8];
                let n = buf.len().min(8);
                raw[8 - n..].copy_from_slice(&buf[..n]);
                Self::new(upid_type, u64::from_be_bytes(raw).to_string())
            }
            _ => Self::new(upid_type, decode_ascii(buf)),
        }
    }

    /// Re-encodes the textual value to wire bytes; the inverse of
    /// [`SegmentationUpid::decode`]. Malformed values are reported to the
    /// diagnostic sink and encoded best-effort.
    pub fn value_bytes(&self) -> Vec<u8> {
        use SegmentationUpidType::*;
        let value = self.value.trim();
        match self.upid_type {
            EIDR => compress_eidr(value),
            ISAN | ISANDeprecated => BASE64.decode(value.as_bytes()).unwrap_or_else(|err| {
                log::warn!("error parsing ISAN UPID value: {err}");
                Vec::new()
            }),
            MPU if self.format_identifier.is_some() => {
                let mut b = self.format_identifier.unwrap_or(0).to_be_bytes().to_vec();
                match BASE64.decode(value.as_bytes()) {
                    Ok(payload) => b.extend_from_slice(&payload),
                    Err(err) => log::warn!("error parsing MPU UPID value: {err}"),
                }
                b
            }
            TI => match value.parse::<u64>() {
                Ok(i) => i.to_be_bytes().to_vec(),
                Err(err) => {
                    log::warn!("error parsing TI UPID value: {err}");
                    vec![0; 8]
                }
            },
            _ => value.as_bytes().to_vec(),
        }
    }

    /// Human-readable name of the UPID type, with the EIDR sub-registry
    /// appended where recognizable.
    pub fn name(&self) -> String {
        if self.upid_type == SegmentationUpidType::EIDR {
            let registry = eidr_registry_name(&self.value);
            if !registry.is_empty() {
                return format!("EIDR: {registry}");
            }
        }
        self.upid_type.to_string()
    }

    /// The value as displayable ASCII; bytes outside the ASCII range render
    /// as a dot.
    pub fn ascii_value(&self) -> String {
        self.value_bytes()
            .iter()
            .map(|&b| AsciiChar::from_ascii(b).map_or('.', char::from))
            .collect()
    }

    /// The MPU format identifier as four ASCII characters when it is
    /// alphanumeric, hex otherwise.
    pub fn format_identifier_display(&self) -> Option<String> {
        self.format_identifier.map(format_identifier_to_string)
    }
}

/// Interprets `b` as US-ASCII and converts it to a UTF-8 string; bytes
/// outside the ASCII range become replacement characters, so the result is
/// always valid UTF-8.
pub fn decode_ascii(b: &[u8]) -> String {
    b.iter()
        .map(|&byte| AsciiChar::from_ascii(byte).map_or('\u{FFFD}', char::from))
        .collect()
}

/// Renders a 32-bit format identifier as four ASCII characters when all
/// bytes are alphanumeric, falling back to hex.
pub fn format_identifier_to_string(format_identifier: u32) -> String {
    let bytes = format_identifier.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
        bytes.iter().map(|&b| char::from(b)).collect()
    } else {
        format!("0x{format_identifier:08X}")
    }
}

/// Expands raw EIDR bytes to the canonical
/// `10.<dec>/<hex>-<hex>-<hex>-<hex>-<hex>` text.
fn canonical_eidr(b: &[u8]) -> String {
    // Some upstream systems carry the canonical text on the wire already.
    if b.contains(&b'/') {
        return decode_ascii(b);
    }
    if b.len() != 12 {
        log::warn!("unexpected EIDR value of {} bytes", b.len());
        return String::new();
    }
    let prefix = u16::from_be_bytes([b[0], b[1]]);
    format!(
        "10.{}/{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}",
        prefix, b[2], b[3], b[4], b[5], b[6], b[7], b[8], b[9], b[10], b[11]
    )
}

/// Compresses a canonical EIDR string back to its 12-byte wire form.
fn compress_eidr(s: &str) -> Vec<u8> {
    let parts: Vec<&str> = s.split(['.', '/']).filter(|p| !p.is_empty()).collect();
    if parts.len() != 3 {
        log::warn!("EIDR string is not canonical: {s}");
        return s.as_bytes().to_vec();
    }

    let prefix: u16 = match parts[1].parse() {
        Ok(i) => i,
        Err(_) => {
            log::warn!("non-canonical EIDR prefix: '{s}'");
            return s.as_bytes().to_vec();
        }
    };

    let hex: String = parts[2].chars().filter(|&c| c != '-').collect();
    let suffix = match data_encoding::HEXLOWER_PERMISSIVE.decode(hex.as_bytes()) {
        Ok(h) if h.len() == 10 => h,
        _ => {
            log::warn!("non-canonical EIDR suffix: '{s}'");
            return s.as_bytes().to_vec();
        }
    };

    let mut b = prefix.to_be_bytes().to_vec();
    b.extend_from_slice(&suffix);
    b
}

/// Maps the EIDR prefix to the sub-registry it identifies.
fn eidr_registry_name(value: &str) -> &'static str {
    if value.starts_with("10.5237") {
        "Party ID"
    } else if value.starts_with("10.5238") {
        "User ID"
    } else if value.starts_with("10.5239") {
        "Service ID"
    } else if value.starts_with("10.5240") {
        "Content ID"
    } else {
        ""
    }
}
