//! SCTE-35 splice descriptor types.
//!
//! Descriptors annotate the splice command with metadata. Those carrying the
//! `"CUEI"` identifier follow the standard layouts keyed by
//! `splice_descriptor_tag`; anything else is preserved as an opaque private
//! descriptor.

mod segmentation;

pub use segmentation::{
    DeliveryRestrictions, DeviceRestrictions, SegmentationDescriptor, SegmentationDescriptorComponent,
    SegmentationType,
};

use serde::{Deserialize, Serialize};

/// Registered `splice_descriptor_tag` values for CUEI descriptors.
pub mod tag {
    /// avail_descriptor()
    pub const AVAIL: u8 = 0x00;
    /// DTMF_descriptor()
    pub const DTMF: u8 = 0x01;
    /// segmentation_descriptor()
    pub const SEGMENTATION: u8 = 0x02;
    /// time_descriptor()
    pub const TIME: u8 = 0x03;
    /// audio_descriptor()
    pub const AUDIO: u8 = 0x04;
}

/// A single entry of the descriptor loop.
///
/// The in-memory list preserves wire order; both the binary encoder and the
/// textual codecs emit descriptors in the order they were decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum SpliceDescriptor {
    /// avail_descriptor() (tag 0x00)
    Avail(AvailDescriptor),
    /// DTMF_descriptor() (tag 0x01)
    Dtmf(DtmfDescriptor),
    /// segmentation_descriptor() (tag 0x02)
    Segmentation(SegmentationDescriptor),
    /// time_descriptor() (tag 0x03)
    Time(TimeDescriptor),
    /// audio_descriptor() (tag 0x04)
    Audio(AudioDescriptor),
    /// Any descriptor without the CUEI identifier, or a CUEI descriptor with
    /// an unassigned tag.
    Private(PrivateDescriptor),
}

impl SpliceDescriptor {
    /// The `splice_descriptor_tag`.
    pub fn tag(&self) -> u8 {
        match self {
            SpliceDescriptor::Avail(_) => tag::AVAIL,
            SpliceDescriptor::Dtmf(_) => tag::DTMF,
            SpliceDescriptor::Segmentation(_) => tag::SEGMENTATION,
            SpliceDescriptor::Time(_) => tag::TIME,
            SpliceDescriptor::Audio(_) => tag::AUDIO,
            SpliceDescriptor::Private(d) => d.tag,
        }
    }

    /// The structure name used in diagnostics and error wrapping.
    pub fn name(&self) -> &'static str {
        match self {
            SpliceDescriptor::Avail(_) => "avail_descriptor",
            SpliceDescriptor::Dtmf(_) => "dtmf_descriptor",
            SpliceDescriptor::Segmentation(_) => "segmentation_descriptor",
            SpliceDescriptor::Time(_) => "time_descriptor",
            SpliceDescriptor::Audio(_) => "audio_descriptor",
            SpliceDescriptor::Private(_) => "private_descriptor",
        }
    }
}

/// avail_descriptor(): tags an avail with a provider-assigned number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailDescriptor {
    /// Provider-defined avail identifier.
    #[serde(default)]
    pub provider_avail_id: u32,
}

/// DTMF_descriptor(): legacy out-of-band cueing via DTMF tones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DtmfDescriptor {
    /// Tenths of a second between this signal and the tone sequence.
    #[serde(default)]
    pub preroll: u8,
    /// The tone characters; `dtmf_count` on the wire is the length.
    #[serde(default)]
    pub chars: String,
}

/// time_descriptor(): the programmer's wall clock in TAI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeDescriptor {
    /// 48-bit TAI seconds.
    #[serde(default)]
    pub tai_seconds: u64,
    /// Nanoseconds within the second.
    #[serde(default)]
    pub tai_ns: u32,
    /// Current TAI-UTC offset in seconds.
    #[serde(default)]
    pub utc_offset: u16,
}

/// audio_descriptor(): static audio layout for receivers without dynamic
/// signaling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDescriptor {
    /// Up to 15 described channels (`audio_count` is 4 bits).
    #[serde(default)]
    pub audio_channels: Vec<AudioChannel>,
}

/// One channel entry of an audio_descriptor().
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioChannel {
    /// Elementary stream this entry applies to.
    #[serde(default)]
    pub component_tag: u8,
    /// ISO 639 language code, three ASCII characters.
    #[serde(default)]
    pub iso_code: String,
    /// ATSC A/52 bit stream mode (3 bits).
    #[serde(default)]
    pub bit_stream_mode: u8,
    /// Channel count code (4 bits).
    #[serde(default)]
    pub num_channels: u8,
    /// Whether this is a full-service audio stream.
    #[serde(default)]
    pub full_srvc_audio: bool,
}

/// A descriptor this library does not interpret, preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateDescriptor {
    /// The original `splice_descriptor_tag`.
    pub tag: u8,
    /// The 32-bit identifier in place of `"CUEI"`.
    pub identifier: u32,
    /// Remaining descriptor bytes after the identifier.
    pub private_bytes: Vec<u8>,
}
