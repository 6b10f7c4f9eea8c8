//! Bidirectional codec for ANSI/SCTE-35 Digital Program Insertion Cueing
//! Messages.
//!
//! The crate decodes base64- or hex-framed `splice_info_section` payloads
//! into a structured model, re-encodes the model to the exact same bytes
//! (canonical form), and maps the model to and from the SCTE-35 XML schema
//! and a camelCase JSON form. A transport-stream scanner extracts SCTE-35
//! sections straight out of 188-byte MPEG-TS packets.
//!
//! # Decoding
//!
//! ```
//! use scte35_codec::{decode_base64, SpliceCommand};
//!
//! let cue = "/DAvAAAAAAAA///wBQb+dGKQoAAZAhdDVUVJSAAAjn+fCAgAAAAALKChijUCAKnMZ1g=";
//! let section = decode_base64(cue).unwrap();
//! assert!(matches!(section.splice_command, SpliceCommand::TimeSignal(_)));
//! assert_eq!(section.base64(), cue);
//! ```
//!
//! # Error policy
//!
//! Decoding reports faults from a closed set ([`CueError`]) wrapped in a
//! [`DecodeError`] that names the innermost structure and carries the
//! best-effort decoded value. A CRC mismatch therefore still hands back the
//! full section for callers that choose to accept corrupted signals.

#![warn(missing_docs)]

// Internal modules
mod bits;
mod encoding;
mod table;

// Public modules
pub mod crc;
pub mod descriptors;
mod error;
pub mod parser;
pub mod serde;
pub mod stream;
pub mod time;
pub mod types;
pub mod upid;
pub mod xml;

pub use error::{CueError, DecodeError};
pub use parser::{decode, decode_base64, decode_hex};

pub use descriptors::{
    AudioChannel, AudioDescriptor, AvailDescriptor, DeliveryRestrictions, DeviceRestrictions,
    DtmfDescriptor, PrivateDescriptor, SegmentationDescriptor, SegmentationDescriptorComponent,
    SegmentationType, SpliceDescriptor, TimeDescriptor,
};
pub use stream::{PacketData, SpliceCue, Stream};
pub use time::{duration_to_ticks, ticks_to_duration, BreakDuration, SpliceTime, TICKS_PER_SECOND};
pub use types::{
    EncryptedPacket, PrivateCommand, SapType, SpliceCommand, SpliceCommandType, SpliceInfoSection,
    SpliceInsert, SpliceInsertComponent, SpliceInsertProgram, SpliceSchedule, SpliceScheduleEvent,
    SpliceScheduleEventComponent, SpliceScheduleEventProgram, TimeSignal,
};
pub use upid::{SegmentationUpid, SegmentationUpidType};

#[cfg(test)]
mod tests;
