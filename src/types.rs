//! Core SCTE-35 data structures.
//!
//! The structured model mirrors the wire format with one deliberate
//! difference: every "presence flag + conditional field" pair on the wire is
//! a single optional value here. `program_splice_flag`,
//! `splice_command_length`, `descriptor_loop_length` and friends are derived
//! at encode time, so a hand-constructed value can never disagree with its
//! own layout.

use crate::descriptors::SpliceDescriptor;
use crate::time::{BreakDuration, SpliceTime};
use serde::{Deserialize, Serialize};

/// `table_id` for every splice_info_section.
pub const TABLE_ID: u8 = 0xFC;

/// The 4-byte ASCII identifier `"CUEI"` carried by standard descriptors.
pub const CUE_IDENTIFIER: u32 = 0x4355_4549;

/// A complete `splice_info_section()`.
///
/// `table_id`, `section_syntax_indicator` and `private_indicator` are fixed
/// by the standard (0xFC / 0 / 0) and therefore not modeled; the derived
/// length fields are computed during encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceInfoSection {
    /// Stream Access Point type (2 bits); 3 means "not specified".
    #[serde(default)]
    pub sap_type: SapType,
    /// 33-bit offset added to every PTS in the section.
    #[serde(default)]
    pub pts_adjustment: u64,
    /// Always 0 for this protocol generation.
    #[serde(default)]
    pub protocol_version: u8,
    /// 12-bit authorization tier; 0xFFF means "all tiers".
    #[serde(default = "default_tier")]
    pub tier: u16,
    /// Encryption metadata; the wire `encrypted_packet` flag is derived from
    /// the algorithm field.
    #[serde(default)]
    pub encrypted_packet: EncryptedPacket,
    /// The single splice command carried by this section.
    #[serde(default)]
    pub splice_command: SpliceCommand,
    /// Descriptor loop, in wire order.
    #[serde(default)]
    pub splice_descriptors: Vec<SpliceDescriptor>,
    /// Stuffing bytes found between the descriptor loop and the CRC on
    /// unencrypted legacy signals. Preserved for diagnostics only; the
    /// encoder always emits canonical form without stuffing.
    #[serde(skip)]
    pub alignment_stuffing: Vec<u8>,
    /// `E_CRC_32`, present on encrypted sections.
    #[serde(skip)]
    pub ecrc_32: Option<u32>,
    /// The CRC-32/MPEG-2 trailer as decoded, or as last computed by the
    /// encoder.
    #[serde(skip)]
    pub crc_32: u32,
}

fn default_tier() -> u16 {
    0xFFF
}

impl Default for SpliceInfoSection {
    fn default() -> Self {
        Self {
            sap_type: SapType::NotSpecified,
            pts_adjustment: 0,
            protocol_version: 0,
            tier: 0xFFF,
            encrypted_packet: EncryptedPacket::default(),
            splice_command: SpliceCommand::SpliceNull,
            splice_descriptors: Vec::new(),
            alignment_stuffing: Vec::new(),
            ecrc_32: None,
            crc_32: 0,
        }
    }
}

impl SpliceInfoSection {
    /// Constructs a section around a command with default header fields.
    pub fn new(splice_command: SpliceCommand) -> Self {
        Self {
            splice_command,
            ..Self::default()
        }
    }

    /// Whether the section payload is encrypted. Derived: a cleared
    /// `encrypted_packet` flag requires a zero `encryption_algorithm`.
    pub fn encrypted(&self) -> bool {
        self.encrypted_packet.encryption_algorithm != 0
    }
}

/// Stream Access Point type (ISO 14496-12 Annex I).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SapType {
    /// Closed GOP with no leading pictures.
    Type1 = 0x00,
    /// Closed GOP with leading pictures.
    Type2 = 0x01,
    /// Open GOP.
    Type3 = 0x02,
    /// SAP type not specified.
    #[default]
    NotSpecified = 0x03,
}

impl From<u8> for SapType {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0x00 => SapType::Type1,
            0x01 => SapType::Type2,
            0x02 => SapType::Type3,
            _ => SapType::NotSpecified,
        }
    }
}

impl From<SapType> for u8 {
    fn from(value: SapType) -> Self {
        value as u8
    }
}

/// Encryption metadata from the section header.
///
/// Ciphering itself is out of scope: the fields are carried through both
/// directions untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPacket {
    /// 6-bit `encryption_algorithm`; 0 means unencrypted.
    #[serde(default)]
    pub encryption_algorithm: u8,
    /// 8-bit control word index.
    #[serde(default)]
    pub cw_index: u8,
}

/// The registered `splice_command_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceCommandType {
    /// splice_null() (0x00)
    SpliceNull,
    /// splice_schedule() (0x04)
    SpliceSchedule,
    /// splice_insert() (0x05)
    SpliceInsert,
    /// time_signal() (0x06)
    TimeSignal,
    /// bandwidth_reservation() (0x07)
    BandwidthReservation,
    /// private_command() (0xFF)
    PrivateCommand,
    /// Reserved slot.
    Reserved(u8),
}

impl From<u8> for SpliceCommandType {
    fn from(value: u8) -> SpliceCommandType {
        match value {
            0x00 => SpliceCommandType::SpliceNull,
            0x04 => SpliceCommandType::SpliceSchedule,
            0x05 => SpliceCommandType::SpliceInsert,
            0x06 => SpliceCommandType::TimeSignal,
            0x07 => SpliceCommandType::BandwidthReservation,
            0xFF => SpliceCommandType::PrivateCommand,
            _ => SpliceCommandType::Reserved(value),
        }
    }
}

impl From<SpliceCommandType> for u8 {
    fn from(value: SpliceCommandType) -> u8 {
        match value {
            SpliceCommandType::SpliceNull => 0x00,
            SpliceCommandType::SpliceSchedule => 0x04,
            SpliceCommandType::SpliceInsert => 0x05,
            SpliceCommandType::TimeSignal => 0x06,
            SpliceCommandType::BandwidthReservation => 0x07,
            SpliceCommandType::PrivateCommand => 0xFF,
            SpliceCommandType::Reserved(value) => value,
        }
    }
}

/// The splice command variants a section can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum SpliceCommand {
    /// No-op heartbeat command.
    SpliceNull,
    /// Pre-scheduled splice events keyed to UTC wall clock.
    SpliceSchedule(SpliceSchedule),
    /// The classic ad-insertion cue.
    SpliceInsert(SpliceInsert),
    /// A bare timestamp, given meaning by the descriptor loop.
    TimeSignal(TimeSignal),
    /// Reserves bandwidth on a cueing channel; carries no payload.
    BandwidthReservation,
    /// Opaque privately-defined command.
    Private(PrivateCommand),
}

impl SpliceCommand {
    /// The `splice_command_type` for this variant.
    pub fn command_type(&self) -> SpliceCommandType {
        match self {
            SpliceCommand::SpliceNull => SpliceCommandType::SpliceNull,
            SpliceCommand::SpliceSchedule(_) => SpliceCommandType::SpliceSchedule,
            SpliceCommand::SpliceInsert(_) => SpliceCommandType::SpliceInsert,
            SpliceCommand::TimeSignal(_) => SpliceCommandType::TimeSignal,
            SpliceCommand::BandwidthReservation => SpliceCommandType::BandwidthReservation,
            SpliceCommand::Private(_) => SpliceCommandType::PrivateCommand,
        }
    }

    /// The structure name used in diagnostics and error wrapping.
    pub fn name(&self) -> &'static str {
        match self {
            SpliceCommand::SpliceNull => "splice_null",
            SpliceCommand::SpliceSchedule(_) => "splice_schedule",
            SpliceCommand::SpliceInsert(_) => "splice_insert",
            SpliceCommand::TimeSignal(_) => "time_signal",
            SpliceCommand::BandwidthReservation => "bandwidth_reservation",
            SpliceCommand::Private(_) => "private_command",
        }
    }
}

impl Default for SpliceCommand {
    fn default() -> Self {
        SpliceCommand::SpliceNull
    }
}

/// `time_signal()`: a single splice time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignal {
    /// When and whether the signal is pinned to a PTS.
    #[serde(default)]
    pub splice_time: SpliceTime,
}

impl TimeSignal {
    /// A time signal at the given PTS ticks.
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            splice_time: SpliceTime::from_ticks(ticks),
        }
    }
}

/// `splice_insert()`: signals a splice in or out of the network feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceInsert {
    /// Unique identifier for the splice event.
    #[serde(default)]
    pub splice_event_id: u32,
    /// Cancels a previously sent event with the same id; when set, only the
    /// id is carried on the wire.
    #[serde(default)]
    pub splice_event_cancel_indicator: bool,
    /// Set when leaving the network feed, cleared when returning.
    #[serde(default)]
    pub out_of_network_indicator: bool,
    /// Splice at the next opportunity rather than at a signaled time.
    #[serde(default)]
    pub splice_immediate_flag: bool,
    /// Program-level splice point. Mutually exclusive with `components`;
    /// its presence is the wire `program_splice_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program: Option<SpliceInsertProgram>,
    /// Component-level splice points (`program_splice_flag == 0`).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub components: Vec<SpliceInsertComponent>,
    /// Break length; presence is the wire `duration_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub break_duration: Option<BreakDuration>,
    /// Identifies the program the event applies to.
    #[serde(default)]
    pub unique_program_id: u16,
    /// Which avail within the break this event represents.
    #[serde(default)]
    pub avail_num: u8,
    /// Expected count of avails in the break.
    #[serde(default)]
    pub avails_expected: u8,
}

impl SpliceInsert {
    /// The wire `program_splice_flag`.
    pub fn program_splice_flag(&self) -> bool {
        self.program.is_some()
    }

    /// The wire `duration_flag`.
    pub fn duration_flag(&self) -> bool {
        self.break_duration.is_some()
    }
}

/// The splice point of a program-level `splice_insert()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceInsertProgram {
    /// The splice time; unspecified PTS on immediate splices.
    #[serde(default)]
    pub splice_time: SpliceTime,
}

impl SpliceInsertProgram {
    /// A program splice pinned to the given PTS ticks.
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            splice_time: SpliceTime::from_ticks(ticks),
        }
    }

    /// The wire `time_specified_flag`.
    pub fn time_specified_flag(&self) -> bool {
        self.splice_time.pts_time.is_some()
    }
}

/// Per-component splice point of a component-level `splice_insert()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceInsertComponent {
    /// Elementary stream this entry applies to.
    #[serde(default)]
    pub component_tag: u8,
    /// Splice time for this component; absent on immediate splices.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub splice_time: Option<SpliceTime>,
}

/// `splice_schedule()`: a list of events keyed to UTC seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceSchedule {
    /// The scheduled events, in wire order.
    #[serde(default)]
    pub events: Vec<SpliceScheduleEvent>,
}

/// A single event within a `splice_schedule()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceScheduleEvent {
    /// Unique identifier for the splice event.
    #[serde(default)]
    pub splice_event_id: u32,
    /// Cancels a previously scheduled event with the same id.
    #[serde(default)]
    pub splice_event_cancel_indicator: bool,
    /// Set when leaving the network feed, cleared when returning.
    #[serde(default)]
    pub out_of_network_indicator: bool,
    /// Program-level splice wall-clock time; presence is the wire
    /// `program_splice_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program: Option<SpliceScheduleEventProgram>,
    /// Component-level splice times (`program_splice_flag == 0`).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub components: Vec<SpliceScheduleEventComponent>,
    /// Break length; presence is the wire `duration_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub break_duration: Option<BreakDuration>,
    /// Identifies the program the event applies to.
    #[serde(default)]
    pub unique_program_id: u16,
    /// Which avail within the break this event represents.
    #[serde(default)]
    pub avail_num: u8,
    /// Expected count of avails in the break.
    #[serde(default)]
    pub avails_expected: u8,
}

/// Program-level schedule splice point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceScheduleEventProgram {
    /// Seconds since the GPS epoch, as carried on the wire.
    #[serde(default)]
    pub utc_splice_time: u32,
}

/// Component-level schedule splice point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceScheduleEventComponent {
    /// Elementary stream this entry applies to.
    #[serde(default)]
    pub component_tag: u8,
    /// Seconds since the GPS epoch, as carried on the wire.
    #[serde(default)]
    pub utc_splice_time: u32,
}

/// `private_command()`: an opaque payload behind a registered identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateCommand {
    /// Registered 32-bit identifier of the private scheme.
    pub identifier: u32,
    /// Uninterpreted payload bytes.
    pub private_bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sap_type_round_trips_two_bits() {
        for raw in 0u8..4 {
            assert_eq!(u8::from(SapType::from(raw)), raw);
        }
    }

    #[test]
    fn command_type_conversions() {
        assert_eq!(
            SpliceCommandType::from(0x06),
            SpliceCommandType::TimeSignal
        );
        assert_eq!(u8::from(SpliceCommandType::PrivateCommand), 0xFF);
        assert_eq!(
            SpliceCommandType::from(0x02),
            SpliceCommandType::Reserved(0x02)
        );
    }

    #[test]
    fn insert_flags_follow_presence() {
        let mut cmd = SpliceInsert {
            program: Some(SpliceInsertProgram::from_ticks(100)),
            ..SpliceInsert::default()
        };
        assert!(cmd.program_splice_flag());
        assert!(!cmd.duration_flag());

        cmd.break_duration = Some(BreakDuration {
            auto_return: true,
            duration: 90_000,
        });
        assert!(cmd.duration_flag());
    }
}
