//! JSON mapping for the structured model.
//!
//! Field names are camelCase and the command/descriptor variants carry a
//! numeric `type` discriminator matching their wire tag, so a document
//! written by one implementation of this format unmarshals in any other.
//! Null and omitted optional fields are equivalent on unmarshal.

use crate::descriptors::{
    tag, AudioChannel, AudioDescriptor, AvailDescriptor, DeliveryRestrictions, DtmfDescriptor,
    PrivateDescriptor, SegmentationDescriptor, SegmentationDescriptorComponent, SpliceDescriptor,
    TimeDescriptor,
};
use crate::time::{BreakDuration, SpliceTime};
use crate::types::{
    PrivateCommand, SapType, SpliceCommand, SpliceInfoSection, SpliceInsert, SpliceInsertComponent,
    SpliceInsertProgram, SpliceSchedule, SpliceScheduleEvent, TimeSignal,
};
use crate::upid::SegmentationUpid;
use data_encoding::BASE64;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serializes a section as an indented JSON document.
pub fn to_json(section: &SpliceInfoSection) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(section)
}

/// Parses a JSON document into a section and recomputes its CRC so the
/// result compares equal to a binary decode of the same signal.
pub fn from_json(document: &str) -> Result<SpliceInfoSection, serde_json::Error> {
    let mut section: SpliceInfoSection = serde_json::from_str(document)?;
    section.refresh_crc();
    Ok(section)
}

impl Serialize for SapType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for SapType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(SapType::from(u8::deserialize(deserializer)?))
    }
}

/// Wraps a command or descriptor body with its numeric `type` tag.
#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    type_id: u8,
    #[serde(flatten)]
    body: &'a T,
}

#[derive(Serialize)]
struct Untyped {}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrivateBytesBody {
    #[serde(default)]
    identifier: u32,
    #[serde(default)]
    private_bytes: String,
}

impl Serialize for SpliceCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let type_id = u8::from(self.command_type());
        match self {
            SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => Tagged {
                type_id,
                body: &Untyped {},
            }
            .serialize(serializer),
            SpliceCommand::SpliceSchedule(cmd) => Tagged { type_id, body: cmd }.serialize(serializer),
            SpliceCommand::SpliceInsert(cmd) => Tagged { type_id, body: cmd }.serialize(serializer),
            SpliceCommand::TimeSignal(cmd) => Tagged { type_id, body: cmd }.serialize(serializer),
            SpliceCommand::Private(cmd) => Tagged {
                type_id,
                body: &PrivateBytesBody {
                    identifier: cmd.identifier,
                    private_bytes: BASE64.encode(&cmd.private_bytes),
                },
            }
            .serialize(serializer),
        }
    }
}

/// All fields any command variant can carry; the `type` tag picks which ones
/// are meaningful.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandRepr {
    #[serde(rename = "type")]
    type_id: u8,
    splice_time: Option<SpliceTime>,
    #[serde(default)]
    events: Vec<SpliceScheduleEvent>,
    #[serde(default)]
    splice_event_id: u32,
    #[serde(default)]
    splice_event_cancel_indicator: bool,
    #[serde(default)]
    out_of_network_indicator: bool,
    #[serde(default)]
    splice_immediate_flag: bool,
    program: Option<SpliceInsertProgram>,
    #[serde(default)]
    components: Vec<SpliceInsertComponent>,
    break_duration: Option<BreakDuration>,
    #[serde(default)]
    unique_program_id: u16,
    #[serde(default)]
    avail_num: u8,
    #[serde(default)]
    avails_expected: u8,
    #[serde(default)]
    identifier: u32,
    private_bytes: Option<String>,
}

impl<'de> Deserialize<'de> for SpliceCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = CommandRepr::deserialize(deserializer)?;
        let command = match repr.type_id {
            0x00 => SpliceCommand::SpliceNull,
            0x04 => SpliceCommand::SpliceSchedule(SpliceSchedule {
                events: repr.events,
            }),
            0x05 => SpliceCommand::SpliceInsert(SpliceInsert {
                splice_event_id: repr.splice_event_id,
                splice_event_cancel_indicator: repr.splice_event_cancel_indicator,
                out_of_network_indicator: repr.out_of_network_indicator,
                splice_immediate_flag: repr.splice_immediate_flag,
                program: repr.program,
                components: repr.components,
                break_duration: repr.break_duration,
                unique_program_id: repr.unique_program_id,
                avail_num: repr.avail_num,
                avails_expected: repr.avails_expected,
            }),
            0x06 => SpliceCommand::TimeSignal(TimeSignal {
                splice_time: repr.splice_time.unwrap_or_default(),
            }),
            0x07 => SpliceCommand::BandwidthReservation,
            0xFF => SpliceCommand::Private(PrivateCommand {
                identifier: repr.identifier,
                private_bytes: decode_base64_field::<D>(repr.private_bytes.as_deref())?,
            }),
            other => {
                return Err(D::Error::custom(format!(
                    "unsupported splice command type {other}"
                )))
            }
        };
        Ok(command)
    }
}

impl Serialize for SpliceDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let type_id = self.tag();
        match self {
            SpliceDescriptor::Avail(d) => Tagged { type_id, body: d }.serialize(serializer),
            SpliceDescriptor::Dtmf(d) => Tagged { type_id, body: d }.serialize(serializer),
            SpliceDescriptor::Segmentation(d) => Tagged { type_id, body: d }.serialize(serializer),
            SpliceDescriptor::Time(d) => Tagged { type_id, body: d }.serialize(serializer),
            SpliceDescriptor::Audio(d) => Tagged { type_id, body: d }.serialize(serializer),
            SpliceDescriptor::Private(d) => Tagged {
                type_id,
                body: &PrivateBytesBody {
                    identifier: d.identifier,
                    private_bytes: BASE64.encode(&d.private_bytes),
                },
            }
            .serialize(serializer),
        }
    }
}

/// All fields any descriptor variant can carry. A private descriptor may
/// reuse one of the CUEI tags, so dispatch keys off the presence of
/// `privateBytes` before consulting `type`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptorRepr {
    #[serde(rename = "type")]
    type_id: u8,
    #[serde(default)]
    provider_avail_id: u32,
    #[serde(default)]
    preroll: u8,
    #[serde(default)]
    chars: String,
    delivery_restrictions: Option<DeliveryRestrictions>,
    #[serde(default)]
    components: Vec<SegmentationDescriptorComponent>,
    segmentation_duration: Option<u64>,
    #[serde(default)]
    segmentation_upids: Vec<SegmentationUpid>,
    #[serde(default)]
    segmentation_event_id: u32,
    #[serde(default)]
    segmentation_event_cancel_indicator: bool,
    #[serde(default)]
    segmentation_type_id: u8,
    #[serde(default)]
    segment_num: u8,
    #[serde(default)]
    segments_expected: u8,
    sub_segment_num: Option<u8>,
    sub_segments_expected: Option<u8>,
    #[serde(default)]
    tai_seconds: u64,
    #[serde(default)]
    tai_ns: u32,
    #[serde(default)]
    utc_offset: u16,
    #[serde(default)]
    audio_channels: Vec<AudioChannel>,
    #[serde(default)]
    identifier: u32,
    private_bytes: Option<String>,
}

impl<'de> Deserialize<'de> for SpliceDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = DescriptorRepr::deserialize(deserializer)?;
        if repr.private_bytes.is_some() {
            return Ok(SpliceDescriptor::Private(PrivateDescriptor {
                tag: repr.type_id,
                identifier: repr.identifier,
                private_bytes: decode_base64_field::<D>(repr.private_bytes.as_deref())?,
            }));
        }
        let descriptor = match repr.type_id {
            tag::AVAIL => SpliceDescriptor::Avail(AvailDescriptor {
                provider_avail_id: repr.provider_avail_id,
            }),
            tag::DTMF => SpliceDescriptor::Dtmf(DtmfDescriptor {
                preroll: repr.preroll,
                chars: repr.chars,
            }),
            tag::SEGMENTATION => SpliceDescriptor::Segmentation(SegmentationDescriptor {
                segmentation_event_id: repr.segmentation_event_id,
                segmentation_event_cancel_indicator: repr.segmentation_event_cancel_indicator,
                delivery_restrictions: repr.delivery_restrictions,
                components: repr.components,
                segmentation_duration: repr.segmentation_duration,
                segmentation_upids: repr.segmentation_upids,
                segmentation_type_id: repr.segmentation_type_id,
                segment_num: repr.segment_num,
                segments_expected: repr.segments_expected,
                sub_segment_num: repr.sub_segment_num,
                sub_segments_expected: repr.sub_segments_expected,
            }),
            tag::TIME => SpliceDescriptor::Time(TimeDescriptor {
                tai_seconds: repr.tai_seconds,
                tai_ns: repr.tai_ns,
                utc_offset: repr.utc_offset,
            }),
            tag::AUDIO => SpliceDescriptor::Audio(AudioDescriptor {
                audio_channels: repr.audio_channels,
            }),
            other => {
                return Err(D::Error::custom(format!(
                    "unsupported splice descriptor type {other}"
                )))
            }
        };
        Ok(descriptor)
    }
}

fn decode_base64_field<'de, D: Deserializer<'de>>(
    field: Option<&str>,
) -> Result<Vec<u8>, D::Error> {
    match field {
        None => Ok(Vec::new()),
        Some(text) => BASE64
            .decode(text.as_bytes())
            .map_err(|err| D::Error::custom(format!("invalid base64 bytes: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::decode_base64;

    #[test]
    fn time_signal_json_shape() {
        let section = decode_base64(
            "/DAvAAAAAAAA///wBQb+dGKQoAAZAhdDVUVJSAAAjn+fCAgAAAAALKChijUCAKnMZ1g=",
        )
        .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&to_json(&section).unwrap()).unwrap();

        assert_eq!(value["sapType"], 3);
        assert_eq!(value["tier"], 4095);
        assert_eq!(value["encryptedPacket"]["cwIndex"], 255);
        assert_eq!(value["spliceCommand"]["type"], 6);
        assert_eq!(value["spliceCommand"]["spliceTime"]["ptsTime"], 0x0_7462_90A0u64);
        assert_eq!(value["spliceDescriptors"][0]["type"], 2);
        assert_eq!(
            value["spliceDescriptors"][0]["segmentationUpids"][0]["segmentationUpidType"],
            8
        );
        assert_eq!(
            value["spliceDescriptors"][0]["segmentationUpids"][0]["value"],
            "748724618"
        );
    }

    #[test]
    fn null_and_omitted_optionals_are_equivalent() {
        let explicit = r#"{
            "spliceCommand": {"type": 5, "spliceEventId": 1, "program": null, "breakDuration": null}
        }"#;
        let omitted = r#"{"spliceCommand": {"type": 5, "spliceEventId": 1}}"#;
        assert_eq!(
            from_json(explicit).unwrap(),
            from_json(omitted).unwrap()
        );
    }

    #[test]
    fn private_descriptor_round_trips_via_private_bytes() {
        let section = decode_base64(
            "/DBPAAAAAAAAAP/wBQb/Gq9LggA5AAVTQVBTCwIwQ1VFSf////9//wAAFI4PDxx1cm46bmJjdW5p\
             LmNvbTpicmM6NDk5ODY2NDM0MQoBbM98zw==",
        )
        .unwrap();
        let round_tripped = from_json(&to_json(&section).unwrap()).unwrap();
        assert_eq!(section, round_tripped);
        match &round_tripped.splice_descriptors[0] {
            SpliceDescriptor::Private(d) => {
                assert_eq!(d.identifier, 0x5341_5053);
                assert_eq!(d.private_bytes, vec![0x0B]);
            }
            other => panic!("expected private descriptor, got {other:?}"),
        }
    }
}
