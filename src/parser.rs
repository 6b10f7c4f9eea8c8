//! Binary decoding of splice_info_section payloads.
//!
//! The decoder is built around a latching [`BitReader`]: field sequences run
//! unconditionally and the reader is checked once per structure, so every
//! fault still yields a best-effort populated [`SpliceInfoSection`] on the
//! returned [`DecodeError`]. A CRC mismatch is reported the same way, with
//! the fully decoded section attached.

use crate::bits::BitReader;
use crate::crc;
use crate::descriptors::{
    tag, AudioChannel, AudioDescriptor, AvailDescriptor, DeliveryRestrictions, DeviceRestrictions,
    DtmfDescriptor, PrivateDescriptor, SegmentationDescriptor, SegmentationDescriptorComponent,
    SpliceDescriptor, TimeDescriptor,
};
use crate::error::{CueError, DecodeError};
use crate::time::{BreakDuration, SpliceTime};
use crate::types::{
    PrivateCommand, SapType, SpliceCommand, SpliceInfoSection, SpliceInsert, SpliceInsertComponent,
    SpliceInsertProgram, SpliceSchedule, SpliceScheduleEvent, SpliceScheduleEventComponent,
    SpliceScheduleEventProgram, TimeSignal, CUE_IDENTIFIER,
};
use crate::upid::{decode_ascii, SegmentationUpid, SegmentationUpidType};
use data_encoding::{BASE64, HEXLOWER_PERMISSIVE};

/// Legacy `splice_command_length` marker: the actual length must be inferred
/// from the command parser's consumption.
const LEGACY_COMMAND_LENGTH: usize = 0xFFF;

/// Decodes a base64-encoded splice_info_section.
pub fn decode_base64(payload: &str) -> Result<SpliceInfoSection, DecodeError> {
    let buffer = BASE64
        .decode(payload.trim().as_bytes())
        .map_err(|_| DecodeError::new(CueError::UnsupportedEncoding, ""))?;
    decode(&buffer)
}

/// Decodes a hex-encoded splice_info_section; the `0x` prefix is optional
/// and either case is accepted.
pub fn decode_hex(payload: &str) -> Result<SpliceInfoSection, DecodeError> {
    let trimmed = payload.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let buffer = HEXLOWER_PERMISSIVE
        .decode(digits.as_bytes())
        .map_err(|_| DecodeError::new(CueError::UnsupportedEncoding, ""))?;
    decode(&buffer)
}

/// Decodes a raw splice_info_section byte buffer.
pub fn decode(buffer: &[u8]) -> Result<SpliceInfoSection, DecodeError> {
    let mut r = BitReader::new(buffer);
    let mut section = SpliceInfoSection::default();

    r.skip(8); // table_id
    r.skip(1); // section_syntax_indicator
    r.skip(1); // private_indicator
    section.sap_type = SapType::from(r.read_bits(2) as u8);
    let section_length = r.read_bits(12) as usize;
    section.protocol_version = r.read_bits(8) as u8;
    let encrypted_flag = r.read_bit();
    section.encrypted_packet.encryption_algorithm = r.read_bits(6) as u8;
    section.pts_adjustment = r.read_bits(33);
    section.encrypted_packet.cw_index = r.read_bits(8) as u8;
    section.tier = r.read_bits(12) as u16;
    let splice_command_length = r.read_bits(12) as usize;
    let splice_command_type = r.read_bits(8) as u8;
    if r.overflowed() {
        return Err(DecodeError::with_section(
            CueError::BufferOverflow,
            "splice_info_section",
            section,
        ));
    }

    if encrypted_flag && section.encrypted_packet.encryption_algorithm == 0 {
        log::warn!("encrypted_packet flag set with encryption_algorithm 0; treated as clear");
    }
    if !encrypted_flag && section.encrypted_packet.encryption_algorithm != 0 {
        log::warn!(
            "encryption_algorithm {} on an unencrypted section; cleared",
            section.encrypted_packet.encryption_algorithm
        );
        section.encrypted_packet.encryption_algorithm = 0;
    }

    let command_start = r.position();
    section.splice_command = match splice_command_type {
        0x00 => SpliceCommand::SpliceNull,
        0x04 => SpliceCommand::SpliceSchedule(decode_splice_schedule(&mut r)),
        0x05 => SpliceCommand::SpliceInsert(decode_splice_insert(&mut r)),
        0x06 => SpliceCommand::TimeSignal(TimeSignal {
            splice_time: decode_splice_time(&mut r),
        }),
        0x07 => SpliceCommand::BandwidthReservation,
        0xFF => match decode_private_command(&mut r, splice_command_length) {
            Some(cmd) => SpliceCommand::Private(cmd),
            None => {
                return Err(DecodeError::with_section(
                    CueError::BufferOverflow,
                    "private_command",
                    section,
                ))
            }
        },
        _ => {
            return Err(DecodeError::with_section(
                CueError::UnsupportedEncoding,
                "splice_command",
                section,
            ))
        }
    };
    if r.overflowed() {
        let structure = section.splice_command.name();
        return Err(DecodeError::with_section(
            CueError::BufferOverflow,
            structure,
            section,
        ));
    }

    let consumed = r.position() - command_start;
    if splice_command_length != LEGACY_COMMAND_LENGTH {
        let declared = splice_command_length * 8;
        if consumed < declared {
            log::warn!(
                "splice command consumed {consumed} bits of {declared} declared; skipping remainder"
            );
            r.skip(declared - consumed);
        } else if consumed > declared {
            log::warn!("splice command consumed {consumed} bits of {declared} declared");
        }
    }

    let descriptor_loop_length = r.read_bits(16) as usize;
    let loop_end = r.position() + descriptor_loop_length * 8;
    while r.position() < loop_end && !r.overflowed() {
        let descriptor_tag = r.read_bits(8) as u8;
        let descriptor_length = r.read_bits(8) as usize;
        let payload = r.read_bytes(descriptor_length);
        if r.overflowed() {
            return Err(DecodeError::with_section(
                CueError::BufferOverflow,
                "splice_descriptor",
                section,
            ));
        }
        match decode_splice_descriptor(descriptor_tag, &payload) {
            Ok(descriptor) => section.splice_descriptors.push(descriptor),
            Err(fault) => {
                return Err(DecodeError::with_section(
                    fault.kind,
                    fault.structure,
                    section,
                ))
            }
        }
    }
    if r.position() > loop_end {
        log::warn!(
            "descriptor loop consumed {} bits of {} declared",
            r.position() - (loop_end - descriptor_loop_length * 8),
            descriptor_loop_length * 8
        );
    }

    // Anything between the descriptor loop and the CRC trailer is alignment
    // stuffing. section_length counts bytes after its own field, so the
    // section ends 3 header bytes plus section_length into the buffer.
    let crc_bits = if encrypted_flag { 64 } else { 32 };
    let section_end = 3 * 8 + section_length * 8;
    if section_end <= buffer.len() * 8 {
        let content_end = section_end.saturating_sub(crc_bits);
        if r.position() < content_end {
            section.alignment_stuffing = r.read_bytes((content_end - r.position()) / 8);
        }
    }

    if encrypted_flag {
        section.ecrc_32 = Some(r.read_bits(32) as u32);
    }
    section.crc_32 = r.read_bits(32) as u32;
    if r.overflowed() {
        return Err(DecodeError::with_section(
            CueError::BufferOverflow,
            "splice_info_section",
            section,
        ));
    }
    if r.bits_left() > 0 {
        return Err(DecodeError::with_section(
            CueError::BufferUnderflow,
            "splice_info_section",
            section,
        ));
    }

    if !crc::validate_section(buffer) {
        return Err(DecodeError::with_section(
            CueError::Crc32Invalid,
            "splice_info_section",
            section,
        ));
    }

    Ok(section)
}

/// splice_time(): marker bit, reserved bits, optional 33-bit PTS.
fn decode_splice_time(r: &mut BitReader) -> SpliceTime {
    if r.read_bit() {
        r.skip(6); // reserved
        SpliceTime {
            pts_time: Some(r.read_bits(33)),
        }
    } else {
        r.skip(7); // reserved
        SpliceTime { pts_time: None }
    }
}

/// break_duration(): auto_return, reserved, 33-bit duration.
fn decode_break_duration(r: &mut BitReader) -> BreakDuration {
    let auto_return = r.read_bit();
    r.skip(6); // reserved
    BreakDuration {
        auto_return,
        duration: r.read_bits(33),
    }
}

fn decode_splice_insert(r: &mut BitReader) -> SpliceInsert {
    let mut cmd = SpliceInsert {
        splice_event_id: r.read_bits(32) as u32,
        splice_event_cancel_indicator: r.read_bit(),
        ..SpliceInsert::default()
    };
    r.skip(7); // reserved
    if cmd.splice_event_cancel_indicator {
        return cmd;
    }

    cmd.out_of_network_indicator = r.read_bit();
    let program_splice_flag = r.read_bit();
    let duration_flag = r.read_bit();
    cmd.splice_immediate_flag = r.read_bit();
    r.skip(4); // reserved

    if program_splice_flag {
        let mut program = SpliceInsertProgram::default();
        if !cmd.splice_immediate_flag {
            program.splice_time = decode_splice_time(r);
        }
        cmd.program = Some(program);
    } else {
        let component_count = r.read_bits(8) as usize;
        for _ in 0..component_count {
            if r.overflowed() {
                break;
            }
            let component_tag = r.read_bits(8) as u8;
            let splice_time = if cmd.splice_immediate_flag {
                None
            } else {
                Some(decode_splice_time(r))
            };
            cmd.components.push(SpliceInsertComponent {
                component_tag,
                splice_time,
            });
        }
    }

    if duration_flag {
        cmd.break_duration = Some(decode_break_duration(r));
    }
    cmd.unique_program_id = r.read_bits(16) as u16;
    cmd.avail_num = r.read_bits(8) as u8;
    cmd.avails_expected = r.read_bits(8) as u8;
    cmd
}

fn decode_splice_schedule(r: &mut BitReader) -> SpliceSchedule {
    let mut schedule = SpliceSchedule::default();
    let splice_count = r.read_bits(8) as usize;
    for _ in 0..splice_count {
        if r.overflowed() {
            break;
        }
        let mut event = SpliceScheduleEvent {
            splice_event_id: r.read_bits(32) as u32,
            splice_event_cancel_indicator: r.read_bit(),
            ..SpliceScheduleEvent::default()
        };
        r.skip(7); // reserved
        if !event.splice_event_cancel_indicator {
            event.out_of_network_indicator = r.read_bit();
            let program_splice_flag = r.read_bit();
            let duration_flag = r.read_bit();
            r.skip(5); // reserved
            if program_splice_flag {
                event.program = Some(SpliceScheduleEventProgram {
                    utc_splice_time: r.read_bits(32) as u32,
                });
            } else {
                let component_count = r.read_bits(8) as usize;
                for _ in 0..component_count {
                    if r.overflowed() {
                        break;
                    }
                    event.components.push(SpliceScheduleEventComponent {
                        component_tag: r.read_bits(8) as u8,
                        utc_splice_time: r.read_bits(32) as u32,
                    });
                }
            }
            if duration_flag {
                event.break_duration = Some(decode_break_duration(r));
            }
            event.unique_program_id = r.read_bits(16) as u16;
            event.avail_num = r.read_bits(8) as u8;
            event.avails_expected = r.read_bits(8) as u8;
        }
        schedule.events.push(event);
    }
    schedule
}

/// private_command() is not self-delimiting, so the declared command length
/// is required; a legacy 0xFFF length cannot be repaired here.
fn decode_private_command(r: &mut BitReader, declared_length: usize) -> Option<PrivateCommand> {
    if declared_length == LEGACY_COMMAND_LENGTH || declared_length < 4 {
        return None;
    }
    Some(PrivateCommand {
        identifier: r.read_bits(32) as u32,
        private_bytes: r.read_bytes(declared_length - 4),
    })
}

pub(crate) struct Fault {
    pub kind: CueError,
    pub structure: &'static str,
}

/// Decodes one descriptor from its payload (the bytes after tag and length).
/// CUEI descriptors with a known tag get the typed treatment; everything
/// else is preserved as a private descriptor.
fn decode_splice_descriptor(
    descriptor_tag: u8,
    payload: &[u8],
) -> Result<SpliceDescriptor, Fault> {
    let mut r = BitReader::new(payload);
    let identifier = r.read_bits(32) as u32;
    if r.overflowed() {
        return Err(Fault {
            kind: CueError::BufferOverflow,
            structure: "splice_descriptor",
        });
    }
    if identifier != CUE_IDENTIFIER {
        return Ok(SpliceDescriptor::Private(PrivateDescriptor {
            tag: descriptor_tag,
            identifier,
            private_bytes: payload[4..].to_vec(),
        }));
    }

    let (descriptor, structure) = match descriptor_tag {
        tag::AVAIL => (
            SpliceDescriptor::Avail(AvailDescriptor {
                provider_avail_id: r.read_bits(32) as u32,
            }),
            "avail_descriptor",
        ),
        tag::DTMF => {
            let preroll = r.read_bits(8) as u8;
            let dtmf_count = r.read_bits(3) as usize;
            r.skip(5); // reserved
            let chars = decode_ascii(&r.read_bytes(dtmf_count));
            (
                SpliceDescriptor::Dtmf(DtmfDescriptor { preroll, chars }),
                "dtmf_descriptor",
            )
        }
        tag::SEGMENTATION => (
            SpliceDescriptor::Segmentation(decode_segmentation_descriptor(&mut r)),
            "segmentation_descriptor",
        ),
        tag::TIME => (
            SpliceDescriptor::Time(TimeDescriptor {
                tai_seconds: r.read_bits(48),
                tai_ns: r.read_bits(32) as u32,
                utc_offset: r.read_bits(16) as u16,
            }),
            "time_descriptor",
        ),
        tag::AUDIO => {
            let audio_count = r.read_bits(4) as usize;
            r.skip(4); // reserved
            let mut audio_channels = Vec::with_capacity(audio_count);
            for _ in 0..audio_count {
                if r.overflowed() {
                    break;
                }
                audio_channels.push(AudioChannel {
                    component_tag: r.read_bits(8) as u8,
                    iso_code: decode_ascii(&r.read_bytes(3)),
                    bit_stream_mode: r.read_bits(3) as u8,
                    num_channels: r.read_bits(4) as u8,
                    full_srvc_audio: r.read_bit(),
                });
            }
            (
                SpliceDescriptor::Audio(AudioDescriptor { audio_channels }),
                "audio_descriptor",
            )
        }
        _ => {
            return Ok(SpliceDescriptor::Private(PrivateDescriptor {
                tag: descriptor_tag,
                identifier,
                private_bytes: payload[4..].to_vec(),
            }))
        }
    };

    if r.overflowed() {
        return Err(Fault {
            kind: CueError::BufferOverflow,
            structure,
        });
    }
    if r.bits_left() > 0 {
        return Err(Fault {
            kind: CueError::BufferUnderflow,
            structure,
        });
    }
    Ok(descriptor)
}

fn decode_segmentation_descriptor(r: &mut BitReader) -> SegmentationDescriptor {
    let mut sd = SegmentationDescriptor {
        segmentation_event_id: r.read_bits(32) as u32,
        segmentation_event_cancel_indicator: r.read_bit(),
        ..SegmentationDescriptor::default()
    };
    r.skip(7); // reserved
    if sd.segmentation_event_cancel_indicator {
        return sd;
    }

    let program_segmentation_flag = r.read_bit();
    let segmentation_duration_flag = r.read_bit();
    let delivery_not_restricted_flag = r.read_bit();
    if !delivery_not_restricted_flag {
        sd.delivery_restrictions = Some(DeliveryRestrictions {
            web_delivery_allowed_flag: r.read_bit(),
            no_regional_blackout_flag: r.read_bit(),
            archive_allowed_flag: r.read_bit(),
            device_restrictions: DeviceRestrictions::from(r.read_bits(2) as u8),
        });
    } else {
        r.skip(5); // reserved
    }

    if !program_segmentation_flag {
        let component_count = r.read_bits(8) as usize;
        for _ in 0..component_count {
            if r.overflowed() {
                break;
            }
            let component_tag = r.read_bits(8) as u8;
            r.skip(7); // reserved
            sd.components.push(SegmentationDescriptorComponent {
                component_tag,
                pts_offset: r.read_bits(33),
            });
        }
    }

    if segmentation_duration_flag {
        sd.segmentation_duration = Some(r.read_bits(40));
    }

    let upid_type = SegmentationUpidType::from(r.read_bits(8) as u8);
    let upid_length = r.read_bits(8) as usize;
    let upid_value = r.read_bytes(upid_length);
    if !r.overflowed() && upid_length > 0 {
        if upid_type == SegmentationUpidType::MID {
            decode_mid_upids(&mut sd.segmentation_upids, &upid_value);
        } else {
            sd.segmentation_upids
                .push(SegmentationUpid::decode(upid_type, &upid_value));
        }
    }

    sd.segmentation_type_id = r.read_bits(8) as u8;
    sd.segment_num = r.read_bits(8) as u8;
    sd.segments_expected = r.read_bits(8) as u8;

    // The sub-segment pair was added to the placement-opportunity start
    // types in 2016; whether a sender includes it is only observable from
    // the residual descriptor length.
    if (sd.segmentation_type_id == 0x34 || sd.segmentation_type_id == 0x36)
        && r.bits_left() == 16
    {
        sd.sub_segment_num = Some(r.read_bits(8) as u8);
        sd.sub_segments_expected = Some(r.read_bits(8) as u8);
    }

    sd
}

/// Walks the (type, length, value) triples inside a MID() container.
fn decode_mid_upids(upids: &mut Vec<SegmentationUpid>, buf: &[u8]) {
    let mut r = BitReader::new(buf);
    while r.bits_left() > 0 {
        let upid_type = SegmentationUpidType::from(r.read_bits(8) as u8);
        let upid_length = r.read_bits(8) as usize;
        let value = r.read_bytes(upid_length);
        if r.overflowed() {
            log::warn!("truncated UPID inside MID; remainder dropped");
            break;
        }
        if upid_type == SegmentationUpidType::MID {
            // The standard allows only one level of MID aggregation.
            log::warn!("nested MID UPID is not allowed; value kept as opaque text");
            upids.push(SegmentationUpid::new(upid_type, decode_ascii(&value)));
        } else {
            upids.push(SegmentationUpid::decode(upid_type, &value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_overflows_the_section() {
        let err = decode(&[]).unwrap_err();
        assert_eq!(err.kind(), CueError::BufferOverflow);
        assert_eq!(err.structure(), "splice_info_section");
    }

    #[test]
    fn invalid_base64_is_unsupported_encoding() {
        let err = decode_base64("/DBaf%^").unwrap_err();
        assert_eq!(err.kind(), CueError::UnsupportedEncoding);
        assert!(err.section().is_none());
    }

    #[test]
    fn invalid_hex_is_unsupported_encoding() {
        let err = decode_hex("0xfc301").unwrap_err();
        assert_eq!(err.kind(), CueError::UnsupportedEncoding);
    }

    #[test]
    fn hex_accepts_prefix_and_either_case() {
        let upper = decode_hex(
            "0xFC302F000000000000FFFFF00506FE746290A0001902174355454948000\
             08E7F9F0808000000002CA0A18A350200A9CC6758",
        )
        .unwrap();
        let lower = decode_hex(
            "fc302f000000000000fffff00506fe746290a0001902174355454948000\
             08e7f9f0808000000002ca0a18a350200a9cc6758",
        )
        .unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.tier, 0xFFF);
    }
}
