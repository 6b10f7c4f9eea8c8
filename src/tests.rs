//! Conformance suite: the SCTE-35 sample signals, error-path cases and the
//! cross-format round-trip laws.

use crate::descriptors::{
    DeliveryRestrictions, DeviceRestrictions, SegmentationDescriptor, SpliceDescriptor,
};
use crate::parser::{decode, decode_base64, decode_hex};
use crate::serde::{from_json, to_json};
use crate::time::BreakDuration;
use crate::types::{
    EncryptedPacket, SapType, SpliceCommand, SpliceInfoSection, SpliceInsert, SpliceInsertProgram,
    TimeSignal,
};
use crate::upid::{SegmentationUpid, SegmentationUpidType};
use crate::xml::{from_xml, to_xml};
use crate::{crc, CueError};

/// SCTE-35 sample 14.1, time_signal with a Placement Opportunity Start.
const SAMPLE_14_1: &str =
    "/DA0AAAAAAAA///wBQb+cr0AUAAeAhxDVUVJSAAAjn/PAAGlmbAICAAAAAAsoKGKNAIAmsnRfg==";
/// SCTE-35 sample 14.2, splice_insert with an avail descriptor.
const SAMPLE_14_2: &str =
    "/DAvAAAAAAAA///wFAVIAACPf+/+c2nALv4AUsz1AAAAAAAKAAhDVUVJAAABNWLbowo=";
/// SCTE-35 sample 14.3, time_signal with a Placement Opportunity End.
const SAMPLE_14_3: &str =
    "/DAvAAAAAAAA///wBQb+dGKQoAAZAhdDVUVJSAAAjn+fCAgAAAAALKChijUCAKnMZ1g=";
/// SCTE-35 sample 14.4, time_signal carrying Program End then Program Start.
const SAMPLE_14_4: &str = "/DBIAAAAAAAA///wBQb+ek2ItgAyAhdDVUVJSAAAGH+fCAgAAAAALMvDRBEAAAIXQ1VF\
                           SUgAABl/nwgIAAAAACyk26AQAACZcuND";
/// splice_null heartbeat.
const HEARTBEAT: &str = "/DARAAAAAAAAAP/wAAAAAHpPv/8=";
/// A structurally valid section whose CRC trailer is wrong.
const BAD_CRC: &str =
    "/DA4AAAAAAAAAP/wFAUABDEAf+//mWEhzP4Azf5gAQAAAAATAhFDVUVJAAAAAX+/AQIwNAEAAKeYO3Q=";
/// Legacy signal declaring splice_command_length = 0xFFF.
const LEGACY_COMMAND_LENGTH: &str = "/DA8AAAAAAAAAP///wb+06ACpQAmAiRDVUVJAACcHX//AACky4AMEERJU0NZ\
                                     TVdGMDQ1MjAwMEgxAQEMm4c0";
/// Segmentation descriptor carrying a MID() with two EIDRs and one ADI.
const MULTIPLE_UPIDS: &str = "/DBrAAAAAAAAAP/wBQb/AAAAAABVAlNDVUVJAAAAAn+/DUQKDBR3i+Xj9gAAAAAAAAoM\
                              FHeL5eP2AAAAAAAACSZTSUdOQUw6THk5RU1HeEtSMGhGWlV0cE1IZENVVlpuUlVGblp6\
                              MTcBA6QTOe8=";
/// time_signal with a non-CUEI private descriptor ahead of a segmentation
/// descriptor.
const NON_CUEI_DESCRIPTOR: &str = "/DBPAAAAAAAAAP/wBQb/Gq9LggA5AAVTQVBTCwIwQ1VFSf////9//wAAFI4PDxx1\
                                   cm46bmJjdW5pLmNvbTpicmM6NDk5ODY2NDM0MQoBbM98zw==";
/// splice_insert with a DTMF descriptor.
const INSERT_WITH_DTMF: &str =
    "/DAxAAAAAAAAAP/wFAVAAIeuf+/+0AWRK/4AUmXAAC0AfwAMAQpDVUVJUJ81MTkqo5/+gA==";
/// Unencrypted signal padded with alignment stuffing.
const ALIGNMENT_STUFFING: &str = "/DAeAAAAAAAAAP///wViAA/nf18ACQAAAAAskJv+YPtE";
/// UPID values that are valid ASCII but not self-evident UTF-8.
const ASCII_UPIDS: &str = "/DDHAAAAABc0AP/wBQb/tVo+agCxAhdDVUVJQA4hwH+fCAgAAAAAPj6IcCMAAAIXQ1VF\
                           SUAOI1x/nwgIAAAAAD4+iHARAAACF0NVRUlADiHgf58ICAAAAAA+Poi2EAAAAhxDVUVJ\
                           QA4hyn/fAABSlKwICAAAAAA+Poi2IgAAAkZDVUVJQA4h1n/PAABSlKwNMgoMFHf5uXs0\
                           AAAAAAAADhh0eXBlPUxBJmR1cj02MDAwMCZ0aWVy/DDHAAAAAAAAAP/wBQb/dvhrwQ==";

/// Vectors that re-encode byte-for-byte: no legacy artifacts, and every
/// UPID value survives the textual representation losslessly.
const ROUND_TRIP_VECTORS: &[&str] = &[
    SAMPLE_14_1,
    SAMPLE_14_2,
    SAMPLE_14_3,
    SAMPLE_14_4,
    HEARTBEAT,
    MULTIPLE_UPIDS,
    NON_CUEI_DESCRIPTOR,
    INSERT_WITH_DTMF,
];

#[test]
fn seed_time_signal_placement_opportunity_end() {
    let section = decode_base64(SAMPLE_14_3).unwrap();

    let expected = SpliceInfoSection {
        encrypted_packet: EncryptedPacket {
            encryption_algorithm: 0,
            cw_index: 255,
        },
        splice_command: SpliceCommand::TimeSignal(TimeSignal::from_ticks(0x0_7462_90A0)),
        splice_descriptors: vec![SpliceDescriptor::Segmentation(SegmentationDescriptor {
            segmentation_event_id: 0x4800_008E,
            delivery_restrictions: Some(DeliveryRestrictions {
                web_delivery_allowed_flag: true,
                no_regional_blackout_flag: true,
                archive_allowed_flag: true,
                device_restrictions: DeviceRestrictions::None,
            }),
            segmentation_upids: vec![SegmentationUpid::new(SegmentationUpidType::TI, "748724618")],
            segmentation_type_id: 0x35,
            segment_num: 2,
            ..SegmentationDescriptor::default()
        })],
        crc_32: section.crc_32,
        ..SpliceInfoSection::default()
    };
    assert_eq!(section, expected);
    assert_eq!(section.base64(), SAMPLE_14_3);
}

#[test]
fn seed_splice_null_heartbeat() {
    let section = decode_base64(HEARTBEAT).unwrap();
    assert_eq!(section.splice_command, SpliceCommand::SpliceNull);
    assert_eq!(section.tier, 4095);
    assert_eq!(section.sap_type, SapType::NotSpecified);
    assert_eq!(section.base64(), HEARTBEAT);
}

#[test]
fn seed_invalid_crc_keeps_best_effort_value() {
    let err = decode_base64(BAD_CRC).unwrap_err();
    assert_eq!(err.kind(), CueError::Crc32Invalid);
    assert_eq!(err.structure(), "splice_info_section");

    let section = err.into_section().expect("populated section");
    match &section.splice_command {
        SpliceCommand::SpliceInsert(cmd) => {
            assert_eq!(cmd.splice_event_id, 0x0004_3100);
            assert!(cmd.out_of_network_indicator);
        }
        other => panic!("expected splice_insert, got {other:?}"),
    }
    assert_eq!(section.splice_descriptors.len(), 1);
}

#[test]
fn seed_invalid_base64() {
    let err = decode_base64("/DBaf%^").unwrap_err();
    assert_eq!(err.kind(), CueError::UnsupportedEncoding);
    assert!(err.section().is_none());
}

#[test]
fn seed_empty_input() {
    let err = decode_base64("").unwrap_err();
    assert_eq!(err.kind(), CueError::BufferOverflow);
    assert_eq!(err.structure(), "splice_info_section");
    assert_eq!(err.to_string(), "splice_info_section: buffer overflow");
}

#[test]
fn seed_legacy_command_length_reencodes_canonically() {
    let section = decode_base64(LEGACY_COMMAND_LENGTH).unwrap();
    match &section.splice_command {
        SpliceCommand::TimeSignal(ts) => {
            assert_eq!(ts.splice_time.pts_time, Some(3_550_479_013));
        }
        other => panic!("expected time_signal, got {other:?}"),
    }
    match &section.splice_descriptors[0] {
        SpliceDescriptor::Segmentation(sd) => {
            assert_eq!(sd.segmentation_event_id, 39_965);
            assert_eq!(sd.segmentation_duration, Some(10_800_000));
            let upid = &sd.segmentation_upids[0];
            assert_eq!(upid.upid_type, SegmentationUpidType::MPU);
            assert_eq!(upid.format_identifier, Some(1_145_656_131));
            assert_eq!(upid.value, "WU1XRjA0NTIwMDBI");
        }
        other => panic!("expected segmentation descriptor, got {other:?}"),
    }

    // The canonical re-encode repairs the legacy length marker, so the
    // output differs from the input but is itself a fixed point.
    let canonical = section.base64();
    assert_ne!(canonical, LEGACY_COMMAND_LENGTH);
    let reparsed = decode_base64(&canonical).unwrap();
    assert_eq!(reparsed.base64(), canonical);
    assert_eq!(reparsed.splice_descriptors, section.splice_descriptors);
}

#[test]
fn seed_mid_with_multiple_upids() {
    let section = decode_base64(MULTIPLE_UPIDS).unwrap();
    let SpliceDescriptor::Segmentation(sd) = &section.splice_descriptors[0] else {
        panic!("expected segmentation descriptor");
    };

    assert_eq!(sd.segmentation_upids.len(), 3);
    assert_eq!(
        sd.segmentation_upids[0],
        SegmentationUpid::new(
            SegmentationUpidType::EIDR,
            "10.5239/8BE5-E3F6-0000-0000-0000"
        )
    );
    assert_eq!(sd.segmentation_upids[1], sd.segmentation_upids[0]);
    assert_eq!(sd.segmentation_upids[2].upid_type, SegmentationUpidType::ADI);
    assert_eq!(sd.segment_num, 1);
    assert_eq!(sd.segments_expected, 3);

    assert_eq!(section.base64(), MULTIPLE_UPIDS);
}

#[test]
fn sample_14_1_structure() {
    let section = decode_base64(SAMPLE_14_1).unwrap();
    assert_eq!(section.encrypted_packet.cw_index, 255);
    assert_eq!(section.tier, 4095);

    let SpliceDescriptor::Segmentation(sd) = &section.splice_descriptors[0] else {
        panic!("expected segmentation descriptor");
    };
    assert_eq!(sd.segmentation_event_id, 0x4800_008E);
    assert_eq!(sd.segmentation_type_id, 0x34);
    assert_eq!(sd.segmentation_duration, Some(0x0001_A599_B0));
    assert_eq!(
        sd.delivery_restrictions,
        Some(DeliveryRestrictions {
            web_delivery_allowed_flag: false,
            no_regional_blackout_flag: true,
            archive_allowed_flag: true,
            device_restrictions: DeviceRestrictions::None,
        })
    );
    // No sub-segment pair on the wire for this sample.
    assert_eq!(sd.sub_segment_num, None);
    assert_eq!(sd.type_name(), "Provider Placement Opportunity Start");
}

#[test]
fn sample_14_2_structure() {
    let section = decode_base64(SAMPLE_14_2).unwrap();

    let expected_command = SpliceCommand::SpliceInsert(SpliceInsert {
        splice_event_id: 0x4800_008F,
        out_of_network_indicator: true,
        program: Some(SpliceInsertProgram::from_ticks(0x0_7369_C02E)),
        break_duration: Some(BreakDuration {
            auto_return: true,
            duration: 0x0005_2CCF5,
        }),
        ..SpliceInsert::default()
    });
    assert_eq!(section.splice_command, expected_command);

    match &section.splice_descriptors[0] {
        SpliceDescriptor::Avail(avail) => assert_eq!(avail.provider_avail_id, 0x0000_0135),
        other => panic!("expected avail descriptor, got {other:?}"),
    }
}

#[test]
fn sample_14_4_preserves_descriptor_order() {
    let section = decode_base64(SAMPLE_14_4).unwrap();
    let type_ids: Vec<u8> = section
        .splice_descriptors
        .iter()
        .map(|d| match d {
            SpliceDescriptor::Segmentation(sd) => sd.segmentation_type_id,
            other => panic!("unexpected descriptor {other:?}"),
        })
        .collect();
    // Program End is signaled before Program Start on the wire.
    assert_eq!(type_ids, vec![0x11, 0x10]);
}

#[test]
fn insert_with_dtmf_descriptor() {
    let section = decode_base64(INSERT_WITH_DTMF).unwrap();
    match &section.splice_descriptors[0] {
        SpliceDescriptor::Dtmf(dtmf) => {
            assert_eq!(dtmf.preroll, 80);
            assert_eq!(dtmf.chars, "519*");
        }
        other => panic!("expected DTMF descriptor, got {other:?}"),
    }
    match &section.splice_command {
        SpliceCommand::SpliceInsert(cmd) => {
            assert_eq!(cmd.unique_program_id, 45);
            assert_eq!(cmd.avails_expected, 127);
            assert_eq!(
                cmd.break_duration,
                Some(BreakDuration {
                    auto_return: true,
                    duration: 5_400_000,
                })
            );
        }
        other => panic!("expected splice_insert, got {other:?}"),
    }
}

#[test]
fn non_cuei_identifier_becomes_private_descriptor() {
    let section = decode_base64(NON_CUEI_DESCRIPTOR).unwrap();
    assert_eq!(section.splice_descriptors.len(), 2);

    match &section.splice_descriptors[0] {
        SpliceDescriptor::Private(private) => {
            assert_eq!(private.tag, 0x00);
            assert_eq!(private.identifier, 0x5341_5053); // "SAPS"
            assert_eq!(private.private_bytes, vec![0x0B]);
        }
        other => panic!("expected private descriptor, got {other:?}"),
    }
    match &section.splice_descriptors[1] {
        SpliceDescriptor::Segmentation(sd) => {
            assert_eq!(sd.segmentation_event_id, u32::MAX);
            assert_eq!(
                sd.segmentation_upids[0],
                SegmentationUpid::new(SegmentationUpidType::URI, "urn:nbcuni.com:brc:499866434")
            );
        }
        other => panic!("expected segmentation descriptor, got {other:?}"),
    }
}

#[test]
fn upid_values_are_valid_utf8() {
    let section = decode_base64(ASCII_UPIDS).unwrap();
    let mut upids = 0;
    for descriptor in &section.splice_descriptors {
        if let SpliceDescriptor::Segmentation(sd) = descriptor {
            for upid in &sd.segmentation_upids {
                assert!(std::str::from_utf8(upid.value.as_bytes()).is_ok());
                upids += 1;
            }
        }
    }
    assert!(upids >= 5);
}

#[test]
fn alignment_stuffing_is_preserved_but_not_reencoded() {
    let section = decode_base64(ALIGNMENT_STUFFING).unwrap();
    assert!(!section.alignment_stuffing.is_empty());
    match &section.splice_command {
        SpliceCommand::SpliceInsert(cmd) => {
            assert_eq!(cmd.splice_event_id, 1_644_171_239);
            assert!(cmd.splice_immediate_flag);
            assert_eq!(cmd.unique_program_id, 9);
            assert_eq!(cmd.program, Some(SpliceInsertProgram::default()));
        }
        other => panic!("expected splice_insert, got {other:?}"),
    }

    // Canonical re-encode drops the stuffing: shorter output, valid CRC,
    // and a fixed point of decode/encode.
    let canonical = section.encode();
    assert!(canonical.len() < ALIGNMENT_STUFFING.len() * 3 / 4);
    assert!(crc::validate_section(&canonical));
    let reparsed = decode(&canonical).unwrap();
    assert!(reparsed.alignment_stuffing.is_empty());
    assert_eq!(reparsed.encode(), canonical);
}

#[test]
fn binary_round_trip_is_byte_exact() {
    for vector in ROUND_TRIP_VECTORS {
        let section = decode_base64(vector).unwrap();
        assert_eq!(&section.base64(), vector, "round-trip of {vector}");
    }
}

#[test]
fn encode_always_emits_a_valid_crc() {
    for vector in ROUND_TRIP_VECTORS {
        let section = decode_base64(vector).unwrap();
        assert!(crc::validate_section(&section.encode()));
    }
}

#[test]
fn hex_round_trip_matches_base64_decoding() {
    let from_hex = decode_hex(
        "0xFC3034000000000000FFFFF00506FE72BD0050001E021C435545494800008E7FCF0001A599B008\
         08000000002CA0A18A3402009AC9D17E",
    )
    .unwrap();
    let from_b64 = decode_base64(SAMPLE_14_1).unwrap();
    assert_eq!(from_hex, from_b64);
    assert_eq!(
        from_hex.hex(),
        "0xFC3034000000000000FFFFF00506FE72BD0050001E021C435545494800008E7FCF0001A599B008\
         08000000002CA0A18A3402009AC9D17E"
    );
}

#[test]
fn xml_round_trip_is_structurally_equal() {
    for vector in ROUND_TRIP_VECTORS {
        let section = decode_base64(vector).unwrap();
        let document = to_xml(&section).unwrap();
        let reparsed = from_xml(&document).unwrap();
        assert_eq!(section, reparsed, "XML round-trip of {vector}");
    }
}

#[test]
fn json_round_trip_is_structurally_equal() {
    for vector in ROUND_TRIP_VECTORS {
        let section = decode_base64(vector).unwrap();
        let document = to_json(&section).unwrap();
        let reparsed = from_json(&document).unwrap();
        assert_eq!(section, reparsed, "JSON round-trip of {vector}");
    }
}

#[test]
fn cross_format_round_trip_reproduces_the_wire_bytes() {
    for vector in ROUND_TRIP_VECTORS {
        let section = decode_base64(vector).unwrap();

        let via_xml = from_xml(&to_xml(&section).unwrap()).unwrap();
        assert_eq!(&via_xml.base64(), vector, "via XML for {vector}");

        let via_json = from_json(&to_json(&section).unwrap()).unwrap();
        assert_eq!(&via_json.base64(), vector, "via JSON for {vector}");
    }
}

#[test]
fn xml_sap_type_defaults_to_not_specified() {
    let document = r#"
        <SpliceInfoSection xmlns="http://www.scte.org/schemas/35" tier="4095">
            <EncryptedPacket xmlns="http://www.scte.org/schemas/35" cwIndex="255"></EncryptedPacket>
            <TimeSignal xmlns="http://www.scte.org/schemas/35">
                <SpliceTime xmlns="http://www.scte.org/schemas/35" ptsTime="1924989008"></SpliceTime>
            </TimeSignal>
            <SegmentationDescriptor xmlns="http://www.scte.org/schemas/35" segmentationEventId="1207959694" segmentationDuration="27630000" segmentationTypeId="52" segmentNum="2">
                <DeliveryRestrictions xmlns="http://www.scte.org/schemas/35" archiveAllowedFlag="true" webDeliveryAllowedFlag="false" noRegionalBlackoutFlag="true" deviceRestrictions="3"></DeliveryRestrictions>
                <SegmentationUpid xmlns="http://www.scte.org/schemas/35" segmentationUpidType="8">748724618</SegmentationUpid>
            </SegmentationDescriptor>
        </SpliceInfoSection>"#;

    let section = from_xml(document).unwrap();
    assert_eq!(section.sap_type, SapType::NotSpecified);
    assert_eq!(section.tier, 4095);
    assert_eq!(section.encrypted_packet.cw_index, 255);
    match &section.splice_command {
        SpliceCommand::TimeSignal(ts) => {
            assert_eq!(ts.splice_time.pts_time, Some(1_924_989_008));
        }
        other => panic!("expected time_signal, got {other:?}"),
    }
    let SpliceDescriptor::Segmentation(sd) = &section.splice_descriptors[0] else {
        panic!("expected segmentation descriptor");
    };
    assert_eq!(sd.segmentation_type_id, 52);
    assert_eq!(sd.segmentation_duration, Some(27_630_000));
    assert_eq!(
        sd.segmentation_upids[0],
        SegmentationUpid::new(SegmentationUpidType::TI, "748724618")
    );
}

#[test]
fn xml_descriptors_unmarshal_in_document_order() {
    let section = decode_base64(NON_CUEI_DESCRIPTOR).unwrap();
    let document = to_xml(&section).unwrap();

    // The private descriptor precedes the segmentation descriptor in the
    // document, and the parsed list follows the document.
    let private_at = document.find("<PrivateDescriptor").unwrap();
    let segmentation_at = document.find("<SegmentationDescriptor").unwrap();
    assert!(private_at < segmentation_at);

    let reparsed = from_xml(&document).unwrap();
    assert!(matches!(
        reparsed.splice_descriptors[0],
        SpliceDescriptor::Private(_)
    ));
    assert!(matches!(
        reparsed.splice_descriptors[1],
        SpliceDescriptor::Segmentation(_)
    ));
    assert_eq!(reparsed.base64(), NON_CUEI_DESCRIPTOR);
}

#[test]
fn spec_transcription_of_the_mid_sample_reports_its_corrupt_crc() {
    // The MID sample circulates with a one-character corruption in the ADI
    // payload; the structure still parses and the CRC fault carries it.
    let corrupted = "/DBrAAAAAAAAAP/wBQb/AAAAAABVAlNDVUVJAAAAAn+/DUQKDBR3i+Xj9gAAAAAAAAoMFHeL\
                     5eP2AAAAAAAACSZTSUdOQUw6THk5RU1HeEtSMGhGWlV0cE1IZENVVlpnUlVGblp6MTcBA6QT\
                     Oe8=";
    let err = decode_base64(corrupted).unwrap_err();
    assert_eq!(err.kind(), CueError::Crc32Invalid);

    let section = err.into_section().expect("populated section");
    let SpliceDescriptor::Segmentation(sd) = &section.splice_descriptors[0] else {
        panic!("expected segmentation descriptor");
    };
    assert_eq!(sd.segmentation_upids.len(), 3);
    assert_eq!(
        sd.segmentation_upids[0].value,
        "10.5239/8BE5-E3F6-0000-0000-0000"
    );
}

#[test]
fn garbage_input_fails_inside_the_command() {
    // Random bytes that happen to declare a splice_insert whose component
    // loop runs past the end of the buffer.
    let err = decode_base64(
        "FkC1lwP3uTQD0VvxHwVBEH89G6B7VjzaZ9eNuyUF9q8pYAIXsRM9ZpDCczBeDbytQhXkssQstGJVGcvjZ3ti\
         IMULiA4BpRHlzLGFa0q6aVMtzk8ZRUeLcxtKibgVOKBBnkCbOQyhSflFiDkrAAIp+Fk+VRsByTSkPN3RvyK+\
         lWcjHElhwa9hNFcAy4dm3DdeRXnrD3I2mISNc7DkgS0ReotPyp94FV77xMHT4D7SYL48XU20UM4bgg==",
    )
    .unwrap_err();
    assert_eq!(err.kind(), CueError::BufferOverflow);
    assert_eq!(err.structure(), "splice_insert");
    assert!(err.section().is_some());
}

#[test]
fn reserved_command_types_are_rejected() {
    // Take the heartbeat and rewrite its command type to a reserved value.
    let mut bytes = decode_base64(HEARTBEAT).unwrap().encode();
    bytes[13] = 0x02;
    let crc = crc::checksum(&bytes[..bytes.len() - 4]);
    let len = bytes.len();
    bytes[len - 4..].copy_from_slice(&crc.to_be_bytes());

    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), CueError::UnsupportedEncoding);
    assert_eq!(err.structure(), "splice_command");
}

#[test]
fn trailing_bytes_are_an_underflow() {
    let mut bytes = decode_base64(HEARTBEAT).unwrap().encode();
    bytes.push(0x00);
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), CueError::BufferUnderflow);
    assert_eq!(err.structure(), "splice_info_section");
}

#[test]
fn constructed_sections_encode_like_the_samples() {
    // Rebuild sample 14.2 from scratch and compare against the known bytes.
    let mut section = SpliceInfoSection::new(SpliceCommand::SpliceInsert(SpliceInsert {
        splice_event_id: 0x4800_008F,
        out_of_network_indicator: true,
        program: Some(SpliceInsertProgram::from_ticks(0x0_7369_C02E)),
        break_duration: Some(BreakDuration {
            auto_return: true,
            duration: 0x0005_2CCF5,
        }),
        ..SpliceInsert::default()
    }));
    section.encrypted_packet.cw_index = 255;
    section
        .splice_descriptors
        .push(SpliceDescriptor::Avail(crate::descriptors::AvailDescriptor {
            provider_avail_id: 0x0000_0135,
        }));

    assert_eq!(section.base64(), SAMPLE_14_2);
}
