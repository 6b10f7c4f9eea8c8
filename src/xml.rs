//! XML mapping for the structured model.
//!
//! The document form follows the SCTE-35 XSD with the
//! `http://www.scte.org/schemas/35` namespace and `SpliceInfoSection` as the
//! root element. Marshalling walks the structured value; unmarshalling is a
//! single pass over the document events, so descriptors land in the ordered
//! list exactly as they appear, whatever order the producer chose.

use crate::descriptors::{
    AudioChannel, AudioDescriptor, AvailDescriptor, DeliveryRestrictions, DeviceRestrictions,
    DtmfDescriptor, PrivateDescriptor, SegmentationDescriptor, SegmentationDescriptorComponent,
    SpliceDescriptor, TimeDescriptor,
};
use crate::time::{BreakDuration, SpliceTime};
use crate::types::{
    PrivateCommand, SapType, SpliceCommand, SpliceInfoSection, SpliceInsert, SpliceInsertComponent,
    SpliceInsertProgram, SpliceSchedule, SpliceScheduleEvent, SpliceScheduleEventComponent,
    SpliceScheduleEventProgram, TimeSignal,
};
use crate::upid::{SegmentationUpid, SegmentationUpidType};
use data_encoding::BASE64;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// The XML namespace of the SCTE-35 schema.
pub const NAMESPACE: &str = "http://www.scte.org/schemas/35";

/// Faults raised while reading or writing XML documents.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The document is not well-formed XML.
    #[error("malformed XML: {0}")]
    Malformed(String),
    /// The document is well-formed but not a valid splice info section.
    #[error("{0}")]
    Invalid(String),
}

type XmlReader<'a> = Reader<&'a [u8]>;

/// Serializes a section as an XML document.
pub fn to_xml(section: &SpliceInfoSection) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    write_section(&mut writer, section)?;
    String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Invalid(err.to_string()))
}

/// Parses an XML document into a section and recomputes its CRC so the
/// result compares equal to a binary decode of the same signal.
pub fn from_xml(document: &str) -> Result<SpliceInfoSection, XmlError> {
    let mut reader = Reader::from_reader(document.as_bytes());
    loop {
        match next_event(&mut reader)? {
            Event::Start(e) if local_name(&e) == "SpliceInfoSection" => {
                let mut section = parse_section(&mut reader, &e, false)?;
                section.refresh_crc();
                return Ok(section);
            }
            Event::Empty(e) if local_name(&e) == "SpliceInfoSection" => {
                let mut section = parse_section(&mut reader, &e, true)?;
                section.refresh_crc();
                return Ok(section);
            }
            Event::Eof => {
                return Err(XmlError::Invalid(
                    "missing SpliceInfoSection root element".into(),
                ))
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Unmarshalling
// ---------------------------------------------------------------------------

fn next_event<'a>(reader: &mut XmlReader<'a>) -> Result<Event<'a>, XmlError> {
    reader
        .read_event()
        .map_err(|err| XmlError::Malformed(err.to_string()))
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Consumes the subtree of the `Start` event that was just read.
fn skip_subtree(reader: &mut XmlReader) -> Result<(), XmlError> {
    let mut depth = 1usize;
    while depth > 0 {
        match next_event(reader)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(())
}

/// Collects the character data of the element whose `Start` event was just
/// read, consuming through its `End`.
fn read_element_text(reader: &mut XmlReader) -> Result<String, XmlError> {
    let mut text = String::new();
    let mut depth = 1usize;
    while depth > 0 {
        match next_event(reader)? {
            Event::Text(t) if depth == 1 => {
                let chunk = t
                    .unescape()
                    .map_err(|err| XmlError::Malformed(err.to_string()))?;
                text.push_str(&chunk);
            }
            Event::Start(_) => depth += 1,
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(text)
}

fn attrs_map(e: &BytesStart) -> Result<HashMap<String, String>, XmlError> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmlError::Malformed(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Malformed(err.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn attr_parse<T: FromStr>(
    attrs: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, XmlError> {
    match attrs.get(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| XmlError::Invalid(format!("invalid value for {name}: {raw}"))),
    }
}

fn attr_bool(attrs: &HashMap<String, String>, name: &str) -> Result<Option<bool>, XmlError> {
    match attrs.get(name).map(|raw| raw.trim()) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(XmlError::Invalid(format!(
            "invalid value for {name}: {other}"
        ))),
    }
}

fn parse_section(
    reader: &mut XmlReader,
    start: &BytesStart,
    is_empty: bool,
) -> Result<SpliceInfoSection, XmlError> {
    let attrs = attrs_map(start)?;
    let mut section = SpliceInfoSection {
        // sapType defaults to "not specified" when the attribute is absent.
        sap_type: SapType::from(attr_parse::<u8>(&attrs, "sapType")?.unwrap_or(3)),
        pts_adjustment: attr_parse(&attrs, "ptsAdjustment")?.unwrap_or(0),
        protocol_version: attr_parse(&attrs, "protocolVersion")?.unwrap_or(0),
        tier: attr_parse(&attrs, "tier")?.unwrap_or(0xFFF),
        ..SpliceInfoSection::default()
    };

    let mut command = None;
    if !is_empty {
        loop {
            match next_event(reader)? {
                Event::Start(e) => {
                    parse_section_child(reader, &e, false, &mut section, &mut command)?
                }
                Event::Empty(e) => {
                    parse_section_child(reader, &e, true, &mut section, &mut command)?
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(XmlError::Invalid("unexpected end of document".into()))
                }
                _ => {}
            }
        }
    }

    section.splice_command =
        command.ok_or_else(|| XmlError::Invalid("section carries no splice command".into()))?;
    Ok(section)
}

fn parse_section_child(
    reader: &mut XmlReader,
    e: &BytesStart,
    is_empty: bool,
    section: &mut SpliceInfoSection,
    command: &mut Option<SpliceCommand>,
) -> Result<(), XmlError> {
    match local_name(e).as_str() {
        "EncryptedPacket" => {
            let attrs = attrs_map(e)?;
            section.encrypted_packet.encryption_algorithm =
                attr_parse(&attrs, "encryptionAlgorithm")?.unwrap_or(0);
            section.encrypted_packet.cw_index = attr_parse(&attrs, "cwIndex")?.unwrap_or(0);
            if !is_empty {
                skip_subtree(reader)?;
            }
        }
        "SpliceNull" => {
            if !is_empty {
                skip_subtree(reader)?;
            }
            *command = Some(SpliceCommand::SpliceNull);
        }
        "BandwidthReservation" => {
            if !is_empty {
                skip_subtree(reader)?;
            }
            *command = Some(SpliceCommand::BandwidthReservation);
        }
        "TimeSignal" => {
            *command = Some(SpliceCommand::TimeSignal(parse_time_signal(
                reader, is_empty,
            )?));
        }
        "SpliceInsert" => {
            *command = Some(SpliceCommand::SpliceInsert(parse_splice_insert(
                reader, e, is_empty,
            )?));
        }
        "SpliceSchedule" => {
            *command = Some(SpliceCommand::SpliceSchedule(parse_splice_schedule(
                reader, is_empty,
            )?));
        }
        "PrivateCommand" => {
            *command = Some(SpliceCommand::Private(parse_private_command(
                reader, e, is_empty,
            )?));
        }
        "AvailDescriptor" => {
            let attrs = attrs_map(e)?;
            if !is_empty {
                skip_subtree(reader)?;
            }
            section
                .splice_descriptors
                .push(SpliceDescriptor::Avail(AvailDescriptor {
                    provider_avail_id: attr_parse(&attrs, "providerAvailId")?.unwrap_or(0),
                }));
        }
        "DTMFDescriptor" => {
            let attrs = attrs_map(e)?;
            if !is_empty {
                skip_subtree(reader)?;
            }
            section
                .splice_descriptors
                .push(SpliceDescriptor::Dtmf(DtmfDescriptor {
                    preroll: attr_parse(&attrs, "preroll")?.unwrap_or(0),
                    chars: attrs.get("chars").cloned().unwrap_or_default(),
                }));
        }
        "SegmentationDescriptor" => {
            let descriptor = parse_segmentation_descriptor(reader, e, is_empty)?;
            section
                .splice_descriptors
                .push(SpliceDescriptor::Segmentation(descriptor));
        }
        "TimeDescriptor" => {
            let attrs = attrs_map(e)?;
            if !is_empty {
                skip_subtree(reader)?;
            }
            section
                .splice_descriptors
                .push(SpliceDescriptor::Time(TimeDescriptor {
                    tai_seconds: attr_parse(&attrs, "taiSeconds")?.unwrap_or(0),
                    tai_ns: attr_parse(&attrs, "taiNs")?.unwrap_or(0),
                    utc_offset: attr_parse(&attrs, "utcOffset")?.unwrap_or(0),
                }));
        }
        "AudioDescriptor" => {
            let descriptor = parse_audio_descriptor(reader, is_empty)?;
            section
                .splice_descriptors
                .push(SpliceDescriptor::Audio(descriptor));
        }
        "PrivateDescriptor" => {
            let attrs = attrs_map(e)?;
            let private_bytes = if is_empty {
                Vec::new()
            } else {
                parse_private_bytes(reader)?
            };
            section
                .splice_descriptors
                .push(SpliceDescriptor::Private(PrivateDescriptor {
                    tag: attr_parse(&attrs, "tag")?.unwrap_or(0),
                    identifier: attr_parse(&attrs, "identifier")?.unwrap_or(0),
                    private_bytes,
                }));
        }
        _ => {
            if !is_empty {
                skip_subtree(reader)?;
            }
        }
    }
    Ok(())
}

/// Reads an optional `SpliceTime` child until the enclosing element closes;
/// reports whether the element was present at all.
fn parse_optional_splice_time(
    reader: &mut XmlReader,
    is_empty: bool,
) -> Result<Option<SpliceTime>, XmlError> {
    let mut splice_time = None;
    if is_empty {
        return Ok(splice_time);
    }
    loop {
        match next_event(reader)? {
            Event::Start(e) => {
                if local_name(&e) == "SpliceTime" {
                    let attrs = attrs_map(&e)?;
                    splice_time = Some(SpliceTime {
                        pts_time: attr_parse(&attrs, "ptsTime")?,
                    });
                }
                skip_subtree(reader)?;
            }
            Event::Empty(e) => {
                if local_name(&e) == "SpliceTime" {
                    let attrs = attrs_map(&e)?;
                    splice_time = Some(SpliceTime {
                        pts_time: attr_parse(&attrs, "ptsTime")?,
                    });
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(splice_time)
}

fn parse_time_signal(reader: &mut XmlReader, is_empty: bool) -> Result<TimeSignal, XmlError> {
    Ok(TimeSignal {
        splice_time: parse_optional_splice_time(reader, is_empty)?.unwrap_or_default(),
    })
}

fn parse_splice_insert(
    reader: &mut XmlReader,
    start: &BytesStart,
    is_empty: bool,
) -> Result<SpliceInsert, XmlError> {
    let attrs = attrs_map(start)?;
    let mut cmd = SpliceInsert {
        splice_event_id: attr_parse(&attrs, "spliceEventId")?.unwrap_or(0),
        splice_event_cancel_indicator: attr_bool(&attrs, "spliceEventCancelIndicator")?
            .unwrap_or(false),
        out_of_network_indicator: attr_bool(&attrs, "outOfNetworkIndicator")?.unwrap_or(false),
        splice_immediate_flag: attr_bool(&attrs, "spliceImmediateFlag")?.unwrap_or(false),
        unique_program_id: attr_parse(&attrs, "uniqueProgramId")?.unwrap_or(0),
        avail_num: attr_parse(&attrs, "availNum")?.unwrap_or(0),
        avails_expected: attr_parse(&attrs, "availsExpected")?.unwrap_or(0),
        ..SpliceInsert::default()
    };
    if is_empty {
        return Ok(cmd);
    }

    loop {
        match next_event(reader)? {
            Event::Start(e) => parse_splice_insert_child(reader, &e, false, &mut cmd)?,
            Event::Empty(e) => parse_splice_insert_child(reader, &e, true, &mut cmd)?,
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(cmd)
}

fn parse_splice_insert_child(
    reader: &mut XmlReader,
    e: &BytesStart,
    is_empty: bool,
    cmd: &mut SpliceInsert,
) -> Result<(), XmlError> {
    match local_name(e).as_str() {
        "Program" => {
            cmd.program = Some(SpliceInsertProgram {
                splice_time: parse_optional_splice_time(reader, is_empty)?.unwrap_or_default(),
            });
        }
        "Component" => {
            let attrs = attrs_map(e)?;
            let splice_time = parse_optional_splice_time(reader, is_empty)?;
            cmd.components.push(SpliceInsertComponent {
                component_tag: attr_parse(&attrs, "componentTag")?.unwrap_or(0),
                splice_time,
            });
        }
        "BreakDuration" => {
            cmd.break_duration = Some(parse_break_duration(e)?);
            if !is_empty {
                skip_subtree(reader)?;
            }
        }
        _ => {
            if !is_empty {
                skip_subtree(reader)?;
            }
        }
    }
    Ok(())
}

fn parse_break_duration(e: &BytesStart) -> Result<BreakDuration, XmlError> {
    let attrs = attrs_map(e)?;
    Ok(BreakDuration {
        auto_return: attr_bool(&attrs, "autoReturn")?.unwrap_or(false),
        duration: attr_parse(&attrs, "duration")?.unwrap_or(0),
    })
}

fn parse_splice_schedule(
    reader: &mut XmlReader,
    is_empty: bool,
) -> Result<SpliceSchedule, XmlError> {
    let mut schedule = SpliceSchedule::default();
    if is_empty {
        return Ok(schedule);
    }
    loop {
        match next_event(reader)? {
            Event::Start(e) => {
                if local_name(&e) == "Event" {
                    schedule
                        .events
                        .push(parse_schedule_event(reader, &e, false)?);
                } else {
                    skip_subtree(reader)?;
                }
            }
            Event::Empty(e) => {
                if local_name(&e) == "Event" {
                    schedule.events.push(parse_schedule_event(reader, &e, true)?);
                }
            }
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(schedule)
}

fn parse_schedule_event(
    reader: &mut XmlReader,
    start: &BytesStart,
    is_empty: bool,
) -> Result<SpliceScheduleEvent, XmlError> {
    let attrs = attrs_map(start)?;
    let mut event = SpliceScheduleEvent {
        splice_event_id: attr_parse(&attrs, "spliceEventId")?.unwrap_or(0),
        splice_event_cancel_indicator: attr_bool(&attrs, "spliceEventCancelIndicator")?
            .unwrap_or(false),
        out_of_network_indicator: attr_bool(&attrs, "outOfNetworkIndicator")?.unwrap_or(false),
        unique_program_id: attr_parse(&attrs, "uniqueProgramId")?.unwrap_or(0),
        avail_num: attr_parse(&attrs, "availNum")?.unwrap_or(0),
        avails_expected: attr_parse(&attrs, "availsExpected")?.unwrap_or(0),
        ..SpliceScheduleEvent::default()
    };
    if is_empty {
        return Ok(event);
    }

    loop {
        match next_event(reader)? {
            Event::Start(e) => {
                parse_schedule_event_child(&e, &mut event)?;
                skip_subtree(reader)?;
            }
            Event::Empty(e) => parse_schedule_event_child(&e, &mut event)?,
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(event)
}

fn parse_schedule_event_child(
    e: &BytesStart,
    event: &mut SpliceScheduleEvent,
) -> Result<(), XmlError> {
    match local_name(e).as_str() {
        "Program" => {
            let attrs = attrs_map(e)?;
            event.program = Some(SpliceScheduleEventProgram {
                utc_splice_time: attr_parse(&attrs, "utcSpliceTime")?.unwrap_or(0),
            });
        }
        "Component" => {
            let attrs = attrs_map(e)?;
            event.components.push(SpliceScheduleEventComponent {
                component_tag: attr_parse(&attrs, "componentTag")?.unwrap_or(0),
                utc_splice_time: attr_parse(&attrs, "utcSpliceTime")?.unwrap_or(0),
            });
        }
        "BreakDuration" => {
            event.break_duration = Some(parse_break_duration(e)?);
        }
        _ => {}
    }
    Ok(())
}

fn parse_private_command(
    reader: &mut XmlReader,
    start: &BytesStart,
    is_empty: bool,
) -> Result<PrivateCommand, XmlError> {
    let attrs = attrs_map(start)?;
    Ok(PrivateCommand {
        identifier: attr_parse(&attrs, "identifier")?.unwrap_or(0),
        private_bytes: if is_empty {
            Vec::new()
        } else {
            parse_private_bytes(reader)?
        },
    })
}

/// Reads the base64 `PrivateBytes` child of the current element.
fn parse_private_bytes(reader: &mut XmlReader) -> Result<Vec<u8>, XmlError> {
    let mut bytes = Vec::new();
    loop {
        match next_event(reader)? {
            Event::Start(e) if local_name(&e) == "PrivateBytes" => {
                let text = read_element_text(reader)?;
                bytes = BASE64
                    .decode(text.trim().as_bytes())
                    .map_err(|err| XmlError::Invalid(format!("invalid private bytes: {err}")))?;
            }
            Event::Start(_) => skip_subtree(reader)?,
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(bytes)
}

fn parse_audio_descriptor(
    reader: &mut XmlReader,
    is_empty: bool,
) -> Result<AudioDescriptor, XmlError> {
    let mut descriptor = AudioDescriptor::default();
    if is_empty {
        return Ok(descriptor);
    }
    loop {
        match next_event(reader)? {
            Event::Start(e) => {
                parse_audio_channel(&e, &mut descriptor)?;
                skip_subtree(reader)?;
            }
            Event::Empty(e) => parse_audio_channel(&e, &mut descriptor)?,
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(descriptor)
}

fn parse_audio_channel(e: &BytesStart, descriptor: &mut AudioDescriptor) -> Result<(), XmlError> {
    if local_name(e) == "AudioChannel" {
        let attrs = attrs_map(e)?;
        descriptor.audio_channels.push(AudioChannel {
            component_tag: attr_parse(&attrs, "componentTag")?.unwrap_or(0),
            iso_code: attrs.get("isoCode").cloned().unwrap_or_default(),
            bit_stream_mode: attr_parse(&attrs, "bitStreamMode")?.unwrap_or(0),
            num_channels: attr_parse(&attrs, "numChannels")?.unwrap_or(0),
            full_srvc_audio: attr_bool(&attrs, "fullSrvcAudio")?.unwrap_or(false),
        });
    }
    Ok(())
}

fn parse_segmentation_descriptor(
    reader: &mut XmlReader,
    start: &BytesStart,
    is_empty: bool,
) -> Result<SegmentationDescriptor, XmlError> {
    let attrs = attrs_map(start)?;
    let mut descriptor = SegmentationDescriptor {
        segmentation_event_id: attr_parse(&attrs, "segmentationEventId")?.unwrap_or(0),
        segmentation_event_cancel_indicator: attr_bool(
            &attrs,
            "segmentationEventCancelIndicator",
        )?
        .unwrap_or(false),
        segmentation_duration: attr_parse(&attrs, "segmentationDuration")?,
        segmentation_type_id: attr_parse(&attrs, "segmentationTypeId")?.unwrap_or(0),
        segment_num: attr_parse(&attrs, "segmentNum")?.unwrap_or(0),
        segments_expected: attr_parse(&attrs, "segmentsExpected")?.unwrap_or(0),
        sub_segment_num: attr_parse(&attrs, "subSegmentNum")?,
        sub_segments_expected: attr_parse(&attrs, "subSegmentsExpected")?,
        ..SegmentationDescriptor::default()
    };
    if is_empty {
        return Ok(descriptor);
    }

    loop {
        match next_event(reader)? {
            Event::Start(e) => match local_name(&e).as_str() {
                "SegmentationUpid" => {
                    let upid_attrs = attrs_map(&e)?;
                    let value = read_element_text(reader)?;
                    descriptor.segmentation_upids.push(SegmentationUpid {
                        upid_type: SegmentationUpidType::from(
                            attr_parse::<u8>(&upid_attrs, "segmentationUpidType")?.unwrap_or(0),
                        ),
                        format_identifier: attr_parse(&upid_attrs, "formatIdentifier")?,
                        value,
                    });
                }
                "DeliveryRestrictions" => {
                    descriptor.delivery_restrictions = Some(parse_delivery_restrictions(&e)?);
                    skip_subtree(reader)?;
                }
                "Component" => {
                    let component_attrs = attrs_map(&e)?;
                    descriptor.components.push(SegmentationDescriptorComponent {
                        component_tag: attr_parse(&component_attrs, "componentTag")?.unwrap_or(0),
                        pts_offset: attr_parse(&component_attrs, "ptsOffset")?.unwrap_or(0),
                    });
                    skip_subtree(reader)?;
                }
                _ => skip_subtree(reader)?,
            },
            Event::Empty(e) => match local_name(&e).as_str() {
                "SegmentationUpid" => {
                    let upid_attrs = attrs_map(&e)?;
                    descriptor.segmentation_upids.push(SegmentationUpid {
                        upid_type: SegmentationUpidType::from(
                            attr_parse::<u8>(&upid_attrs, "segmentationUpidType")?.unwrap_or(0),
                        ),
                        format_identifier: attr_parse(&upid_attrs, "formatIdentifier")?,
                        value: String::new(),
                    });
                }
                "DeliveryRestrictions" => {
                    descriptor.delivery_restrictions = Some(parse_delivery_restrictions(&e)?);
                }
                "Component" => {
                    let component_attrs = attrs_map(&e)?;
                    descriptor.components.push(SegmentationDescriptorComponent {
                        component_tag: attr_parse(&component_attrs, "componentTag")?.unwrap_or(0),
                        pts_offset: attr_parse(&component_attrs, "ptsOffset")?.unwrap_or(0),
                    });
                }
                _ => {}
            },
            Event::End(_) => break,
            Event::Eof => return Err(XmlError::Invalid("unexpected end of document".into())),
            _ => {}
        }
    }
    Ok(descriptor)
}

fn parse_delivery_restrictions(e: &BytesStart) -> Result<DeliveryRestrictions, XmlError> {
    let attrs = attrs_map(e)?;
    Ok(DeliveryRestrictions {
        web_delivery_allowed_flag: attr_bool(&attrs, "webDeliveryAllowedFlag")?.unwrap_or(false),
        no_regional_blackout_flag: attr_bool(&attrs, "noRegionalBlackoutFlag")?.unwrap_or(false),
        archive_allowed_flag: attr_bool(&attrs, "archiveAllowedFlag")?.unwrap_or(false),
        device_restrictions: DeviceRestrictions::from(
            attr_parse::<u8>(&attrs, "deviceRestrictions")?.unwrap_or(3),
        ),
    })
}

// ---------------------------------------------------------------------------
// Marshalling
// ---------------------------------------------------------------------------

type XmlWriter = Writer<Vec<u8>>;

fn emit(writer: &mut XmlWriter, event: Event) -> Result<(), XmlError> {
    writer
        .write_event(event)
        .map_err(|err| XmlError::Invalid(err.to_string()))
}

fn element<'a>(name: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut e = BytesStart::new(name);
    for (key, value) in attrs {
        e.push_attribute((*key, value.as_str()));
    }
    e
}

fn emit_empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, String)]) -> Result<(), XmlError> {
    emit(writer, Event::Empty(element(name, attrs)))
}

fn write_section(writer: &mut XmlWriter, section: &SpliceInfoSection) -> Result<(), XmlError> {
    let root = element(
        "SpliceInfoSection",
        &[
            ("xmlns", NAMESPACE.to_string()),
            ("sapType", u8::from(section.sap_type).to_string()),
            ("ptsAdjustment", section.pts_adjustment.to_string()),
            ("protocolVersion", section.protocol_version.to_string()),
            ("tier", section.tier.to_string()),
        ],
    );
    emit(writer, Event::Start(root))?;

    emit_empty(
        writer,
        "EncryptedPacket",
        &[
            (
                "encryptionAlgorithm",
                section.encrypted_packet.encryption_algorithm.to_string(),
            ),
            ("cwIndex", section.encrypted_packet.cw_index.to_string()),
        ],
    )?;

    write_command(writer, &section.splice_command)?;
    for descriptor in &section.splice_descriptors {
        write_descriptor(writer, descriptor)?;
    }

    emit(writer, Event::End(BytesEnd::new("SpliceInfoSection")))
}

fn write_splice_time(writer: &mut XmlWriter, splice_time: &SpliceTime) -> Result<(), XmlError> {
    match splice_time.pts_time {
        Some(pts) => emit_empty(writer, "SpliceTime", &[("ptsTime", pts.to_string())]),
        None => emit_empty(writer, "SpliceTime", &[]),
    }
}

fn write_break_duration(
    writer: &mut XmlWriter,
    duration: &BreakDuration,
) -> Result<(), XmlError> {
    emit_empty(
        writer,
        "BreakDuration",
        &[
            ("autoReturn", duration.auto_return.to_string()),
            ("duration", duration.duration.to_string()),
        ],
    )
}

fn write_command(writer: &mut XmlWriter, command: &SpliceCommand) -> Result<(), XmlError> {
    match command {
        SpliceCommand::SpliceNull => emit_empty(writer, "SpliceNull", &[]),
        SpliceCommand::BandwidthReservation => emit_empty(writer, "BandwidthReservation", &[]),
        SpliceCommand::TimeSignal(cmd) => {
            emit(writer, Event::Start(element("TimeSignal", &[])))?;
            write_splice_time(writer, &cmd.splice_time)?;
            emit(writer, Event::End(BytesEnd::new("TimeSignal")))
        }
        SpliceCommand::SpliceInsert(cmd) => write_splice_insert(writer, cmd),
        SpliceCommand::SpliceSchedule(cmd) => write_splice_schedule(writer, cmd),
        SpliceCommand::Private(cmd) => {
            let start = element(
                "PrivateCommand",
                &[("identifier", cmd.identifier.to_string())],
            );
            emit(writer, Event::Start(start))?;
            write_private_bytes(writer, &cmd.private_bytes)?;
            emit(writer, Event::End(BytesEnd::new("PrivateCommand")))
        }
    }
}

fn write_private_bytes(writer: &mut XmlWriter, bytes: &[u8]) -> Result<(), XmlError> {
    emit(writer, Event::Start(element("PrivateBytes", &[])))?;
    emit(
        writer,
        Event::Text(BytesText::new(&BASE64.encode(bytes)).into_owned()),
    )?;
    emit(writer, Event::End(BytesEnd::new("PrivateBytes")))
}

fn write_splice_insert(writer: &mut XmlWriter, cmd: &SpliceInsert) -> Result<(), XmlError> {
    let start = element(
        "SpliceInsert",
        &[
            ("spliceEventId", cmd.splice_event_id.to_string()),
            (
                "spliceEventCancelIndicator",
                cmd.splice_event_cancel_indicator.to_string(),
            ),
            (
                "outOfNetworkIndicator",
                cmd.out_of_network_indicator.to_string(),
            ),
            ("spliceImmediateFlag", cmd.splice_immediate_flag.to_string()),
            ("uniqueProgramId", cmd.unique_program_id.to_string()),
            ("availNum", cmd.avail_num.to_string()),
            ("availsExpected", cmd.avails_expected.to_string()),
        ],
    );
    emit(writer, Event::Start(start))?;

    if let Some(program) = &cmd.program {
        emit(writer, Event::Start(element("Program", &[])))?;
        write_splice_time(writer, &program.splice_time)?;
        emit(writer, Event::End(BytesEnd::new("Program")))?;
    }
    for component in &cmd.components {
        let start = element(
            "Component",
            &[("componentTag", component.component_tag.to_string())],
        );
        emit(writer, Event::Start(start))?;
        if let Some(splice_time) = &component.splice_time {
            write_splice_time(writer, splice_time)?;
        }
        emit(writer, Event::End(BytesEnd::new("Component")))?;
    }
    if let Some(duration) = &cmd.break_duration {
        write_break_duration(writer, duration)?;
    }

    emit(writer, Event::End(BytesEnd::new("SpliceInsert")))
}

fn write_splice_schedule(writer: &mut XmlWriter, cmd: &SpliceSchedule) -> Result<(), XmlError> {
    emit(writer, Event::Start(element("SpliceSchedule", &[])))?;
    for event in &cmd.events {
        write_schedule_event(writer, event)?;
    }
    emit(writer, Event::End(BytesEnd::new("SpliceSchedule")))
}

fn write_schedule_event(
    writer: &mut XmlWriter,
    event: &SpliceScheduleEvent,
) -> Result<(), XmlError> {
    let start = element(
        "Event",
        &[
            ("spliceEventId", event.splice_event_id.to_string()),
            (
                "spliceEventCancelIndicator",
                event.splice_event_cancel_indicator.to_string(),
            ),
            (
                "outOfNetworkIndicator",
                event.out_of_network_indicator.to_string(),
            ),
            ("uniqueProgramId", event.unique_program_id.to_string()),
            ("availNum", event.avail_num.to_string()),
            ("availsExpected", event.avails_expected.to_string()),
        ],
    );
    emit(writer, Event::Start(start))?;

    if let Some(program) = &event.program {
        emit_empty(
            writer,
            "Program",
            &[("utcSpliceTime", program.utc_splice_time.to_string())],
        )?;
    }
    for component in &event.components {
        emit_empty(
            writer,
            "Component",
            &[
                ("componentTag", component.component_tag.to_string()),
                ("utcSpliceTime", component.utc_splice_time.to_string()),
            ],
        )?;
    }
    if let Some(duration) = &event.break_duration {
        write_break_duration(writer, duration)?;
    }

    emit(writer, Event::End(BytesEnd::new("Event")))
}

fn write_descriptor(
    writer: &mut XmlWriter,
    descriptor: &SpliceDescriptor,
) -> Result<(), XmlError> {
    match descriptor {
        SpliceDescriptor::Avail(d) => emit_empty(
            writer,
            "AvailDescriptor",
            &[("providerAvailId", d.provider_avail_id.to_string())],
        ),
        SpliceDescriptor::Dtmf(d) => emit_empty(
            writer,
            "DTMFDescriptor",
            &[
                ("preroll", d.preroll.to_string()),
                ("chars", d.chars.clone()),
            ],
        ),
        SpliceDescriptor::Time(d) => emit_empty(
            writer,
            "TimeDescriptor",
            &[
                ("taiSeconds", d.tai_seconds.to_string()),
                ("taiNs", d.tai_ns.to_string()),
                ("utcOffset", d.utc_offset.to_string()),
            ],
        ),
        SpliceDescriptor::Audio(d) => {
            emit(writer, Event::Start(element("AudioDescriptor", &[])))?;
            for channel in &d.audio_channels {
                emit_empty(
                    writer,
                    "AudioChannel",
                    &[
                        ("componentTag", channel.component_tag.to_string()),
                        ("isoCode", channel.iso_code.clone()),
                        ("bitStreamMode", channel.bit_stream_mode.to_string()),
                        ("numChannels", channel.num_channels.to_string()),
                        ("fullSrvcAudio", channel.full_srvc_audio.to_string()),
                    ],
                )?;
            }
            emit(writer, Event::End(BytesEnd::new("AudioDescriptor")))
        }
        SpliceDescriptor::Segmentation(d) => write_segmentation_descriptor(writer, d),
        SpliceDescriptor::Private(d) => {
            let start = element(
                "PrivateDescriptor",
                &[
                    ("tag", d.tag.to_string()),
                    ("identifier", d.identifier.to_string()),
                ],
            );
            emit(writer, Event::Start(start))?;
            write_private_bytes(writer, &d.private_bytes)?;
            emit(writer, Event::End(BytesEnd::new("PrivateDescriptor")))
        }
    }
}

fn write_segmentation_descriptor(
    writer: &mut XmlWriter,
    descriptor: &SegmentationDescriptor,
) -> Result<(), XmlError> {
    let mut attrs = vec![
        (
            "segmentationEventId",
            descriptor.segmentation_event_id.to_string(),
        ),
        (
            "segmentationEventCancelIndicator",
            descriptor.segmentation_event_cancel_indicator.to_string(),
        ),
        (
            "segmentationTypeId",
            descriptor.segmentation_type_id.to_string(),
        ),
        ("segmentNum", descriptor.segment_num.to_string()),
        (
            "segmentsExpected",
            descriptor.segments_expected.to_string(),
        ),
    ];
    if let Some(duration) = descriptor.segmentation_duration {
        attrs.push(("segmentationDuration", duration.to_string()));
    }
    if let Some(sub_segment_num) = descriptor.sub_segment_num {
        attrs.push(("subSegmentNum", sub_segment_num.to_string()));
    }
    if let Some(sub_segments_expected) = descriptor.sub_segments_expected {
        attrs.push(("subSegmentsExpected", sub_segments_expected.to_string()));
    }

    emit(
        writer,
        Event::Start(element("SegmentationDescriptor", &attrs)),
    )?;

    if let Some(restrictions) = &descriptor.delivery_restrictions {
        emit_empty(
            writer,
            "DeliveryRestrictions",
            &[
                (
                    "webDeliveryAllowedFlag",
                    restrictions.web_delivery_allowed_flag.to_string(),
                ),
                (
                    "noRegionalBlackoutFlag",
                    restrictions.no_regional_blackout_flag.to_string(),
                ),
                (
                    "archiveAllowedFlag",
                    restrictions.archive_allowed_flag.to_string(),
                ),
                (
                    "deviceRestrictions",
                    u8::from(restrictions.device_restrictions).to_string(),
                ),
            ],
        )?;
    }
    for component in &descriptor.components {
        emit_empty(
            writer,
            "Component",
            &[
                ("componentTag", component.component_tag.to_string()),
                ("ptsOffset", component.pts_offset.to_string()),
            ],
        )?;
    }
    for upid in &descriptor.segmentation_upids {
        let mut upid_attrs = vec![(
            "segmentationUpidType",
            u8::from(upid.upid_type).to_string(),
        )];
        if let Some(format_identifier) = upid.format_identifier {
            upid_attrs.push(("formatIdentifier", format_identifier.to_string()));
        }
        emit(
            writer,
            Event::Start(element("SegmentationUpid", &upid_attrs)),
        )?;
        emit(writer, Event::Text(BytesText::new(&upid.value).into_owned()))?;
        emit(writer, Event::End(BytesEnd::new("SegmentationUpid")))?;
    }

    emit(writer, Event::End(BytesEnd::new("SegmentationDescriptor")))
}
