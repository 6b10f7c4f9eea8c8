//! Diagnostic text rendering of decoded sections.
//!
//! This is display-only output for humans reading a cue on a terminal; the
//! structured, XML and JSON forms are the interchange surfaces.

use crate::descriptors::SpliceDescriptor;
use crate::time::ticks_to_duration;
use crate::types::{SpliceCommand, SpliceInfoSection};
use humantime::format_duration;
use std::fmt::Display;
use std::fmt::Write as _;

/// Indented `key: value` block writer.
struct Table {
    out: String,
    prefix: String,
    indent: String,
    depth: usize,
}

impl Table {
    fn new(prefix: &str, indent: &str) -> Self {
        Self {
            out: String::new(),
            prefix: prefix.to_string(),
            indent: indent.to_string(),
            depth: 0,
        }
    }

    fn pad(&mut self, extra: usize) {
        self.out.push_str(&self.prefix);
        for _ in 0..self.depth + extra {
            self.out.push_str(&self.indent);
        }
    }

    fn open(&mut self, label: &str) {
        self.pad(0);
        let _ = writeln!(self.out, "{label} {{");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth -= 1;
        self.pad(0);
        self.out.push_str("}\n");
    }

    fn row<V: Display>(&mut self, key: &str, value: V) {
        self.pad(0);
        let _ = writeln!(self.out, "{key}: {value}");
    }

    fn finish(self) -> String {
        self.out
    }
}

fn ticks_with_duration(ticks: u64) -> String {
    format!("{ticks} ticks ({})", format_duration(ticks_to_duration(ticks)))
}

impl SpliceInfoSection {
    /// Renders the section as an indented diagnostic table.
    pub fn table(&self, prefix: &str, indent: &str) -> String {
        let mut t = Table::new(prefix, indent);
        t.open("splice_info_section()");
        t.row("sap_type", format!("{:#02x}", u8::from(self.sap_type)));
        t.row("protocol_version", self.protocol_version);
        t.row("encrypted_packet", self.encrypted());
        if self.encrypted() {
            t.row(
                "encryption_algorithm",
                self.encrypted_packet.encryption_algorithm,
            );
        }
        t.row("pts_adjustment", ticks_with_duration(self.pts_adjustment));
        t.row("cw_index", self.encrypted_packet.cw_index);
        t.row("tier", format!("{:#03x}", self.tier));

        write_command(&mut t, &self.splice_command);
        for descriptor in &self.splice_descriptors {
            write_descriptor(&mut t, descriptor);
        }

        if let Some(ecrc) = self.ecrc_32 {
            t.row("E_CRC_32", format!("{ecrc:#08x}"));
        }
        t.row("CRC_32", format!("{:#08x}", self.crc_32));
        t.close();
        t.finish()
    }
}

fn write_command(t: &mut Table, command: &SpliceCommand) {
    t.open(&format!("{}()", command.name()));
    match command {
        SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => {}
        SpliceCommand::TimeSignal(cmd) => {
            if let Some(pts) = cmd.splice_time.pts_time {
                t.row("time_specified_flag", true);
                t.row("pts_time", ticks_with_duration(pts));
            } else {
                t.row("time_specified_flag", false);
            }
        }
        SpliceCommand::SpliceInsert(cmd) => {
            t.row("splice_event_id", cmd.splice_event_id);
            t.row(
                "splice_event_cancel_indicator",
                cmd.splice_event_cancel_indicator,
            );
            if !cmd.splice_event_cancel_indicator {
                t.row("out_of_network_indicator", cmd.out_of_network_indicator);
                t.row("program_splice_flag", cmd.program_splice_flag());
                t.row("duration_flag", cmd.duration_flag());
                t.row("splice_immediate_flag", cmd.splice_immediate_flag);
                if let Some(program) = &cmd.program {
                    if let Some(pts) = program.splice_time.pts_time {
                        t.row("pts_time", ticks_with_duration(pts));
                    }
                }
                for component in &cmd.components {
                    t.open("component()");
                    t.row("component_tag", component.component_tag);
                    if let Some(pts) = component.splice_time.and_then(|st| st.pts_time) {
                        t.row("pts_time", ticks_with_duration(pts));
                    }
                    t.close();
                }
                if let Some(duration) = &cmd.break_duration {
                    t.row("auto_return", duration.auto_return);
                    t.row("duration", ticks_with_duration(duration.duration));
                }
                t.row("unique_program_id", cmd.unique_program_id);
                t.row("avail_num", cmd.avail_num);
                t.row("avails_expected", cmd.avails_expected);
            }
        }
        SpliceCommand::SpliceSchedule(cmd) => {
            t.row("splice_count", cmd.events.len());
            for event in &cmd.events {
                t.open("splice_event()");
                t.row("splice_event_id", event.splice_event_id);
                t.row(
                    "splice_event_cancel_indicator",
                    event.splice_event_cancel_indicator,
                );
                if !event.splice_event_cancel_indicator {
                    t.row("out_of_network_indicator", event.out_of_network_indicator);
                    if let Some(program) = &event.program {
                        t.row("utc_splice_time", program.utc_splice_time);
                    }
                    for component in &event.components {
                        t.open("component()");
                        t.row("component_tag", component.component_tag);
                        t.row("utc_splice_time", component.utc_splice_time);
                        t.close();
                    }
                    if let Some(duration) = &event.break_duration {
                        t.row("auto_return", duration.auto_return);
                        t.row("duration", ticks_with_duration(duration.duration));
                    }
                    t.row("unique_program_id", event.unique_program_id);
                    t.row("avail_num", event.avail_num);
                    t.row("avails_expected", event.avails_expected);
                }
                t.close();
            }
        }
        SpliceCommand::Private(cmd) => {
            t.row(
                "identifier",
                crate::upid::format_identifier_to_string(cmd.identifier),
            );
            t.row("private_bytes", format!("{} bytes", cmd.private_bytes.len()));
        }
    }
    t.close();
}

fn write_descriptor(t: &mut Table, descriptor: &SpliceDescriptor) {
    t.open(&format!("{}()", descriptor.name()));
    match descriptor {
        SpliceDescriptor::Avail(d) => {
            t.row("provider_avail_id", d.provider_avail_id);
        }
        SpliceDescriptor::Dtmf(d) => {
            t.row("preroll", d.preroll);
            t.row("dtmf_count", d.chars.len());
            t.row("DTMF_char", &d.chars);
        }
        SpliceDescriptor::Time(d) => {
            t.row("TAI_seconds", d.tai_seconds);
            t.row("TAI_ns", d.tai_ns);
            t.row("UTC_offset", d.utc_offset);
        }
        SpliceDescriptor::Audio(d) => {
            t.row("audio_count", d.audio_channels.len());
            for channel in &d.audio_channels {
                t.open("audio_channel()");
                t.row("component_tag", channel.component_tag);
                t.row("ISO_code", &channel.iso_code);
                t.row("bit_stream_mode", channel.bit_stream_mode);
                t.row("num_channels", channel.num_channels);
                t.row("full_srvc_audio", channel.full_srvc_audio);
                t.close();
            }
        }
        SpliceDescriptor::Segmentation(d) => {
            t.row("segmentation_event_id", d.segmentation_event_id);
            t.row(
                "segmentation_event_cancel_indicator",
                d.segmentation_event_cancel_indicator,
            );
            if !d.segmentation_event_cancel_indicator {
                t.row("program_segmentation_flag", d.program_segmentation_flag());
                t.row("segmentation_duration_flag", d.segmentation_duration_flag());
                t.row(
                    "delivery_not_restricted_flag",
                    d.delivery_not_restricted_flag(),
                );
                if let Some(restrictions) = &d.delivery_restrictions {
                    t.row(
                        "web_delivery_allowed_flag",
                        restrictions.web_delivery_allowed_flag,
                    );
                    t.row(
                        "no_regional_blackout_flag",
                        restrictions.no_regional_blackout_flag,
                    );
                    t.row("archive_allowed_flag", restrictions.archive_allowed_flag);
                    t.row("device_restrictions", restrictions.device_restrictions);
                }
                for component in &d.components {
                    t.open("component()");
                    t.row("component_tag", component.component_tag);
                    t.row("pts_offset", ticks_with_duration(component.pts_offset));
                    t.close();
                }
                if let Some(duration) = d.segmentation_duration {
                    t.row("segmentation_duration", ticks_with_duration(duration));
                }
                t.row("segmentation_upid_length", d.upid_length());
                for upid in &d.segmentation_upids {
                    t.open("segmentation_upid()");
                    t.row(
                        "segmentation_upid_type",
                        format!("{} ({:#02x})", upid.name(), u8::from(upid.upid_type)),
                    );
                    if let Some(format_identifier) = upid.format_identifier_display() {
                        t.row("format_identifier", format_identifier);
                    }
                    t.row("segmentation_upid", &upid.value);
                    t.close();
                }
                t.row(
                    "segmentation_type_id",
                    format!("{} ({:#02x})", d.type_name(), d.segmentation_type_id),
                );
                t.row("segment_num", d.segment_num);
                t.row("segments_expected", d.segments_expected);
                if let Some(sub_segment_num) = d.sub_segment_num {
                    t.row("sub_segment_num", sub_segment_num);
                }
                if let Some(sub_segments_expected) = d.sub_segments_expected {
                    t.row("sub_segments_expected", sub_segments_expected);
                }
            }
        }
        SpliceDescriptor::Private(d) => {
            t.row("tag", format!("{:#02x}", d.tag));
            t.row(
                "identifier",
                crate::upid::format_identifier_to_string(d.identifier),
            );
            t.row("private_bytes", format!("{} bytes", d.private_bytes.len()));
        }
    }
    t.close();
}
