//! MPEG-TS scanning for SCTE-35 sections.
//!
//! The scanner walks a transport stream 188 bytes at a time: the PAT reveals
//! the PMT PIDs, each PMT maps elementary PIDs to its program and flags
//! SCTE-35 PIDs (stream types 0x06 and 0x86), PCR and PTS values are tracked
//! per program, and sections on SCTE-35 PIDs are reassembled across packets
//! and handed to the binary decoder. A bad section is logged and skipped;
//! the scan itself keeps going.

use crate::error::CueError;
use crate::parser;
use crate::types::SpliceInfoSection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::io::{self, Read};

/// Size of a transport stream packet in bytes.
pub const PACKET_SIZE: usize = 188;

/// PAT section separator: pointer_field 0x00 followed by table_id 0x00.
const PAT_SEPARATOR: &[u8] = &[0x00, 0x00];
/// PMT table_id.
const PMT_SEPARATOR: &[u8] = &[0x02];
/// SCTE-35 section prefix: table_id 0xFC, flags/length byte 0x30.
const SCTE35_SEPARATOR: &[u8] = &[0xFC, 0x30];

/// Where in the stream a cue was found, with the clocks last seen for its
/// program (seconds, truncated to microsecond precision).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketData {
    /// Ordinal of the packet completing the section, counted from 1.
    pub packet_number: u64,
    /// PID the section arrived on.
    pub pid: u16,
    /// Program that PID belongs to.
    pub program: u16,
    /// Latest program clock reference, in seconds.
    pub pcr: f64,
    /// Latest presentation timestamp, in seconds.
    pub pts: f64,
}

/// A decoded cue together with its location in the stream.
#[derive(Debug)]
pub struct SpliceCue {
    /// Stream position and clocks at the completing packet.
    pub packet: PacketData,
    /// The decoded section. For a failed CRC the best-effort value is kept
    /// and the error recorded alongside.
    pub section: SpliceInfoSection,
    /// `Some(Crc32Invalid)` when the section arrived corrupted.
    pub error: Option<CueError>,
}

/// Stateful scanner over one transport stream.
///
/// State is confined to the instance; distinct streams can be scanned
/// concurrently without coordination.
#[derive(Debug, Default)]
pub struct Stream {
    packet_number: u64,
    programs: Vec<u16>,
    pid_to_program: HashMap<u16, u16>,
    program_to_pcr: HashMap<u16, u64>,
    program_to_pts: HashMap<u16, u64>,
    /// Partially accumulated sections by PID.
    partial: HashMap<u16, Vec<u8>>,
    /// Previous payload by PID, for duplicate suppression.
    last: HashMap<u16, Vec<u8>>,
    pmt_pids: HashSet<u16>,
    pcr_pids: HashSet<u16>,
    scte35_pids: HashSet<u16>,
    cues: Vec<SpliceCue>,
}

impl Stream {
    /// A scanner with empty lookup tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a whole transport stream, returning the cues found. Trailing
    /// bytes shorter than one packet are ignored.
    pub fn scan<R: Read>(&mut self, mut input: R) -> io::Result<Vec<SpliceCue>> {
        let mut packet = [0u8; PACKET_SIZE];
        while read_packet(&mut input, &mut packet)? {
            self.packet_number += 1;
            self.parse_packet(&packet);
        }
        Ok(std::mem::take(&mut self.cues))
    }

    /// Feeds one packet; complete cues accumulate until drained.
    pub fn push_packet(&mut self, packet: &[u8; PACKET_SIZE]) {
        self.packet_number += 1;
        self.parse_packet(packet);
    }

    /// Takes the cues collected so far.
    pub fn take_cues(&mut self) -> Vec<SpliceCue> {
        std::mem::take(&mut self.cues)
    }

    /// Programs seen in the PAT.
    pub fn programs(&self) -> &[u16] {
        &self.programs
    }

    /// PIDs carrying SCTE-35 sections, per the PMTs seen so far.
    pub fn scte35_pids(&self) -> &HashSet<u16> {
        &self.scte35_pids
    }

    fn parse_packet(&mut self, packet: &[u8]) {
        let pid = parse_pid(packet[1], packet[2]);
        let payload = packet_payload(packet).to_vec();

        if pid == 0 {
            self.parse_pat(payload.clone(), pid);
        }
        if self.pmt_pids.contains(&pid) {
            self.parse_pmt(payload.clone(), pid);
        }
        if self.pcr_pids.contains(&pid) {
            self.parse_pcr(packet, pid);
        } else {
            self.parse_pts(packet, pid, &payload);
        }
        if self.scte35_pids.contains(&pid) {
            self.parse_scte35(payload, pid);
        }
    }

    /// Compares this payload to the previous one on the PID; repeated
    /// sections are skipped rather than re-parsed.
    fn same_as_last(&mut self, payload: &[u8], pid: u16) -> bool {
        if self.last.get(&pid).is_some_and(|prev| prev == payload) {
            return true;
        }
        self.last.insert(pid, payload.to_vec());
        false
    }

    /// Prepends any stored partial for the PID and aligns to the separator.
    fn check_partial(&mut self, mut payload: Vec<u8>, pid: u16, separator: &[u8]) -> Vec<u8> {
        if let Some(stored) = self.partial.remove(&pid) {
            let mut joined = stored;
            joined.extend_from_slice(&payload);
            payload = joined;
        }
        match find_separator(&payload, separator) {
            Some(index) => payload[index..].to_vec(),
            None => Vec::new(),
        }
    }

    /// Accumulates until `section_length + 3` bytes are available.
    fn section_done(&mut self, payload: &[u8], pid: u16, section_length: u16) -> bool {
        if usize::from(section_length) + 3 > payload.len() {
            self.partial.insert(pid, payload.to_vec());
            return false;
        }
        self.partial.remove(&pid);
        true
    }

    fn parse_pat(&mut self, payload: Vec<u8>, pid: u16) {
        if self.same_as_last(&payload, pid) {
            return;
        }
        let payload = self.check_partial(payload, pid, PAT_SEPARATOR);
        if payload.len() < 4 {
            return;
        }
        let section_length = parse_length(payload[2], payload[3]);
        if !self.section_done(&payload, pid, section_length) {
            return;
        }

        // Program entries run from offset 9 (pointer-prefixed indexing) to
        // the CRC; the 5 bytes before them are tsid/version/section numbers.
        let entries_len = section_length.saturating_sub(5).saturating_sub(4);
        let mut index = 9usize;
        let end = index + usize::from(entries_len);
        while index + 4 <= end && index + 4 <= payload.len() {
            let program = parse_program(payload[index], payload[index + 1]);
            if program > 0 {
                if !self.programs.contains(&program) {
                    self.programs.push(program);
                }
                let pmt_pid = parse_pid(payload[index + 2], payload[index + 3]);
                self.pmt_pids.insert(pmt_pid);
            }
            index += 4;
        }
    }

    fn parse_pmt(&mut self, payload: Vec<u8>, pid: u16) {
        if self.same_as_last(&payload, pid) {
            return;
        }
        let payload = self.check_partial(payload, pid, PMT_SEPARATOR);
        if payload.len() < 12 {
            return;
        }
        let section_length = parse_length(payload[1], payload[2]);
        if !self.section_done(&payload, pid, section_length) {
            return;
        }

        let program = parse_program(payload[3], payload[4]);
        let pcr_pid = parse_pid(payload[8], payload[9]);
        self.pcr_pids.insert(pcr_pid);
        let program_info_length = parse_length(payload[10], payload[11]);
        let index = 12 + usize::from(program_info_length);
        let streams_length = usize::from(section_length)
            .saturating_sub(9)
            .saturating_sub(usize::from(program_info_length));
        self.parse_streams(&payload, index, streams_length, program);
    }

    /// Walks the PMT elementary-stream entries, mapping PIDs to the program
    /// and registering SCTE-35 PIDs by stream type.
    fn parse_streams(&mut self, payload: &[u8], mut index: usize, length: usize, program: u16) {
        // The last 4 bytes of the declared span are the section CRC.
        let end = (index + length).saturating_sub(4).min(payload.len());
        while index + 5 <= end {
            let stream_type = payload[index];
            let elementary_pid = parse_pid(payload[index + 1], payload[index + 2]);
            let es_info_length = parse_length(payload[index + 3], payload[index + 4]);
            index += 5 + usize::from(es_info_length);

            self.pid_to_program.insert(elementary_pid, program);
            if stream_type == 0x06 || stream_type == 0x86 {
                self.scte35_pids.insert(elementary_pid);
            }
        }
    }

    /// 33-bit PCR base from the adaptation field, when the PCR flag is set.
    fn parse_pcr(&mut self, packet: &[u8], pid: u16) {
        let has_adaptation = (packet[3] >> 5) & 1 == 1;
        if !has_adaptation || packet.len() < 11 || (packet[5] >> 4) & 1 != 1 {
            return;
        }
        let mut pcr = u64::from(packet[6]) << 25;
        pcr |= u64::from(packet[7]) << 17;
        pcr |= u64::from(packet[8]) << 9;
        pcr |= u64::from(packet[9]) << 1;
        pcr |= u64::from(packet[10]) >> 7;
        if let Some(&program) = self.pid_to_program.get(&pid) {
            self.program_to_pcr.insert(program, pcr);
        }
    }

    /// 33-bit PTS from the standard five-byte PES timestamp layout, on
    /// packets carrying a payload unit start.
    fn parse_pts(&mut self, packet: &[u8], pid: u16, payload: &[u8]) {
        let pusi = (packet[1] >> 6) & 1 == 1;
        if !pusi || payload.len() < 14 {
            return;
        }
        // PES start code prefix, then the PTS flag in the header flags byte.
        if payload[0] != 0x00 || payload[1] != 0x00 || payload[2] != 0x01 {
            return;
        }
        if (payload[7] >> 7) & 1 != 1 {
            return;
        }
        let Some(&program) = self.pid_to_program.get(&pid) else {
            return;
        };
        let mut pts = (u64::from(payload[9]) >> 1 & 0x07) << 30;
        pts |= u64::from(payload[10]) << 22;
        pts |= (u64::from(payload[11]) >> 1) << 15;
        pts |= u64::from(payload[12]) << 7;
        pts |= u64::from(payload[13]) >> 1;
        self.program_to_pts.insert(program, pts);
    }

    fn parse_scte35(&mut self, payload: Vec<u8>, pid: u16) {
        if self.same_as_last(&payload, pid) {
            return;
        }
        let payload = self.check_partial(payload, pid, SCTE35_SEPARATOR);
        if payload.is_empty() {
            // Nothing that looks like a section on this PID after all.
            self.scte35_pids.remove(&pid);
            return;
        }
        if payload.len() < 3 {
            self.partial.insert(pid, payload);
            return;
        }
        let section_length = parse_length(payload[1], payload[2]);
        if !self.section_done(&payload, pid, section_length) {
            return;
        }

        let section_bytes = &payload[..usize::from(section_length) + 3];
        let packet = self.packet_data(pid);
        match parser::decode(section_bytes) {
            Ok(section) => self.cues.push(SpliceCue {
                packet,
                section,
                error: None,
            }),
            Err(err) if err.kind() == CueError::Crc32Invalid => {
                log::warn!("pid {pid}: section with invalid CRC_32 kept as best effort");
                if let Some(section) = err.into_section() {
                    self.cues.push(SpliceCue {
                        packet,
                        section,
                        error: Some(CueError::Crc32Invalid),
                    });
                }
            }
            Err(err) => {
                log::warn!("pid {pid}: dropping undecodable section: {err}");
            }
        }
    }

    fn packet_data(&self, pid: u16) -> PacketData {
        let program = self.pid_to_program.get(&pid).copied().unwrap_or(0);
        PacketData {
            packet_number: self.packet_number,
            pid,
            program,
            pcr: as_seconds(self.program_to_pcr.get(&program).copied().unwrap_or(0)),
            pts: as_seconds(self.program_to_pts.get(&program).copied().unwrap_or(0)),
        }
    }
}

/// Reads exactly one packet; `Ok(false)` on a clean end of stream.
fn read_packet<R: Read>(input: &mut R, packet: &mut [u8; PACKET_SIZE]) -> io::Result<bool> {
    match input.read_exact(packet) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => Err(err),
    }
}

/// The payload after the 4-byte header and the adaptation field, if any.
fn packet_payload(packet: &[u8]) -> &[u8] {
    let mut head = 4;
    let has_adaptation = (packet[3] >> 5) & 1 == 1;
    if has_adaptation {
        head += 1 + usize::from(packet[4]);
    }
    &packet[head.min(PACKET_SIZE)..]
}

fn find_separator(payload: &[u8], separator: &[u8]) -> Option<usize> {
    payload
        .windows(separator.len())
        .position(|window| window == separator)
}

/// 90 kHz ticks as seconds, truncated to microsecond precision.
fn as_seconds(ticks: u64) -> f64 {
    let seconds = ticks as f64 / 90_000.0;
    (seconds * 1_000_000.0) as u64 as f64 / 1_000_000.0
}

fn parse_length(byte1: u8, byte2: u8) -> u16 {
    u16::from(byte1 & 0x0F) << 8 | u16::from(byte2)
}

fn parse_pid(byte1: u8, byte2: u8) -> u16 {
    u16::from(byte1 & 0x1F) << 8 | u16::from(byte2)
}

fn parse_program(byte1: u8, byte2: u8) -> u16 {
    u16::from(byte1) << 8 | u16::from(byte2)
}
