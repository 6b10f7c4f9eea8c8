//! Section assembly: header, derived lengths, CRC trailer and text framing.

use super::Encodable;
use crate::bits::BitWriter;
use crate::crc;
use crate::types::{SpliceInfoSection, TABLE_ID};
use data_encoding::{BASE64, HEXUPPER};

impl SpliceInfoSection {
    /// Encodes the section to its binary wire form in canonical layout:
    /// derived length fields are recomputed and no alignment stuffing is
    /// emitted, so legacy inputs re-encode shorter than they arrived.
    pub fn encode(&self) -> Vec<u8> {
        let command_size = self.splice_command.encoded_size();
        let descriptor_loop_size: usize = self
            .splice_descriptors
            .iter()
            .map(Encodable::encoded_size)
            .sum();

        // section_length covers everything after its own field, through the
        // CRC trailer: 11 fixed header bytes, the command, the 2-byte
        // descriptor loop length, the loop, E_CRC_32 when encrypted, CRC_32.
        let mut section_length = 11 + command_size + 2 + descriptor_loop_size + 4;
        if self.encrypted() {
            section_length += 4;
        }

        let mut writer = BitWriter::with_capacity(section_length + 3);
        writer.write_bits(u64::from(TABLE_ID), 8);
        writer.write_bit(false); // section_syntax_indicator
        writer.write_bit(false); // private_indicator
        writer.write_bits(u64::from(u8::from(self.sap_type)), 2);
        writer.write_bits(section_length as u64, 12);
        writer.write_bits(u64::from(self.protocol_version), 8);
        writer.write_bit(self.encrypted());
        writer.write_bits(u64::from(self.encrypted_packet.encryption_algorithm), 6);
        writer.write_bits(self.pts_adjustment & 0x1_FFFF_FFFF, 33);
        writer.write_bits(u64::from(self.encrypted_packet.cw_index), 8);
        writer.write_bits(u64::from(self.tier) & 0xFFF, 12);
        writer.write_bits(command_size as u64, 12);
        writer.write_bits(u64::from(u8::from(self.splice_command.command_type())), 8);
        self.splice_command.encode(&mut writer);

        writer.write_bits(descriptor_loop_size as u64, 16);
        for descriptor in &self.splice_descriptors {
            descriptor.encode(&mut writer);
        }

        if self.encrypted() {
            writer.write_bits(u64::from(self.ecrc_32.unwrap_or(0)), 32);
        }

        let mut buffer = writer.finish();
        debug_assert_eq!(buffer.len(), section_length + 3 - 4);
        let crc = crc::checksum(&buffer);
        buffer.extend_from_slice(&crc.to_be_bytes());
        buffer
    }

    /// The canonical binary form, base64-encoded with padding.
    pub fn base64(&self) -> String {
        BASE64.encode(&self.encode())
    }

    /// The canonical binary form as upper-case hex with a `0x` prefix.
    pub fn hex(&self) -> String {
        format!("0x{}", HEXUPPER.encode(&self.encode()))
    }

    /// Recomputes `crc_32` from the canonical encoding. Used after
    /// constructing a section from a textual document, so the structured
    /// value compares equal to a binary-decoded one.
    pub fn refresh_crc(&mut self) {
        let encoded = self.encode();
        let trailer = &encoded[encoded.len() - 4..];
        self.crc_32 = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{SpliceCommand, SpliceInfoSection, TimeSignal};

    #[test]
    fn default_section_is_the_null_heartbeat() {
        let section = SpliceInfoSection::default();
        assert_eq!(section.base64(), "/DARAAAAAAAAAP/wAAAAAHpPv/8=");
        assert_eq!(
            section.hex(),
            "0xFC301100000000000000FFF0000000007A4FBFFF"
        );
    }

    #[test]
    fn encoded_sections_always_carry_a_valid_crc() {
        let mut section = SpliceInfoSection::new(SpliceCommand::TimeSignal(
            TimeSignal::from_ticks(0x0_7269_2982),
        ));
        section.encrypted_packet.cw_index = 0xFF;
        assert!(crate::crc::validate_section(&section.encode()));

        section.refresh_crc();
        let trailer = section.encode();
        assert_eq!(
            section.crc_32,
            u32::from_be_bytes(trailer[trailer.len() - 4..].try_into().unwrap())
        );
    }
}
