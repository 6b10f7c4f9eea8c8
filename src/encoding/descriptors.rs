//! Encoders for the splice descriptor variants.
//!
//! Every descriptor writes its tag, the computed `descriptor_length`, the
//! identifier (CUEI for the typed variants) and its payload. Descriptors are
//! emitted in the order they sit in the section's list, which is the order
//! they were decoded.

use super::Encodable;
use crate::bits::BitWriter;
use crate::descriptors::{
    tag, AudioDescriptor, AvailDescriptor, DtmfDescriptor, PrivateDescriptor,
    SegmentationDescriptor, SpliceDescriptor, TimeDescriptor,
};
use crate::types::CUE_IDENTIFIER;
use crate::upid::SegmentationUpidType;

fn write_header(writer: &mut BitWriter, descriptor_tag: u8, identifier: u32, length: usize) {
    writer.write_bits(u64::from(descriptor_tag), 8);
    writer.write_bits(length as u64, 8);
    writer.write_bits(u64::from(identifier), 32);
}

impl Encodable for SpliceDescriptor {
    fn encode(&self, writer: &mut BitWriter) {
        // descriptor_length counts the bytes after the length field itself.
        let length = self.encoded_size() - 2;
        match self {
            SpliceDescriptor::Avail(d) => {
                write_header(writer, tag::AVAIL, CUE_IDENTIFIER, length);
                writer.write_bits(u64::from(d.provider_avail_id), 32);
            }
            SpliceDescriptor::Dtmf(d) => {
                write_header(writer, tag::DTMF, CUE_IDENTIFIER, length);
                d.encode_payload(writer);
            }
            SpliceDescriptor::Segmentation(d) => {
                write_header(writer, tag::SEGMENTATION, CUE_IDENTIFIER, length);
                d.encode_payload(writer);
            }
            SpliceDescriptor::Time(d) => {
                write_header(writer, tag::TIME, CUE_IDENTIFIER, length);
                writer.write_bits(d.tai_seconds, 48);
                writer.write_bits(u64::from(d.tai_ns), 32);
                writer.write_bits(u64::from(d.utc_offset), 16);
            }
            SpliceDescriptor::Audio(d) => {
                write_header(writer, tag::AUDIO, CUE_IDENTIFIER, length);
                d.encode_payload(writer);
            }
            SpliceDescriptor::Private(d) => {
                write_header(writer, d.tag, d.identifier, length);
                writer.write_bytes(&d.private_bytes);
            }
        }
    }

    fn encoded_size(&self) -> usize {
        // tag + length + identifier = 6 bytes of framing.
        6 + match self {
            SpliceDescriptor::Avail(_) => AvailDescriptor::PAYLOAD_SIZE,
            SpliceDescriptor::Dtmf(d) => d.payload_size(),
            SpliceDescriptor::Segmentation(d) => d.payload_size(),
            SpliceDescriptor::Time(_) => TimeDescriptor::PAYLOAD_SIZE,
            SpliceDescriptor::Audio(d) => d.payload_size(),
            SpliceDescriptor::Private(d) => d.private_bytes.len(),
        }
    }
}

impl AvailDescriptor {
    const PAYLOAD_SIZE: usize = 4;
}

impl TimeDescriptor {
    const PAYLOAD_SIZE: usize = 12;
}

impl DtmfDescriptor {
    fn payload_size(&self) -> usize {
        2 + self.chars.len()
    }

    fn encode_payload(&self, writer: &mut BitWriter) {
        writer.write_bits(u64::from(self.preroll), 8);
        writer.write_bits(self.chars.len() as u64, 3);
        writer.write_bits(0x1F, 5); // reserved
        writer.write_bytes(self.chars.as_bytes());
    }
}

impl AudioDescriptor {
    fn payload_size(&self) -> usize {
        1 + self.audio_channels.len() * 6
    }

    fn encode_payload(&self, writer: &mut BitWriter) {
        writer.write_bits(self.audio_channels.len() as u64, 4);
        writer.write_bits(0x0F, 4); // reserved
        for channel in &self.audio_channels {
            writer.write_bits(u64::from(channel.component_tag), 8);
            let mut iso = channel.iso_code.bytes();
            for _ in 0..3 {
                writer.write_bits(u64::from(iso.next().unwrap_or(b' ')), 8);
            }
            writer.write_bits(u64::from(channel.bit_stream_mode), 3);
            writer.write_bits(u64::from(channel.num_channels), 4);
            writer.write_bit(channel.full_srvc_audio);
        }
    }
}

impl SegmentationDescriptor {
    fn payload_size(&self) -> usize {
        let mut size = 5; // segmentation_event_id + cancel/reserved byte
        if self.segmentation_event_cancel_indicator {
            return size;
        }
        size += 1; // flags + restrictions/reserved
        if !self.program_segmentation_flag() {
            size += 1 + self.components.len() * 6;
        }
        if self.segmentation_duration.is_some() {
            size += 5;
        }
        size += 2 + self.upid_length(); // upid type + length + value
        size += 3; // segmentation_type_id + segment_num + segments_expected
        size += usize::from(self.sub_segment_num.is_some());
        size += usize::from(self.sub_segments_expected.is_some());
        size
    }

    fn encode_payload(&self, writer: &mut BitWriter) {
        writer.write_bits(u64::from(self.segmentation_event_id), 32);
        writer.write_bit(self.segmentation_event_cancel_indicator);
        writer.write_bits(0x7F, 7); // reserved
        if self.segmentation_event_cancel_indicator {
            return;
        }

        writer.write_bit(self.program_segmentation_flag());
        writer.write_bit(self.segmentation_duration_flag());
        writer.write_bit(self.delivery_not_restricted_flag());
        match &self.delivery_restrictions {
            Some(restrictions) => {
                writer.write_bit(restrictions.web_delivery_allowed_flag);
                writer.write_bit(restrictions.no_regional_blackout_flag);
                writer.write_bit(restrictions.archive_allowed_flag);
                writer.write_bits(u64::from(u8::from(restrictions.device_restrictions)), 2);
            }
            None => writer.write_bits(0x1F, 5), // reserved
        }

        if !self.program_segmentation_flag() {
            writer.write_bits(self.components.len() as u64, 8);
            for component in &self.components {
                writer.write_bits(u64::from(component.component_tag), 8);
                writer.write_bits(0x7F, 7); // reserved
                writer.write_bits(component.pts_offset & 0x1_FFFF_FFFF, 33);
            }
        }

        if let Some(duration) = self.segmentation_duration {
            writer.write_bits(duration & 0xFF_FFFF_FFFF, 40);
        }

        match self.segmentation_upids.len() {
            // An absent UPID still occupies the type and length fields.
            0 => writer.write_bits(0, 16),
            1 => {
                let upid = &self.segmentation_upids[0];
                let value = upid.value_bytes();
                writer.write_bits(u64::from(u8::from(upid.upid_type)), 8);
                writer.write_bits(value.len() as u64, 8);
                writer.write_bytes(&value);
            }
            _ => {
                // Multiple UPIDs aggregate into a MID(); the outer length is
                // the sum of the inner (type, length, value) triples.
                writer.write_bits(u64::from(u8::from(SegmentationUpidType::MID)), 8);
                writer.write_bits(self.upid_length() as u64, 8);
                for upid in &self.segmentation_upids {
                    let value = upid.value_bytes();
                    writer.write_bits(u64::from(u8::from(upid.upid_type)), 8);
                    writer.write_bits(value.len() as u64, 8);
                    writer.write_bytes(&value);
                }
            }
        }

        writer.write_bits(u64::from(self.segmentation_type_id), 8);
        writer.write_bits(u64::from(self.segment_num), 8);
        writer.write_bits(u64::from(self.segments_expected), 8);
        if let Some(sub_segment_num) = self.sub_segment_num {
            writer.write_bits(u64::from(sub_segment_num), 8);
        }
        if let Some(sub_segments_expected) = self.sub_segments_expected {
            writer.write_bits(u64::from(sub_segments_expected), 8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{DeliveryRestrictions, DeviceRestrictions};
    use crate::upid::SegmentationUpid;
    use data_encoding::HEXLOWER;

    fn encode_to_vec(descriptor: &SpliceDescriptor) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(descriptor.encoded_size());
        descriptor.encode(&mut writer);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), descriptor.encoded_size());
        bytes
    }

    #[test]
    fn avail_descriptor_layout() {
        let bytes = encode_to_vec(&SpliceDescriptor::Avail(AvailDescriptor {
            provider_avail_id: 0x0000_0135,
        }));
        assert_eq!(HEXLOWER.encode(&bytes), "00084355454900000135");
    }

    #[test]
    fn segmentation_descriptor_sample_14_1() {
        // Provider Placement Opportunity Start from SCTE-35 sample 14.1.
        let descriptor = SpliceDescriptor::Segmentation(SegmentationDescriptor {
            segmentation_event_id: 0x4800_008E,
            delivery_restrictions: Some(DeliveryRestrictions {
                web_delivery_allowed_flag: false,
                no_regional_blackout_flag: true,
                archive_allowed_flag: true,
                device_restrictions: DeviceRestrictions::None,
            }),
            segmentation_duration: Some(0x0001_A599_B0),
            segmentation_upids: vec![SegmentationUpid::new(
                crate::upid::SegmentationUpidType::TI,
                "748724618",
            )],
            segmentation_type_id: 0x34,
            segment_num: 2,
            segments_expected: 0,
            ..SegmentationDescriptor::default()
        });
        let bytes = encode_to_vec(&descriptor);
        assert_eq!(
            HEXLOWER.encode(&bytes),
            "021c435545494800008e7fcf0001a599b00808000000002ca0a18a340200"
        );
    }

    #[test]
    fn private_descriptor_keeps_tag_and_identifier() {
        let bytes = encode_to_vec(&SpliceDescriptor::Private(PrivateDescriptor {
            tag: 0x00,
            identifier: 0x5341_5053,
            private_bytes: vec![0x0B],
        }));
        assert_eq!(HEXLOWER.encode(&bytes), "0005534150530b");
    }
}
