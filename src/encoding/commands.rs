//! Encoders for the splice command variants.
//!
//! Reserved bits are written as ones, matching the layouts in the standard.

use super::Encodable;
use crate::bits::BitWriter;
use crate::time::{BreakDuration, SpliceTime};
use crate::types::{
    PrivateCommand, SpliceCommand, SpliceInsert, SpliceSchedule, SpliceScheduleEvent, TimeSignal,
};

const PTS_MASK: u64 = 0x1_FFFF_FFFF;

impl Encodable for SpliceTime {
    fn encode(&self, writer: &mut BitWriter) {
        match self.pts_time {
            Some(pts) => {
                writer.write_bit(true); // time_specified_flag
                writer.write_bits(0x3F, 6); // reserved
                writer.write_bits(pts & PTS_MASK, 33);
            }
            None => {
                writer.write_bit(false); // time_specified_flag
                writer.write_bits(0x7F, 7); // reserved
            }
        }
    }

    fn encoded_size(&self) -> usize {
        if self.pts_time.is_some() {
            5
        } else {
            1
        }
    }
}

impl Encodable for BreakDuration {
    fn encode(&self, writer: &mut BitWriter) {
        writer.write_bit(self.auto_return);
        writer.write_bits(0x3F, 6); // reserved
        writer.write_bits(self.duration & PTS_MASK, 33);
    }

    fn encoded_size(&self) -> usize {
        5
    }
}

impl Encodable for TimeSignal {
    fn encode(&self, writer: &mut BitWriter) {
        self.splice_time.encode(writer);
    }

    fn encoded_size(&self) -> usize {
        self.splice_time.encoded_size()
    }
}

impl Encodable for SpliceInsert {
    fn encode(&self, writer: &mut BitWriter) {
        writer.write_bits(u64::from(self.splice_event_id), 32);
        writer.write_bit(self.splice_event_cancel_indicator);
        writer.write_bits(0x7F, 7); // reserved
        if self.splice_event_cancel_indicator {
            return;
        }

        writer.write_bit(self.out_of_network_indicator);
        writer.write_bit(self.program_splice_flag());
        writer.write_bit(self.duration_flag());
        writer.write_bit(self.splice_immediate_flag);
        writer.write_bits(0x0F, 4); // reserved

        if let Some(program) = &self.program {
            if !self.splice_immediate_flag {
                program.splice_time.encode(writer);
            }
        } else {
            writer.write_bits(self.components.len() as u64, 8);
            for component in &self.components {
                writer.write_bits(u64::from(component.component_tag), 8);
                if !self.splice_immediate_flag {
                    component.splice_time.unwrap_or_default().encode(writer);
                }
            }
        }

        if let Some(duration) = &self.break_duration {
            duration.encode(writer);
        }
        writer.write_bits(u64::from(self.unique_program_id), 16);
        writer.write_bits(u64::from(self.avail_num), 8);
        writer.write_bits(u64::from(self.avails_expected), 8);
    }

    fn encoded_size(&self) -> usize {
        let mut size = 5; // splice_event_id + cancel/reserved byte
        if self.splice_event_cancel_indicator {
            return size;
        }
        size += 1; // indicator flags + reserved
        if let Some(program) = &self.program {
            if !self.splice_immediate_flag {
                size += program.splice_time.encoded_size();
            }
        } else {
            size += 1; // component_count
            for component in &self.components {
                size += 1; // component_tag
                if !self.splice_immediate_flag {
                    size += component.splice_time.unwrap_or_default().encoded_size();
                }
            }
        }
        if let Some(duration) = &self.break_duration {
            size += duration.encoded_size();
        }
        size + 4 // unique_program_id + avail_num + avails_expected
    }
}

impl Encodable for SpliceScheduleEvent {
    fn encode(&self, writer: &mut BitWriter) {
        writer.write_bits(u64::from(self.splice_event_id), 32);
        writer.write_bit(self.splice_event_cancel_indicator);
        writer.write_bits(0x7F, 7); // reserved
        if self.splice_event_cancel_indicator {
            return;
        }

        writer.write_bit(self.out_of_network_indicator);
        writer.write_bit(self.program.is_some());
        writer.write_bit(self.break_duration.is_some());
        writer.write_bits(0x1F, 5); // reserved

        if let Some(program) = &self.program {
            writer.write_bits(u64::from(program.utc_splice_time), 32);
        } else {
            writer.write_bits(self.components.len() as u64, 8);
            for component in &self.components {
                writer.write_bits(u64::from(component.component_tag), 8);
                writer.write_bits(u64::from(component.utc_splice_time), 32);
            }
        }

        if let Some(duration) = &self.break_duration {
            duration.encode(writer);
        }
        writer.write_bits(u64::from(self.unique_program_id), 16);
        writer.write_bits(u64::from(self.avail_num), 8);
        writer.write_bits(u64::from(self.avails_expected), 8);
    }

    fn encoded_size(&self) -> usize {
        let mut size = 5;
        if self.splice_event_cancel_indicator {
            return size;
        }
        size += 1; // indicator flags + reserved
        size += match &self.program {
            Some(_) => 4,
            None => 1 + self.components.len() * 5,
        };
        if let Some(duration) = &self.break_duration {
            size += duration.encoded_size();
        }
        size + 4
    }
}

impl Encodable for SpliceSchedule {
    fn encode(&self, writer: &mut BitWriter) {
        writer.write_bits(self.events.len() as u64, 8);
        for event in &self.events {
            event.encode(writer);
        }
    }

    fn encoded_size(&self) -> usize {
        1 + self
            .events
            .iter()
            .map(Encodable::encoded_size)
            .sum::<usize>()
    }
}

impl Encodable for PrivateCommand {
    fn encode(&self, writer: &mut BitWriter) {
        writer.write_bits(u64::from(self.identifier), 32);
        writer.write_bytes(&self.private_bytes);
    }

    fn encoded_size(&self) -> usize {
        4 + self.private_bytes.len()
    }
}

impl Encodable for SpliceCommand {
    fn encode(&self, writer: &mut BitWriter) {
        match self {
            SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => {}
            SpliceCommand::SpliceSchedule(cmd) => cmd.encode(writer),
            SpliceCommand::SpliceInsert(cmd) => cmd.encode(writer),
            SpliceCommand::TimeSignal(cmd) => cmd.encode(writer),
            SpliceCommand::Private(cmd) => cmd.encode(writer),
        }
    }

    fn encoded_size(&self) -> usize {
        match self {
            SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => 0,
            SpliceCommand::SpliceSchedule(cmd) => cmd.encoded_size(),
            SpliceCommand::SpliceInsert(cmd) => cmd.encoded_size(),
            SpliceCommand::TimeSignal(cmd) => cmd.encoded_size(),
            SpliceCommand::Private(cmd) => cmd.encoded_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpliceInsertProgram;

    fn encode_to_vec<T: Encodable>(value: &T) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(value.encoded_size());
        value.encode(&mut writer);
        let bytes = writer.finish();
        assert_eq!(bytes.len(), value.encoded_size());
        bytes
    }

    #[test]
    fn splice_time_forms() {
        assert_eq!(encode_to_vec(&SpliceTime::default()), vec![0x7F]);
        assert_eq!(
            encode_to_vec(&SpliceTime::from_ticks(0x0_72BD_0050)),
            vec![0xFE, 0x72, 0xBD, 0x00, 0x50]
        );
    }

    #[test]
    fn splice_insert_sample_14_2_payload() {
        // Command bytes of SCTE-35 sample 14.2.
        let cmd = SpliceInsert {
            splice_event_id: 0x4800_008F,
            out_of_network_indicator: true,
            program: Some(SpliceInsertProgram::from_ticks(0x0_7369_C02E)),
            break_duration: Some(BreakDuration {
                auto_return: true,
                duration: 0x0005_2CCF5,
            }),
            ..SpliceInsert::default()
        };
        let bytes = encode_to_vec(&cmd);
        assert_eq!(
            bytes,
            [
                0x48, 0x00, 0x00, 0x8F, 0x7F, 0xEF, 0xFE, 0x73, 0x69, 0xC0, 0x2E, 0xFE, 0x00,
                0x52, 0xCC, 0xF5, 0x00, 0x00, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn cancelled_insert_is_minimal() {
        let cmd = SpliceInsert {
            splice_event_id: 7,
            splice_event_cancel_indicator: true,
            ..SpliceInsert::default()
        };
        assert_eq!(encode_to_vec(&cmd), [0x00, 0x00, 0x00, 0x07, 0xFF]);
    }
}
