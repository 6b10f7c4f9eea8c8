//! The segmentation descriptor: the richest annotation in the standard.

use crate::upid::SegmentationUpid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// segmentation_descriptor(): marks a boundary of a program, chapter, break
/// or placement opportunity, optionally scoped by delivery restrictions and
/// identified by one or more UPIDs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationDescriptor {
    /// Unique identifier of the segmentation event.
    #[serde(default)]
    pub segmentation_event_id: u32,
    /// Cancels a previously sent event; when set, nothing else is carried.
    #[serde(default)]
    pub segmentation_event_cancel_indicator: bool,
    /// Inline restriction block; its presence is the inverse of the wire
    /// `delivery_not_restricted_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub delivery_restrictions: Option<DeliveryRestrictions>,
    /// Component-level PTS offsets; an empty list means program
    /// segmentation (`program_segmentation_flag == 1`).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub components: Vec<SegmentationDescriptorComponent>,
    /// Segment length in 90 kHz ticks (40 bits); presence is the wire
    /// `segmentation_duration_flag`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub segmentation_duration: Option<u64>,
    /// The attached UPIDs. Zero entries encode as a zero-typed placeholder,
    /// one entry encodes directly, several entries encode as a MID().
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub segmentation_upids: Vec<SegmentationUpid>,
    /// The raw `segmentation_type_id`; see [`SegmentationType`] for the
    /// registered values.
    #[serde(default)]
    pub segmentation_type_id: u8,
    /// Segment index within the event.
    #[serde(default)]
    pub segment_num: u8,
    /// Expected segment count.
    #[serde(default)]
    pub segments_expected: u8,
    /// Provider/distributor placement-opportunity sub-segment index; only
    /// carried for type ids 0x34 and 0x36 when present on the wire.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_segment_num: Option<u8>,
    /// Expected sub-segment count, paired with `sub_segment_num`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sub_segments_expected: Option<u8>,
}

impl SegmentationDescriptor {
    /// The wire `program_segmentation_flag`.
    pub fn program_segmentation_flag(&self) -> bool {
        self.components.is_empty()
    }

    /// The wire `segmentation_duration_flag`.
    pub fn segmentation_duration_flag(&self) -> bool {
        self.segmentation_duration.is_some()
    }

    /// The wire `delivery_not_restricted_flag`.
    pub fn delivery_not_restricted_flag(&self) -> bool {
        self.delivery_restrictions.is_none()
    }

    /// The registered segmentation type, when the id is assigned.
    pub fn segmentation_type(&self) -> Option<SegmentationType> {
        SegmentationType::from_id(self.segmentation_type_id)
    }

    /// Human-readable name of the segmentation type.
    pub fn type_name(&self) -> &'static str {
        self.segmentation_type()
            .map_or("Unknown", |t| t.description())
    }

    /// Byte length of the `segmentation_upid()` field: the single UPID's
    /// value, or for a MID the inner (type, length, value) triples.
    pub fn upid_length(&self) -> usize {
        match self.segmentation_upids.len() {
            0 => 0,
            1 => self.segmentation_upids[0].value_bytes().len(),
            _ => self
                .segmentation_upids
                .iter()
                .map(|upid| 2 + upid.value_bytes().len())
                .sum(),
        }
    }
}

/// The restriction block carried when delivery is not unrestricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRestrictions {
    /// Segment may be delivered over unmanaged networks.
    #[serde(default)]
    pub web_delivery_allowed_flag: bool,
    /// No regional blackout applies.
    #[serde(default)]
    pub no_regional_blackout_flag: bool,
    /// Recording for later playback is allowed.
    #[serde(default)]
    pub archive_allowed_flag: bool,
    /// Two-bit device class restriction.
    #[serde(default)]
    pub device_restrictions: DeviceRestrictions,
}

/// The two-bit `device_restrictions` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DeviceRestrictions {
    /// Restricted to device group 0, defined out of band.
    RestrictGroup0 = 0b00,
    /// Restricted to device group 1, defined out of band.
    RestrictGroup1 = 0b01,
    /// Restricted to device group 2, defined out of band.
    RestrictGroup2 = 0b10,
    /// No device restrictions.
    #[default]
    None = 0b11,
}

impl From<u8> for DeviceRestrictions {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0b00 => DeviceRestrictions::RestrictGroup0,
            0b01 => DeviceRestrictions::RestrictGroup1,
            0b10 => DeviceRestrictions::RestrictGroup2,
            _ => DeviceRestrictions::None,
        }
    }
}

impl From<DeviceRestrictions> for u8 {
    fn from(value: DeviceRestrictions) -> Self {
        value as u8
    }
}

impl Serialize for DeviceRestrictions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for DeviceRestrictions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(DeviceRestrictions::from(u8::deserialize(deserializer)?))
    }
}

impl fmt::Display for DeviceRestrictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceRestrictions::RestrictGroup0 => "Restrict Group 0",
            DeviceRestrictions::RestrictGroup1 => "Restrict Group 1",
            DeviceRestrictions::RestrictGroup2 => "Restrict Group 2",
            DeviceRestrictions::None => "None",
        };
        f.write_str(name)
    }
}

/// One component entry of a component-segmented descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationDescriptorComponent {
    /// Elementary stream this entry applies to.
    #[serde(default)]
    pub component_tag: u8,
    /// 33-bit offset added to the signaled splice time for this component.
    #[serde(default)]
    pub pts_offset: u64,
}

/// The registered `segmentation_type_id` values (0x00..=0x51).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentationType {
    /// Not indicated (0x00)
    NotIndicated,
    /// Content identification (0x01)
    ContentIdentification,
    /// Program start (0x10)
    ProgramStart,
    /// Program end (0x11)
    ProgramEnd,
    /// Program early termination (0x12)
    ProgramEarlyTermination,
    /// Program breakaway (0x13)
    ProgramBreakaway,
    /// Program resumption (0x14)
    ProgramResumption,
    /// Program runover planned (0x15)
    ProgramRunoverPlanned,
    /// Program runover unplanned (0x16)
    ProgramRunoverUnplanned,
    /// Program overlap start (0x17)
    ProgramOverlapStart,
    /// Program blackout override (0x18)
    ProgramBlackoutOverride,
    /// Program join in progress (0x19)
    ProgramJoin,
    /// Chapter start (0x20)
    ChapterStart,
    /// Chapter end (0x21)
    ChapterEnd,
    /// Break start (0x22)
    BreakStart,
    /// Break end (0x23)
    BreakEnd,
    /// Opening credit start, deprecated (0x24)
    OpeningCreditStart,
    /// Opening credit end, deprecated (0x25)
    OpeningCreditEnd,
    /// Closing credit start, deprecated (0x26)
    ClosingCreditStart,
    /// Closing credit end, deprecated (0x27)
    ClosingCreditEnd,
    /// Provider advertisement start (0x30)
    ProviderAdvertisementStart,
    /// Provider advertisement end (0x31)
    ProviderAdvertisementEnd,
    /// Distributor advertisement start (0x32)
    DistributorAdvertisementStart,
    /// Distributor advertisement end (0x33)
    DistributorAdvertisementEnd,
    /// Provider placement opportunity start (0x34)
    ProviderPlacementOpportunityStart,
    /// Provider placement opportunity end (0x35)
    ProviderPlacementOpportunityEnd,
    /// Distributor placement opportunity start (0x36)
    DistributorPlacementOpportunityStart,
    /// Distributor placement opportunity end (0x37)
    DistributorPlacementOpportunityEnd,
    /// Provider overlay placement opportunity start (0x38)
    ProviderOverlayPlacementOpportunityStart,
    /// Provider overlay placement opportunity end (0x39)
    ProviderOverlayPlacementOpportunityEnd,
    /// Distributor overlay placement opportunity start (0x3A)
    DistributorOverlayPlacementOpportunityStart,
    /// Distributor overlay placement opportunity end (0x3B)
    DistributorOverlayPlacementOpportunityEnd,
    /// Provider promo start (0x3C)
    ProviderPromoStart,
    /// Provider promo end (0x3D)
    ProviderPromoEnd,
    /// Distributor promo start (0x3E)
    DistributorPromoStart,
    /// Distributor promo end (0x3F)
    DistributorPromoEnd,
    /// Unscheduled event start (0x40)
    UnscheduledEventStart,
    /// Unscheduled event end (0x41)
    UnscheduledEventEnd,
    /// Alternate content opportunity start (0x42)
    AlternateContentOpportunityStart,
    /// Alternate content opportunity end (0x43)
    AlternateContentOpportunityEnd,
    /// Provider ad block start (0x44)
    ProviderAdBlockStart,
    /// Provider ad block end (0x45)
    ProviderAdBlockEnd,
    /// Distributor ad block start (0x46)
    DistributorAdBlockStart,
    /// Distributor ad block end (0x47)
    DistributorAdBlockEnd,
    /// Network start (0x50)
    NetworkStart,
    /// Network end (0x51)
    NetworkEnd,
}

impl SegmentationType {
    /// The numeric `segmentation_type_id` for this variant.
    pub fn id(&self) -> u8 {
        use SegmentationType::*;
        match self {
            NotIndicated => 0x00,
            ContentIdentification => 0x01,
            ProgramStart => 0x10,
            ProgramEnd => 0x11,
            ProgramEarlyTermination => 0x12,
            ProgramBreakaway => 0x13,
            ProgramResumption => 0x14,
            ProgramRunoverPlanned => 0x15,
            ProgramRunoverUnplanned => 0x16,
            ProgramOverlapStart => 0x17,
            ProgramBlackoutOverride => 0x18,
            ProgramJoin => 0x19,
            ChapterStart => 0x20,
            ChapterEnd => 0x21,
            BreakStart => 0x22,
            BreakEnd => 0x23,
            OpeningCreditStart => 0x24,
            OpeningCreditEnd => 0x25,
            ClosingCreditStart => 0x26,
            ClosingCreditEnd => 0x27,
            ProviderAdvertisementStart => 0x30,
            ProviderAdvertisementEnd => 0x31,
            DistributorAdvertisementStart => 0x32,
            DistributorAdvertisementEnd => 0x33,
            ProviderPlacementOpportunityStart => 0x34,
            ProviderPlacementOpportunityEnd => 0x35,
            DistributorPlacementOpportunityStart => 0x36,
            DistributorPlacementOpportunityEnd => 0x37,
            ProviderOverlayPlacementOpportunityStart => 0x38,
            ProviderOverlayPlacementOpportunityEnd => 0x39,
            DistributorOverlayPlacementOpportunityStart => 0x3A,
            DistributorOverlayPlacementOpportunityEnd => 0x3B,
            ProviderPromoStart => 0x3C,
            ProviderPromoEnd => 0x3D,
            DistributorPromoStart => 0x3E,
            DistributorPromoEnd => 0x3F,
            UnscheduledEventStart => 0x40,
            UnscheduledEventEnd => 0x41,
            AlternateContentOpportunityStart => 0x42,
            AlternateContentOpportunityEnd => 0x43,
            ProviderAdBlockStart => 0x44,
            ProviderAdBlockEnd => 0x45,
            DistributorAdBlockStart => 0x46,
            DistributorAdBlockEnd => 0x47,
            NetworkStart => 0x50,
            NetworkEnd => 0x51,
        }
    }

    /// Looks up the variant for a raw id; `None` for unassigned values.
    pub fn from_id(id: u8) -> Option<Self> {
        use SegmentationType::*;
        let t = match id {
            0x00 => NotIndicated,
            0x01 => ContentIdentification,
            0x10 => ProgramStart,
            0x11 => ProgramEnd,
            0x12 => ProgramEarlyTermination,
            0x13 => ProgramBreakaway,
            0x14 => ProgramResumption,
            0x15 => ProgramRunoverPlanned,
            0x16 => ProgramRunoverUnplanned,
            0x17 => ProgramOverlapStart,
            0x18 => ProgramBlackoutOverride,
            0x19 => ProgramJoin,
            0x20 => ChapterStart,
            0x21 => ChapterEnd,
            0x22 => BreakStart,
            0x23 => BreakEnd,
            0x24 => OpeningCreditStart,
            0x25 => OpeningCreditEnd,
            0x26 => ClosingCreditStart,
            0x27 => ClosingCreditEnd,
            0x30 => ProviderAdvertisementStart,
            0x31 => ProviderAdvertisementEnd,
            0x32 => DistributorAdvertisementStart,
            0x33 => DistributorAdvertisementEnd,
            0x34 => ProviderPlacementOpportunityStart,
            0x35 => ProviderPlacementOpportunityEnd,
            0x36 => DistributorPlacementOpportunityStart,
            0x37 => DistributorPlacementOpportunityEnd,
            0x38 => ProviderOverlayPlacementOpportunityStart,
            0x39 => ProviderOverlayPlacementOpportunityEnd,
            0x3A => DistributorOverlayPlacementOpportunityStart,
            0x3B => DistributorOverlayPlacementOpportunityEnd,
            0x3C => ProviderPromoStart,
            0x3D => ProviderPromoEnd,
            0x3E => DistributorPromoStart,
            0x3F => DistributorPromoEnd,
            0x40 => UnscheduledEventStart,
            0x41 => UnscheduledEventEnd,
            0x42 => AlternateContentOpportunityStart,
            0x43 => AlternateContentOpportunityEnd,
            0x44 => ProviderAdBlockStart,
            0x45 => ProviderAdBlockEnd,
            0x46 => DistributorAdBlockStart,
            0x47 => DistributorAdBlockEnd,
            0x50 => NetworkStart,
            0x51 => NetworkEnd,
            _ => return None,
        };
        Some(t)
    }

    /// The display name from the segmentation_type_id table.
    pub fn description(&self) -> &'static str {
        use SegmentationType::*;
        match self {
            NotIndicated => "Not Indicated",
            ContentIdentification => "Content Identification",
            ProgramStart => "Program Start",
            ProgramEnd => "Program End",
            ProgramEarlyTermination => "Program Early Termination",
            ProgramBreakaway => "Program Breakaway",
            ProgramResumption => "Program Resumption",
            ProgramRunoverPlanned => "Program Runover Planned",
            ProgramRunoverUnplanned => "Program Runover Unplanned",
            ProgramOverlapStart => "Program Overlap Start",
            ProgramBlackoutOverride => "Program Blackout Override",
            ProgramJoin => "Program Join",
            ChapterStart => "Chapter Start",
            ChapterEnd => "Chapter End",
            BreakStart => "Break Start",
            BreakEnd => "Break End",
            OpeningCreditStart => "Opening Credit Start",
            OpeningCreditEnd => "Opening Credit End",
            ClosingCreditStart => "Closing Credit Start",
            ClosingCreditEnd => "Closing Credit End",
            ProviderAdvertisementStart => "Provider Advertisement Start",
            ProviderAdvertisementEnd => "Provider Advertisement End",
            DistributorAdvertisementStart => "Distributor Advertisement Start",
            DistributorAdvertisementEnd => "Distributor Advertisement End",
            ProviderPlacementOpportunityStart => "Provider Placement Opportunity Start",
            ProviderPlacementOpportunityEnd => "Provider Placement Opportunity End",
            DistributorPlacementOpportunityStart => "Distributor Placement Opportunity Start",
            DistributorPlacementOpportunityEnd => "Distributor Placement Opportunity End",
            ProviderOverlayPlacementOpportunityStart => {
                "Provider Overlay Placement Opportunity Start"
            }
            ProviderOverlayPlacementOpportunityEnd => "Provider Overlay Placement Opportunity End",
            DistributorOverlayPlacementOpportunityStart => {
                "Distributor Overlay Placement Opportunity Start"
            }
            DistributorOverlayPlacementOpportunityEnd => {
                "Distributor Overlay Placement Opportunity End"
            }
            ProviderPromoStart => "Provider Promo Start",
            ProviderPromoEnd => "Provider Promo End",
            DistributorPromoStart => "Distributor Promo Start",
            DistributorPromoEnd => "Distributor Promo End",
            UnscheduledEventStart => "Unscheduled Event Start",
            UnscheduledEventEnd => "Unscheduled Event End",
            AlternateContentOpportunityStart => "Alternate Content Opportunity Start",
            AlternateContentOpportunityEnd => "Alternate Content Opportunity End",
            ProviderAdBlockStart => "Provider Ad Block Start",
            ProviderAdBlockEnd => "Provider Ad Block End",
            DistributorAdBlockStart => "Distributor Ad Block Start",
            DistributorAdBlockEnd => "Distributor Ad Block End",
            NetworkStart => "Network Start",
            NetworkEnd => "Network End",
        }
    }
}

impl fmt::Display for SegmentationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upid::{SegmentationUpid, SegmentationUpidType};

    #[test]
    fn type_id_table_round_trips() {
        for id in 0x00..=0x51u8 {
            if let Some(t) = SegmentationType::from_id(id) {
                assert_eq!(t.id(), id);
                assert!(!t.description().is_empty());
            }
        }
        assert!(SegmentationType::from_id(0x2F).is_none());
        assert_eq!(
            SegmentationType::from_id(0x35),
            Some(SegmentationType::ProviderPlacementOpportunityEnd)
        );
    }

    #[test]
    fn flags_follow_presence() {
        let mut sd = SegmentationDescriptor::default();
        assert!(sd.program_segmentation_flag());
        assert!(sd.delivery_not_restricted_flag());
        assert!(!sd.segmentation_duration_flag());

        sd.components.push(SegmentationDescriptorComponent {
            component_tag: 2,
            pts_offset: 90_000,
        });
        sd.segmentation_duration = Some(27_630_000);
        sd.delivery_restrictions = Some(DeliveryRestrictions {
            web_delivery_allowed_flag: false,
            no_regional_blackout_flag: true,
            archive_allowed_flag: true,
            device_restrictions: DeviceRestrictions::None,
        });
        assert!(!sd.program_segmentation_flag());
        assert!(!sd.delivery_not_restricted_flag());
        assert!(sd.segmentation_duration_flag());
    }

    #[test]
    fn upid_length_counts_mid_headers() {
        let mut sd = SegmentationDescriptor::default();
        assert_eq!(sd.upid_length(), 0);

        sd.segmentation_upids
            .push(SegmentationUpid::new(SegmentationUpidType::TI, "748724618"));
        assert_eq!(sd.upid_length(), 8);

        sd.segmentation_upids
            .push(SegmentationUpid::new(SegmentationUpidType::AdID, "ABCD0123"));
        // MID form: (1 type + 1 length + value) per inner UPID.
        assert_eq!(sd.upid_length(), (2 + 8) + (2 + 8));
    }
}
