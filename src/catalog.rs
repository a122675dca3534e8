//! The fixed telemetry channel catalog: the fourteen broker topics the
//! cluster subscribes to, and the ingest identifiers the bridge maps
//! onto a subset of them. Channels are known at start time and never
//! change.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One telemetry channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    BatterySoc,
    HvBatteryPackTemp,
    CaccMileageAccumulation,
    DriveModeActive,
    DistanceToLeadVehicle,
    FrontEduReportedTemp,
    BackEduReportedTemp,
    FrontAxlePower,
    RearAxlePower,
    TrafficLightState,
    MilLampEdu01,
    MilLampEdu02,
    MilLampEdu03,
    MilLampEdu04,
}

impl Channel {
    /// All channels in subscription order.
    pub fn all() -> &'static [Channel] {
        &[
            Channel::BatterySoc,
            Channel::HvBatteryPackTemp,
            Channel::CaccMileageAccumulation,
            Channel::DriveModeActive,
            Channel::DistanceToLeadVehicle,
            Channel::FrontEduReportedTemp,
            Channel::BackEduReportedTemp,
            Channel::FrontAxlePower,
            Channel::RearAxlePower,
            Channel::TrafficLightState,
            Channel::MilLampEdu01,
            Channel::MilLampEdu02,
            Channel::MilLampEdu03,
            Channel::MilLampEdu04,
        ]
    }

    /// Broker topic for this channel.
    pub fn topic(&self) -> &'static str {
        match self {
            Channel::BatterySoc => "hmi/pcm/battery_soc",
            Channel::HvBatteryPackTemp => "hmi/pcm/hv_battery_pack_temp",
            Channel::CaccMileageAccumulation => "hmi/cav/cacc_mileage_accumulation",
            Channel::DriveModeActive => "hmi/pcm/drive_mode_active",
            Channel::DistanceToLeadVehicle => "hmi/cav/distance_to_lead_vehicle",
            Channel::FrontEduReportedTemp => "hmi/pcm/front_edu_reported_temp",
            Channel::BackEduReportedTemp => "hmi/pcm/back_edu_reported_temp",
            Channel::FrontAxlePower => "hmi/pcm/front_axle_power",
            Channel::RearAxlePower => "hmi/pcm/rear_axle_power",
            Channel::TrafficLightState => "hmi/cav/traffic_light_state",
            Channel::MilLampEdu01 => "hmi/pcm/mil_lamp_edu_01",
            Channel::MilLampEdu02 => "hmi/pcm/mil_lamp_edu_02",
            Channel::MilLampEdu03 => "hmi/pcm/mil_lamp_edu_03",
            Channel::MilLampEdu04 => "hmi/pcm/mil_lamp_edu_04",
        }
    }

    /// Exact-match topic lookup. Wildcard forms are not recognised.
    pub fn from_topic(topic: &str) -> Option<Channel> {
        TOPIC_MAP.get(topic).copied()
    }

    /// Channel for a TCP ingest frame identifier, if one is assigned.
    /// Identifiers 0x01..=0x05 are the powertrain signals the vehicle
    /// modules push over TCP; the remaining channels arrive from other
    /// publishers.
    pub fn from_ingest_id(id: u8) -> Option<Channel> {
        match id {
            0x01 => Some(Channel::BatterySoc),
            0x02 => Some(Channel::HvBatteryPackTemp),
            0x03 => Some(Channel::FrontEduReportedTemp),
            0x04 => Some(Channel::BackEduReportedTemp),
            0x05 => Some(Channel::DriveModeActive),
            _ => None,
        }
    }
}

static TOPIC_MAP: Lazy<HashMap<&'static str, Channel>> = Lazy::new(|| {
    Channel::all().iter().map(|c| (c.topic(), *c)).collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_count() {
        assert_eq!(Channel::all().len(), 14);
    }

    #[test]
    fn test_topic_lookup_round_trip() {
        for channel in Channel::all() {
            assert_eq!(Channel::from_topic(channel.topic()), Some(*channel));
        }
    }

    #[test]
    fn test_topic_lookup_is_exact() {
        assert_eq!(Channel::from_topic("hmi/pcm/#"), None);
        assert_eq!(Channel::from_topic("hmi/pcm/battery_soc/raw"), None);
        assert_eq!(Channel::from_topic("battery_soc"), None);
        assert_eq!(Channel::from_topic("HMI/PCM/BATTERY_SOC"), None);
        assert_eq!(Channel::from_topic(""), None);
    }

    #[test]
    fn test_ingest_id_map() {
        assert_eq!(Channel::from_ingest_id(0x01), Some(Channel::BatterySoc));
        assert_eq!(
            Channel::from_ingest_id(0x02),
            Some(Channel::HvBatteryPackTemp)
        );
        assert_eq!(
            Channel::from_ingest_id(0x03),
            Some(Channel::FrontEduReportedTemp)
        );
        assert_eq!(
            Channel::from_ingest_id(0x04),
            Some(Channel::BackEduReportedTemp)
        );
        assert_eq!(Channel::from_ingest_id(0x05), Some(Channel::DriveModeActive));
        assert_eq!(Channel::from_ingest_id(0x00), None);
        assert_eq!(Channel::from_ingest_id(0x06), None);
        assert_eq!(Channel::from_ingest_id(0xFF), None);
    }
}
