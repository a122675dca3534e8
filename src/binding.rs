//! Pure mutation planner for the instrument cluster.
//!
//! Maps one broker message (topic, payload) to the list of display
//! mutations it implies. Planning never performs IO and never fails:
//! unknown topics plan nothing, unparseable payloads fall open to a
//! neutral display state. Applying the plan to a panel is `panel`'s job.

use crate::catalog::Channel;

/// Element names shared between the planner and the panel.
pub mod elements {
    /// Fuel / state-of-charge percentage readout.
    pub const FUEL_PERCENTAGE: &str = "fuel-percentage";
    /// Proportional fuel bar.
    pub const FUEL_LEVEL: &str = "fuel-level";
    /// HV battery pack temperature readout.
    pub const BATTERY_TEMP: &str = "battery-temp";
    /// Accumulated CACC mileage readout.
    pub const CACC_MILEAGE: &str = "cacc-mileage";
    /// Active drive mode readout.
    pub const DRIVE_MODE_STATUS: &str = "drive-mode-status";
    /// Distance to lead vehicle readout.
    pub const DISTANCE: &str = "distance";
    /// Front motor temperature readout.
    pub const FRONT_MOTOR_TEMP: &str = "front-motor-temp";
    /// Rear motor temperature readout.
    pub const REAR_MOTOR_TEMP: &str = "rear-motor-temp";

    /// Class carried by all four wheel indicators.
    pub const WHEEL: &str = "wheel";
    pub const FRONT_LEFT: &str = "front-left";
    pub const FRONT_RIGHT: &str = "front-right";
    pub const REAR_LEFT: &str = "rear-left";
    pub const REAR_RIGHT: &str = "rear-right";

    /// Traffic light elements.
    pub const RED_LIGHT: &str = "red-light";
    pub const YELLOW_LIGHT: &str = "yellow-light";
    pub const GREEN_LIGHT: &str = "green-light";
    /// Shared malfunction indicator lamp.
    pub const MIL_LAMP: &str = "mil-lamp";

    /// State class set on the active traffic light.
    pub const ACTIVE: &str = "active";
    /// State class set on the MIL lamp while a fault is raised.
    pub const GLOW: &str = "glow";
}

/// How a mutation addresses panel elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// The element with this unique id. A missing element is an error.
    Id(&'static str),
    /// The first element carrying this class. A missing element is an error.
    FirstWithClass(&'static str),
    /// Every element carrying all of these classes. Zero matches is not
    /// an error; the mutation simply applies to nothing.
    AllWithClasses(&'static [&'static str]),
}

/// Fill colour for the wheel indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndicatorColor {
    Red,
    Green,
}

/// One planned display mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum UiMutation {
    /// Replace the element's text content.
    SetText { target: Target, text: String },
    /// Set a proportional bar's width, as a percentage string.
    SetWidth { target: Target, width: String },
    /// Set an indicator's fill colour.
    SetColor { target: Target, color: IndicatorColor },
    /// Add a state class.
    AddClass { target: Target, class: &'static str },
    /// Remove a state class.
    RemoveClass { target: Target, class: &'static str },
}

/// Parse a payload for the numeric-state topics: trimmed, as a float,
/// compared downstream against exact integer states. `None` for anything
/// that does not parse, including the empty string.
fn parse_state(payload: &str) -> Option<f64> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Plan the display mutations for one message.
///
/// Dispatch is by exact topic match through the channel catalog; topics
/// outside the fixed set plan nothing.
pub fn plan(topic: &str, payload: &str) -> Vec<UiMutation> {
    use elements::*;

    let Some(channel) = Channel::from_topic(topic) else {
        return Vec::new();
    };

    match channel {
        Channel::BatterySoc => vec![
            UiMutation::SetText {
                target: Target::Id(FUEL_PERCENTAGE),
                text: format!("{}%", payload),
            },
            UiMutation::SetWidth {
                target: Target::Id(FUEL_LEVEL),
                width: format!("{}%", payload),
            },
        ],
        Channel::HvBatteryPackTemp => vec![UiMutation::SetText {
            target: Target::Id(BATTERY_TEMP),
            text: format!("{}°C", payload),
        }],
        Channel::CaccMileageAccumulation => vec![UiMutation::SetText {
            target: Target::Id(CACC_MILEAGE),
            text: format!("{} mi", payload),
        }],
        Channel::DriveModeActive => {
            let name = match parse_state(payload) {
                Some(mode) if mode == 0.0 => "Default Drive",
                Some(mode) if mode == 1.0 => "Performance Drive",
                Some(mode) if mode == 2.0 => "ECO Drive",
                _ => "Unknown Mode",
            };
            vec![UiMutation::SetText {
                target: Target::Id(DRIVE_MODE_STATUS),
                text: format!("Drive Mode: {}", name),
            }]
        }
        Channel::DistanceToLeadVehicle => vec![UiMutation::SetText {
            target: Target::Id(DISTANCE),
            text: format!("Distance: {}m", payload),
        }],
        Channel::FrontEduReportedTemp => vec![UiMutation::SetText {
            target: Target::Id(FRONT_MOTOR_TEMP),
            text: format!("Front Motor Temp: {}°C", payload),
        }],
        Channel::BackEduReportedTemp => vec![UiMutation::SetText {
            target: Target::Id(REAR_MOTOR_TEMP),
            text: format!("Rear Motor Temp: {}°C", payload),
        }],
        Channel::FrontAxlePower => {
            let color = axle_color(payload);
            vec![
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, FRONT_LEFT]),
                    color,
                },
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, FRONT_RIGHT]),
                    color,
                },
            ]
        }
        Channel::RearAxlePower => {
            let color = axle_color(payload);
            vec![
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, REAR_LEFT]),
                    color,
                },
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, REAR_RIGHT]),
                    color,
                },
            ]
        }
        Channel::TrafficLightState => {
            // Clear first so a repeated state is a net no-op and an
            // unknown state leaves no light active.
            let mut mutations = vec![
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(RED_LIGHT),
                    class: ACTIVE,
                },
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(YELLOW_LIGHT),
                    class: ACTIVE,
                },
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(GREEN_LIGHT),
                    class: ACTIVE,
                },
            ];
            let light = match parse_state(payload) {
                Some(state) if state == 0.0 => Some(RED_LIGHT),
                Some(state) if state == 1.0 => Some(YELLOW_LIGHT),
                Some(state) if state == 2.0 => Some(GREEN_LIGHT),
                _ => None,
            };
            if let Some(light) = light {
                mutations.push(UiMutation::AddClass {
                    target: Target::FirstWithClass(light),
                    class: ACTIVE,
                });
            }
            mutations
        }
        Channel::MilLampEdu01
        | Channel::MilLampEdu02
        | Channel::MilLampEdu03
        | Channel::MilLampEdu04 => {
            // Byte-exact comparison, no trim. "01" and " 1" do not glow.
            if payload == "1" {
                vec![UiMutation::AddClass {
                    target: Target::FirstWithClass(MIL_LAMP),
                    class: GLOW,
                }]
            } else {
                vec![UiMutation::RemoveClass {
                    target: Target::FirstWithClass(MIL_LAMP),
                    class: GLOW,
                }]
            }
        }
    }
}

/// Byte-exact comparison, no trim. Only the literal "0" means unpowered.
fn axle_color(payload: &str) -> IndicatorColor {
    if payload == "0" {
        IndicatorColor::Red
    } else {
        IndicatorColor::Green
    }
}

#[cfg(test)]
mod tests {
    use super::elements::*;
    use super::*;

    #[test]
    fn test_battery_soc_sets_text_and_width() {
        let mutations = plan("hmi/pcm/battery_soc", "73");
        assert_eq!(
            mutations,
            vec![
                UiMutation::SetText {
                    target: Target::Id(FUEL_PERCENTAGE),
                    text: "73%".to_string(),
                },
                UiMutation::SetWidth {
                    target: Target::Id(FUEL_LEVEL),
                    width: "73%".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_text_readouts() {
        // (topic, payload, element id, expected text)
        let cases = [
            (
                "hmi/pcm/hv_battery_pack_temp",
                "31.5",
                BATTERY_TEMP,
                "31.5°C",
            ),
            (
                "hmi/cav/cacc_mileage_accumulation",
                "1204",
                CACC_MILEAGE,
                "1204 mi",
            ),
            (
                "hmi/cav/distance_to_lead_vehicle",
                "42",
                DISTANCE,
                "Distance: 42m",
            ),
            (
                "hmi/pcm/front_edu_reported_temp",
                "68",
                FRONT_MOTOR_TEMP,
                "Front Motor Temp: 68°C",
            ),
            (
                "hmi/pcm/back_edu_reported_temp",
                "71",
                REAR_MOTOR_TEMP,
                "Rear Motor Temp: 71°C",
            ),
        ];

        for (topic, payload, id, expected) in cases {
            let mutations = plan(topic, payload);
            assert_eq!(
                mutations,
                vec![UiMutation::SetText {
                    target: Target::Id(id),
                    text: expected.to_string(),
                }],
                "topic {}",
                topic
            );
        }
    }

    #[test]
    fn test_drive_mode_names() {
        let cases = [
            ("0", "Drive Mode: Default Drive"),
            ("1", "Drive Mode: Performance Drive"),
            ("2", "Drive Mode: ECO Drive"),
            // Floats and whitespace are accepted as long as the value
            // lands exactly on a state.
            ("2.0", "Drive Mode: ECO Drive"),
            (" 1 ", "Drive Mode: Performance Drive"),
            ("1e0", "Drive Mode: Performance Drive"),
            // Anything else fails open.
            ("7", "Drive Mode: Unknown Mode"),
            ("abc", "Drive Mode: Unknown Mode"),
            ("", "Drive Mode: Unknown Mode"),
            ("1.5", "Drive Mode: Unknown Mode"),
        ];

        for (payload, expected) in cases {
            let mutations = plan("hmi/pcm/drive_mode_active", payload);
            assert_eq!(
                mutations,
                vec![UiMutation::SetText {
                    target: Target::Id(DRIVE_MODE_STATUS),
                    text: expected.to_string(),
                }],
                "payload {:?}",
                payload
            );
        }
    }

    #[test]
    fn test_axle_power_colors() {
        // Only the literal "0" is red; "00", "0.0" and " 0" count as powered.
        let cases = [
            ("0", IndicatorColor::Red),
            ("1", IndicatorColor::Green),
            ("42", IndicatorColor::Green),
            ("00", IndicatorColor::Green),
            ("0.0", IndicatorColor::Green),
            (" 0", IndicatorColor::Green),
        ];

        for (payload, color) in cases {
            let mutations = plan("hmi/pcm/front_axle_power", payload);
            assert_eq!(
                mutations,
                vec![
                    UiMutation::SetColor {
                        target: Target::AllWithClasses(&[WHEEL, FRONT_LEFT]),
                        color,
                    },
                    UiMutation::SetColor {
                        target: Target::AllWithClasses(&[WHEEL, FRONT_RIGHT]),
                        color,
                    },
                ],
                "payload {:?}",
                payload
            );
        }

        let mutations = plan("hmi/pcm/rear_axle_power", "0");
        assert_eq!(
            mutations,
            vec![
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, REAR_LEFT]),
                    color: IndicatorColor::Red,
                },
                UiMutation::SetColor {
                    target: Target::AllWithClasses(&[WHEEL, REAR_RIGHT]),
                    color: IndicatorColor::Red,
                },
            ]
        );
    }

    #[test]
    fn test_traffic_light_clears_then_activates() {
        let mutations = plan("hmi/cav/traffic_light_state", "1");
        assert_eq!(
            mutations,
            vec![
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(RED_LIGHT),
                    class: ACTIVE,
                },
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(YELLOW_LIGHT),
                    class: ACTIVE,
                },
                UiMutation::RemoveClass {
                    target: Target::FirstWithClass(GREEN_LIGHT),
                    class: ACTIVE,
                },
                UiMutation::AddClass {
                    target: Target::FirstWithClass(YELLOW_LIGHT),
                    class: ACTIVE,
                },
            ]
        );
    }

    #[test]
    fn test_traffic_light_states() {
        let activated = |payload: &str| -> Option<&'static str> {
            plan("hmi/cav/traffic_light_state", payload)
                .into_iter()
                .find_map(|m| match m {
                    UiMutation::AddClass {
                        target: Target::FirstWithClass(light),
                        ..
                    } => Some(light),
                    _ => None,
                })
        };

        assert_eq!(activated("0"), Some(RED_LIGHT));
        assert_eq!(activated("1"), Some(YELLOW_LIGHT));
        assert_eq!(activated("2"), Some(GREEN_LIGHT));
        // Out-of-range or unparseable states clear the board.
        assert_eq!(activated("5"), None);
        assert_eq!(activated("abc"), None);
        assert_eq!(activated(""), None);

        // The three removes are always planned, even when no light follows.
        assert_eq!(plan("hmi/cav/traffic_light_state", "5").len(), 3);
    }

    #[test]
    fn test_mil_lamp_exact_one() {
        for topic in [
            "hmi/pcm/mil_lamp_edu_01",
            "hmi/pcm/mil_lamp_edu_02",
            "hmi/pcm/mil_lamp_edu_03",
            "hmi/pcm/mil_lamp_edu_04",
        ] {
            assert_eq!(
                plan(topic, "1"),
                vec![UiMutation::AddClass {
                    target: Target::FirstWithClass(MIL_LAMP),
                    class: GLOW,
                }],
                "topic {}",
                topic
            );
            for payload in ["0", "true", "01", " 1", ""] {
                assert_eq!(
                    plan(topic, payload),
                    vec![UiMutation::RemoveClass {
                        target: Target::FirstWithClass(MIL_LAMP),
                        class: GLOW,
                    }],
                    "topic {} payload {:?}",
                    topic,
                    payload
                );
            }
        }
    }

    #[test]
    fn test_unknown_topic_plans_nothing() {
        assert!(plan("hmi/pcm/unknown_signal", "1").is_empty());
        assert!(plan("", "1").is_empty());
        assert!(plan("hmi/pcm/battery_soc/extra", "50").is_empty());
    }

    #[test]
    fn test_every_channel_has_a_plan() {
        use crate::catalog::Channel;
        for channel in Channel::all() {
            assert!(
                !plan(channel.topic(), "1").is_empty(),
                "channel {:?}",
                channel
            );
        }
    }
}
