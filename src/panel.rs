//! In-process model of the cluster's display elements.
//!
//! Elements are addressed by id or class and hold text, bar width,
//! indicator colour and state classes. Lookup semantics match the
//! bindings' expectations: id and first-with-class targets are
//! required, all-with-classes targets apply to every match and
//! tolerate zero matches.

use std::collections::BTreeSet;
use std::fmt;

use crate::binding::{IndicatorColor, Target, UiMutation};

/// One display element.
#[derive(Clone, Debug, Default)]
pub struct Element {
    /// Unique id, if the element has one.
    pub id: Option<String>,
    /// Classes the element carries (layout classes plus state classes).
    pub classes: BTreeSet<String>,
    /// Text content.
    pub text: String,
    /// Bar width as a percentage string, for proportional elements.
    pub width: String,
    /// Indicator fill colour, once set.
    pub color: Option<IndicatorColor>,
}

impl Element {
    fn with_id(id: &str) -> Element {
        Element {
            id: Some(id.to_string()),
            ..Element::default()
        }
    }

    fn with_classes(classes: &[&str]) -> Element {
        Element {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            ..Element::default()
        }
    }
}

/// Failure to resolve a required mutation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelError {
    /// No element carries the id.
    MissingId(&'static str),
    /// No element carries the class.
    MissingClass(&'static str),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::MissingId(id) => write!(f, "no element with id '{}'", id),
            PanelError::MissingClass(class) => {
                write!(f, "no element with class '{}'", class)
            }
        }
    }
}

impl std::error::Error for PanelError {}

/// The display element registry.
#[derive(Clone, Debug)]
pub struct Panel {
    elements: Vec<Element>,
}

impl Panel {
    /// A panel holding the given elements. The cluster uses
    /// [`Panel::cluster`]; this is mostly for tests.
    pub fn new(elements: Vec<Element>) -> Panel {
        Panel { elements }
    }

    /// The standard cluster panel, with every element the bindings address.
    pub fn cluster() -> Panel {
        use crate::binding::elements::*;

        Panel {
            elements: vec![
                Element::with_id(FUEL_PERCENTAGE),
                Element::with_id(FUEL_LEVEL),
                Element::with_id(BATTERY_TEMP),
                Element::with_id(CACC_MILEAGE),
                Element::with_id(DRIVE_MODE_STATUS),
                Element::with_id(DISTANCE),
                Element::with_id(FRONT_MOTOR_TEMP),
                Element::with_id(REAR_MOTOR_TEMP),
                Element::with_classes(&[WHEEL, FRONT_LEFT]),
                Element::with_classes(&[WHEEL, FRONT_RIGHT]),
                Element::with_classes(&[WHEEL, REAR_LEFT]),
                Element::with_classes(&[WHEEL, REAR_RIGHT]),
                Element::with_classes(&[RED_LIGHT]),
                Element::with_classes(&[YELLOW_LIGHT]),
                Element::with_classes(&[GREEN_LIGHT]),
                Element::with_classes(&[MIL_LAMP]),
            ],
        }
    }

    /// Element indices a target resolves to. Required targets fail when
    /// nothing matches; all-with-classes targets resolve to an empty set.
    fn resolve(&self, target: &Target) -> Result<Vec<usize>, PanelError> {
        match target {
            Target::Id(id) => self
                .elements
                .iter()
                .position(|e| e.id.as_deref() == Some(*id))
                .map(|i| vec![i])
                .ok_or(PanelError::MissingId(id)),
            Target::FirstWithClass(class) => self
                .elements
                .iter()
                .position(|e| e.classes.contains(*class))
                .map(|i| vec![i])
                .ok_or(PanelError::MissingClass(class)),
            Target::AllWithClasses(classes) => Ok(self
                .elements
                .iter()
                .enumerate()
                .filter(|(_, e)| classes.iter().all(|c| e.classes.contains(*c)))
                .map(|(i, _)| i)
                .collect()),
        }
    }

    /// Apply one mutation.
    pub fn apply(&mut self, mutation: &UiMutation) -> Result<(), PanelError> {
        match mutation {
            UiMutation::SetText { target, text } => {
                for i in self.resolve(target)? {
                    self.elements[i].text = text.clone();
                }
            }
            UiMutation::SetWidth { target, width } => {
                for i in self.resolve(target)? {
                    self.elements[i].width = width.clone();
                }
            }
            UiMutation::SetColor { target, color } => {
                for i in self.resolve(target)? {
                    self.elements[i].color = Some(*color);
                }
            }
            UiMutation::AddClass { target, class } => {
                for i in self.resolve(target)? {
                    self.elements[i].classes.insert((*class).to_string());
                }
            }
            UiMutation::RemoveClass { target, class } => {
                for i in self.resolve(target)? {
                    self.elements[i].classes.remove(*class);
                }
            }
        }
        Ok(())
    }

    /// Apply a plan in order. Stops at the first failed required lookup,
    /// leaving mutations already applied in place.
    pub fn apply_all(&mut self, mutations: &[UiMutation]) -> Result<(), PanelError> {
        for mutation in mutations {
            self.apply(mutation)?;
        }
        Ok(())
    }

    /// Text of the element with the given id. Empty for unknown ids.
    pub fn text(&self, id: &str) -> &str {
        self.elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .map(|e| e.text.as_str())
            .unwrap_or("")
    }

    /// Bar width string of the element with the given id.
    pub fn width(&self, id: &str) -> &str {
        self.elements
            .iter()
            .find(|e| e.id.as_deref() == Some(id))
            .map(|e| e.width.as_str())
            .unwrap_or("")
    }

    /// Indicator colour of the first element carrying all the classes.
    pub fn color(&self, classes: &[&str]) -> Option<IndicatorColor> {
        self.elements
            .iter()
            .find(|e| classes.iter().all(|c| e.classes.contains(*c)))
            .and_then(|e| e.color)
    }

    /// Whether the first element carrying `class` also carries `state`.
    pub fn has_state(&self, class: &str, state: &str) -> bool {
        self.elements
            .iter()
            .find(|e| e.classes.contains(class))
            .map(|e| e.classes.contains(state))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::elements::*;
    use crate::binding::{plan, Target};

    #[test]
    fn test_cluster_accepts_every_channel_plan() {
        use crate::catalog::Channel;

        let mut panel = Panel::cluster();
        for channel in Channel::all() {
            let mutations = plan(channel.topic(), "1");
            assert_eq!(panel.apply_all(&mutations), Ok(()), "channel {:?}", channel);
        }
    }

    #[test]
    fn test_battery_soc_applies_to_panel() {
        let mut panel = Panel::cluster();
        panel
            .apply_all(&plan("hmi/pcm/battery_soc", "73"))
            .expect("apply");
        assert_eq!(panel.text(FUEL_PERCENTAGE), "73%");
        assert_eq!(panel.width(FUEL_LEVEL), "73%");
        // Nothing else moved.
        assert_eq!(panel.text(BATTERY_TEMP), "");
        assert_eq!(panel.text(DRIVE_MODE_STATUS), "");
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let mut panel = Panel::new(vec![]);
        let err = panel
            .apply(&UiMutation::SetText {
                target: Target::Id(BATTERY_TEMP),
                text: "31°C".to_string(),
            })
            .unwrap_err();
        assert_eq!(err, PanelError::MissingId(BATTERY_TEMP));
        assert_eq!(err.to_string(), "no element with id 'battery-temp'");
    }

    #[test]
    fn test_partial_application_keeps_earlier_mutations() {
        // A panel with the percentage readout but no fuel bar: the first
        // mutation lands, the second fails, the first stays applied.
        let mut panel = Panel::new(vec![Element::with_id(FUEL_PERCENTAGE)]);
        let mutations = plan("hmi/pcm/battery_soc", "73");

        let err = panel.apply_all(&mutations).unwrap_err();
        assert_eq!(err, PanelError::MissingId(FUEL_LEVEL));
        assert_eq!(panel.text(FUEL_PERCENTAGE), "73%");
    }

    #[test]
    fn test_all_with_classes_tolerates_zero_matches() {
        // No wheel elements at all: the axle plan applies to nothing and
        // reports no error.
        let mut panel = Panel::new(vec![]);
        assert_eq!(
            panel.apply_all(&plan("hmi/pcm/front_axle_power", "0")),
            Ok(())
        );
    }

    #[test]
    fn test_axle_power_colors_both_wheels() {
        let mut panel = Panel::cluster();
        panel
            .apply_all(&plan("hmi/pcm/front_axle_power", "0"))
            .expect("apply");
        assert_eq!(
            panel.color(&[WHEEL, FRONT_LEFT]),
            Some(IndicatorColor::Red)
        );
        assert_eq!(
            panel.color(&[WHEEL, FRONT_RIGHT]),
            Some(IndicatorColor::Red)
        );
        // Rear wheels untouched.
        assert_eq!(panel.color(&[WHEEL, REAR_LEFT]), None);

        panel
            .apply_all(&plan("hmi/pcm/front_axle_power", "1"))
            .expect("apply");
        assert_eq!(
            panel.color(&[WHEEL, FRONT_LEFT]),
            Some(IndicatorColor::Green)
        );
    }

    #[test]
    fn test_traffic_light_transitions() {
        let mut panel = Panel::cluster();

        panel
            .apply_all(&plan("hmi/cav/traffic_light_state", "0"))
            .expect("apply");
        assert!(panel.has_state(RED_LIGHT, ACTIVE));
        assert!(!panel.has_state(YELLOW_LIGHT, ACTIVE));
        assert!(!panel.has_state(GREEN_LIGHT, ACTIVE));

        panel
            .apply_all(&plan("hmi/cav/traffic_light_state", "2"))
            .expect("apply");
        assert!(!panel.has_state(RED_LIGHT, ACTIVE));
        assert!(panel.has_state(GREEN_LIGHT, ACTIVE));

        panel
            .apply_all(&plan("hmi/cav/traffic_light_state", "5"))
            .expect("apply");
        assert!(!panel.has_state(RED_LIGHT, ACTIVE));
        assert!(!panel.has_state(YELLOW_LIGHT, ACTIVE));
        assert!(!panel.has_state(GREEN_LIGHT, ACTIVE));
    }

    #[test]
    fn test_most_recent_mil_message_wins() {
        let mut panel = Panel::cluster();

        panel
            .apply_all(&plan("hmi/pcm/mil_lamp_edu_01", "1"))
            .expect("apply");
        assert!(panel.has_state(MIL_LAMP, GLOW));

        // A later all-clear from a different fault signal clears the lamp.
        panel
            .apply_all(&plan("hmi/pcm/mil_lamp_edu_02", "0"))
            .expect("apply");
        assert!(!panel.has_state(MIL_LAMP, GLOW));

        panel
            .apply_all(&plan("hmi/pcm/mil_lamp_edu_04", "1"))
            .expect("apply");
        assert!(panel.has_state(MIL_LAMP, GLOW));
    }

    #[test]
    fn test_unknown_topic_leaves_panel_unchanged() {
        let mut panel = Panel::cluster();
        panel
            .apply_all(&plan("hmi/pcm/not_a_channel", "9"))
            .expect("apply");
        for id in [FUEL_PERCENTAGE, BATTERY_TEMP, DRIVE_MODE_STATUS] {
            assert_eq!(panel.text(id), "");
        }
    }
}
