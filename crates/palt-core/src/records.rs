// Display records built fresh from every server snapshot
use crate::arguments::parse_module_arguments;
use crate::state::{classify_state, StateColor};
use tracing::debug;

/// Module argument keys shown in a module's list entry, in display order.
const PRINTABLE_ATTRIBUTES: [&str; 5] = ["sink_name", "source_name", "sink", "source", "master"];

/// A source or sink as the server reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDevice {
    pub index: u32,
    pub name: String,
    pub driver: String,
    pub state: String,
    pub description: String,
}

/// A loaded module as the server reports it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModule {
    pub index: u32,
    pub name: String,
    pub argument: Option<String>,
}

/// Module types this tool lists and manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    NullSink,
    Loopback,
    NullSource,
    RemapSource,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 4] = [
        ModuleKind::NullSink,
        ModuleKind::Loopback,
        ModuleKind::NullSource,
        ModuleKind::RemapSource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleKind::NullSink => "module-null-sink",
            ModuleKind::Loopback => "module-loopback",
            ModuleKind::NullSource => "module-null-source",
            ModuleKind::RemapSource => "module-remap-source",
        }
    }

    /// `None` for any module type outside the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub id: u32,
    pub name: String,
    pub driver: String,
    pub state: String,
    pub color: StateColor,
    pub nice_name: String,
}

impl DeviceRecord {
    pub fn new(id: u32, name: &str, driver: &str, state: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            driver: driver.to_string(),
            state: state.to_string(),
            color: classify_state(state),
            nice_name: format!("{} {} {}", id, description, state.to_uppercase()),
        }
    }
}

impl From<&RawDevice> for DeviceRecord {
    fn from(raw: &RawDevice) -> Self {
        let record = Self::new(raw.index, &raw.name, &raw.driver, &raw.state, &raw.description);
        debug!("Device {} -> {:?} ({})", raw.index, record.nice_name, record.color);
        record
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub id: u32,
    pub name: String,
    pub nice_name: String,
    pub color: StateColor,
}

impl ModuleRecord {
    pub fn new(id: u32, name: &str, argument: Option<&str>) -> Self {
        let attributes = parse_module_arguments(argument.unwrap_or_default());
        let shown: Vec<String> = PRINTABLE_ATTRIBUTES
            .iter()
            .filter_map(|key| attributes.get(*key).map(|value| format!("{}={}", key, value)))
            .collect();

        let nice_name = if shown.is_empty() {
            format!("{} {}", id, name)
        } else {
            format!("{} {} {}", id, name, shown.join(" "))
        };

        Self {
            id,
            name: name.to_string(),
            nice_name,
            color: StateColor::Neutral,
        }
    }

    pub fn kind(&self) -> Option<ModuleKind> {
        ModuleKind::from_name(&self.name)
    }
}

impl From<&RawModule> for ModuleRecord {
    fn from(raw: &RawModule) -> Self {
        let record = Self::new(raw.index, &raw.name, raw.argument.as_deref());
        debug!("Module {} -> {:?}", raw.index, record.nice_name);
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_nice_name_and_color() {
        let record = DeviceRecord::new(5, "alsa_output.pci", "module-alsa-card.c", "RUNNING", "Built-in Audio");
        assert_eq!(record.nice_name, "5 Built-in Audio RUNNING");
        assert_eq!(record.color, StateColor::Green);
        assert_eq!(record.driver, "module-alsa-card.c");
    }

    #[test]
    fn test_device_state_uppercased_in_nice_name() {
        let raw = RawDevice {
            index: 2,
            name: "vsink.monitor".to_string(),
            driver: "module-null-sink.c".to_string(),
            state: "suspended".to_string(),
            description: "Monitor of vsink".to_string(),
        };
        let record = DeviceRecord::from(&raw);
        assert_eq!(record.nice_name, "2 Monitor of vsink SUSPENDED");
        assert_eq!(record.state, "suspended");
        assert_eq!(record.color, StateColor::Yellow);
    }

    #[test]
    fn test_module_attributes_follow_priority_order() {
        let record = ModuleRecord::new(21, "module-remap-source", Some("master=m1 sink_name=s1"));
        assert_eq!(record.nice_name, "21 module-remap-source sink_name=s1 master=m1");
        assert_eq!(record.color, StateColor::Neutral);
    }

    #[test]
    fn test_module_ignores_unprintable_attributes() {
        let record = ModuleRecord::new(
            30,
            "module-loopback",
            Some("sink=7 source=3 latency_msec=1"),
        );
        assert_eq!(record.nice_name, "30 module-loopback sink=7 source=3");
    }

    #[test]
    fn test_module_without_attributes() {
        assert_eq!(ModuleRecord::new(4, "module-null-sink", None).nice_name, "4 module-null-sink");
        assert_eq!(
            ModuleRecord::new(4, "module-null-sink", Some("rate=48000")).nice_name,
            "4 module-null-sink"
        );
    }

    #[test]
    fn test_module_quoted_attribute() {
        let record = ModuleRecord::new(
            9,
            "module-remap-source",
            Some(r#"master=3 source_name="Desk Mic" source_properties=device.description=Desk"#),
        );
        assert_eq!(record.nice_name, "9 module-remap-source source_name=Desk Mic master=3");
        assert_eq!(record.kind(), Some(ModuleKind::RemapSource));
    }

    #[test]
    fn test_module_kind_allow_list() {
        assert_eq!(ModuleKind::from_name("module-null-sink"), Some(ModuleKind::NullSink));
        assert_eq!(ModuleKind::from_name("module-null-source"), Some(ModuleKind::NullSource));
        assert_eq!(ModuleKind::from_name("module-echo-cancel"), None);
        for kind in ModuleKind::ALL {
            assert_eq!(ModuleKind::from_name(kind.as_str()), Some(kind));
        }
    }
}
