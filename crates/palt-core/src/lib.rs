// Core of the PulseAudio loopback tool: turns what the sound server reports
// into display records and issues the pactl commands that change it.
pub mod arguments;
pub mod commands;
pub mod error;
pub mod inventory;
pub mod pulse;
pub mod records;
pub mod settings;
pub mod state;

pub use arguments::parse_module_arguments;
pub use commands::{CommandOutcome, CommandRunner, CommandService, Invocation, SystemRunner};
pub use error::{InventoryError, SettingsError};
pub use inventory::{AudioServer, Inventory, Snapshot};
pub use pulse::PulseServer;
pub use records::{DeviceRecord, ModuleKind, ModuleRecord, RawDevice, RawModule};
pub use settings::Settings;
pub use state::{classify_state, StateColor};
