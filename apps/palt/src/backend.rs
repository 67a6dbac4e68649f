// Async bridge between the UI and the blocking core.
//
// The PulseAudio connection is not Send, so it is created, used and dropped
// inside a single blocking task.
use palt_core::{
    CommandOutcome, CommandRunner, CommandService, Inventory, InventoryError, PulseServer, Snapshot,
    SystemRunner,
};
use tracing::error;

/// One mutating action the user asked for, with the entry values it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Loopback { source: String, sink: String },
    VirtualSink { name: String },
    RemapSource { name: String, source: String },
    DeleteModule { id: String },
}

impl Request {
    pub fn execute<R: CommandRunner>(&self, commands: &CommandService<R>) -> CommandOutcome {
        match self {
            Request::Loopback { source, sink } => commands.create_loopback(source, sink),
            Request::VirtualSink { name } => commands.create_virtual_sink(name),
            Request::RemapSource { name, source } => commands.create_remapped_source(name, source),
            Request::DeleteModule { id } => commands.delete_module(id),
        }
    }
}

pub async fn refresh() -> Result<Snapshot, String> {
    tokio::task::spawn_blocking(|| -> Result<Snapshot, InventoryError> {
        let mut inventory = Inventory::new(PulseServer::connect()?);
        inventory.snapshot()
    })
    .await
    .map_err(|e| {
        error!("Task join error during refresh: {}", e);
        format!("Task error: {}", e)
    })?
    .map_err(|e| e.to_string())
}

pub async fn execute(commands: CommandService<SystemRunner>, request: Request) -> CommandOutcome {
    tokio::task::spawn_blocking(move || request.execute(&commands))
        .await
        .unwrap_or_else(|e| {
            error!("Task join error running command: {}", e);
            CommandOutcome::Unexpected(-1)
        })
}

pub async fn open_volume_control(commands: CommandService<SystemRunner>) -> bool {
    tokio::task::spawn_blocking(move || commands.open_volume_control())
        .await
        .unwrap_or(false)
}
