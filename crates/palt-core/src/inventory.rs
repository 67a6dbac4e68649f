// Read side: sources, sinks and modules turned into display records
use crate::error::InventoryError;
use crate::records::{DeviceRecord, ModuleKind, ModuleRecord, RawDevice, RawModule};
use tracing::{debug, info};

/// The audio server's control interface, as far as the inventory needs it.
pub trait AudioServer {
    fn sources(&mut self) -> Result<Vec<RawDevice>, InventoryError>;
    fn sinks(&mut self) -> Result<Vec<RawDevice>, InventoryError>;
    fn modules(&mut self) -> Result<Vec<RawModule>, InventoryError>;
}

/// Everything a global refresh shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub sources: Vec<DeviceRecord>,
    pub sinks: Vec<DeviceRecord>,
    pub modules: Vec<ModuleRecord>,
}

impl Snapshot {
    /// Modules of one kind, in server order.
    pub fn modules_of(&self, kind: ModuleKind) -> impl Iterator<Item = &ModuleRecord> {
        self.modules
            .iter()
            .filter(move |module| module.kind() == Some(kind))
    }
}

pub struct Inventory<S> {
    server: S,
}

impl<S: AudioServer> Inventory<S> {
    pub fn new(server: S) -> Self {
        Self { server }
    }

    pub fn list_sources(&mut self) -> Result<Vec<DeviceRecord>, InventoryError> {
        let sources = self.server.sources()?;
        debug!("Server reported {} sources", sources.len());
        Ok(sources.iter().map(DeviceRecord::from).collect())
    }

    pub fn list_sinks(&mut self) -> Result<Vec<DeviceRecord>, InventoryError> {
        let sinks = self.server.sinks()?;
        debug!("Server reported {} sinks", sinks.len());
        Ok(sinks.iter().map(DeviceRecord::from).collect())
    }

    /// Allow-listed modules only; everything else the server has loaded is dropped.
    pub fn list_modules(&mut self) -> Result<Vec<ModuleRecord>, InventoryError> {
        let modules = self.server.modules()?;
        let total = modules.len();
        let listed: Vec<ModuleRecord> = modules
            .iter()
            .filter(|module| ModuleKind::from_name(&module.name).is_some())
            .map(ModuleRecord::from)
            .collect();
        debug!("Server reported {} modules, {} listable", total, listed.len());
        Ok(listed)
    }

    pub fn snapshot(&mut self) -> Result<Snapshot, InventoryError> {
        info!("Refreshing inventory");
        Ok(Snapshot {
            sources: self.list_sources()?,
            sinks: self.list_sinks()?,
            modules: self.list_modules()?,
        })
    }

    pub fn into_inner(self) -> S {
        self.server
    }
}
