// PulseAudio implementation of the inventory's server interface, using pulsectl-rs
//
// A single SinkController connection serves all three lists; sources and modules are
// read through its handler's introspector the same way pulsectl reads sinks.
use crate::error::InventoryError;
use crate::inventory::AudioServer;
use crate::records::{RawDevice, RawModule};
use libpulse_binding::callbacks::ListResult;
use libpulse_binding::context::introspect::{ModuleInfo, SinkInfo, SourceInfo};
use pulsectl::controllers::SinkController;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt::Debug;
use std::rc::Rc;
use tracing::{error, info, warn};

pub struct PulseServer {
    controller: SinkController,
}

impl PulseServer {
    /// Open the connection. Fails with `InventoryError::Connection` when no
    /// server is reachable.
    pub fn connect() -> Result<Self, InventoryError> {
        info!("Connecting to PulseAudio daemon");
        let controller = SinkController::create().map_err(|e| {
            error!("Failed to create SinkController: {}", e);
            InventoryError::Connection(e.to_string())
        })?;
        Ok(Self { controller })
    }

    fn wait<G: ?Sized>(
        &mut self,
        what: &'static str,
        op: libpulse_binding::operation::Operation<G>,
    ) -> Result<(), InventoryError> {
        self.controller.handler.wait_for_operation(op).map_err(|e| {
            error!("Failed to list {}: {}", what, e);
            InventoryError::Query {
                what,
                reason: e.to_string(),
            }
        })
    }
}

/// Items gathered by one introspection callback, plus whether the server
/// reported an error part way through.
struct Listing<T> {
    items: Rc<RefCell<Vec<T>>>,
    failed: Rc<Cell<bool>>,
}

impl<T> Clone for Listing<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            failed: self.failed.clone(),
        }
    }
}

impl<T> Listing<T> {
    fn new() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
            failed: Rc::new(Cell::new(false)),
        }
    }

    fn push(&self, what: &'static str, result: ListResult<T>) {
        match result {
            ListResult::Item(item) => self.items.borrow_mut().push(item),
            ListResult::End => {}
            ListResult::Error => {
                warn!("Server reported an error while listing {}", what);
                self.failed.set(true);
            }
        }
    }

    /// A listing the server broke off is an error, not a short inventory.
    fn finish(self, what: &'static str) -> Result<Vec<T>, InventoryError> {
        if self.failed.get() {
            return Err(InventoryError::Query {
                what,
                reason: "server reported an error during listing".to_string(),
            });
        }
        Ok(self.items.take())
    }
}

fn convert<A, T>(result: ListResult<A>, f: impl FnOnce(A) -> T) -> ListResult<T> {
    match result {
        ListResult::Item(item) => ListResult::Item(f(item)),
        ListResult::End => ListResult::End,
        ListResult::Error => ListResult::Error,
    }
}

fn text(value: &Option<Cow<'_, str>>) -> String {
    value.as_deref().unwrap_or_default().to_string()
}

// "Running" -> "running"
fn state_token(state: impl Debug) -> String {
    format!("{:?}", state).to_lowercase()
}

impl AudioServer for PulseServer {
    fn sources(&mut self) -> Result<Vec<RawDevice>, InventoryError> {
        let listing = Listing::new();
        let callback_listing = listing.clone();
        let op = self.controller.handler.introspect.get_source_info_list(
            move |result: ListResult<&SourceInfo>| {
                callback_listing.push(
                    "sources",
                    convert(result, |source| RawDevice {
                        index: source.index,
                        name: text(&source.name),
                        driver: text(&source.driver),
                        state: state_token(source.state),
                        description: text(&source.description),
                    }),
                )
            },
        );
        self.wait("sources", op)?;
        listing.finish("sources")
    }

    fn sinks(&mut self) -> Result<Vec<RawDevice>, InventoryError> {
        let listing = Listing::new();
        let callback_listing = listing.clone();
        let op = self.controller.handler.introspect.get_sink_info_list(
            move |result: ListResult<&SinkInfo>| {
                callback_listing.push(
                    "sinks",
                    convert(result, |sink| RawDevice {
                        index: sink.index,
                        name: text(&sink.name),
                        driver: text(&sink.driver),
                        state: state_token(sink.state),
                        description: text(&sink.description),
                    }),
                )
            },
        );
        self.wait("sinks", op)?;
        listing.finish("sinks")
    }

    fn modules(&mut self) -> Result<Vec<RawModule>, InventoryError> {
        let listing = Listing::new();
        let callback_listing = listing.clone();
        let op = self.controller.handler.introspect.get_module_info_list(
            move |result: ListResult<&ModuleInfo>| {
                callback_listing.push(
                    "modules",
                    convert(result, |module| RawModule {
                        index: module.index,
                        name: text(&module.name),
                        argument: module.argument.as_deref().map(str::to_string),
                    }),
                )
            },
        );
        self.wait("modules", op)?;
        listing.finish("modules")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libpulse_binding::def::{SinkState, SourceState};

    #[test]
    fn test_state_tokens_match_classifier_input() {
        assert_eq!(state_token(SourceState::Running), "running");
        assert_eq!(state_token(SinkState::Suspended), "suspended");
        assert_eq!(state_token(SinkState::Idle), "idle");
    }

    #[test]
    fn test_completed_listing_returns_items() {
        let listing = Listing::new();
        listing.push("modules", ListResult::Item(RawModule { index: 3, ..Default::default() }));
        listing.push("modules", ListResult::Item(RawModule { index: 5, ..Default::default() }));
        listing.push("modules", ListResult::End);

        let modules = listing.finish("modules").unwrap();
        assert_eq!(modules.iter().map(|m| m.index).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_listing_error_is_not_an_empty_inventory() {
        let listing: Listing<RawDevice> = Listing::new();
        listing.push("sources", ListResult::Error);
        listing.push("sources", ListResult::End);
        assert!(matches!(
            listing.finish("sources"),
            Err(InventoryError::Query { what: "sources", .. })
        ));
    }

    #[test]
    fn test_listing_error_after_items_drops_partial_list() {
        let listing = Listing::new();
        listing.push("sinks", ListResult::Item(RawDevice::default()));
        listing.push("sinks", ListResult::Error);
        assert!(listing.finish("sinks").is_err());
    }

    #[test]
    fn test_convert_keeps_list_markers() {
        assert!(matches!(convert(ListResult::Item(2), |n: i32| n * 10), ListResult::Item(20)));
        assert!(matches!(convert(ListResult::<i32>::End, |n| n), ListResult::End));
        assert!(matches!(convert(ListResult::<i32>::Error, |n| n), ListResult::Error));
    }

    #[test]
    fn test_missing_text_is_empty() {
        assert_eq!(text(&None), "");
        assert_eq!(text(&Some(Cow::Borrowed("Built-in Audio"))), "Built-in Audio");
    }
}
