//! The shim context: discovery, registration and teardown of intercepts.
//!
//! A [`Shim`] owns everything one process needs to follow the target runtime through a load
//! cycle: the [`ProcessWideState`] behind a mutex, the [`InterceptRegistry`] with the original
//! implementation of every installed call, the slot policy and the external capabilities.
//!
//! # Architecture
//!
//! The context is driven from three directions:
//!
//! - [`Shim::install`] (lifecycle) looks for the target module and intercepts its interface
//!   factory export
//! - [`Shim::intercept_factory`] (entry point) observes every interface the host requests and
//!   hands it to [`Shim::on_interface_resolved`] (registrar), which installs the per-family
//!   call intercepts
//! - [`Shim::on_cleanup`] (lifecycle) removes everything once the runtime shuts down
//!
//! The context itself is ABI-agnostic. [`crate::ffi`] binds one instance to the process and
//! provides the `extern "C"` replacements that route into it.
//!
//! # Thread Safety
//!
//! [`Shim`] is `Send + Sync`. Registrar and lifecycle transitions serialize on the state
//! mutex; forwarders only touch the lock-free registry.

mod entry;
mod lifecycle;
mod registrar;
mod state;

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

pub use lifecycle::InstallOutcome;
pub use registrar::Registration;
pub use state::ProcessWideState;

use crate::{
    config::ShimConfig,
    forward::CallObserver,
    interface::{CallSite, InterfaceFamily, SlotTable},
    runtime::{
        FnAddr, InstanceHandle, InterceptBackend, InterceptId, InterceptLocation, InterceptRecord,
        InterceptRegistry, ModuleHandle, ModuleProbe, Replacement,
    },
    Error, Result,
};

/// The interception context for one process.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use vrshim::{ffi, forward::NoopObserver, Shim};
///
/// // `DetourBackend` and `LoaderProbe` wrap the platform's patching and loader APIs.
/// let shim = Shim::new(DetourBackend::new(), LoaderProbe, Arc::new(NoopObserver));
/// ffi::bind(shim)?;
/// ffi::install()?;
/// ```
pub struct Shim {
    state: Mutex<ProcessWideState>,
    intercepts: InterceptRegistry,
    backend: Box<dyn InterceptBackend>,
    probe: Box<dyn ModuleProbe>,
    observer: Arc<dyn CallObserver>,
    config: ShimConfig,
    slots: SlotTable,
}

impl Shim {
    /// Creates a context with the default configuration and the built-in slot table.
    ///
    /// # Arguments
    ///
    /// * `backend` - Installs and removes intercepts
    /// * `probe` - Reports the modules loaded in the process
    /// * `observer` - Receives the data of intercepted calls
    #[must_use]
    pub fn new(
        backend: impl InterceptBackend + 'static,
        probe: impl ModuleProbe + 'static,
        observer: Arc<dyn CallObserver>,
    ) -> Self {
        Self {
            state: Mutex::new(ProcessWideState::new()),
            intercepts: InterceptRegistry::new(),
            backend: Box::new(backend),
            probe: Box::new(probe),
            observer,
            config: ShimConfig::default(),
            slots: SlotTable::builtin(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ShimConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the revision to slot policy, e.g. to describe a runtime revision this crate
    /// does not know yet.
    ///
    /// # Arguments
    ///
    /// * `slots` - The policy table used by the registrar
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_slot_table(mut self, slots: SlotTable) -> Self {
        self.slots = slots;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ShimConfig {
        &self.config
    }

    /// Returns the revision to slot policy.
    #[must_use]
    pub fn slot_table(&self) -> &SlotTable {
        &self.slots
    }

    /// Returns the side-effect collaborator.
    #[must_use]
    pub fn observer(&self) -> &dyn CallObserver {
        self.observer.as_ref()
    }

    /// Returns the records of all installed intercepts.
    #[must_use]
    pub fn intercepts(&self) -> &InterceptRegistry {
        &self.intercepts
    }

    /// Returns the original implementation behind an installed intercept.
    ///
    /// This is the address the backend returned when the intercept was installed. While an
    /// install is still in progress the patch can already be live without a record, in which
    /// case the backend is asked directly. `None` if the intercept is not installed.
    #[must_use]
    pub fn original(&self, id: InterceptId) -> Option<FnAddr> {
        self.intercepts
            .original(id)
            .or_else(|| self.backend.original(Replacement::of(id)))
    }

    /// Returns the retained core-client instance, if any.
    #[must_use]
    pub fn core_client(&self) -> Option<InstanceHandle> {
        lock!(self.state).core_client
    }

    /// Returns a copy of the current process-wide state.
    #[must_use]
    pub fn state(&self) -> ProcessWideState {
        lock!(self.state).clone()
    }

    /// Returns `true` while the factory export of the target module is intercepted.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        lock!(self.state).module_intercept_installed
    }

    fn install_failed(id: InterceptId, label: &str, error: Error) -> Error {
        match error {
            Error::InstallFailed { .. } => error,
            other => Error::InstallFailed {
                id,
                label: label.to_string(),
                reason: other.to_string(),
            },
        }
    }

    fn install_export_intercept(&self, module: ModuleHandle) -> Result<()> {
        let id = InterceptId::ClientCoreFactory;
        let export = self.config.factory_export.as_str();

        let original = self
            .backend
            .install_export(export, module, Replacement::of(id))
            .map_err(|e| Self::install_failed(id, export, e))?;

        self.intercepts.insert(InterceptRecord {
            id,
            label: export.to_string(),
            location: InterceptLocation::Export { module },
            original,
        });
        info!(export, ?original, "intercepted interface factory export");
        Ok(())
    }

    fn install_slot_intercept(&self, site: &CallSite, instance: InstanceHandle) -> Result<()> {
        let original = self
            .backend
            .install_slot(
                &site.label,
                instance,
                site.slot,
                Replacement::of(site.intercept),
            )
            .map_err(|e| Self::install_failed(site.intercept, &site.label, e))?;

        self.intercepts.insert(InterceptRecord {
            id: site.intercept,
            label: site.label.clone(),
            location: InterceptLocation::Slot {
                instance,
                slot: site.slot,
            },
            original,
        });
        info!(
            call = %site.label,
            slot = site.slot,
            intercept = %site.intercept,
            ?instance,
            "intercepted dispatch slot"
        );
        Ok(())
    }

    /// Installs every call site of one family on `instance`.
    ///
    /// On failure, whatever was already installed for the family is removed again so that a
    /// family is never left half-intercepted.
    fn install_call_sites(
        &self,
        family: InterfaceFamily,
        sites: &[CallSite],
        instance: InstanceHandle,
    ) -> Result<()> {
        for site in sites {
            if let Err(e) = self.install_slot_intercept(site, instance) {
                self.remove_family_intercepts(family);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Unpatches `id`, then forgets its record. The record outlives the patch so that calls
    /// arriving during removal still reach the original.
    fn remove_intercept(&self, id: InterceptId) {
        if !self.intercepts.contains(id) {
            return;
        }
        self.backend.remove(Replacement::of(id));
        if let Some(record) = self.intercepts.remove(id) {
            debug!(intercept = %id, label = %record.label, "removed intercept");
        }
    }

    fn remove_family_intercepts(&self, family: InterfaceFamily) {
        for id in self.intercepts.ids() {
            if id.family() == Some(family) {
                self.remove_intercept(id);
            }
        }
    }

    fn remove_all_intercepts(&self) {
        for id in self.intercepts.ids() {
            self.remove_intercept(id);
        }
    }
}
