//! Lifecycle of the shim: from an absent runtime to intercepted, and back.
//!
//! ```text
//!   UNINSTALLED ──install()──▶ INSTALLED
//!        ▲                         │
//!        └──────on_cleanup()───────┘
//! ```

use tracing::{debug, info};

use crate::{shim::Shim, Result};

/// Result of [`Shim::install`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The factory export was intercepted.
    Installed,
    /// The factory export was already intercepted; nothing was done.
    AlreadyInstalled,
    /// The target module is not loaded yet. Call [`Shim::install`] again later.
    ModuleAbsent,
    /// The target module is the module hosting this crate, which must not intercept itself.
    SelfHosted,
}

impl Shim {
    /// Intercepts the interface factory export of the target runtime, if it is loaded.
    ///
    /// Idempotent: once installed, further calls do nothing until [`on_cleanup`] resets the
    /// shim. A missing target module is not an error; the embedder is expected to retry,
    /// e.g. whenever a new module is loaded into the process. After a cleanup the runtime is
    /// usually still loaded and no such event follows, so the embedder calls this again
    /// itself before the next session.
    ///
    /// [`on_cleanup`]: Shim::on_cleanup
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InstallFailed`] if the backend could not intercept the export.
    /// The shim stays uninstalled and the call can be retried.
    pub fn install(&self) -> Result<InstallOutcome> {
        let mut state = lock!(self.state);
        if state.module_intercept_installed {
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        let module_name = self.config.module_name.as_str();
        let Some(module) = self.probe.loaded_module(module_name) else {
            debug!(module = module_name, "target runtime not loaded yet");
            return Ok(InstallOutcome::ModuleAbsent);
        };
        if module == self.probe.self_module() {
            debug!(module = module_name, "target runtime is the hosting module");
            return Ok(InstallOutcome::SelfHosted);
        }

        info!(module = module_name, "target runtime is loaded, installing intercepts");
        self.install_export_intercept(module)?;
        state.module_intercept_installed = true;

        Ok(InstallOutcome::Installed)
    }

    /// Ends a load cycle of the target runtime.
    ///
    /// Runs the original cleanup first, then removes every intercept this shim installed,
    /// including the factory export, and resets the process-wide state. A later
    /// [`install`](Shim::install) starts from scratch.
    ///
    /// # Arguments
    ///
    /// * `call_original` - Invokes the original `IVRClientCore::Cleanup`
    pub fn on_cleanup<F>(&self, call_original: F)
    where
        F: FnOnce(),
    {
        call_original();

        info!("IVRClientCore::Cleanup was called, removing intercepts");
        let mut state = lock!(self.state);
        self.remove_all_intercepts();
        state.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Arc};

    use super::*;
    use crate::{
        config::ShimConfig,
        forward::NoopObserver,
        runtime::{InterceptId, ModuleHandle},
        test::{instance, MockBackend, MockProbe},
        Error,
    };

    const RUNTIME: ModuleHandle = ModuleHandle::new(0x7ff0_0000);

    fn shim(backend: &MockBackend, probe: MockProbe) -> Shim {
        Shim::new(backend.clone(), probe, Arc::new(NoopObserver))
    }

    #[test]
    fn test_absent_module_defers() {
        let backend = MockBackend::new();
        let shim = shim(&backend, MockProbe::absent());

        assert_eq!(shim.install().unwrap(), InstallOutcome::ModuleAbsent);
        assert!(!shim.is_installed());
        assert!(backend.export_installs().is_empty());
    }

    #[test]
    fn test_install_is_idempotent() {
        let backend = MockBackend::new();
        let shim = shim(&backend, MockProbe::loaded(RUNTIME));

        assert_eq!(shim.install().unwrap(), InstallOutcome::Installed);
        assert_eq!(shim.install().unwrap(), InstallOutcome::AlreadyInstalled);

        assert!(shim.is_installed());
        assert_eq!(
            backend.export_installs(),
            vec![("VRClientCoreFactory".to_string(), RUNTIME)]
        );
        assert!(shim.original(InterceptId::ClientCoreFactory).is_some());
    }

    #[test]
    fn test_install_uses_configured_names() {
        let backend = MockBackend::new();
        let probe = MockProbe::loaded(RUNTIME).named("vrclient_test.so");
        let shim = shim(&backend, probe).with_config(
            ShimConfig::new()
                .with_module_name("vrclient_test.so")
                .with_factory_export("TestFactory"),
        );

        assert_eq!(shim.install().unwrap(), InstallOutcome::Installed);
        assert_eq!(
            backend.export_installs(),
            vec![("TestFactory".to_string(), RUNTIME)]
        );
    }

    #[test]
    fn test_self_hosted_module_is_refused() {
        let backend = MockBackend::new();
        let shim = shim(&backend, MockProbe::loaded(RUNTIME).hosting(RUNTIME));

        assert_eq!(shim.install().unwrap(), InstallOutcome::SelfHosted);
        assert!(!shim.is_installed());
        assert!(backend.export_installs().is_empty());
    }

    #[test]
    fn test_failed_install_can_be_retried() {
        let backend = MockBackend::new().failing_on(InterceptId::ClientCoreFactory);
        let shim = shim(&backend, MockProbe::loaded(RUNTIME));

        assert!(matches!(
            shim.install(),
            Err(Error::InstallFailed {
                id: InterceptId::ClientCoreFactory,
                ..
            })
        ));
        assert!(!shim.is_installed());

        backend.clear_failure();
        assert_eq!(shim.install().unwrap(), InstallOutcome::Installed);
    }

    #[test]
    fn test_cleanup_forwards_then_resets() {
        let backend = MockBackend::new();
        let shim = shim(&backend, MockProbe::loaded(RUNTIME));

        shim.install().unwrap();
        shim.on_interface_resolved("IVRClientCore_003", Some(instance(0x10)))
            .unwrap();
        shim.on_interface_resolved("IVRCompositor_027", Some(instance(0x20)))
            .unwrap();
        shim.on_interface_resolved("IVRSystem_022", Some(instance(0x30)))
            .unwrap();
        assert_eq!(shim.intercepts().len(), 5);

        let forwarded = Cell::new(false);
        shim.on_cleanup(|| {
            assert_eq!(shim.intercepts().len(), 5);
            forwarded.set(true);
        });

        assert!(forwarded.get());
        assert!(shim.intercepts().is_empty());
        assert!(shim.state().is_empty());
        assert_eq!(
            backend.removed(),
            vec![
                InterceptId::ClientCoreFactory,
                InterceptId::GetGenericInterface,
                InterceptId::Cleanup,
                InterceptId::SubmitCurrent,
                InterceptId::RecommendedRenderTargetSize,
            ]
        );
    }

    #[test]
    fn test_cycle_restarts_from_scratch() {
        let backend = MockBackend::new();
        let shim = shim(&backend, MockProbe::loaded(RUNTIME));

        shim.install().unwrap();
        shim.on_interface_resolved("IVRCompositor_009", Some(instance(0x20)))
            .unwrap();
        shim.on_cleanup(|| {});

        assert_eq!(shim.install().unwrap(), InstallOutcome::Installed);
        shim.on_interface_resolved("IVRCompositor_027", Some(instance(0x40)))
            .unwrap();

        assert_eq!(
            shim.state().revision(crate::interface::InterfaceFamily::Compositor),
            Some(27)
        );
        assert_eq!(backend.export_installs().len(), 2);
        assert_eq!(
            backend.slot_installs(),
            vec![
                ("IVRCompositor::Submit".to_string(), 4, InterceptId::SubmitCurrent),
                ("IVRCompositor::Submit".to_string(), 5, InterceptId::SubmitCurrent),
            ]
        );
    }
}
