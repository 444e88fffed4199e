//! Entry point interception: observing the runtime's interface factories.

use std::ffi::{c_void, CStr};

use tracing::error;

use crate::{runtime::InstanceHandle, shim::Shim};

impl Shim {
    /// Runs one intercepted interface factory call.
    ///
    /// Used for both the module export `VRClientCoreFactory` and the object-level
    /// `IVRClientCore::GetGenericInterface`. The original factory runs first and its result is
    /// returned untouched; in between, the instance is handed to the registrar. Registrar
    /// errors are logged, never surfaced to the caller.
    ///
    /// # Arguments
    ///
    /// * `name` - The interface name the host requested
    /// * `call_original` - Invokes the original factory and returns its instance pointer
    ///
    /// # Returns
    ///
    /// Exactly the pointer returned by `call_original`.
    pub fn intercept_factory<F>(&self, name: &CStr, call_original: F) -> *mut c_void
    where
        F: FnOnce() -> *mut c_void,
    {
        let instance = call_original();

        let name = name.to_string_lossy();
        if let Err(e) = self.on_interface_resolved(&name, InstanceHandle::new(instance)) {
            error!("{e}");
        }

        instance
    }
}
