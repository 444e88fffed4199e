//! Capabilities this crate consumes but does not implement.
//!
//! Binary patching and module enumeration are platform specific and live outside this crate.
//! An embedder supplies them by implementing the two traits below, typically on top of an
//! existing detour library and the OS loader API.

use crate::{
    runtime::{FnAddr, InstanceHandle, ModuleHandle, Replacement},
    Result,
};

/// Installs and removes intercepts.
///
/// # Contract
///
/// - Both install methods return the address of the original, un-intercepted implementation.
///   The shim stores it alongside the intercept record and the forwarders call it on every
///   intercepted call, so it must stay valid until [`remove`](Self::remove) is called for the
///   same replacement.
/// - [`remove`](Self::remove) reverses either kind of installation, identified solely by the
///   replacement's identity. Removing something that is not installed is a no-op.
/// - [`original`](Self::original) answers for a replacement from the moment its patch is
///   live until it is removed. Host calls can reach the replacement before the install method
///   has returned, and the shim falls back to this lookup until it has recorded the original.
/// - Implementations must not call [`crate::Shim`]'s registration or lifecycle operations;
///   they are invoked while the shim holds its state lock. Replacements entered by host
///   threads during an install or removal read the registry and `original`, so `original`
///   must not wait on a lock held while a patch is applied or taken down.
///
/// # Thread Safety
///
/// Backends must be `Send + Sync`, intercepted calls can arrive on any host thread.
pub trait InterceptBackend: Send + Sync {
    /// Intercepts the named export of a loaded module.
    ///
    /// # Arguments
    ///
    /// * `export` - The exported symbol name
    /// * `module` - The module exporting it
    /// * `replacement` - The function calls should be redirected to
    ///
    /// # Errors
    ///
    /// Returns an error if the export does not exist or cannot be patched.
    fn install_export(
        &self,
        export: &str,
        module: ModuleHandle,
        replacement: Replacement,
    ) -> Result<FnAddr>;

    /// Intercepts entry `slot` of the dispatch table of the object behind `instance`.
    ///
    /// # Arguments
    ///
    /// * `label` - Human readable call name, e.g. `IVRCompositor::Submit`
    /// * `instance` - The runtime object whose dispatch table is patched
    /// * `slot` - Zero based index into the dispatch table
    /// * `replacement` - The function calls should be redirected to
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be patched.
    fn install_slot(
        &self,
        label: &str,
        instance: InstanceHandle,
        slot: usize,
        replacement: Replacement,
    ) -> Result<FnAddr>;

    /// Removes a previously installed intercept.
    fn remove(&self, replacement: Replacement);

    /// Returns the original implementation behind a live intercept.
    ///
    /// # Returns
    ///
    /// The same address the install method returned (or will return) for `replacement`, or
    /// `None` if the replacement is not currently patched in.
    fn original(&self, replacement: Replacement) -> Option<FnAddr>;
}

/// Answers questions about the modules loaded in the current process.
pub trait ModuleProbe: Send + Sync {
    /// Returns the handle of the named module if it is currently loaded.
    fn loaded_module(&self, name: &str) -> Option<ModuleHandle>;

    /// Returns the handle of the module hosting this crate.
    fn self_module(&self) -> ModuleHandle;
}
