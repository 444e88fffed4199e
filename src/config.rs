//! Configuration of a [`crate::Shim`].
//!
//! The defaults describe the stock OpenVR client library. They only need changing when the
//! runtime is loaded under a different file name, or to re-enter the runtime with a different
//! `IVRSystem` revision than the one this crate was written against.

use std::ffi::{CStr, CString};

/// Default file name of the target runtime module for the current platform.
#[cfg(all(windows, target_pointer_width = "64"))]
pub const DEFAULT_MODULE_NAME: &str = "vrclient_x64.dll";
/// Default file name of the target runtime module for the current platform.
#[cfg(all(windows, not(target_pointer_width = "64")))]
pub const DEFAULT_MODULE_NAME: &str = "vrclient.dll";
/// Default file name of the target runtime module for the current platform.
#[cfg(not(windows))]
pub const DEFAULT_MODULE_NAME: &str = "vrclient.so";

/// Name of the module-level interface factory export.
pub const DEFAULT_FACTORY_EXPORT: &str = "VRClientCoreFactory";

/// `IVRSystem` interface name requested when re-entering the runtime (`IVRSystem_Version`).
pub const DEFAULT_SYSTEM_INTERFACE: &CStr = c"IVRSystem_022";

/// Names the shim uses to find and re-enter the target runtime.
///
/// # Examples
///
/// ```rust
/// use vrshim::ShimConfig;
///
/// let config = ShimConfig::new().with_module_name("vrclient_custom.dll");
/// assert_eq!(config.module_name, "vrclient_custom.dll");
/// assert_eq!(config.factory_export, "VRClientCoreFactory");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimConfig {
    /// File name of the target runtime module, as passed to the [`crate::ModuleProbe`].
    pub module_name: String,
    /// Export of the target module to intercept as the interface factory.
    pub factory_export: String,
    /// Interface name requested by [`crate::ffi::system_interface`].
    pub system_interface: CString,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            factory_export: DEFAULT_FACTORY_EXPORT.to_string(),
            system_interface: DEFAULT_SYSTEM_INTERFACE.to_owned(),
        }
    }
}

impl ShimConfig {
    /// Creates a configuration for the stock OpenVR client library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the file name of the target runtime module.
    ///
    /// # Arguments
    ///
    /// * `name` - Module file name, e.g. `vrclient_x64.dll`
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    /// Sets the name of the interface factory export.
    #[must_use]
    pub fn with_factory_export(mut self, export: impl Into<String>) -> Self {
        self.factory_export = export.into();
        self
    }

    /// Sets the `IVRSystem` interface name requested on re-entry.
    ///
    /// # Arguments
    ///
    /// * `name` - Interface name, e.g. `IVRSystem_019`
    ///
    /// # Returns
    ///
    /// Returns `self` for method chaining.
    #[must_use]
    pub fn with_system_interface(mut self, name: impl Into<CString>) -> Self {
        self.system_interface = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShimConfig::default();
        assert_eq!(config.module_name, DEFAULT_MODULE_NAME);
        assert_eq!(config.factory_export, "VRClientCoreFactory");
        assert_eq!(config.system_interface.as_c_str(), c"IVRSystem_022");
    }

    #[test]
    fn test_builder_overrides() {
        let config = ShimConfig::new()
            .with_module_name("vrclient.dll")
            .with_factory_export("OtherFactory")
            .with_system_interface(c"IVRSystem_019");

        assert_eq!(config.module_name, "vrclient.dll");
        assert_eq!(config.factory_export, "OtherFactory");
        assert_eq!(config.system_interface.as_c_str(), c"IVRSystem_019");
    }
}
