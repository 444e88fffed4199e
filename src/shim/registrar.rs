//! Interface registrar: turns observed interface requests into installed call intercepts.

use strum::IntoEnumIterator;
use tracing::{debug, error, info};

use crate::{
    interface::{InterfaceFamily, InterfaceVersion},
    runtime::{InstanceHandle, InterceptId},
    shim::{ProcessWideState, Shim},
    Result,
};

/// What the registrar did with one observed interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// The factory returned no instance; nothing to intercept.
    Ignored,
    /// The name belongs to no tracked family.
    Untracked,
    /// The family's call intercepts were installed on the instance.
    Installed(InterfaceVersion),
    /// The family was already resolved in this load cycle; the request changed nothing.
    AlreadyResolved {
        /// The version of this request
        requested: InterfaceVersion,
        /// The revision recorded by the first request of the family
        recorded: u32,
    },
    /// No dispatch layout is known for this revision; the family stays un-intercepted.
    Unsupported(InterfaceVersion),
}

impl Shim {
    /// Handles an interface instance obtained from the target runtime.
    ///
    /// For the core client, the two object-level intercepts are removed and, if the revision
    /// is supported, installed again on `instance`, which is then retained for re-entry. Every
    /// other tracked family is resolved once per load cycle: the first instance seen records
    /// the family's revision and receives the call intercepts for it, later requests are
    /// left alone.
    ///
    /// The check for an already resolved family and the installation happen under the state
    /// lock, so concurrent requests never install a family twice.
    ///
    /// # Arguments
    ///
    /// * `name` - The interface name requested by the host, e.g. `IVRCompositor_027`
    /// * `instance` - The instance returned by the runtime, `None` if it returned null
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InstallFailed`] if the backend refused an intercept. The
    /// family's revision stays recorded and none of its intercepts remain installed.
    pub fn on_interface_resolved(
        &self,
        name: &str,
        instance: Option<InstanceHandle>,
    ) -> Result<Registration> {
        debug!(
            interface = name,
            null = instance.is_none(),
            "requested interface"
        );

        let Some(instance) = instance else {
            return Ok(Registration::Ignored);
        };
        let Some(version) = InterfaceVersion::parse(name) else {
            return Ok(Registration::Untracked);
        };

        let mut state = lock!(self.state);
        match version.family {
            InterfaceFamily::ClientCore => self.register_core_client(&mut state, version, instance),
            _ => self.register_family(&mut state, version, instance),
        }
    }

    fn register_core_client(
        &self,
        state: &mut ProcessWideState,
        version: InterfaceVersion,
        instance: InstanceHandle,
    ) -> Result<Registration> {
        for id in InterceptId::iter().filter(|id| id.family() == Some(version.family)) {
            self.remove_intercept(id);
        }

        let sites = match self.slots.resolve(version) {
            Ok(sites) if !sites.is_empty() => sites,
            Ok(_) => {
                error!(%version, "no call sites known for this interface");
                state.core_client = None;
                return Ok(Registration::Unsupported(version));
            }
            Err(e) => {
                error!("{e}");
                state.core_client = None;
                return Ok(Registration::Unsupported(version));
            }
        };

        if let Err(e) = self.install_call_sites(version.family, &sites, instance) {
            state.core_client = None;
            return Err(e);
        }

        state.core_client = Some(instance);
        info!(%version, ?instance, "retained core client");
        Ok(Registration::Installed(version))
    }

    fn register_family(
        &self,
        state: &mut ProcessWideState,
        version: InterfaceVersion,
        instance: InstanceHandle,
    ) -> Result<Registration> {
        if let Some(recorded) = state.revision(version.family) {
            debug!(%version, recorded, "family already resolved in this cycle");
            return Ok(Registration::AlreadyResolved {
                requested: version,
                recorded,
            });
        }
        state.resolved.insert(version.family, version.revision);

        match self.slots.resolve(version) {
            Ok(sites) if !sites.is_empty() => {
                self.install_call_sites(version.family, &sites, instance)?;
                Ok(Registration::Installed(version))
            }
            Ok(_) => {
                error!(%version, "no call sites known for this interface");
                Ok(Registration::Unsupported(version))
            }
            Err(e) => {
                error!("{e}");
                Ok(Registration::Unsupported(version))
            }
        }
    }
}
