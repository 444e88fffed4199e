use thiserror::Error;

use crate::{interface::InterfaceFamily, runtime::InterceptId};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// None of these conditions are fatal to the hosted application. The FFI layer logs them and
/// keeps forwarding calls to the target runtime untouched; the Rust API returns them so that
/// embedders and tests can observe what went wrong.
///
/// # Error Categories
///
/// ## Interception Errors
/// - [`Error::InstallFailed`] - The interception backend refused to install an intercept
/// - [`Error::UnsupportedRevision`] - No dispatch slot is known for an interface revision
///
/// ## Binding Errors
/// - [`Error::AlreadyBound`] - A shim context is already bound to the process
/// - [`Error::NotBound`] - The FFI layer was used before a shim context was bound
///
/// # Examples
///
/// ```rust,no_run
/// use vrshim::{Error, InstallOutcome, Shim};
///
/// fn try_install(shim: &Shim) {
///     match shim.install() {
///         Ok(InstallOutcome::Installed) => println!("factory intercepted"),
///         Ok(outcome) => println!("nothing to do yet: {outcome:?}"),
///         Err(Error::InstallFailed { label, reason, .. }) => {
///             eprintln!("could not intercept {label}: {reason}");
///         }
///         Err(e) => eprintln!("other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The interception backend failed to install an intercept.
    ///
    /// # Fields
    ///
    /// * `id` - Identity of the replacement that was being installed
    /// * `label` - Human readable call-site label (export name or `Interface::Method`)
    /// * `reason` - Backend provided description of the failure
    #[error("Failed to install intercept {id} at {label}: {reason}")]
    InstallFailed {
        /// The intercept that could not be installed
        id: InterceptId,
        /// The call-site label passed to the backend
        label: String,
        /// The failure reported by the backend
        reason: String,
    },

    /// The slot policy table has no entry for this interface revision.
    ///
    /// The corresponding feature stays inactive; calls are forwarded untouched.
    #[error("Don't know how to intercept revision {revision} of {family}")]
    UnsupportedRevision {
        /// The interface family that was requested
        family: InterfaceFamily,
        /// The revision parsed from the interface name
        revision: u32,
    },

    /// A [`crate::Shim`] is already bound to the process-wide FFI slot.
    #[error("A shim context is already bound to this process")]
    AlreadyBound,

    /// No [`crate::Shim`] has been bound to the process-wide FFI slot yet.
    #[error("No shim context is bound to this process")]
    NotBound,

    /// Generic error for miscellaneous failures.
    ///
    /// Mostly used by interception backends to report platform errors.
    #[error("{0}")]
    Error(String),
}
