//! Opaque handles exchanged with the target runtime and the interception backend.
//!
//! - [`FnAddr`]: a code address (original implementation or replacement)
//! - [`InstanceHandle`]: a non-null runtime object returned by an interface factory
//! - [`ModuleHandle`]: a loaded module as reported by a [`ModuleProbe`](super::ModuleProbe)
//! - [`InterceptId`]: identity of one replacement function this crate can install
//! - [`Replacement`]: an [`InterceptId`] together with the address of its replacement

use std::{ffi::c_void, fmt, ptr::NonNull};

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

use crate::interface::InterfaceFamily;

/// Address of a function inside the process.
///
/// This is the currency of the interception backend: it returns the original implementation
/// of every call it patches as an `FnAddr`, and receives replacements the same way. Turning
/// an address back into a callable function pointer is the job of the [`crate::ffi`] layer,
/// which knows the signature of every call.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FnAddr(usize);

impl FnAddr {
    /// Wraps a raw address.
    #[must_use]
    pub const fn new(addr: usize) -> Self {
        Self(addr)
    }

    /// Wraps a raw code pointer.
    #[must_use]
    pub fn from_ptr(ptr: *const c_void) -> Self {
        Self(ptr as usize)
    }

    /// Returns the raw address.
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Returns the address as a raw pointer.
    #[must_use]
    pub fn as_ptr(self) -> *const c_void {
        self.0 as *const c_void
    }

    /// Returns `true` for the null address.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for FnAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FnAddr({:#x})", self.0)
    }
}

/// Opaque reference to an object owned by the target runtime.
///
/// Handles are never null, never freed and never dereferenced by this crate. They are only
/// handed to the interception backend (to patch the object's dispatch table) and, for the
/// core client, retained to re-enter the runtime later.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InstanceHandle(NonNull<c_void>);

// The handle is an address owned by the runtime; this crate never dereferences it.
unsafe impl Send for InstanceHandle {}
unsafe impl Sync for InstanceHandle {}

impl InstanceHandle {
    /// Wraps a pointer returned by a runtime factory, `None` if it is null.
    #[must_use]
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Returns the raw object pointer.
    #[must_use]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

impl fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceHandle({:p})", self.0)
    }
}

/// A module loaded in the process, as reported by a [`ModuleProbe`](super::ModuleProbe).
///
/// Only compared for equality (self-injection guard) and passed back to the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ModuleHandle(usize);

impl ModuleHandle {
    /// Wraps a raw module handle (base address, `HMODULE`, `dlopen` handle, ...).
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Returns the raw module handle.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

/// Identity of a replacement function.
///
/// Every call this crate can intercept has exactly one replacement, so the identity doubles
/// as the key under which intercepts are installed, looked up and removed.
///
/// | Identity | Installed at | Forwarder |
/// |----------|--------------|-----------|
/// | [`ClientCoreFactory`](Self::ClientCoreFactory) | module export | observe |
/// | [`GetGenericInterface`](Self::GetGenericInterface) | `IVRClientCore` slot | observe |
/// | [`Cleanup`](Self::Cleanup) | `IVRClientCore` slot | teardown |
/// | [`SubmitCurrent`](Self::SubmitCurrent) | `IVRCompositor` slot, rev ≥ 9 | around |
/// | [`SubmitTyped`](Self::SubmitTyped) | `IVRCompositor` slot, rev 8 | around |
/// | [`SubmitLegacy`](Self::SubmitLegacy) | `IVRCompositor` slot, rev 7 | around |
/// | [`RecommendedRenderTargetSize`](Self::RecommendedRenderTargetSize) | `IVRSystem` slot | before |
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    Display,
    IntoStaticStr,
)]
pub enum InterceptId {
    /// The module-level `VRClientCoreFactory` export.
    ClientCoreFactory,
    /// `IVRClientCore::GetGenericInterface`, the object-level interface factory.
    GetGenericInterface,
    /// `IVRClientCore::Cleanup`, the end of a load cycle.
    Cleanup,
    /// `IVRCompositor::Submit` taking a `Texture_t` pointer.
    SubmitCurrent,
    /// `IVRCompositor::Submit` taking texture type and handle separately, with flags.
    SubmitTyped,
    /// `IVRCompositor::Submit` taking texture type and handle separately, without flags.
    SubmitLegacy,
    /// `IVRSystem::GetRecommendedRenderTargetSize`.
    RecommendedRenderTargetSize,
}

impl InterceptId {
    /// Returns the interface family whose dispatch table this intercept patches.
    ///
    /// `None` for the export-level factory intercept.
    #[must_use]
    pub fn family(self) -> Option<InterfaceFamily> {
        match self {
            InterceptId::ClientCoreFactory => None,
            InterceptId::GetGenericInterface | InterceptId::Cleanup => {
                Some(InterfaceFamily::ClientCore)
            }
            InterceptId::SubmitCurrent | InterceptId::SubmitTyped | InterceptId::SubmitLegacy => {
                Some(InterfaceFamily::Compositor)
            }
            InterceptId::RecommendedRenderTargetSize => Some(InterfaceFamily::System),
        }
    }
}

/// A replacement function: its identity and the address the backend should redirect to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Replacement {
    /// Identity of the replacement.
    pub id: InterceptId,
    /// Address of the replacement function.
    pub function: FnAddr,
}

impl Replacement {
    /// Returns the replacement for `id`, pointing at this crate's extern trampoline.
    #[must_use]
    pub fn of(id: InterceptId) -> Self {
        Self {
            id,
            function: crate::ffi::replacement_address(id),
        }
    }
}
