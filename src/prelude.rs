//! # vrshim Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the vrshim library. Import this module to get quick access to everything needed to
//! bind a shim to the process.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all vrshim operations
pub use crate::Error;

/// The result type used throughout vrshim
pub use crate::Result;

/// Module and export names of the target runtime
pub use crate::ShimConfig;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The interception context and its outcomes
pub use crate::shim::{InstallOutcome, ProcessWideState, Registration, Shim};

// ================================================================================================
// External Capabilities
// ================================================================================================

/// Traits an embedder implements for its platform
pub use crate::runtime::{InterceptBackend, ModuleProbe};

/// Handles exchanged with the backend
pub use crate::runtime::{FnAddr, InstanceHandle, InterceptId, ModuleHandle, Replacement};

// ================================================================================================
// Interfaces and Revisions
// ================================================================================================

/// Interface classification and the revision to slot policy
pub use crate::interface::{
    CallPolicy, InterfaceFamily, InterfaceVersion, RevisionRange, SlotRule, SlotTable,
};

// ================================================================================================
// Call Forwarding
// ================================================================================================

/// The side-effect collaborator
pub use crate::forward::{CallObserver, NoopObserver};

/// Canonical frame submission data
pub use crate::forward::{
    ColorSpace, CompositorError, Eye, SubmitFlags, SubmitPayload, Texture, TextureBounds,
    TextureType,
};
