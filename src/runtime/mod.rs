//! The boundary to the target runtime and to the interception backend.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `types` | Opaque handles and intercept identities |
//! | `backend` | [`InterceptBackend`] and [`ModuleProbe`], supplied by the embedder |
//! | `registry` | [`InterceptRegistry`], records of installed intercepts |

mod backend;
mod registry;
mod types;

pub use backend::{InterceptBackend, ModuleProbe};
pub use registry::{InterceptLocation, InterceptRecord, InterceptRegistry};
pub use types::{FnAddr, InstanceHandle, InterceptId, ModuleHandle, Replacement};
