// Copyright 2025 The vrshim Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # vrshim
//!
//! Interface discovery and version dispatch for intercepting the OpenVR client runtime from
//! inside a host process.
//!
//! `vrshim` follows the OpenVR client library (`vrclient[_x64]`) through its load cycle:
//! it intercepts the runtime's interface factory, learns which revision of every interface
//! the application requests, and installs call intercepts at the dispatch-table slot that
//! revision uses. The intercepted calls are routed to a [`CallObserver`] that can inspect and
//! adjust them; everything else about the runtime's behavior is left untouched.
//!
//! ## Features
//!
//! - **Revision aware** - Dispatch-slot layouts of every known runtime revision, as data
//! - **Fail closed** - Unknown revisions stay un-intercepted instead of guessing a layout
//! - **Idempotent** - One set of intercepts per interface family and load cycle
//! - **Clean teardown** - Everything is removed when the runtime shuts down
//! - **Backend agnostic** - Patching and module lookup are supplied through traits
//!
//! ## Architecture
//!
//! - [`interface`] - Interface names, revisions and the revision to slot policy (pure)
//! - [`runtime`] - Handles, intercept identities, the intercept registry and the traits for
//!   the platform capabilities this crate consumes
//! - [`forward`] - The logic behind every intercepted call and the [`CallObserver`] seam
//! - [`Shim`] - The context tying discovery, registration and teardown together
//! - [`ffi`] - The process-wide binding and the `extern "C"` replacement functions
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vrshim::prelude::*;
//!
//! struct Supersample;
//!
//! impl CallObserver for Supersample {
//!     fn on_size_query_result(&self, width: &mut u32, height: &mut u32) {
//!         *width = *width * 3 / 2;
//!         *height = *height * 3 / 2;
//!     }
//! }
//!
//! fn attach(backend: impl InterceptBackend + 'static, probe: impl ModuleProbe + 'static) -> Result<()> {
//!     let shim = Shim::new(backend, probe, Arc::new(Supersample));
//!     vrshim::ffi::bind(shim)?;
//!
//!     match vrshim::ffi::install()? {
//!         InstallOutcome::ModuleAbsent => println!("runtime not loaded yet, retry later"),
//!         outcome => println!("{outcome:?}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Lifecycle transitions and installed intercepts are reported through [`tracing`] at `info`
//! level, observed interface requests at `debug`, unsupported revisions and backend failures
//! at `error`. The library installs no subscriber.

#[macro_use]
pub(crate) mod macros;

pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use vrshim::prelude::*;
///
/// let version = InterfaceVersion::parse("IVRSystem_022").unwrap();
/// assert_eq!(version.family, InterfaceFamily::System);
/// ```
pub mod prelude;

pub mod config;
pub mod ffi;
pub mod forward;
pub mod interface;
pub mod runtime;
pub mod shim;

/// `vrshim` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `vrshim` Error type
///
/// The main error type for all operations in this crate. See [`Error`] for the individual
/// conditions; none of them is fatal to the host application.
pub use error::Error;

pub use config::ShimConfig;
pub use forward::{CallObserver, NoopObserver};
pub use interface::{InterfaceFamily, InterfaceVersion, SlotTable};
pub use runtime::{FnAddr, InstanceHandle, InterceptBackend, InterceptId, ModuleHandle, ModuleProbe};
pub use shim::{InstallOutcome, Registration, Shim};
