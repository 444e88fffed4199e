//! Call forwarders: the logic behind every intercepted call.
//!
//! Forwarders are independent of the ABI. They receive the caller's arguments in safe Rust
//! form, run the [`CallObserver`] and hand control to the original implementation through a
//! closure; the [`crate::ffi`] trampolines supply that closure from the intercept registry.
//!
//! Two shapes exist:
//!
//! - **before-forward** ([`forward_size_query`]): the original runs first, the observer then
//!   adjusts its outputs
//! - **around-forward** ([`forward_submit`]): the observer sees a canonical payload, the
//!   original then receives it in its own historical argument shape

mod observer;
mod sizing;
mod submit;

pub use observer::{CallObserver, NoopObserver};
pub use sizing::forward_size_query;
pub use submit::{
    forward_submit, ColorSpace, CompositorError, Eye, SubmitCall, SubmitFlags, SubmitPayload,
    Texture, TextureBounds, TextureType,
};
