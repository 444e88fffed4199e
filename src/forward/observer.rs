//! The side-effect collaborator invoked by the call forwarders.

use crate::forward::SubmitPayload;

/// Receives the data of intercepted calls.
///
/// This is where an embedder implements its actual feature, e.g. rendering at a different
/// resolution and upscaling the submitted frame. All methods default to doing nothing, so an
/// observer only implements what it needs.
///
/// Observers are called from whichever host thread performs the intercepted call, commonly a
/// dedicated render thread, and must not block for long.
///
/// # Examples
///
/// ```rust
/// use vrshim::forward::CallObserver;
///
/// struct Supersample(f32);
///
/// impl CallObserver for Supersample {
///     fn on_size_query_result(&self, width: &mut u32, height: &mut u32) {
///         *width = (*width as f32 * self.0) as u32;
///         *height = (*height as f32 * self.0) as u32;
///     }
/// }
/// ```
pub trait CallObserver: Send + Sync {
    /// Called after the runtime answered a render target size query.
    ///
    /// The values can be adjusted in place; the host sees the adjusted size.
    fn on_size_query_result(&self, width: &mut u32, height: &mut u32) {
        let _ = (width, height);
    }

    /// Called before a frame is submitted to the compositor.
    ///
    /// The payload can be modified in place to substitute any of its fields; the modified
    /// values are mapped back into the runtime's argument shape.
    fn on_submit(&self, payload: &mut SubmitPayload) {
        let _ = payload;
    }
}

/// An observer that leaves every call untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl CallObserver for NoopObserver {}
