//! The C ABI surface: process-wide binding and the replacement functions.
//!
//! The interception backend redirects the runtime's calls to the `extern "C"` functions in
//! this module. Each of them finds the bound [`Shim`], fetches the original implementation
//! from its intercept registry and routes the call through the matching forwarder.
//!
//! # Calling Convention
//!
//! Replacements for dispatch-table slots receive the object pointer as an explicit first
//! argument. On 64-bit Windows and on System V targets member functions use the platform's C
//! calling convention with `this` as the first argument, which is what these signatures
//! describe.
//!
//! # Failure Behavior
//!
//! If no shim is bound, or an intercept has no recorded original, the replacement logs an
//! error and returns a neutral value (null instance, [`CompositorError::REQUEST_FAILED`], or
//! nothing).
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vrshim::{ffi, Shim};
//!
//! ffi::bind(Shim::new(backend, probe, Arc::new(Supersampler::new(1.5))))?;
//!
//! // Call on every module load until the runtime shows up.
//! ffi::install()?;
//!
//! // `IVRClientCore::Cleanup` removes the factory intercept as well, but the runtime module
//! // usually stays loaded. Install again before the host starts its next session.
//! ffi::install()?;
//! ```

use std::{
    ffi::{c_char, c_void, CStr},
    mem, ptr,
    sync::OnceLock,
};

use tracing::error;

use crate::{
    forward::{
        forward_size_query, forward_submit, CompositorError, Eye, SubmitCall, SubmitFlags,
        Texture, TextureBounds, TextureType,
    },
    runtime::{FnAddr, InstanceHandle, InterceptId},
    shim::{InstallOutcome, Shim},
    Error, Result,
};

type FactoryFn = unsafe extern "C" fn(*const c_char, *mut i32) -> *mut c_void;
type GetGenericInterfaceFn =
    unsafe extern "C" fn(*mut c_void, *const c_char, *mut i32) -> *mut c_void;
type CleanupFn = unsafe extern "C" fn(*mut c_void);
type SubmitCurrentFn = unsafe extern "C" fn(
    *mut c_void,
    Eye,
    *const Texture,
    *const TextureBounds,
    u32,
) -> CompositorError;
type SubmitTypedFn = unsafe extern "C" fn(
    *mut c_void,
    Eye,
    TextureType,
    *mut c_void,
    *const TextureBounds,
    u32,
) -> CompositorError;
type SubmitLegacyFn = unsafe extern "C" fn(
    *mut c_void,
    Eye,
    TextureType,
    *mut c_void,
    *const TextureBounds,
) -> CompositorError;
type RenderTargetSizeFn = unsafe extern "C" fn(*mut c_void, *mut u32, *mut u32);

static SHIM: OnceLock<Shim> = OnceLock::new();

/// Binds `shim` as the process-wide context the replacement functions route into.
///
/// # Errors
///
/// Returns [`Error::AlreadyBound`] if a context is already bound. A process has exactly one
/// binding for its lifetime.
pub fn bind(shim: Shim) -> Result<&'static Shim> {
    SHIM.set(shim).map_err(|_| Error::AlreadyBound)?;
    bound().ok_or(Error::NotBound)
}

/// Returns the bound context, if any.
#[must_use]
pub fn bound() -> Option<&'static Shim> {
    SHIM.get()
}

/// Runs [`Shim::install`] on the bound context.
///
/// # Errors
///
/// Returns [`Error::NotBound`] before [`bind`], otherwise whatever [`Shim::install`] returns.
pub fn install() -> Result<InstallOutcome> {
    bound().ok_or(Error::NotBound)?.install()
}

/// Requests the `IVRSystem` interface from the retained core client.
///
/// The request goes through the intercepted `GetGenericInterface` path, so a system instance
/// obtained this way is registered like any other. The interface name comes from
/// [`crate::ShimConfig::system_interface`].
///
/// # Returns
///
/// `None` if no context is bound, no core client has been retained in this load cycle, or
/// the runtime returned no instance.
#[must_use]
pub fn system_interface() -> Option<InstanceHandle> {
    let shim = bound()?;
    let core = shim.core_client()?;
    let mut init_error = 0i32;

    // The core client stays valid until its cleanup call, which also clears the handle.
    let instance = unsafe {
        get_generic_interface(
            core.as_ptr(),
            shim.config().system_interface.as_ptr(),
            &mut init_error,
        )
    };
    InstanceHandle::new(instance)
}

/// Returns the address of the replacement function for `id`.
#[must_use]
pub fn replacement_address(id: InterceptId) -> FnAddr {
    let function = match id {
        InterceptId::ClientCoreFactory => client_core_factory as FactoryFn as usize,
        InterceptId::GetGenericInterface => {
            get_generic_interface as GetGenericInterfaceFn as usize
        }
        InterceptId::Cleanup => cleanup as CleanupFn as usize,
        InterceptId::SubmitCurrent => submit_current as SubmitCurrentFn as usize,
        InterceptId::SubmitTyped => submit_typed as SubmitTypedFn as usize,
        InterceptId::SubmitLegacy => submit_legacy as SubmitLegacyFn as usize,
        InterceptId::RecommendedRenderTargetSize => {
            recommended_render_target_size as RenderTargetSizeFn as usize
        }
    };
    FnAddr::new(function)
}

/// Looks up the bound context and the original implementation behind `id`.
///
/// # Safety
///
/// `F` must be the function pointer type matching the signature of `id`.
unsafe fn route<F: Copy>(id: InterceptId) -> Option<(&'static Shim, F)> {
    const { assert!(mem::size_of::<F>() == mem::size_of::<usize>()) };

    let Some(shim) = bound() else {
        error!(intercept = %id, "intercepted call without a bound shim");
        return None;
    };
    let Some(original) = shim.original(id).filter(|addr| !addr.is_null()) else {
        error!(intercept = %id, "intercepted call without a recorded original");
        return None;
    };

    Some((shim, unsafe { mem::transmute_copy::<usize, F>(&original.addr()) }))
}

/// Replacement for the module export `VRClientCoreFactory`.
///
/// # Safety
///
/// Called by the host with the arguments of the original export.
pub unsafe extern "C" fn client_core_factory(
    name: *const c_char,
    return_code: *mut i32,
) -> *mut c_void {
    let Some((shim, original)) = (unsafe { route::<FactoryFn>(InterceptId::ClientCoreFactory) })
    else {
        return ptr::null_mut();
    };
    if name.is_null() {
        return unsafe { original(name, return_code) };
    }

    let interface = unsafe { CStr::from_ptr(name) };
    shim.intercept_factory(interface, || unsafe { original(name, return_code) })
}

/// Replacement for `IVRClientCore::GetGenericInterface`.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn get_generic_interface(
    this: *mut c_void,
    name: *const c_char,
    init_error: *mut i32,
) -> *mut c_void {
    let Some((shim, original)) =
        (unsafe { route::<GetGenericInterfaceFn>(InterceptId::GetGenericInterface) })
    else {
        return ptr::null_mut();
    };
    if name.is_null() {
        return unsafe { original(this, name, init_error) };
    }

    let interface = unsafe { CStr::from_ptr(name) };
    shim.intercept_factory(interface, || unsafe { original(this, name, init_error) })
}

/// Replacement for `IVRClientCore::Cleanup`.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn cleanup(this: *mut c_void) {
    let Some(shim) = bound() else {
        error!(intercept = %InterceptId::Cleanup, "intercepted call without a bound shim");
        return;
    };
    let original = unsafe { route::<CleanupFn>(InterceptId::Cleanup) }.map(|(_, f)| f);

    shim.on_cleanup(|| {
        if let Some(original) = original {
            unsafe { original(this) }
        }
    });
}

/// Replacement for `IVRCompositor::Submit`, revision 9 and later.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn submit_current(
    this: *mut c_void,
    eye: Eye,
    texture: *const Texture,
    bounds: *const TextureBounds,
    flags: u32,
) -> CompositorError {
    let Some((shim, original)) =
        (unsafe { route::<SubmitCurrentFn>(InterceptId::SubmitCurrent) })
    else {
        return CompositorError::REQUEST_FAILED;
    };

    let call = SubmitCall::Current {
        eye,
        texture,
        bounds,
        flags: SubmitFlags::from_bits_retain(flags),
    };
    let forward = |outgoing: SubmitCall| match outgoing {
        SubmitCall::Current {
            eye,
            texture,
            bounds,
            flags,
        } => unsafe { original(this, eye, texture, bounds, flags.bits()) },
        _ => unreachable!("denormalize keeps the call shape"),
    };

    unsafe { forward_submit(shim.observer(), call, forward) }
}

/// Replacement for `IVRCompositor::Submit`, revision 8.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn submit_typed(
    this: *mut c_void,
    eye: Eye,
    texture_type: TextureType,
    handle: *mut c_void,
    bounds: *const TextureBounds,
    flags: u32,
) -> CompositorError {
    let Some((shim, original)) = (unsafe { route::<SubmitTypedFn>(InterceptId::SubmitTyped) })
    else {
        return CompositorError::REQUEST_FAILED;
    };

    let call = SubmitCall::Typed {
        eye,
        texture_type,
        handle,
        bounds,
        flags: SubmitFlags::from_bits_retain(flags),
    };
    let forward = |outgoing: SubmitCall| match outgoing {
        SubmitCall::Typed {
            eye,
            texture_type,
            handle,
            bounds,
            flags,
        } => unsafe { original(this, eye, texture_type, handle, bounds, flags.bits()) },
        _ => unreachable!("denormalize keeps the call shape"),
    };

    unsafe { forward_submit(shim.observer(), call, forward) }
}

/// Replacement for `IVRCompositor::Submit`, revision 7.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn submit_legacy(
    this: *mut c_void,
    eye: Eye,
    texture_type: TextureType,
    handle: *mut c_void,
    bounds: *const TextureBounds,
) -> CompositorError {
    let Some((shim, original)) = (unsafe { route::<SubmitLegacyFn>(InterceptId::SubmitLegacy) })
    else {
        return CompositorError::REQUEST_FAILED;
    };

    let call = SubmitCall::Legacy {
        eye,
        texture_type,
        handle,
        bounds,
    };
    let forward = |outgoing: SubmitCall| match outgoing {
        SubmitCall::Legacy {
            eye,
            texture_type,
            handle,
            bounds,
        } => unsafe { original(this, eye, texture_type, handle, bounds) },
        _ => unreachable!("denormalize keeps the call shape"),
    };

    unsafe { forward_submit(shim.observer(), call, forward) }
}

/// Replacement for `IVRSystem::GetRecommendedRenderTargetSize`.
///
/// # Safety
///
/// Called by the host with the arguments of the original method.
pub unsafe extern "C" fn recommended_render_target_size(
    this: *mut c_void,
    width: *mut u32,
    height: *mut u32,
) {
    let Some((shim, original)) =
        (unsafe { route::<RenderTargetSizeFn>(InterceptId::RecommendedRenderTargetSize) })
    else {
        return;
    };

    if ptr::eq(width, height) {
        // Aliased outputs cannot be handed out as two exclusive references.
        return unsafe { original(this, width, height) };
    }

    let (w, h) = unsafe { (width.as_mut(), height.as_mut()) };
    forward_size_query(shim.observer(), w, h, |w, h| {
        let w = w.map_or(ptr::null_mut(), |w| w as *mut u32);
        let h = h.map_or(ptr::null_mut(), |h| h as *mut u32);
        unsafe { original(this, w, h) }
    });
}
