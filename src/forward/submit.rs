//! Around-forward shape: frame submission.
//!
//! `IVRCompositor::Submit` has taken three different argument shapes over the runtime's
//! history. Each shape is a [`SubmitCall`] variant; all of them converge on one canonical
//! [`SubmitPayload`] that the observer sees, and are rebuilt from it before the original
//! implementation is called.
//!
//! | Variant | Revisions | Texture | Flags |
//! |---------|-----------|---------|-------|
//! | [`SubmitCall::Current`] | ≥ 9 | `Texture_t` pointer | yes |
//! | [`SubmitCall::Typed`] | 8 | type + handle | yes |
//! | [`SubmitCall::Legacy`] | 7 | type + handle | no |
//!
//! Fields a shape does not carry are synthesized on the way in ([`ColorSpace::AUTO`],
//! [`SubmitFlags::DEFAULT`]) and dropped on the way out.

use std::{ffi::c_void, ptr};

use bitflags::bitflags;

use crate::forward::CallObserver;

/// Which eye a frame is submitted for (`EVREye`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Eye(pub i32);

impl Eye {
    /// `Eye_Left`
    pub const LEFT: Self = Self(0);
    /// `Eye_Right`
    pub const RIGHT: Self = Self(1);
}

/// Graphics API owning a submitted texture (`ETextureType`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TextureType(pub i32);

impl TextureType {
    /// `TextureType_Invalid`
    pub const INVALID: Self = Self(-1);
    /// `TextureType_DirectX`, an `ID3D11Texture2D`.
    pub const DIRECTX: Self = Self(0);
    /// `TextureType_OpenGL`, a texture name.
    pub const OPENGL: Self = Self(1);
    /// `TextureType_Vulkan`, a `VRVulkanTextureData_t`.
    pub const VULKAN: Self = Self(2);
    /// `TextureType_IOSurface`
    pub const IOSURFACE: Self = Self(3);
    /// `TextureType_DirectX12`, a `D3D12TextureData_t`.
    pub const DIRECTX12: Self = Self(4);
    /// `TextureType_DXGISharedHandle`
    pub const DXGI_SHARED_HANDLE: Self = Self(5);
    /// `TextureType_Metal`
    pub const METAL: Self = Self(6);
}

/// Colour space of a submitted texture (`EColorSpace`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ColorSpace(pub i32);

impl ColorSpace {
    /// `ColorSpace_Auto`, the runtime guesses from the texture format. This is what older
    /// submission shapes without a colour space field are assumed to use.
    pub const AUTO: Self = Self(0);
    /// `ColorSpace_Gamma`
    pub const GAMMA: Self = Self(1);
    /// `ColorSpace_Linear`
    pub const LINEAR: Self = Self(2);
}

/// Result of a compositor call (`EVRCompositorError`), returned to the host verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct CompositorError(pub i32);

impl CompositorError {
    /// `VRCompositorError_None`
    pub const NONE: Self = Self(0);
    /// `VRCompositorError_RequestFailed`
    pub const REQUEST_FAILED: Self = Self(1);
    /// `VRCompositorError_InvalidTexture`
    pub const INVALID_TEXTURE: Self = Self(102);
}

bitflags! {
    /// Submission flags (`EVRSubmitFlags`).
    ///
    /// Unknown bits are kept as they are and passed back to the runtime.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SubmitFlags: u32 {
        /// The lens distortion has already been applied by the application.
        const LENS_DISTORTION_ALREADY_APPLIED = 0x01;
        /// The OpenGL handle is a render buffer, not a texture.
        const GL_RENDER_BUFFER = 0x02;
        /// Reserved by the runtime.
        const RESERVED = 0x04;
        /// The texture pointer is a `VRTextureWithPose_t`.
        const TEXTURE_WITH_POSE = 0x08;
        /// The texture pointer is a `VRTextureWithDepth_t`.
        const TEXTURE_WITH_DEPTH = 0x10;
        /// The frame does not continue the previous one.
        const FRAME_DISCONTINUITY = 0x20;
        /// The Vulkan texture pointer is a `VRVulkanTextureArrayData_t`.
        const VULKAN_TEXTURE_WITH_ARRAY_DATA = 0x40;
        /// The OpenGL texture is an array texture.
        const GL_ARRAY_TEXTURE = 0x80;
        /// The OpenGL context is an EGL context.
        const IS_EGL = 0x100;
    }
}

impl SubmitFlags {
    /// `Submit_Default`
    pub const DEFAULT: Self = Self::empty();

    /// Flags announcing that the texture pointer points at a larger structure than
    /// [`Texture`].
    pub const TEXTURE_EXTENSIONS: Self = Self::TEXTURE_WITH_POSE
        .union(Self::TEXTURE_WITH_DEPTH)
        .union(Self::VULKAN_TEXTURE_WITH_ARRAY_DATA);
}

/// A submitted texture (`Texture_t`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Texture {
    /// API specific texture handle.
    pub handle: *mut c_void,
    /// API the handle belongs to.
    pub texture_type: TextureType,
    /// Colour space of the texture contents.
    pub color_space: ColorSpace,
}

/// The region of a texture to display (`VRTextureBounds_t`), in normalized coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct TextureBounds {
    /// Left edge.
    pub u_min: f32,
    /// Top edge.
    pub v_min: f32,
    /// Right edge.
    pub u_max: f32,
    /// Bottom edge.
    pub v_max: f32,
}

impl Default for TextureBounds {
    fn default() -> Self {
        Self {
            u_min: 0.0,
            v_min: 0.0,
            u_max: 1.0,
            v_max: 1.0,
        }
    }
}

/// The canonical form of a frame submission, independent of the runtime revision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubmitPayload {
    /// The eye the frame belongs to.
    pub eye: Eye,
    /// The submitted texture.
    pub texture: Texture,
    /// The displayed region, `None` for the whole texture.
    pub bounds: Option<TextureBounds>,
    /// Submission flags.
    pub flags: SubmitFlags,
}

/// Arguments of one `IVRCompositor::Submit` call, in the shape of the runtime revision that
/// received it.
///
/// Pointers are kept exactly as the caller passed them so that an untouched call reaches the
/// runtime bit for bit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitCall {
    /// Revision 9 and later: `Submit(eye, const Texture_t*, const VRTextureBounds_t*, flags)`.
    Current {
        /// The eye the frame belongs to.
        eye: Eye,
        /// The texture description, possibly an extended structure (see
        /// [`SubmitFlags::TEXTURE_EXTENSIONS`]).
        texture: *const Texture,
        /// The displayed region, may be null.
        bounds: *const TextureBounds,
        /// Submission flags.
        flags: SubmitFlags,
    },
    /// Revision 8: `Submit(eye, type, handle, const VRTextureBounds_t*, flags)`.
    Typed {
        /// The eye the frame belongs to.
        eye: Eye,
        /// API the handle belongs to.
        texture_type: TextureType,
        /// API specific texture handle.
        handle: *mut c_void,
        /// The displayed region, may be null.
        bounds: *const TextureBounds,
        /// Submission flags.
        flags: SubmitFlags,
    },
    /// Revision 7: `Submit(eye, type, handle, const VRTextureBounds_t*)`.
    Legacy {
        /// The eye the frame belongs to.
        eye: Eye,
        /// API the handle belongs to.
        texture_type: TextureType,
        /// API specific texture handle.
        handle: *mut c_void,
        /// The displayed region, may be null.
        bounds: *const TextureBounds,
    },
}

impl SubmitCall {
    fn bounds_ptr(&self) -> *const TextureBounds {
        match *self {
            SubmitCall::Current { bounds, .. }
            | SubmitCall::Typed { bounds, .. }
            | SubmitCall::Legacy { bounds, .. } => bounds,
        }
    }

    /// Converts the call into the canonical payload.
    ///
    /// # Returns
    ///
    /// `None` if the call carries a null texture pointer; such a call has no payload to
    /// observe and is forwarded as it is.
    ///
    /// # Safety
    ///
    /// The texture and bounds pointers must each be null or valid for reads.
    #[must_use]
    pub unsafe fn normalize(&self) -> Option<SubmitPayload> {
        let bounds = unsafe { self.bounds_ptr().as_ref() }.copied();

        match *self {
            SubmitCall::Current {
                eye,
                texture,
                flags,
                ..
            } => {
                let texture = unsafe { texture.as_ref() }.copied()?;
                Some(SubmitPayload {
                    eye,
                    texture,
                    bounds,
                    flags,
                })
            }
            SubmitCall::Typed {
                eye,
                texture_type,
                handle,
                flags,
                ..
            } => Some(SubmitPayload {
                eye,
                texture: Texture {
                    handle,
                    texture_type,
                    color_space: ColorSpace::AUTO,
                },
                bounds,
                flags,
            }),
            SubmitCall::Legacy {
                eye,
                texture_type,
                handle,
                ..
            } => Some(SubmitPayload {
                eye,
                texture: Texture {
                    handle,
                    texture_type,
                    color_space: ColorSpace::AUTO,
                },
                bounds,
                flags: SubmitFlags::DEFAULT,
            }),
        }
    }

    /// Maps a (possibly modified) payload back into this call's shape.
    ///
    /// `original` must be the payload [`normalize`](Self::normalize) produced for this call.
    /// Fields the observer left untouched keep the caller's original pointers; substituted
    /// texture or bounds point into `payload`, which therefore has to outlive the forwarded
    /// call. A substituted texture is a plain [`Texture`], so the
    /// [`SubmitFlags::TEXTURE_EXTENSIONS`] flags are cleared alongside it.
    #[must_use]
    pub fn denormalize(&self, original: &SubmitPayload, payload: &SubmitPayload) -> SubmitCall {
        let bounds = if payload.bounds == original.bounds {
            self.bounds_ptr()
        } else {
            payload
                .bounds
                .as_ref()
                .map_or(ptr::null(), |bounds| bounds as *const TextureBounds)
        };

        match *self {
            SubmitCall::Current { texture, .. } => {
                if payload.texture == original.texture {
                    SubmitCall::Current {
                        eye: payload.eye,
                        texture,
                        bounds,
                        flags: payload.flags,
                    }
                } else {
                    SubmitCall::Current {
                        eye: payload.eye,
                        texture: &payload.texture,
                        bounds,
                        flags: payload.flags.difference(SubmitFlags::TEXTURE_EXTENSIONS),
                    }
                }
            }
            SubmitCall::Typed { .. } => SubmitCall::Typed {
                eye: payload.eye,
                texture_type: payload.texture.texture_type,
                handle: payload.texture.handle,
                bounds,
                flags: payload.flags,
            },
            SubmitCall::Legacy { .. } => SubmitCall::Legacy {
                eye: payload.eye,
                texture_type: payload.texture.texture_type,
                handle: payload.texture.handle,
                bounds,
            },
        }
    }
}

/// Forwards a frame submission through the observer to the original implementation.
///
/// The observer sees the canonical payload and may modify it; the original implementation
/// then receives the payload in the call's own shape. Its result is returned unchanged.
///
/// # Arguments
///
/// * `observer` - The side-effect collaborator
/// * `call` - The call as received from the host
/// * `call_original` - Invokes the original implementation with the outgoing arguments
///
/// # Safety
///
/// The pointers inside `call` must be null or valid for reads for the duration of the call.
pub unsafe fn forward_submit<F>(
    observer: &dyn CallObserver,
    call: SubmitCall,
    call_original: F,
) -> CompositorError
where
    F: FnOnce(SubmitCall) -> CompositorError,
{
    let Some(original) = (unsafe { call.normalize() }) else {
        return call_original(call);
    };

    let mut payload = original;
    observer.on_submit(&mut payload);

    call_original(call.denormalize(&original, &payload))
}
