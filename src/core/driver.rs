//! The low-level graphics driver abstraction consumed by the frame graph.
//!
//! The graph itself never talks to the GPU. During [`execute`](crate::FrameGraph::execute)
//! it asks an implementation of the [`Driver`] trait to materialize textures and render
//! targets for the interval a resource is live, and to tear them down again afterwards.
//! Everything the graph needs from a backend is captured by this trait, which keeps the
//! planner testable against a recording driver and portable across backends.

use ash::vk;
use bitflags::bitflags;

/// Opaque driver-side texture handle. The meaning of the inner value is up to the
/// driver implementation; the graph only stores and returns it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Opaque driver-side render target handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RenderTargetHandle(pub u64);

/// Selects which underlying texture of a resource an operation refers to.
///
/// [`TextureUsage::Default`] resolves against the resource's accumulated read flags:
/// it picks the depth texture if and only if the resource is read as depth only,
/// and the color texture otherwise.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureUsage {
    #[default]
    Default,
    ColorAttachment,
    DepthAttachment,
}

bitflags! {
    /// Attachment set of a render target.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct AttachmentFlags: u32 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
        const STENCIL = 0x4;
    }
}

/// Capability set the frame graph requires from a graphics backend.
///
/// The driver is borrowed mutably for the duration of [`execute`](crate::FrameGraph::execute)
/// only. Implementations may buffer commands internally; the graph calls these methods
/// from a single thread, interleaved with pass callbacks, and guarantees that every
/// `create_*` is matched by exactly one `destroy_*` before the frame ends.
pub trait Driver {
    /// Create a texture. `samples` is the per-texture sample count; multisampling of
    /// the combined target is requested through [`Driver::create_render_target`].
    #[allow(clippy::too_many_arguments)]
    fn create_texture(
        &mut self,
        ty: vk::ImageType,
        levels: u8,
        format: vk::Format,
        samples: u8,
        width: u32,
        height: u32,
        depth: u32,
        usage: TextureUsage,
    ) -> TextureHandle;

    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create a render target over previously created attachment textures.
    #[allow(clippy::too_many_arguments)]
    fn create_render_target(
        &mut self,
        attachments: AttachmentFlags,
        width: u32,
        height: u32,
        samples: u8,
        format: vk::Format,
        color: Option<TextureHandle>,
        depth: Option<TextureHandle>,
        stencil: Option<TextureHandle>,
    ) -> RenderTargetHandle;

    fn destroy_render_target(&mut self, target: RenderTargetHandle);
}
