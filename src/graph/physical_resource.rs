//! Physical backing state for virtual resources over their live interval.

use ash::vk;

use crate::core::driver::{AttachmentFlags, Driver, RenderTargetHandle, TextureHandle, TextureUsage};
use crate::graph::resource::{RWFlags, TextureDescriptor};

// Depth attachments are allocated with a 24-bit depth format regardless of the
// descriptor format, which only describes the color plane.
const DEPTH_FORMAT: vk::Format = vk::Format::D24_UNORM_S8_UINT;

/// Driver-side state backing one or more virtual resources during execution.
///
/// Records are appended in lockstep with resource nodes during compile and never
/// reordered afterwards, so indices into the registry stay stable until the graph
/// resets. All driver handles are `None` outside the `[first, last]` pass interval.
#[derive(Debug)]
pub(crate) struct PhysicalResource {
    pub(crate) name: String,
    pub(crate) desc: TextureDescriptor,
    pub(crate) read_flags: RWFlags,
    pub(crate) write_flags: RWFlags,

    // computed during compile()
    pub(crate) writer: Option<u16>,
    pub(crate) first: Option<u16>,
    pub(crate) last: Option<u16>,
    pub(crate) reader_count: u32,
    pub(crate) writer_count: u32,

    // live driver state: color texture, depth texture, combined target
    pub(crate) textures: [Option<TextureHandle>; 2],
    pub(crate) target: Option<RenderTargetHandle>,
}

impl PhysicalResource {
    pub(crate) fn new(
        name: impl Into<String>,
        desc: TextureDescriptor,
        read_flags: RWFlags,
        write_flags: RWFlags,
    ) -> Self {
        PhysicalResource {
            name: name.into(),
            desc,
            read_flags,
            write_flags,
            writer: None,
            first: None,
            last: None,
            reader_count: 0,
            writer_count: 0,
            textures: [None, None],
            target: None,
        }
    }

    /// Materialize the driver resources this record needs: one texture per read
    /// plane, and a render target when some pass writes through it.
    pub(crate) fn create(&mut self, driver: &mut dyn Driver) {
        let desc = &self.desc;
        if self.reader_count > 0 {
            debug_assert!(!self.read_flags.is_empty());
            if self.read_flags.contains(RWFlags::COLOR) {
                self.textures[0] = Some(driver.create_texture(
                    desc.ty,
                    desc.levels,
                    desc.format,
                    1,
                    desc.width,
                    desc.height,
                    desc.depth,
                    TextureUsage::ColorAttachment,
                ));
            }
            if self.read_flags.contains(RWFlags::DEPTH) {
                self.textures[1] = Some(driver.create_texture(
                    desc.ty,
                    desc.levels,
                    DEPTH_FORMAT,
                    1,
                    desc.width,
                    desc.height,
                    desc.depth,
                    TextureUsage::DepthAttachment,
                ));
            }
        }
        if self.writer_count > 0 {
            debug_assert!(!self.write_flags.is_empty());
            let mut attachments = AttachmentFlags::empty();
            if self.write_flags.contains(RWFlags::COLOR) {
                attachments |= AttachmentFlags::COLOR;
            }
            if self.write_flags.contains(RWFlags::DEPTH) {
                attachments |= AttachmentFlags::DEPTH;
            }
            self.target = Some(driver.create_render_target(
                attachments,
                desc.width,
                desc.height,
                desc.samples,
                desc.format,
                self.textures[0],
                self.textures[1],
                None,
            ));
        }
    }

    /// Release everything [`PhysicalResource::create`] allocated.
    pub(crate) fn destroy(&mut self, driver: &mut dyn Driver) {
        for texture in &mut self.textures {
            if let Some(texture) = texture.take() {
                driver.destroy_texture(texture);
            }
        }
        if let Some(target) = self.target.take() {
            driver.destroy_render_target(target);
        }
    }
}

impl Drop for PhysicalResource {
    fn drop(&mut self) {
        // every create() must have been balanced by a destroy() before the graph resets
        debug_assert!(
            self.textures[0].is_none(),
            "color texture of \"{}\" leaked",
            self.name
        );
        debug_assert!(
            self.textures[1].is_none(),
            "depth texture of \"{}\" leaked",
            self.name
        );
        debug_assert!(self.target.is_none(), "render target of \"{}\" leaked", self.name);
    }
}
