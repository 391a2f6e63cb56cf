//! Read-only accessor handed to pass execute callbacks.

use crate::core::driver::{RenderTargetHandle, TextureHandle, TextureUsage};
use crate::graph::physical_resource::PhysicalResource;
use crate::graph::resource::{RWFlags, ResourceNode, VirtualResource};

/// Resolves the handles a pass declared during setup to the concrete driver handles
/// materialized for the current frame.
///
/// Only resources this pass declared as reads or writes are meaningfully resolvable;
/// the graph does not currently verify the declaration, so treat lookups of
/// undeclared handles as a bug in the calling pass.
pub struct PassResources<'graph> {
    pub(crate) resource_nodes: &'graph [ResourceNode],
    pub(crate) resources: &'graph [PhysicalResource],
}

impl PassResources<'_> {
    /// Driver texture backing `handle`. With [`TextureUsage::Default`] the depth
    /// texture is returned iff the resource is read as depth only, the color
    /// texture otherwise.
    ///
    /// Panics if the resource was never devirtualized; a pass that executes can only
    /// observe resources the compiler scheduled for allocation before it.
    pub fn texture(&self, handle: VirtualResource, usage: TextureUsage) -> TextureHandle {
        let resource = self.physical(handle);
        let texture = match usage {
            TextureUsage::Default => {
                if resource.read_flags == RWFlags::DEPTH {
                    resource.textures[1]
                } else {
                    resource.textures[0]
                }
            }
            TextureUsage::ColorAttachment => resource.textures[0],
            TextureUsage::DepthAttachment => resource.textures[1],
        };
        texture.expect("resource was not devirtualized before use")
    }

    /// Driver render target backing `handle`.
    pub fn render_target(&self, handle: VirtualResource) -> RenderTargetHandle {
        self.physical(handle)
            .target
            .expect("resource was not devirtualized before use")
    }

    fn physical(&self, handle: VirtualResource) -> &PhysicalResource {
        let node = &self.resource_nodes[handle.index as usize];
        // set for every node by compile(); executing passes cannot exist without it
        let index = node.resource.expect("pass executed on an uncompiled graph");
        &self.resources[index as usize]
    }
}
