//! Virtual resources: handles, descriptors and the per-declaration node record.

use ash::vk;
use bitflags::bitflags;

bitflags! {
    /// Selects which parts of a resource a pass touches when reading or writing.
    ///
    /// The builder accumulates these by bitwise OR across all declared accesses;
    /// at execution time they decide which textures and which render target
    /// attachments are materialized.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct RWFlags: u32 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
    }
}

impl Default for RWFlags {
    /// Reads and writes touch the color plane unless stated otherwise.
    fn default() -> Self {
        RWFlags::COLOR
    }
}

/// Names one version of a virtual resource in a frame graph.
///
/// Handles are plain values: freely copyable, comparable, and owning nothing. A handle
/// is valid as long as it carries the current version of the resource it names; every
/// write bumps that version, so older handles stay usable for reads of the previous
/// state but are rejected for further writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VirtualResource {
    pub(crate) index: u16,
    pub(crate) version: u16,
}

impl VirtualResource {
    pub(crate) const UNINITIALIZED: u16 = u16::MAX;

    /// Returns true if this handle was obtained from a builder rather than
    /// default-constructed or returned from a rejected operation.
    pub fn is_initialized(&self) -> bool {
        self.index != Self::UNINITIALIZED
    }
}

impl Default for VirtualResource {
    fn default() -> Self {
        VirtualResource {
            index: Self::UNINITIALIZED,
            version: 0,
        }
    }
}

/// Declarative attributes of a texture resource. Opaque to the graph itself; handed
/// through to the driver when the resource is materialized.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub ty: vk::ImageType,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub levels: u8,
    pub samples: u8,
    pub format: vk::Format,
}

impl Default for TextureDescriptor {
    fn default() -> Self {
        TextureDescriptor {
            ty: vk::ImageType::TYPE_2D,
            width: 1,
            height: 1,
            depth: 1,
            levels: 1,
            samples: 1,
            format: vk::Format::R8G8B8A8_UNORM,
        }
    }
}

/// One virtual resource declaration. Owned by the graph, addressed by index.
#[derive(Debug)]
pub(crate) struct ResourceNode {
    pub(crate) name: String,
    pub(crate) index: u16,
    // handle generation counter, bumped on every successful write
    pub(crate) version: u16,
    pub(crate) desc: TextureDescriptor,
    pub(crate) read_flags: RWFlags,
    pub(crate) write_flags: RWFlags,
    /// Index of the physical record backing this node. Set during compile; aliased
    /// nodes end up sharing the record of their alias source.
    pub(crate) resource: Option<u16>,
}

impl ResourceNode {
    pub(crate) fn new(name: impl Into<String>, index: u16, desc: TextureDescriptor) -> Self {
        ResourceNode {
            name: name.into(),
            index,
            version: 0,
            desc,
            read_flags: RWFlags::empty(),
            write_flags: RWFlags::empty(),
            resource: None,
        }
    }

    /// Handle for the current version of this resource.
    pub(crate) fn handle(&self) -> VirtualResource {
        VirtualResource {
            index: self.index,
            version: self.version,
        }
    }
}
