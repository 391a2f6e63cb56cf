//! Convenience re-exports of everything needed to build and run a frame graph.

pub use crate::core::driver::{
    AttachmentFlags, Driver, RenderTargetHandle, TextureHandle, TextureUsage,
};
pub use crate::core::error::Error;
pub use crate::graph::builder::PassBuilder;
pub use crate::graph::frame_graph::FrameGraph;
pub use crate::graph::graphviz::GraphViz;
pub use crate::graph::pass::PassExecutor;
pub use crate::graph::pass_resources::PassResources;
pub use crate::graph::resource::{RWFlags, TextureDescriptor, VirtualResource};
