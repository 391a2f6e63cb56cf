//! # deimos
//!
//! Deimos is a frame graph library: a declarative planner for per-frame GPU work.
//! Rendering passes and the virtual resources they exchange are declared up front;
//! the graph then compiles that description into an executable schedule that culls
//! passes whose outputs are never consumed, materializes driver resources only for
//! the interval they are live, and drives pass execution against a pluggable
//! low-level [`Driver`].
//!
//! The design is largely inspired by Yuriy O'Donnell's 2017 GDC talk "FrameGraph:
//! Extensible Rendering Architecture in Frostbite".
//!
//! See the [`graph`] module documentation for an overview of the three frame phases
//! and a worked example; the [`prelude`] re-exports the whole public surface.

pub mod core;
pub mod graph;
pub mod prelude;

pub use ash::vk;

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
