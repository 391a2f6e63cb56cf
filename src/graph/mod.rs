//! The frame graph: a declarative planner for per-frame GPU work.
//!
//! A frame is described as a set of passes and the virtual resources each pass reads
//! and writes. Resources are declared through a [`PassBuilder`](builder::PassBuilder)
//! inside each pass's setup closure and referenced by plain
//! [`VirtualResource`](resource::VirtualResource) handles; nothing driver-side exists
//! until the graph is compiled and executed.
//!
//! Writing a resource renames its handle: the setup code of a later pass can only
//! consume the version an earlier pass actually produced, which encodes the frame's
//! dependencies without an explicit edge list. Compilation walks those implicit
//! edges backwards from every externally observable output
//! ([`present`](frame_graph::FrameGraph::present)) and culls all work that
//! contributes to none of them, then computes the exact pass interval each surviving
//! resource needs to be backed by driver memory.
//!
//! # Example
//!
//! ```
//! use deimos::prelude::*;
//! # use deimos::vk;
//! # struct NullDriver { next: u64 }
//! # impl Driver for NullDriver {
//! #     fn create_texture(&mut self, _: vk::ImageType, _: u8, _: vk::Format, _: u8,
//! #                       _: u32, _: u32, _: u32, _: TextureUsage) -> TextureHandle {
//! #         self.next += 1;
//! #         TextureHandle(self.next)
//! #     }
//! #     fn destroy_texture(&mut self, _: TextureHandle) {}
//! #     fn create_render_target(&mut self, _: AttachmentFlags, _: u32, _: u32, _: u8,
//! #                             _: vk::Format, _: Option<TextureHandle>, _: Option<TextureHandle>,
//! #                             _: Option<TextureHandle>) -> RenderTargetHandle {
//! #         self.next += 1;
//! #         RenderTargetHandle(self.next)
//! #     }
//! #     fn destroy_render_target(&mut self, _: RenderTargetHandle) {}
//! # }
//! # let mut driver = NullDriver { next: 0 };
//! #[derive(Copy, Clone)]
//! struct GeometryData {
//!     output: VirtualResource,
//! }
//!
//! let mut graph = FrameGraph::new();
//! let geometry = graph.add_pass(
//!     "geometry",
//!     |builder| {
//!         let output = builder.create_texture("color", TextureDescriptor::default());
//!         let output = builder.write(output);
//!         GeometryData { output }
//!     },
//!     |resources, data, _driver| {
//!         let _target = resources.render_target(data.output);
//!         // record draw calls against _target here
//!     },
//! );
//! graph.present(geometry.output);
//! graph.compile().execute(&mut driver);
//! ```

pub mod builder;
pub mod frame_graph;
pub mod graphviz;
pub mod pass;
pub mod pass_resources;
pub mod resource;

pub(crate) mod physical_resource;
