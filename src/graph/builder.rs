//! The per-pass setup API used to declare reads, writes and new resources.

use crate::graph::frame_graph::FrameGraph;
use crate::graph::resource::{RWFlags, TextureDescriptor, VirtualResource};

/// Scoped declaration API handed to the setup closure of
/// [`add_pass`](FrameGraph::add_pass). It is bound to the pass under construction
/// and lives only for the duration of that closure.
///
/// All operations on stale handles fail quietly: a diagnostic is logged, nothing is
/// recorded on the pass, and an uninitialized handle is returned.
pub struct PassBuilder<'graph> {
    pub(crate) graph: &'graph mut FrameGraph,
    pub(crate) pass: usize,
}

impl PassBuilder<'_> {
    /// Declare a new virtual texture and return a handle to its initial version.
    /// Nothing is allocated until the compiled graph decides the resource is
    /// actually consumed.
    pub fn create_texture(&mut self, name: &str, desc: TextureDescriptor) -> VirtualResource {
        self.graph.create_resource(name, desc)
    }

    /// Declare that this pass reads the color plane of `input`.
    pub fn read(&mut self, input: VirtualResource) -> VirtualResource {
        self.read_flags(input, RWFlags::default())
    }

    /// Declare that this pass reads `input`, selecting the touched planes explicitly.
    /// Returns `input` unchanged; reading never invalidates a handle.
    pub fn read_flags(&mut self, input: VirtualResource, flags: RWFlags) -> VirtualResource {
        self.graph
            .record_read(self.pass, input, flags)
            .unwrap_or_default()
    }

    /// Declare that this pass writes the color plane of `output`.
    pub fn write(&mut self, output: VirtualResource) -> VirtualResource {
        self.write_flags(output, RWFlags::default())
    }

    /// Declare that this pass writes `output`, selecting the touched planes
    /// explicitly. Returns a renamed handle for the new version of the resource.
    ///
    /// Handles that are written through are invalidated, to avoid undefined order
    /// of access to the resource:
    ///
    /// ```text
    ///          +-> [R1] -+
    ///         /           \
    ///   (A) -+             +-> (A)
    ///         \           /
    ///          +-> [R2] -+        // failure when setting R2 from (A)
    /// ```
    ///
    /// The old handle remains usable as a read of the previous version, but a second
    /// write through it fails the version check. Two unrelated passes can therefore
    /// never write the "same" resource; only the holder of the current version can.
    pub fn write_flags(&mut self, output: VirtualResource, flags: RWFlags) -> VirtualResource {
        self.graph
            .record_write(self.pass, output, flags)
            .unwrap_or_default()
    }

    /// True iff `handle` names the current version of its resource. Mirrors
    /// [`FrameGraph::is_valid`] for use inside setup closures, where the graph
    /// itself is exclusively borrowed by the builder.
    pub fn is_valid(&self, handle: VirtualResource) -> bool {
        self.graph.is_valid(handle)
    }

    /// Version-checked descriptor lookup, usable during setup.
    pub fn descriptor(&self, handle: VirtualResource) -> Option<&TextureDescriptor> {
        self.graph.descriptor(handle)
    }
}
