//! Frame graph construction, compilation and execution.

use anyhow::Result;
use log::{debug, trace, warn};

use crate::core::driver::Driver;
use crate::core::error::Error;
use crate::graph::builder::PassBuilder;
use crate::graph::pass::{PassNode, TypedPassExecutor};
use crate::graph::pass_resources::PassResources;
use crate::graph::physical_resource::PhysicalResource;
use crate::graph::resource::{RWFlags, ResourceNode, TextureDescriptor, VirtualResource};

/// Records a [`move_resource`](FrameGraph::move_resource) call. After compile, `to`
/// shares the physical record of `from`.
#[derive(Debug, Copy, Clone)]
pub(crate) struct ResourceAlias {
    pub(crate) from: VirtualResource,
    pub(crate) to: VirtualResource,
}

/// A declarative planner for per-frame GPU work.
///
/// Clients describe rendering passes and the virtual resources each pass reads and
/// writes; compiling the description culls passes whose outputs are never consumed
/// and computes, for every surviving resource, the interval it has to be backed by
/// driver memory. Executing the compiled graph interleaves resource creation, pass
/// callbacks and resource teardown, then resets the graph for the next frame.
///
/// A frame goes through three phases on a single thread:
///
/// 1. **setup**: [`add_pass`](Self::add_pass), [`present`](Self::present) and
///    [`move_resource`](Self::move_resource) record the frame's structure,
/// 2. **compile**: [`compile`](Self::compile), at most once per frame,
/// 3. **execute**: [`execute`](Self::execute), which drives the driver and leaves
///    the graph empty and reusable.
///
/// Construction calls must not be made between compile and execute.
#[derive(Debug, Default)]
pub struct FrameGraph {
    pub(crate) pass_nodes: Vec<PassNode>,
    pub(crate) resource_nodes: Vec<ResourceNode>,
    // physical registry, appended in lockstep with resource_nodes during compile
    pub(crate) resources: Vec<PhysicalResource>,
    pub(crate) aliases: Vec<ResourceAlias>,
}

impl FrameGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to the graph.
    ///
    /// `setup` runs synchronously with a [`PassBuilder`] bound to the new pass and
    /// constructs the pass-local data, declaring reads, writes and new resources as
    /// it goes. `execute` is stored on the pass and invoked during
    /// [`execute`](Self::execute) with that data, unless the pass is culled. A clone
    /// of the pass data is returned so later passes can consume the handles this
    /// pass produced.
    pub fn add_pass<T, S, E>(&mut self, name: &str, setup: S, execute: E) -> T
    where
        T: Clone + 'static,
        S: FnOnce(&mut PassBuilder) -> T,
        E: FnMut(&PassResources, &T, &mut dyn Driver) + 'static,
    {
        let id = self.pass_nodes.len() as u32;
        self.pass_nodes.push(PassNode::new(name, id));

        let mut builder = PassBuilder {
            graph: self,
            pass: id as usize,
        };
        let data = setup(&mut builder);

        self.pass_nodes[id as usize].executor = Some(Box::new(TypedPassExecutor {
            data: data.clone(),
            callback: execute,
        }));
        data
    }

    /// Declare that the contents of `input` are externally observable. This is a
    /// no-op pass reading `input`; the read keeps the resource and, transitively,
    /// everything that produced it from being culled.
    pub fn present(&mut self, input: VirtualResource) {
        self.add_pass(
            "present",
            |builder| {
                builder.read(input);
            },
            |_: &PassResources, _: &(), _: &mut dyn Driver| {},
        );
    }

    /// Record that `to` should be backed by the same physical resource as `from`.
    ///
    /// Both handles must be current at the time of the call; the alias is verified
    /// again during compile and dropped with a warning if either resource was
    /// written in the meantime.
    pub fn move_resource(&mut self, from: VirtualResource, to: VirtualResource) -> Result<()> {
        self.check_current(from)?;
        self.check_current(to)?;
        self.aliases.push(ResourceAlias { from, to });
        Ok(())
    }

    /// True iff `handle` names the current version of its resource.
    pub fn is_valid(&self, handle: VirtualResource) -> bool {
        handle.is_initialized()
            && self
                .resource_nodes
                .get(handle.index as usize)
                .map(|node| node.version == handle.version)
                .unwrap_or(false)
    }

    /// Version-checked lookup of the descriptor `handle` was declared with.
    pub fn descriptor(&self, handle: VirtualResource) -> Option<&TextureDescriptor> {
        self.resource(handle).map(|node| &node.desc)
    }

    /// Compile the graph: materialize physical records, resolve aliases, seed
    /// reference counts, cull unconsumed passes and place allocate/release points.
    ///
    /// Returns `self` so a frame can be written as `graph.compile().execute(driver)`.
    pub fn compile(&mut self) -> &mut Self {
        debug_assert!(self.resources.is_empty(), "compile() must run once per frame");

        let Self {
            pass_nodes,
            resource_nodes,
            resources,
            aliases,
        } = self;

        // one physical record per node, in lockstep
        resources.reserve(resource_nodes.len());
        for node in resource_nodes.iter_mut() {
            node.resource = Some(resources.len() as u16);
            resources.push(PhysicalResource::new(
                node.name.clone(),
                node.desc,
                node.read_flags,
                node.write_flags,
            ));
        }

        // remap aliased nodes onto their source's record; the orphaned record stays
        // in the registry but ends up with no users and never allocates
        for alias in aliases.iter() {
            let from = &resource_nodes[alias.from.index as usize];
            let to = &resource_nodes[alias.to.index as usize];
            if from.version != alias.from.version || to.version != alias.to.version {
                warn!(
                    "dropping move of \"{}\" onto \"{}\": a handle went stale after move_resource()",
                    from.name, to.name
                );
                continue;
            }
            let record = resource_nodes[alias.from.index as usize].resource;
            if let Some(index) = record {
                // the shared record must satisfy the usages declared on both nodes
                let shared = &mut resources[index as usize];
                shared.read_flags |= to.read_flags;
                shared.write_flags |= to.write_flags;
            }
            resource_nodes[alias.to.index as usize].resource = record;
        }

        // seed pass refcounts and per-record reader/writer counts and endpoints
        for (id, pass) in pass_nodes.iter_mut().enumerate() {
            pass.ref_count = pass.writes.len() as u32;

            for handle in &pass.reads {
                let record = record_mut(resource_nodes, resources, *handle);
                record.reader_count += 1;
                record.first.get_or_insert(id as u16);
                record.last = Some(id as u16);
            }
            for handle in &pass.writes {
                let record = record_mut(resource_nodes, resources, *handle);
                record.writer = Some(id as u16);
                record.writer_count += 1;
                record.first.get_or_insert(id as u16);
                record.last = Some(id as u16);
            }
        }

        // reverse-refcount cull, seeded with every record nothing reads
        let mut stack: Vec<u16> = resources
            .iter()
            .enumerate()
            .filter(|(_, record)| record.reader_count == 0)
            .map(|(index, _)| index as u16)
            .collect();

        while let Some(index) = stack.pop() {
            let record = &resources[index as usize];

            // an unread record cannot have more than one producer: two unrelated
            // passes can never hold the same current handle, and a read+write pass
            // keeps the reader count alive
            debug_assert!(record.writer_count <= 1);

            let Some(writer) = record.writer else {
                warn!("resource \"{}\" is never written", record.name);
                continue;
            };

            let writer = &mut pass_nodes[writer as usize];
            debug_assert!(writer.ref_count >= 1);
            writer.ref_count -= 1;
            if writer.ref_count == 0 {
                // the pass is culled; its reads no longer pin their sources
                trace!("culling pass \"{}\"", writer.name);
                for handle in &writer.reads {
                    let index = resource_nodes[handle.index as usize]
                        .resource
                        .expect("record assigned above");
                    let record = &mut resources[index as usize];
                    record.reader_count -= 1;
                    if record.reader_count == 0 {
                        stack.push(index);
                    }
                }
            }
        }

        // place allocate/release points on the endpoints of every surviving record
        for (index, record) in resources.iter().enumerate() {
            debug_assert_eq!(record.first.is_none(), record.last.is_none());
            if record.reader_count == 0 {
                continue;
            }
            if let (Some(first), Some(last)) = (record.first, record.last) {
                pass_nodes[first as usize].devirtualize.push(index as u16);
                pass_nodes[last as usize].destroy.push(index as u16);
            }
        }

        self
    }

    /// Execute every surviving pass in declaration order, materializing each
    /// resource right before its first consumer and releasing it right after its
    /// last. Afterwards the graph is empty and ready to record the next frame.
    pub fn execute(&mut self, driver: &mut dyn Driver) {
        let Self {
            pass_nodes,
            resource_nodes,
            resources,
            aliases,
        } = self;

        for pass in pass_nodes.iter_mut() {
            if pass.is_culled() {
                debug!("skipping culled pass \"{}\"", pass.name);
                continue;
            }
            let mut executor = pass
                .executor
                .take()
                .expect("executor is set by add_pass and taken at most once");

            for &index in &pass.devirtualize {
                resources[index as usize].create(driver);
            }

            let view = PassResources {
                resource_nodes: resource_nodes.as_slice(),
                resources: resources.as_slice(),
            };
            executor.execute(&view, driver);

            for &index in &pass.destroy {
                resources[index as usize].destroy(driver);
            }
        }

        pass_nodes.clear();
        resource_nodes.clear();
        resources.clear();
        aliases.clear();
    }

    // --- internals shared with the builder ---

    pub(crate) fn create_resource(&mut self, name: &str, desc: TextureDescriptor) -> VirtualResource {
        let index = self.resource_nodes.len() as u16;
        self.resource_nodes.push(ResourceNode::new(name, index, desc));
        self.resource_nodes[index as usize].handle()
    }

    pub(crate) fn record_read(
        &mut self,
        pass: usize,
        input: VirtualResource,
        flags: RWFlags,
    ) -> Option<VirtualResource> {
        let node = resource_mut(&mut self.resource_nodes, input)?;
        node.read_flags |= flags;
        self.pass_nodes[pass].read(node);
        Some(input)
    }

    pub(crate) fn record_write(
        &mut self,
        pass: usize,
        output: VirtualResource,
        flags: RWFlags,
    ) -> Option<VirtualResource> {
        let node = resource_mut(&mut self.resource_nodes, output)?;
        node.write_flags |= flags;
        Some(self.pass_nodes[pass].write(node))
    }

    fn resource(&self, handle: VirtualResource) -> Option<&ResourceNode> {
        if !handle.is_initialized() {
            warn!("using an uninitialized resource handle");
            return None;
        }
        let node = self.resource_nodes.get(handle.index as usize)?;
        if handle.version != node.version {
            warn!(
                "using an invalid resource handle (version={}) for resource \"{}\" (id={}, version={})",
                handle.version, node.name, node.index, node.version
            );
            return None;
        }
        Some(node)
    }

    fn check_current(&self, handle: VirtualResource) -> Result<(), Error> {
        if !handle.is_initialized() {
            return Err(Error::InvalidHandle {
                index: handle.index,
                version: handle.version,
            });
        }
        match self.resource_nodes.get(handle.index as usize) {
            None => Err(Error::UnknownResource(handle.index)),
            Some(node) if node.version != handle.version => Err(Error::InvalidHandle {
                index: handle.index,
                version: handle.version,
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Version-checked mutable node lookup. Logs and returns `None` on a stale handle,
/// leaving the graph untouched.
fn resource_mut<'nodes>(
    nodes: &'nodes mut [ResourceNode],
    handle: VirtualResource,
) -> Option<&'nodes mut ResourceNode> {
    if !handle.is_initialized() {
        warn!("using an uninitialized resource handle");
        return None;
    }
    let node = nodes.get_mut(handle.index as usize)?;
    if handle.version != node.version {
        warn!(
            "using an invalid resource handle (version={}) for resource \"{}\" (id={}, version={})",
            handle.version, node.name, node.index, node.version
        );
        return None;
    }
    Some(node)
}

/// Physical record a handle resolves to. Only meaningful during compile, after the
/// registry has been populated.
fn record_mut<'registry>(
    nodes: &[ResourceNode],
    resources: &'registry mut [PhysicalResource],
    handle: VirtualResource,
) -> &'registry mut PhysicalResource {
    let index = nodes[handle.index as usize]
        .resource
        .expect("registry is populated before refcounts are seeded");
    &mut resources[index as usize]
}
