//! Pass nodes and the type-erased pass executor.

use derivative::Derivative;

use crate::core::driver::Driver;
use crate::graph::pass_resources::PassResources;
use crate::graph::resource::{ResourceNode, VirtualResource};

/// Type eraser over pass-local data: every pass, whatever data type its setup
/// constructed, exposes a single execute entry point.
pub trait PassExecutor {
    /// Run the pass. `resources` resolves the pass's declared handles to concrete
    /// driver handles; `driver` is the backend the pass submits its work to.
    fn execute(&mut self, resources: &PassResources, driver: &mut dyn Driver);
}

pub(crate) type BoxedPassExecutor = Box<dyn PassExecutor>;

/// Pairs user pass data with its callback. This is the variant the graph boxes
/// behind [`PassExecutor`]; the data type is erased, the capability is kept.
pub(crate) struct TypedPassExecutor<T, F> {
    pub(crate) data: T,
    pub(crate) callback: F,
}

impl<T, F> PassExecutor for TypedPassExecutor<T, F>
where
    F: FnMut(&PassResources, &T, &mut dyn Driver),
{
    fn execute(&mut self, resources: &PassResources, driver: &mut dyn Driver) {
        (self.callback)(resources, &self.data, driver)
    }
}

/// A unit of GPU work with declared reads and writes. Owned by the graph,
/// addressed by declaration index.
#[derive(Derivative)]
#[derivative(Debug)]
pub(crate) struct PassNode {
    pub(crate) name: String,
    // monotonic declaration index, also the execution sequence number
    pub(crate) id: u32,
    #[derivative(Debug = "ignore")]
    pub(crate) executor: Option<BoxedPassExecutor>,

    // set by the builder
    pub(crate) reads: Vec<VirtualResource>,
    pub(crate) writes: Vec<VirtualResource>,

    // computed during compile()
    pub(crate) devirtualize: Vec<u16>,
    pub(crate) destroy: Vec<u16>,
    pub(crate) ref_count: u32,
}

impl PassNode {
    pub(crate) fn new(name: impl Into<String>, id: u32) -> Self {
        PassNode {
            name: name.into(),
            id,
            executor: None,
            reads: Vec::new(),
            writes: Vec::new(),
            devirtualize: Vec::new(),
            destroy: Vec::new(),
            ref_count: 0,
        }
    }

    /// Record a read of the resource's current version.
    pub(crate) fn read(&mut self, resource: &ResourceNode) {
        self.reads.push(resource.handle());
    }

    /// Record a write: bump the resource version, invalidating all existing handles
    /// to it, and return the renamed handle.
    pub(crate) fn write(&mut self, resource: &mut ResourceNode) -> VirtualResource {
        resource.version += 1;
        let handle = resource.handle();
        self.writes.push(handle);
        handle
    }

    /// A pass is culled when the reverse-refcount pass drained all of its writes.
    /// Passes that write nothing exist only for their side effects (present,
    /// readbacks) and always run.
    pub(crate) fn is_culled(&self) -> bool {
        self.ref_count == 0 && !self.writes.is_empty()
    }
}
