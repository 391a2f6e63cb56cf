//! Graphviz dump of a frame graph, for debugging and visualization.

use std::io::Write;

use anyhow::Result;

use crate::graph::frame_graph::FrameGraph;
use crate::graph::resource::ResourceNode;

/// Trait that is implemented for the frame graph to help with debugging and
/// visualizing a compiled frame.
pub trait GraphViz {
    /// Write the graph in `dot` format.
    ///
    /// Passes render as orange boxes (dark when culled) labeled with their name,
    /// reference count and sequence number; every `(resource, version)` pair renders
    /// as a sky-blue box (dark when nothing reads the backing record). Red edges
    /// connect passes to the versions they write, green edges connect versions to
    /// their readers, and dashed yellow edges mark aliases. With `remove_culled`
    /// set, culled passes, dead resources and their edges are suppressed.
    ///
    /// The dump reflects compilation results; call it between
    /// [`compile`](FrameGraph::compile) and [`execute`](FrameGraph::execute).
    fn export_graphviz<W: Write>(&self, out: &mut W, remove_culled: bool) -> Result<()>;
}

impl GraphViz for FrameGraph {
    fn export_graphviz<W: Write>(&self, out: &mut W, remove_culled: bool) -> Result<()> {
        writeln!(out, "digraph framegraph {{")?;
        writeln!(out, "rankdir = LR")?;
        writeln!(out, "bgcolor = black")?;
        writeln!(out, "node [shape=rectangle, fontname=\"helvetica\", fontsize=10]")?;
        writeln!(out)?;

        // passes
        for pass in &self.pass_nodes {
            if remove_culled && pass.is_culled() {
                continue;
            }
            writeln!(
                out,
                "\"P{}\" [label=\"{}\\nrefs: {}\\nseq: {}\", style=filled, fillcolor={}]",
                pass.id,
                pass.name,
                pass.ref_count,
                pass.id,
                if pass.is_culled() { "darkorange4" } else { "darkorange" }
            )?;
        }

        // one node per version of each resource
        writeln!(out)?;
        for node in &self.resource_nodes {
            let readers = self.reader_count(node);
            if remove_culled && readers == 0 {
                continue;
            }
            for version in 0..=node.version {
                writeln!(
                    out,
                    "\"R{}_{}\" [label=\"{}\\n(version: {})\\nid:{}\\nrefs:{}\", style=filled, fillcolor={}]",
                    node.index,
                    version,
                    node.name,
                    version,
                    node.index,
                    readers,
                    if readers > 0 { "skyblue" } else { "skyblue4" }
                )?;
            }
        }

        // connect passes to the versions they write
        writeln!(out)?;
        for pass in &self.pass_nodes {
            if remove_culled && pass.is_culled() {
                continue;
            }
            for handle in &pass.writes {
                if remove_culled
                    && self.reader_count(&self.resource_nodes[handle.index as usize]) == 0
                {
                    continue;
                }
                writeln!(
                    out,
                    "P{} -> R{}_{} [color=red2]",
                    pass.id, handle.index, handle.version
                )?;
            }
        }

        // connect versions to the passes that read them
        writeln!(out)?;
        for pass in &self.pass_nodes {
            if remove_culled && pass.is_culled() {
                continue;
            }
            for handle in &pass.reads {
                if remove_culled
                    && self.reader_count(&self.resource_nodes[handle.index as usize]) == 0
                {
                    continue;
                }
                writeln!(
                    out,
                    "R{}_{} -> P{} [color=lightgreen]",
                    handle.index, handle.version, pass.id
                )?;
            }
        }

        // aliases
        if !self.aliases.is_empty() {
            writeln!(out)?;
            for alias in &self.aliases {
                writeln!(
                    out,
                    "R{}_{} -> R{}_{} [color=yellow, style=dashed]",
                    alias.from.index, alias.from.version, alias.to.index, alias.to.version
                )?;
            }
        }

        writeln!(out, "}}")?;
        Ok(())
    }
}

impl FrameGraph {
    /// Readers of the record backing `node`, zero before compile or for nodes whose
    /// record was culled.
    fn reader_count(&self, node: &ResourceNode) -> u32 {
        node.resource
            .map(|index| self.resources[index as usize].reader_count)
            .unwrap_or(0)
    }
}
