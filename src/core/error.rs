//! Exposes the deimos error type.

use thiserror::Error;

/// Error type that deimos can return.
///
/// Stale handles handed to the [`PassBuilder`](crate::PassBuilder) are a soft failure
/// (logged, operation skipped) and never surface here; this type covers operations
/// that refuse to proceed on bad input, such as [`move_resource`](crate::FrameGraph::move_resource).
#[derive(Debug, Error)]
pub enum Error {
    /// The handle does not name the current version of its resource. It was either
    /// never initialized or invalidated by a later write.
    #[error("stale resource handle (index {index}, version {version})")]
    InvalidHandle {
        /// Index carried by the offending handle.
        index: u16,
        /// Version carried by the offending handle.
        version: u16,
    },
    /// The handle's index does not name any resource declared in the graph.
    #[error("unknown resource index {0}")]
    UnknownResource(u16),
}
