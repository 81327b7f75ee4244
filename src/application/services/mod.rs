//! Application services
//!
//! Concrete service implementations that orchestrate the domain pipeline.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod render;
mod tree;

pub use render::{resolve_output, RenderRequest, RenderService, RenderSummary};
pub use tree::{to_text_tree, PreparedTree, TreeService};
