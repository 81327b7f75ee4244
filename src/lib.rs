//! viztree: reduce large decision trees and render them with Graphviz.
//!
//! Layers, innermost first:
//! - [`domain`]: tree model, reducer, chain collapsing, graph description
//! - [`application`]: services orchestrating load, reduce and render
//! - [`infrastructure`]: filesystem and process boundaries, service wiring
//! - [`cli`]: argument parsing, dispatch and user-facing output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
