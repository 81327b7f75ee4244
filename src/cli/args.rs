//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::Settings;
use crate::domain::{LayoutDirection, LayoutEngine};

/// Reduce large decision trees (pruning, top-k, chain collapsing) and render them with Graphviz
#[derive(Parser, Debug)]
#[command(name = "viztree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: $XDG_CONFIG_HOME/viztree/viztree.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reduce a tree and render it with Graphviz
    Render {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        json_file: PathBuf,

        /// Output file (svg/png/pdf); the extension selects the format
        #[arg(short, long, default_value = "tree.svg", value_hint = ValueHint::FilePath)]
        out: PathBuf,

        /// Graphviz layout engine (dot, neato, fdp, sfdp, twopi, circo)
        #[arg(long)]
        engine: Option<LayoutEngine>,

        /// TB (top->bottom) or LR (left->right)
        #[arg(long)]
        rankdir: Option<LayoutDirection>,

        #[command(flatten)]
        reduce: ReduceArgs,
    },

    /// Print the reduced tree as Graphviz DOT source
    Dot {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        json_file: PathBuf,

        /// TB (top->bottom) or LR (left->right)
        #[arg(long)]
        rankdir: Option<LayoutDirection>,

        #[command(flatten)]
        reduce: ReduceArgs,
    },

    /// Print the reduced tree as indented text
    Tree {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        json_file: PathBuf,

        #[command(flatten)]
        reduce: ReduceArgs,
    },

    /// Show node counts before and after reduction
    Stats {
        /// Tree JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        json_file: PathBuf,

        #[command(flatten)]
        reduce: ReduceArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings as TOML
    Show,
    /// Show the global config file location
    Path,
}

/// Tree reduction flags shared by all tree commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ReduceArgs {
    /// Collapse linear single-child chains (default)
    #[arg(long, overrides_with = "no_collapse_chains")]
    pub collapse_chains: bool,

    /// Disable chain collapsing
    #[arg(long, overrides_with = "collapse_chains")]
    pub no_collapse_chains: bool,

    /// Prune nodes with amount < MIN
    #[arg(long, value_name = "MIN", allow_negative_numbers = true)]
    pub min_amount: Option<f64>,

    /// Keep only the top K children by amount at each branching
    #[arg(long, value_name = "K")]
    pub topk: Option<usize>,

    /// Do not expand past this depth
    #[arg(long, value_name = "D")]
    pub max_depth: Option<usize>,

    /// Upper bound on materialized and rendered nodes
    #[arg(long, value_name = "N")]
    pub max_nodes: Option<usize>,
}

impl ReduceArgs {
    /// `Some` only when one of the collapse flags was given.
    pub fn collapse(&self) -> Option<bool> {
        if self.no_collapse_chains {
            Some(false)
        } else if self.collapse_chains {
            Some(true)
        } else {
            None
        }
    }

    /// Apply flags on top of loaded settings; flags win.
    pub fn apply(&self, settings: &Settings) -> Settings {
        let mut merged = settings.clone();
        let reduce = &mut merged.reduce;
        if let Some(collapse) = self.collapse() {
            reduce.collapse_chains = collapse;
        }
        reduce.min_amount = self.min_amount.or(reduce.min_amount);
        reduce.topk = self.topk.or(reduce.topk);
        reduce.max_depth = self.max_depth.or(reduce.max_depth);
        reduce.max_nodes = self.max_nodes.or(reduce.max_nodes);
        merged
    }
}
