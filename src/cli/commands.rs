//! Command dispatch: maps parsed arguments onto application services

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::{to_text_tree, RenderRequest};
use crate::cli::args::{Cli, Commands, ConfigCommands, ReduceArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{GraphDescription, LayoutDirection, LayoutEngine};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("effective settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Render {
            json_file,
            out,
            engine,
            rankdir,
            reduce,
        }) => _render(&settings, json_file, out, *engine, *rankdir, reduce),
        Some(Commands::Dot {
            json_file,
            rankdir,
            reduce,
        }) => _dot(&settings, json_file, *rankdir, reduce),
        Some(Commands::Tree { json_file, reduce }) => _tree(&settings, json_file, reduce),
        Some(Commands::Stats { json_file, reduce }) => _stats(&settings, json_file, reduce),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => {
            Cli::command()
                .print_help()
                .map_err(|e| CliError::Usage(e.to_string()))?;
            Ok(())
        }
    }
}

#[instrument(skip(settings, reduce))]
fn _render(
    settings: &Settings,
    json_file: &Path,
    out: &Path,
    engine: Option<LayoutEngine>,
    rankdir: Option<LayoutDirection>,
    reduce: &ReduceArgs,
) -> CliResult<()> {
    let container = ServiceContainer::new(reduce.apply(settings));
    let opts = &container.settings.reduce;
    let prepared = container.tree_service().load_prepared(json_file, opts)?;

    let request = RenderRequest {
        output: out.to_path_buf(),
        engine: engine.unwrap_or(container.settings.render.engine),
        direction: rankdir.unwrap_or(container.settings.render.direction),
        max_nodes: opts.max_nodes,
    };
    let summary = container.render_service().render(&prepared.tree, &request)?;
    output::success(&format!(
        "Rendered tree to {} (nodes rendered: {})",
        summary.output.display(),
        summary.rendered
    ));
    Ok(())
}

#[instrument(skip(settings, reduce))]
fn _dot(
    settings: &Settings,
    json_file: &Path,
    rankdir: Option<LayoutDirection>,
    reduce: &ReduceArgs,
) -> CliResult<()> {
    let container = ServiceContainer::new(reduce.apply(settings));
    let opts = &container.settings.reduce;
    let prepared = container.tree_service().load_prepared(json_file, opts)?;

    let direction = rankdir.unwrap_or(container.settings.render.direction);
    let graph = GraphDescription::from_tree(&prepared.tree, direction, opts.max_nodes);
    output::info(graph.to_dot().trim_end());
    Ok(())
}

#[instrument(skip(settings, reduce))]
fn _tree(settings: &Settings, json_file: &Path, reduce: &ReduceArgs) -> CliResult<()> {
    let container = ServiceContainer::new(reduce.apply(settings));
    let prepared = container
        .tree_service()
        .load_prepared(json_file, &container.settings.reduce)?;
    output::info(to_text_tree(&prepared.tree).to_string().trim_end());
    Ok(())
}

#[instrument(skip(settings, reduce))]
fn _stats(settings: &Settings, json_file: &Path, reduce: &ReduceArgs) -> CliResult<()> {
    let container = ServiceContainer::new(reduce.apply(settings));
    let prepared = container
        .tree_service()
        .load_prepared(json_file, &container.settings.reduce)?;

    output::header(&json_file.display());
    output::field("input", 8, &prepared.raw);
    output::field("reduced", 8, &prepared.reduced);
    if prepared.raw.nodes > 0 {
        let kept = prepared.reduced.nodes as f64 / prepared.raw.nodes as f64 * 100.0;
        output::field("kept", 8, &format!("{:.1}%", kept));
    }
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                output::info(&path.display());
                if !path.exists() {
                    output::warning("global config file does not exist; using defaults");
                }
            }
            None => {
                return Err(CliError::Usage(
                    "cannot determine config directory (no home directory)".into(),
                ))
            }
        },
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
