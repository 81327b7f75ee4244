//! Graphviz rendering service
//!
//! Turns a prepared tree into a graph description and hands it to the
//! Graphviz executable. The DOT source lives in a temporary file that is
//! removed when rendering finishes, successful or not.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::RenderSettings;
use crate::domain::{GraphDescription, LayoutDirection, LayoutEngine, Node};
use crate::infrastructure::traits::{CommandRunner, FileSystem};
use crate::infrastructure::InfraError;

/// Where and how to render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Requested output path; its extension picks the format
    pub output: PathBuf,
    pub engine: LayoutEngine,
    pub direction: LayoutDirection,
    /// Final safety bound on emitted nodes
    pub max_nodes: Option<usize>,
}

/// Outcome of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    /// Path actually written (may have gained an extension)
    pub output: PathBuf,
    /// Graphviz output format
    pub format: String,
    /// Nodes emitted to the renderer
    pub rendered: usize,
}

/// Resolve the output path and format from the requested path.
///
/// The format is the lower-cased extension; without one, `default_format`
/// is used and appended to the path.
pub fn resolve_output(requested: &Path, default_format: &str) -> (PathBuf, String) {
    match requested.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() => (requested.to_path_buf(), ext.to_ascii_lowercase()),
        _ => {
            let mut with_ext = requested.as_os_str().to_os_string();
            with_ext.push(".");
            with_ext.push(default_format);
            (PathBuf::from(with_ext), default_format.to_string())
        }
    }
}

/// Service driving the external Graphviz renderer.
pub struct RenderService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: RenderSettings,
}

impl RenderService {
    /// Create a new render service.
    pub fn new(fs: Arc<dyn FileSystem>, cmd: Arc<dyn CommandRunner>, settings: RenderSettings) -> Self {
        Self { fs, cmd, settings }
    }

    /// Build the graph description for an annotated tree.
    pub fn describe(&self, tree: &Node, direction: LayoutDirection, max_nodes: Option<usize>) -> GraphDescription {
        GraphDescription::from_tree(tree, direction, max_nodes)
    }

    /// Render an annotated tree to the requested output file.
    #[instrument(level = "debug", skip(self, tree), fields(output = %request.output.display()))]
    pub fn render(&self, tree: &Node, request: &RenderRequest) -> ApplicationResult<RenderSummary> {
        let graph = self.describe(tree, request.direction, request.max_nodes);
        let (output, format) = resolve_output(&request.output, &self.settings.default_format);
        debug!(
            "render: {} nodes, {} edges as {} via {}",
            graph.node_count(),
            graph.edges.len(),
            format,
            request.engine
        );

        self.fs
            .ensure_parent(&output)
            .with_path_context("create output directory", &output)?;

        let mut source = NamedTempFile::new().with_context("create temporary DOT file")?;
        let written = source
            .write_all(graph.to_dot().as_bytes())
            .and_then(|_| source.flush());
        written.with_path_context("write DOT source", source.path())?;

        self.run_renderer(source.path(), &output, &format, request.engine)?;
        // `source` is dropped here, deleting the temporary DOT file

        info!("rendered {} nodes to {}", graph.node_count(), output.display());
        Ok(RenderSummary {
            output,
            format,
            rendered: graph.node_count(),
        })
    }

    fn run_renderer(
        &self,
        source: &Path,
        output: &Path,
        format: &str,
        engine: LayoutEngine,
    ) -> ApplicationResult<()> {
        let engine_arg = format!("-K{}", engine);
        let format_arg = format!("-T{}", format);
        let output_str = output.to_string_lossy();
        let source_str = source.to_string_lossy();
        let args = [
            engine_arg.as_str(),
            format_arg.as_str(),
            "-o",
            output_str.as_ref(),
            source_str.as_ref(),
        ];

        let binary = &self.settings.dot_binary;
        let result = self
            .cmd
            .run(binary, &args)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("run {} (is Graphviz installed?)", binary),
                source: Box::new(InfraError::Render {
                    message: e.to_string(),
                    exit_code: None,
                }),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(ApplicationError::OperationFailed {
                context: format!("{} {}: {}", binary, output.display(), stderr),
                source: Box::new(InfraError::Render {
                    message: stderr,
                    exit_code: result.status.code(),
                }),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_extension_when_resolving_then_lowercase_format() {
        let (path, format) = resolve_output(Path::new("out/tree.PNG"), "svg");
        assert_eq!(path, PathBuf::from("out/tree.PNG"));
        assert_eq!(format, "png");
    }

    #[test]
    fn given_no_extension_when_resolving_then_default_appended() {
        let (path, format) = resolve_output(Path::new("out/tree"), "svg");
        assert_eq!(path, PathBuf::from("out/tree.svg"));
        assert_eq!(format, "svg");
    }
}
