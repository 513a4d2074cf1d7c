//! Export sink and the end-to-end export job.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use decal_common::config::{AppConfig, ExportResolution, ResizeFilter};
use decal_common::error::{DecalError, DecalResult};
use decal_model::session::Session;

use crate::compositor::{composite, PNG_MIME};
use crate::mapper::map_export;

/// What to do with the flattened image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportAction {
    /// Save as a file.
    Download,
    /// Hand to the platform's share facility.
    Share,
}

/// An encoded export ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    /// Whether the overlay made it onto the image.
    pub with_overlay: bool,
}

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Saved(PathBuf),
    Shared { backend: String },
}

/// Trait for native share facilities.
pub trait ShareBackend: Send {
    /// Hand the artifact over. Errors mean the facility rejected it.
    fn share(&mut self, artifact: &ExportArtifact) -> DecalResult<()>;

    /// Check, at call time, whether the facility exists on this system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Share backend for platforms without a share facility.
#[derive(Debug, Default)]
pub struct NoShareBackend;

impl ShareBackend for NoShareBackend {
    fn share(&mut self, _artifact: &ExportArtifact) -> DecalResult<()> {
        Err(DecalError::unsupported("no share facility on this platform"))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Share backend that pipes the PNG bytes into a helper program's stdin,
/// e.g. `wl-copy --type image/png` or a desktop share portal wrapper.
#[derive(Debug, Clone)]
pub struct CommandShareBackend {
    argv: Vec<String>,
}

impl CommandShareBackend {
    /// `None` if `argv` is empty.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        (!argv.is_empty()).then_some(Self { argv })
    }
}

impl ShareBackend for CommandShareBackend {
    fn share(&mut self, artifact: &ExportArtifact) -> DecalResult<()> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| DecalError::unsupported("share command is empty"))?;

        tracing::debug!(program, ?args, bytes = artifact.bytes.len(), "Running share helper");

        let mut child = Command::new(program)
            .args(args)
            .env("DECAL_SHARE_FILE_NAME", &artifact.file_name)
            .env("DECAL_SHARE_MIME_TYPE", artifact.mime_type)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DecalError::share_failed(format!("failed to start {program}: {e}")))?;

        {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| DecalError::share_failed("failed to open share helper stdin"))?;
            stdin
                .write_all(&artifact.bytes)
                .map_err(|e| DecalError::share_failed(format!("failed to send image: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| DecalError::share_failed(format!("failed to wait on {program}: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecalError::share_failed(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.argv
            .first()
            .map(|program| command_exists(program))
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("none")
    }
}

/// Build the configured share backend.
pub fn share_backend_from_config(config: &AppConfig) -> Box<dyn ShareBackend> {
    match config.share.command.clone().and_then(CommandShareBackend::new) {
        Some(backend) => Box::new(backend),
        None => Box::new(NoShareBackend),
    }
}

/// Turns artifacts into files or share payloads.
pub struct ExportSink {
    output_dir: PathBuf,
    share: Box<dyn ShareBackend>,
}

impl ExportSink {
    pub fn new(output_dir: impl Into<PathBuf>, share: Box<dyn ShareBackend>) -> Self {
        Self {
            output_dir: output_dir.into(),
            share,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.export.output_dir.clone(), share_backend_from_config(config))
    }

    /// Whether sharing would currently be attempted.
    pub fn can_share(&self) -> bool {
        self.share.is_available()
    }

    pub fn share_backend_name(&self) -> &str {
        self.share.name()
    }

    /// Deliver an artifact.
    ///
    /// `Share` fails with `Unsupported` when no facility is present and
    /// with `ShareFailed` when the facility rejects the payload. Neither
    /// is retried.
    pub fn deliver(
        &mut self,
        artifact: &ExportArtifact,
        action: ExportAction,
    ) -> DecalResult<Delivery> {
        match action {
            ExportAction::Download => {
                std::fs::create_dir_all(&self.output_dir)?;
                let path = self.output_dir.join(&artifact.file_name);
                std::fs::write(&path, &artifact.bytes)?;
                tracing::info!(path = %path.display(), bytes = artifact.bytes.len(), "Export saved");
                Ok(Delivery::Saved(path))
            }
            ExportAction::Share => {
                if !self.share.is_available() {
                    return Err(DecalError::unsupported(format!(
                        "share facility '{}' is not available",
                        self.share.name()
                    )));
                }
                let backend = self.share.name().to_string();
                match self.share.share(artifact) {
                    Ok(()) => {
                        tracing::info!(backend = %backend, "Shared successfully");
                        Ok(Delivery::Shared { backend })
                    }
                    Err(e @ DecalError::ShareFailed { .. }) | Err(e @ DecalError::Unsupported { .. }) => {
                        Err(e)
                    }
                    Err(e) => Err(DecalError::share_failed(e.to_string())),
                }
            }
        }
    }
}

/// Options controlling one export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub file_name: String,
    pub resolution: ExportResolution,
    pub filter: ResizeFilter,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ExportOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            file_name: config.export.file_name.clone(),
            resolution: config.export.resolution,
            filter: config.export.filter,
        }
    }
}

/// Summary of a finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub width: u32,
    pub height: u32,
    pub with_overlay: bool,
    pub bytes: usize,
    pub delivery: Delivery,
}

/// Render the session's current arrangement to a flattened PNG.
///
/// Does not mutate the session. Sources are decoded afresh.
pub async fn render_artifact(
    session: &Session,
    options: &ExportOptions,
) -> DecalResult<ExportArtifact> {
    let plan = map_export(session, options.resolution)?;
    let surface = composite(&plan, options.filter).await?;
    let bytes = surface.encode_png()?;
    Ok(ExportArtifact {
        bytes,
        file_name: options.file_name.clone(),
        mime_type: PNG_MIME,
        width: surface.width(),
        height: surface.height(),
        with_overlay: surface.has_overlay(),
    })
}

/// Export the session and deliver the result.
///
/// This is the main entry point for exporting.
pub async fn export_session(
    session: &Session,
    action: ExportAction,
    options: &ExportOptions,
    sink: &mut ExportSink,
) -> DecalResult<ExportReport> {
    tracing::info!(
        ?action,
        resolution = ?options.resolution,
        state = ?session.state(),
        "Starting export"
    );

    let artifact = render_artifact(session, options).await?;
    let delivery = sink.deliver(&artifact, action)?;

    Ok(ExportReport {
        width: artifact.width,
        height: artifact.height,
        with_overlay: artifact.with_overlay,
        bytes: artifact.bytes.len(),
        delivery,
    })
}

fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary} >/dev/null 2>&1"))
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
