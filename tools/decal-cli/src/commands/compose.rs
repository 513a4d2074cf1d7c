//! Place a sticker on a base image and export the result.

use std::path::PathBuf;

use decal_common::config::{AppConfig, ExportResolution, ResizeFilter};
use decal_common::error::DecalError;
use decal_model::geometry::{Dimensions, Offset};
use decal_model::session::Session;
use decal_model::source::SourceRef;
use decal_model::transform::parse_transform_offset;
use decal_render_engine::loader::{self, LoadOutcome};
use decal_render_engine::stickers::builtin_stickers;
use decal_render_engine::{export_session, Delivery, ExportAction, ExportOptions, ExportSink};

pub struct ComposeArgs {
    pub base: PathBuf,
    pub overlay: Option<PathBuf>,
    pub sticker: Option<u32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub transform: Option<String>,
    pub container: Option<Dimensions>,
    pub share: bool,
    pub out: Option<PathBuf>,
    pub native: bool,
    pub filter: Option<ResizeFilter>,
}

pub async fn run(mut config: AppConfig, args: ComposeArgs) -> anyhow::Result<()> {
    if let Some(out) = args.out {
        config.export.output_dir = out;
    }
    if args.native {
        config.export.resolution = ExportResolution::Native;
    }
    if let Some(filter) = args.filter {
        config.export.filter = filter;
    }

    let mut session = Session::from_config(&config, builtin_stickers()?);
    session.set_container_size(super::stage_size(&config, args.container));

    match loader::load_base(&mut session, SourceRef::local(args.base.clone()))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", args.base.display()))?
    {
        LoadOutcome::Applied(size) => tracing::debug!(intrinsic = %size, "Base ready"),
        LoadOutcome::Superseded => anyhow::bail!("Base image load was superseded"),
    }

    let sticker_id = match (args.overlay, args.sticker) {
        (Some(path), _) => Some(
            loader::add_overlay(&mut session, SourceRef::local(path.clone()))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to add sticker {}: {e}", path.display()))?,
        ),
        (None, id) => id,
    };

    if let Some(id) = sticker_id {
        loader::select_overlay(&mut session, id).await?;

        let requested = match &args.transform {
            Some(transform) => parse_transform_offset(Some(transform.as_str())),
            None => Offset::new(args.x.unwrap_or(0.0), args.y.unwrap_or(0.0)),
        };
        session.begin_drag()?;
        let applied = session.drag_to(requested)?;
        session.end_drag();
        if applied != requested {
            tracing::warn!(
                requested = %requested.css_transform(),
                applied = %applied.css_transform(),
                "Sticker offset constrained to the stage"
            );
        }
    }

    let options = ExportOptions::from_config(&config);
    let mut sink = ExportSink::from_config(&config);
    let action = if args.share {
        ExportAction::Share
    } else {
        ExportAction::Download
    };

    let report = match export_session(&session, action, &options, &mut sink).await {
        Ok(report) => report,
        Err(e @ DecalError::Unsupported { .. }) => {
            tracing::warn!(error = %e, "Sharing is not available; saving instead");
            export_session(&session, ExportAction::Download, &options, &mut sink).await?
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Exported {}x{} ({} bytes{})",
        report.width,
        report.height,
        report.bytes,
        if report.with_overlay {
            ", with sticker"
        } else {
            ""
        }
    );
    match session.active() {
        Some(active) if report.with_overlay => {
            println!("  Sticker {} at {}", active.id, active.offset.css_transform())
        }
        Some(active) => println!("  Sticker {} could not be drawn", active.id),
        None => {}
    }
    match report.delivery {
        Delivery::Saved(path) => println!("  Saved: {}", path.display()),
        Delivery::Shared { backend } => println!("  Shared via {backend}"),
    }

    Ok(())
}
