//! List the sticker gallery.

use std::path::PathBuf;

use decal_common::config::AppConfig;
use decal_model::session::Session;
use decal_model::source::SourceRef;
use decal_render_engine::decode;
use decal_render_engine::loader;
use decal_render_engine::stickers::{builtin_stickers, BUILTIN_STICKER_COUNT};

pub async fn run(config: &AppConfig, add: Vec<PathBuf>) -> anyhow::Result<()> {
    let mut session = Session::from_config(config, builtin_stickers()?);

    for path in add {
        match loader::add_overlay(&mut session, SourceRef::local(path.clone())).await {
            Ok(id) => tracing::info!(id, path = %path.display(), "Sticker added"),
            Err(e) => println!("[WARN] {}: {e}", path.display()),
        }
    }

    let gallery = session.gallery();
    println!("Stickers ({}):", gallery.len());
    for candidate in gallery.list() {
        let size = match decode::probe(&candidate.source.source).await {
            Ok(size) => size.to_string(),
            Err(_) => "unreadable".to_string(),
        };
        let kind = if (candidate.id as usize) <= BUILTIN_STICKER_COUNT {
            "built-in".to_string()
        } else {
            candidate.source.source.describe()
        };
        println!("  {:>2}  {:<12} {}", candidate.id, size, kind);
    }

    match gallery.capacity() {
        Some(capacity) if !gallery.can_add() => {
            println!("Gallery is full ({capacity} items).")
        }
        Some(capacity) => println!(
            "Room for {} more.",
            capacity.saturating_sub(gallery.len())
        ),
        None => {}
    }

    Ok(())
}
