//! Check export and share capabilities.

use decal_common::config::AppConfig;
use decal_render_engine::ExportSink;

pub fn run(config: &AppConfig, write_config: bool) -> anyhow::Result<()> {
    println!("Decal System Check");
    println!("{}", "=".repeat(50));

    println!(
        "[OK] Export: {} -> {}",
        config.export.file_name,
        config.export.output_dir.display()
    );
    println!(
        "     Resolution: {:?}, filter: {:?}",
        config.export.resolution, config.export.filter
    );

    let sink = ExportSink::from_config(config);
    if sink.can_share() {
        println!("[OK] Share helper: {}", sink.share_backend_name());
    } else if config.share.command.is_some() {
        println!(
            "[WARN] Share helper '{}' not found on PATH",
            sink.share_backend_name()
        );
    } else {
        println!("[WARN] Share helper: not configured");
        println!("     Set share.command in the config file, e.g. [\"wl-copy\", \"--type\", \"image/png\"]");
    }

    println!();
    if write_config {
        let path = config.save()?;
        println!("[OK] Config written to {}", path.display());
    } else {
        println!("     Config file: {}", AppConfig::path().display());
    }

    println!();
    println!("Downloads are always available. Sharing falls back to a download when unavailable.");

    Ok(())
}
