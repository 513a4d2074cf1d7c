use std::io::Cursor;
use std::path::PathBuf;

use decal_common::config::{ExportResolution, ResizeFilter};
use decal_common::error::DecalError;
use decal_model::gallery::OverlayGallery;
use decal_model::geometry::{Dimensions, Offset};
use decal_model::session::Session;
use decal_model::source::{ImageSource, Origin, SourceRef};
use decal_render_engine::export::{
    export_session, render_artifact, Delivery, ExportAction, ExportOptions, ExportSink,
    NoShareBackend,
};
use decal_render_engine::loader::{load_base, select_overlay};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

fn encode(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("fixture should encode");
    buf
}

fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn source(img: &RgbaImage) -> SourceRef {
    SourceRef::local(ImageSource::from(encode(img)))
}

fn stage(stickers: Vec<SourceRef>) -> Session {
    let mut session = Session::new(OverlayGallery::with_builtins(stickers, None), 100.0);
    session.set_container_size(Dimensions::new(476.0, 300.0));
    session
}

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("decal-{name}-{}", std::process::id()))
}

fn nearest() -> ExportOptions {
    ExportOptions {
        filter: ResizeFilter::Nearest,
        ..ExportOptions::default()
    }
}

#[tokio::test]
async fn landscape_base_exports_at_display_size() {
    let mut session = stage(vec![]);
    load_base(&mut session, source(&gradient(1000, 500)))
        .await
        .unwrap();

    let artifact = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap();
    assert_eq!((artifact.width, artifact.height), (476, 238));
    assert_eq!(artifact.file_name, "receipt.png");
    assert_eq!(artifact.mime_type, "image/png");
}

#[tokio::test]
async fn portrait_base_refits_by_height() {
    let mut session = stage(vec![]);
    load_base(&mut session, source(&gradient(500, 1000)))
        .await
        .unwrap();

    let artifact = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap();
    assert_eq!((artifact.width, artifact.height), (150, 300));
}

#[tokio::test]
async fn base_only_export_is_scaled_base() {
    let base = gradient(1000, 500);
    let mut session = stage(vec![source(&RgbaImage::from_pixel(20, 20, BLUE))]);
    load_base(&mut session, source(&base)).await.unwrap();

    let artifact = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap();
    let exported = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    let expected = imageops::resize(&base, 476, 238, FilterType::Triangle);
    assert_eq!(exported, expected);
    assert!(!exported.pixels().any(|p| *p == BLUE));
}

#[tokio::test]
async fn overlay_is_drawn_at_dragged_offset() {
    let mut session = stage(vec![source(&RgbaImage::from_pixel(200, 50, BLUE))]);
    load_base(&mut session, source(&RgbaImage::from_pixel(1000, 500, RED)))
        .await
        .unwrap();
    select_overlay(&mut session, 1).await.unwrap();
    session.begin_drag().unwrap();
    session.drag_to(Offset::new(12.0, 5.0)).unwrap();
    session.end_drag();

    let artifact = render_artifact(&session, &nearest()).await.unwrap();
    let exported = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();

    assert_eq!(*exported.get_pixel(12, 5), BLUE);
    assert_eq!(*exported.get_pixel(211, 54), BLUE);
    assert_eq!(*exported.get_pixel(11, 5), RED);
    assert_eq!(*exported.get_pixel(212, 5), RED);
    assert_eq!(*exported.get_pixel(12, 55), RED);
}

#[tokio::test]
async fn repeated_export_is_byte_identical() {
    let mut session = stage(vec![source(&gradient(300, 400))]);
    load_base(&mut session, source(&gradient(640, 480)))
        .await
        .unwrap();
    select_overlay(&mut session, 1).await.unwrap();
    session.drag_to(Offset::new(33.3, 17.8)).unwrap();

    let first = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap();
    let second = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap();
    assert_eq!(first.bytes, second.bytes);
}

#[tokio::test]
async fn native_resolution_scales_overlay() {
    let mut session = stage(vec![source(&RgbaImage::from_pixel(100, 100, BLUE))]);
    load_base(&mut session, source(&RgbaImage::from_pixel(952, 476, RED)))
        .await
        .unwrap();
    select_overlay(&mut session, 1).await.unwrap();
    session.drag_to(Offset::new(10.0, 20.0)).unwrap();

    let options = ExportOptions {
        resolution: ExportResolution::Native,
        ..nearest()
    };
    let artifact = render_artifact(&session, &options).await.unwrap();
    assert_eq!((artifact.width, artifact.height), (952, 476));

    let exported = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert_eq!(*exported.get_pixel(20, 40), BLUE);
    assert_eq!(*exported.get_pixel(219, 239), BLUE);
    assert_eq!(*exported.get_pixel(220, 240), RED);
}

#[tokio::test]
async fn export_before_base_is_not_ready() {
    let session = stage(vec![]);
    let err = render_artifact(&session, &ExportOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DecalError::GeometryNotReady { .. }));
}

#[tokio::test]
async fn download_writes_file() {
    let dir = scratch_dir("download");
    let mut session = stage(vec![]);
    load_base(&mut session, source(&gradient(100, 100)))
        .await
        .unwrap();

    let mut sink = ExportSink::new(&dir, Box::new(NoShareBackend));
    let report = export_session(
        &session,
        ExportAction::Download,
        &ExportOptions::default(),
        &mut sink,
    )
    .await
    .unwrap();

    let path = dir.join("receipt.png");
    assert_eq!(report.delivery, Delivery::Saved(path.clone()));
    assert_eq!((report.width, report.height), (300, 300));
    assert!(!report.with_overlay);
    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (300, 300));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn share_without_facility_reports_unsupported() {
    let mut session = stage(vec![]);
    load_base(&mut session, source(&gradient(100, 100)))
        .await
        .unwrap();

    let mut sink = ExportSink::new(scratch_dir("share"), Box::new(NoShareBackend));
    let err = export_session(
        &session,
        ExportAction::Share,
        &ExportOptions::default(),
        &mut sink,
    )
    .await
    .unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn cross_origin_sticker_blocks_export_without_output() {
    let dir = scratch_dir("blocked");
    let mut session = stage(vec![]);
    load_base(&mut session, source(&gradient(100, 100)))
        .await
        .unwrap();
    let foreign = SourceRef::with_origin(
        ImageSource::from(encode(&RgbaImage::from_pixel(10, 10, BLUE))),
        Origin::CrossOrigin,
    );
    let id = session.add_overlay(foreign).unwrap();
    select_overlay(&mut session, id).await.unwrap();

    let mut sink = ExportSink::new(&dir, Box::new(NoShareBackend));
    let err = export_session(
        &session,
        ExportAction::Download,
        &ExportOptions::default(),
        &mut sink,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DecalError::ExportBlocked { .. }));
    assert!(!dir.join("receipt.png").exists());
}

#[tokio::test]
async fn undecodable_sticker_is_skipped_at_export() {
    let dir = scratch_dir("skipped");
    let mut session = stage(vec![]);
    load_base(&mut session, source(&RgbaImage::from_pixel(100, 100, RED)))
        .await
        .unwrap();

    // A sticker file that measured fine but was replaced on disk before export.
    let path = scratch_dir("sticker").with_extension("png");
    std::fs::write(&path, encode(&RgbaImage::from_pixel(10, 10, BLUE))).unwrap();
    let id = session.add_overlay(SourceRef::local(path.clone())).unwrap();
    select_overlay(&mut session, id).await.unwrap();
    std::fs::write(&path, b"truncated").unwrap();

    let artifact = render_artifact(&session, &nearest()).await.unwrap();
    assert!(!artifact.with_overlay);
    let exported = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
    assert!(exported.pixels().all(|p| *p == RED));

    let mut sink = ExportSink::new(&dir, Box::new(NoShareBackend));
    let report = export_session(&session, ExportAction::Download, &nearest(), &mut sink)
        .await
        .unwrap();
    assert!(!report.with_overlay);
    assert!(session.active().is_some());

    std::fs::remove_file(&path).ok();
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn report_counts_drawn_sticker() {
    let dir = scratch_dir("with-sticker");
    let mut session = stage(vec![source(&RgbaImage::from_pixel(20, 20, BLUE))]);
    load_base(&mut session, source(&RgbaImage::from_pixel(100, 100, RED)))
        .await
        .unwrap();
    select_overlay(&mut session, 1).await.unwrap();

    let mut sink = ExportSink::new(&dir, Box::new(NoShareBackend));
    let report = export_session(&session, ExportAction::Download, &nearest(), &mut sink)
        .await
        .unwrap();
    assert!(report.with_overlay);
    std::fs::remove_dir_all(&dir).ok();
}
