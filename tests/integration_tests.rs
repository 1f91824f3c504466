use anyhow::Result;
use httpmock::prelude::*;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use where_iss::core::Display;
use where_iss::utils::validation::Validate;
use where_iss::{FileDisplay, MapPipeline, PrintEngine, PrintOutcome, TomlConfig, WatchLoop};

fn png(image: RgbImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Half land, half sea
fn coast_tile() -> Vec<u8> {
    png(RgbImage::from_fn(16, 16, |x, _| {
        if x < 8 {
            Rgb([10, 20, 40])
        } else {
            Rgb([240, 230, 200])
        }
    }))
}

fn ocean_tile() -> Vec<u8> {
    png(RgbImage::from_pixel(16, 16, Rgb([5, 10, 30])))
}

fn mock_iss(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/iss-now.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "message": "success",
                "timestamp": 1709276709,
                "iss_position": {"latitude": "0.0000", "longitude": "0.0000"}
            }));
    })
}

/// 小尺寸面板的配置，所有輸出都放在暫存目錄
fn test_config(server: &MockServer, display_dir: &Path, export_dir: &Path) -> Result<TomlConfig> {
    let toml_content = format!(
        r#"
[source]
endpoint = "{iss}"
timeout_seconds = 5

[tiles]
endpoint = "{base}/tiles/{{z}}/{{x}}/{{y}}.png"

[display]
width = 64
height = 48
map_width = 32
map_height = 32
x_offset = 0
y_offset = 0
output_dir = '{display}'

[export]
enabled = true
path = '{export}'
"#,
        iss = server.url("/iss-now.json"),
        base = server.base_url(),
        display = display_dir.display(),
        export = export_dir.display(),
    );

    let config = TomlConfig::from_toml_str(&toml_content)?;
    config.validate()?;
    Ok(config)
}

fn only_subdirectory(path: &Path) -> Result<std::path::PathBuf> {
    let entries: Vec<_> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .collect();
    assert_eq!(entries.len(), 1, "expected one export directory");
    Ok(entries[0].path())
}

#[tokio::test]
async fn test_end_to_end_print_with_real_http() -> Result<()> {
    let display_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;

    let server = MockServer::start();
    let iss_mock = mock_iss(&server);
    let tile_mock = server.mock(|when, then| {
        when.method(GET).path("/tiles/10/512/512.png");
        then.status(200).header("Content-Type", "image/png").body(coast_tile());
    });

    let config = test_config(&server, display_dir.path(), export_dir.path())?;
    let pipeline = MapPipeline::from_config(config)?;
    let engine = PrintEngine::new_with_monitoring(pipeline, false);

    let outcome = engine.run().await?;

    iss_mock.assert();
    tile_mock.assert();

    let report = match outcome {
        PrintOutcome::Printed(report) => report,
        other => panic!("expected a print, got {:?}", other),
    };
    assert_eq!(report.tile.zoom, 10);
    assert_eq!((report.tile.x, report.tile.y), (512, 512));
    assert_eq!(report.stats.foreground_percentage, 50);
    assert!(!report.inverted);

    // 面板畫面
    assert!(display_dir.path().join("frame.bin").exists());
    assert!(display_dir.path().join("frame.png").exists());

    let display = engine.into_pipeline().into_display()?;
    assert!(!display.is_awake());
    let frame = display.current_frame()?;
    assert_eq!((frame.width(), frame.height()), (64, 48));
    // map sits at (16, 8) with white border around it
    assert!(frame.is_black(16, 8));
    assert!(!frame.is_black(47, 8));
    assert!(!frame.is_black(0, 0));
    assert!(!frame.is_black(63, 47));

    // 匯出
    let export = only_subdirectory(export_dir.path())?;
    let slug = export
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_default();
    assert!(export.join(format!("{}-color.png", slug)).exists());
    assert!(export.join(format!("{}-dithered.png", slug)).exists());
    assert!(!export.join("rejects").exists());

    let text = std::fs::read_to_string(export.join(format!("{}.txt", slug)))?;
    assert!(text.contains("Coordinates:\t0, 0"));
    assert!(text.contains("Map zoom:\t10"));
    assert!(text.contains("Tile name:\t512, 512"));
    assert!(text.contains("Foreground:\t50%"));
    assert!(text.contains("Background:\t50%"));

    Ok(())
}

#[tokio::test]
async fn test_zooms_out_until_interesting() -> Result<()> {
    let display_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;

    let server = MockServer::start();
    mock_iss(&server);
    let zoom_10 = server.mock(|when, then| {
        when.method(GET).path("/tiles/10/512/512.png");
        then.status(200).body(ocean_tile());
    });
    let zoom_9 = server.mock(|when, then| {
        when.method(GET).path("/tiles/9/256/256.png");
        then.status(200).body(ocean_tile());
    });
    let coast = server.mock(|when, then| {
        when.method(GET).path("/tiles/8/128/128.png");
        then.status(200).body(coast_tile());
    });

    let config = test_config(&server, display_dir.path(), export_dir.path())?;
    let engine = PrintEngine::new(MapPipeline::from_config(config)?);

    let outcome = engine.run().await?;

    zoom_10.assert();
    zoom_9.assert();
    coast.assert();
    assert!(matches!(outcome, PrintOutcome::Printed(ref report) if report.tile.zoom == 8));

    let export = only_subdirectory(export_dir.path())?;
    let rejects: Vec<String> = std::fs::read_dir(export.join("rejects"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(rejects.len(), 2);
    assert!(rejects.iter().any(|name| name.ends_with("-zoom-10.png")));
    assert!(rejects.iter().any(|name| name.ends_with("-zoom-09.png")));

    Ok(())
}

#[tokio::test]
async fn test_skips_when_every_zoom_is_boring() -> Result<()> {
    let display_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;

    let server = MockServer::start();
    mock_iss(&server);
    let tiles = server.mock(|when, then| {
        when.method(GET).path_contains("/tiles/");
        then.status(200).body(ocean_tile());
    });

    let config = test_config(&server, display_dir.path(), export_dir.path())?;
    let engine = PrintEngine::new(MapPipeline::from_config(config)?);

    let outcome = engine.run().await?;

    tiles.assert_hits(6);
    match outcome {
        PrintOutcome::Skipped { attempts, position } => {
            assert_eq!(attempts, 6);
            assert_eq!(position.latitude, 0.0);
        }
        other => panic!("expected a skip, got {:?}", other),
    }

    // 面板維持原狀
    assert!(!display_dir.path().join("frame.bin").exists());

    Ok(())
}

#[tokio::test]
async fn test_tile_server_error_fails_the_run() -> Result<()> {
    let display_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;

    let server = MockServer::start();
    mock_iss(&server);
    server.mock(|when, then| {
        when.method(GET).path_contains("/tiles/");
        then.status(503);
    });

    let config = test_config(&server, display_dir.path(), export_dir.path())?;
    let engine = PrintEngine::new(MapPipeline::from_config(config)?);

    let error = engine.run().await.unwrap_err();

    assert!(matches!(
        error,
        where_iss::IssError::TileError {
            zoom: 10,
            status: 503
        }
    ));
    assert!(!display_dir.path().join("frame.bin").exists());

    Ok(())
}

#[tokio::test]
async fn test_watch_prints_each_edition_then_clears() -> Result<()> {
    let display_dir = TempDir::new()?;
    let export_dir = TempDir::new()?;

    let server = MockServer::start();
    let iss_mock = mock_iss(&server);
    server.mock(|when, then| {
        when.method(GET).path_contains("/tiles/");
        then.status(200).body(coast_tile());
    });

    let config = test_config(&server, display_dir.path(), export_dir.path())?;
    let watch = WatchLoop::new(
        PrintEngine::new(MapPipeline::from_config(config)?),
        2,
        Duration::ZERO,
    );

    let summary = watch.run().await?;

    iss_mock.assert_hits(2);
    assert_eq!(summary.printed, 2);
    assert_eq!(summary.failed, 0);
    assert!(!summary.interrupted);

    // 結束時畫面被清空
    let display = FileDisplay::new(display_dir.path(), 64, 48);
    assert_eq!(display.current_frame()?.black_pixels(), 0);

    Ok(())
}

#[test]
fn test_clear_display_blanks_panel() -> Result<()> {
    let display_dir = TempDir::new()?;
    let mut display = FileDisplay::new(display_dir.path(), 800, 480);

    display.init()?;
    display.clear()?;
    display.sleep()?;

    let frame = display.current_frame()?;
    assert_eq!(frame.as_bytes().len(), 800 / 8 * 480);
    assert_eq!(frame.black_pixels(), 0);
    assert!(display_dir.path().join("frame.png").exists());
    assert!(!display.is_awake());

    Ok(())
}
