//! snap-translate - screen region translation
//!
//! Select a screen region, OCR it with the bundled engine, and translate the
//! recognized text through a configurable LLM chat-completion endpoint.

mod app;
mod background;
mod bubble;
mod capture;
mod config;
mod hotkey;
mod ocr;
mod pipeline;
mod selection;
mod shared;
mod translate;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{ContentController, NoSelection};
use crate::background::BackgroundService;
use crate::bubble::LogSurface;
use crate::capture::MonitorSource;
use crate::hotkey::HotkeyDispatcher;
use crate::ocr::{OcrAdapter, OcrAssets};
use crate::pipeline::CaptureCoordinator;
use crate::selection::Rect;

/// snap-translate - screen region translation via OCR and an LLM endpoint
#[derive(Parser, Debug)]
#[command(name = "snap-translate")]
#[command(about = "Select a screen region, OCR it, translate it")]
struct Args {
    /// Monitor index to capture (0 = primary)
    #[arg(short, long, default_value = "0")]
    monitor: usize,

    /// List available monitors and exit
    #[arg(long)]
    list_monitors: bool,

    /// Translate this text directly and exit
    #[arg(long)]
    text: Option<String>,

    /// Run the screenshot pipeline over "X,Y,WIDTH,HEIGHT" (logical pixels)
    /// and exit
    #[arg(long)]
    region: Option<String>,

    /// OCR asset root (engine binary plus tessdata); defaults to `assets`
    /// next to the executable
    #[arg(long)]
    ocr_assets: Option<PathBuf>,
}

/// Parse an "X,Y,WIDTH,HEIGHT" region argument.
fn parse_region(value: &str) -> Result<Rect> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("invalid region '{value}', expected X,Y,WIDTH,HEIGHT"))?;

    let [x, y, width, height] = parts.as_slice() else {
        return Err(anyhow!("invalid region '{value}', expected four components"));
    };
    Ok(Rect {
        x: *x,
        y: *y,
        width: *width,
        height: *height,
    })
}

fn default_asset_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("could not locate executable")?;
    Ok(exe
        .parent()
        .ok_or_else(|| anyhow!("executable has no parent directory"))?
        .join("assets"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.list_monitors {
        println!("Available monitors:");
        match xcap::Monitor::all() {
            Ok(monitors) => {
                for (index, monitor) in monitors.iter().enumerate() {
                    println!(
                        "  [{}] {}x{} scale {}{}",
                        index,
                        monitor.width(),
                        monitor.height(),
                        monitor.scale_factor(),
                        if monitor.is_primary() { " (primary)" } else { "" }
                    );
                }
            }
            Err(e) => println!("  Monitor enumeration failed: {e}"),
        }
        return Ok(());
    }

    let settings = Arc::new(RwLock::new(config::load_or_default()));

    let background = BackgroundService::new(
        Box::new(MonitorSource::new(args.monitor)),
        settings.clone(),
    )
    .spawn();

    // Direct translation does not need capture or OCR.
    if let Some(text) = args.text {
        let translated = background.translate_text(text).await?;
        println!("{translated}");
        return Ok(());
    }

    let asset_root = match args.ocr_assets {
        Some(root) => root,
        None => default_asset_root()?,
    };
    info!("OCR assets rooted at {:?}", asset_root);

    let coordinator = CaptureCoordinator::new(
        background.clone(),
        OcrAdapter::bundled(OcrAssets::rooted_at(asset_root)),
    );

    if let Some(region) = args.region {
        let rect = parse_region(&region)?;
        if !rect.is_selectable() {
            return Err(anyhow!(
                "region {}x{} is below the {} px minimum",
                rect.width,
                rect.height,
                selection::MIN_SELECTION_PX
            ));
        }

        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel();
        let progress_task = tokio::spawn(async move {
            while let Some(phase) = progress_rx.recv().await {
                info!("{phase}");
            }
        });

        let output = coordinator.run(rect, &progress_tx).await?;
        drop(progress_tx);
        let _ = progress_task.await;

        println!("{}", output.recognized);
        println!("---");
        println!("{}", output.translated);
        return Ok(());
    }

    // Interactive mode: shortcuts drive the content controller. The overlay
    // host feeding pointer events is the embedding surface; without one,
    // screenshot mode is reachable through --region.
    let controller = ContentController::new(coordinator, background, LogSurface);
    let dispatcher = HotkeyDispatcher::new(&settings.read())?;
    let provider = NoSelection;

    {
        let s = settings.read();
        info!(
            "Ready. {} translates the selection, {} starts screenshot mode, Ctrl+C exits",
            s.translate_shortcut, s.screenshot_shortcut
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if let Some(command) = dispatcher.poll_event() {
                    controller.handle_command(command, &provider);
                }
            }
        }
    }

    info!("snap-translate shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_region() {
        let rect = parse_region("20, 30, 200, 100").unwrap();
        assert_eq!(rect.x, 20.0);
        assert_eq!(rect.y, 30.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 100.0);
    }

    #[test]
    fn test_parse_region_rejects_garbage() {
        assert!(parse_region("20,30").is_err());
        assert!(parse_region("a,b,c,d").is_err());
        assert!(parse_region("").is_err());
    }
}
