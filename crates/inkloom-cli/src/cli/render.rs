//! Render command implementation.
//!
//! Runs the compositor headless at the configured refresh rate and saves
//! the active layer as a PNG, the same frame a display would have shown.

use std::time::Instant;

use chrono::Local;
use log::info;

use inkloom::{CompositorSettings, DoodleConfig, FrameCompositor, DEFAULT_REFRESH_RATE};

use super::common::{exit_with_error, parse_run_options};

/// Execute the render command.
pub fn cmd_render(args: &[String]) {
    let options = parse_run_options(args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage();
        std::process::exit(1);
    });

    if options.help {
        print_usage();
        return;
    }

    let seconds = if options.complete {
        f64::INFINITY
    } else {
        options.seconds
    };
    let output = options.output.unwrap_or_else(default_output_name);

    let start = Instant::now();
    let summary =
        render_to_png(&options.config, seconds, &output).unwrap_or_else(|e| exit_with_error(e));

    println!(
        "Saved {} ({} frames, {} segments cached, {}) in {:.1?}",
        output,
        summary.frames,
        summary.cached_segments,
        if summary.complete { "complete" } else { "in progress" },
        start.elapsed()
    );
}

/// What a headless render did.
#[derive(Debug)]
pub struct RenderSummary {
    pub frames: u64,
    pub cached_segments: usize,
    pub complete: bool,
}

/// Simulate `seconds` of animation and write the active layer to `output`.
pub fn render_to_png(config: &DoodleConfig, seconds: f64, output: &str) -> Result<RenderSummary, String> {
    let catalog = config.layout.to_catalog().map_err(|e| e.to_string())?;
    let mut compositor = FrameCompositor::new(
        config.canvas.width,
        config.canvas.height,
        catalog,
        CompositorSettings::from(config),
    )
    .map_err(|e| e.to_string())?;

    let rate = config.refresh_rate.unwrap_or(DEFAULT_REFRESH_RATE).max(1);
    let frames = compositor.run_for(seconds, 1.0 / rate as f64);
    info!("rendered {} frames at {} Hz", frames, rate);

    compositor
        .active()
        .save_png(output)
        .map_err(|e| format!("{}: {}", output, e))?;

    Ok(RenderSummary {
        frames,
        cached_segments: compositor.cached_segments(),
        complete: compositor.is_complete(),
    })
}

/// `inkloom-YYYYmmdd-HHMMSS.png` in the current directory.
fn default_output_name() -> String {
    Local::now().format("inkloom-%Y%m%d-%H%M%S.png").to_string()
}

fn print_usage() {
    eprintln!("Usage: inkloom render [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --seconds <n>      Simulated seconds to run (default: 5)");
    eprintln!("  --complete             Run until every stroke is drawn");
    eprintln!("  -o, --output <file>    PNG path (default: inkloom-<timestamp>.png)");
    eprintln!("  --rate <hz>            Frame rate to simulate (default: 60)");
    eprintln!("  -w, --width <px>       Canvas width");
    eprintln!("  -H, --height <px>      Canvas height");
    eprintln!("  --speed <px/s>         Ink speed");
    eprintln!("  --layout <name>        Built-in layout (see 'inkloom layouts')");
    eprintln!("  --svg <file>           Take regions from an SVG file");
    eprintln!("  -c, --config <file>    YAML config file");
}
