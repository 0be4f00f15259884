//! Stats command implementation.

use std::time::Instant;

use serde::Serialize;

use inkloom::{CompositorSettings, DoodleConfig, FrameCompositor};

use super::common::{exit_with_error, parse_run_options};

#[derive(Serialize)]
struct JsonStats {
    width: u32,
    height: u32,
    layout: String,
    fill_ms: f64,
    total_segments: usize,
    sections: Vec<JsonSectionStats>,
}

#[derive(Serialize)]
struct JsonSectionStats {
    index: usize,
    boundary_len: usize,
    chords: usize,
    segment_count: usize,
}

/// Execute the stats command.
pub fn cmd_stats(args: &[String]) {
    let options = parse_run_options(args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage();
        std::process::exit(1);
    });

    if options.help {
        print_usage();
        return;
    }

    let start = Instant::now();
    let compositor = build(&options.config).unwrap_or_else(|e| exit_with_error(e));
    let sections = compositor.sections();
    let fill_ms = start.elapsed().as_secs_f64() * 1000.0;
    let total: usize = sections.iter().map(|s| s.segment_count).sum();

    if options.json {
        let stats = JsonStats {
            width: options.config.canvas.width,
            height: options.config.canvas.height,
            layout: options.config.layout.describe(),
            fill_ms,
            total_segments: total,
            sections: sections
                .iter()
                .enumerate()
                .map(|(index, s)| JsonSectionStats {
                    index,
                    boundary_len: s.boundary_len,
                    chords: s.segment_count - s.boundary_len,
                    segment_count: s.segment_count,
                })
                .collect(),
        };
        match serde_json::to_string_pretty(&stats) {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with_error(e),
        }
        return;
    }

    println!(
        "Layout {} on {}x{}",
        options.config.layout.describe(),
        options.config.canvas.width,
        options.config.canvas.height
    );
    println!();
    println!("  {:>7}  {:>8}  {:>7}  {:>8}", "section", "boundary", "chords", "segments");
    for (index, s) in sections.iter().enumerate() {
        println!(
            "  {:>7}  {:>8}  {:>7}  {:>8}",
            index,
            s.boundary_len,
            s.segment_count - s.boundary_len,
            s.segment_count
        );
    }
    println!();
    println!("  Total segments: {}", total);
    println!("  Fill time: {:.2}ms", fill_ms);

    let seconds = longest_section_length(&compositor) / options.config.ink_speed;
    println!("  Time to draw at {} px/s: {:.1}s", options.config.ink_speed, seconds);
}

fn build(config: &DoodleConfig) -> Result<FrameCompositor, String> {
    let catalog = config.layout.to_catalog().map_err(|e| e.to_string())?;
    FrameCompositor::new(
        config.canvas.width,
        config.canvas.height,
        catalog,
        CompositorSettings::from(config),
    )
    .map_err(|e| e.to_string())
}

/// Ink length of the longest section, which is what the whole canvas
/// waits on.
fn longest_section_length(compositor: &FrameCompositor) -> f64 {
    compositor
        .section_segments()
        .iter()
        .map(|segments| segments.iter().map(|s| s.length()).sum::<f64>())
        .fold(0.0, f64::max)
}

fn print_usage() {
    eprintln!("Usage: inkloom stats [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --json                 Output as JSON");
    eprintln!("  -w, --width <px>       Canvas width");
    eprintln!("  -H, --height <px>      Canvas height");
    eprintln!("  --layout <name>        Built-in layout (see 'inkloom layouts')");
    eprintln!("  --svg <file>           Take regions from an SVG file");
    eprintln!("  -c, --config <file>    YAML config file");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_layout_has_four_sections() {
        let sections = build(&DoodleConfig::default()).unwrap().sections();
        assert_eq!(sections.len(), 4);
        for s in sections {
            assert_eq!(s.boundary_len, 4);
            assert!(s.segment_count >= 4);
        }
    }

    #[test]
    fn ink_length_covers_the_boundary() {
        let mut config = DoodleConfig::default();
        config.layout = inkloom::LayoutSource::Single;
        let length = longest_section_length(&build(&config).unwrap());
        // At least the perimeter of the 960x540 canvas.
        assert!(length >= 2.0 * (960.0 + 540.0));
    }
}
