//! Export command implementation.
//!
//! Generates every section for the configured canvas and writes the
//! segment lists as SVG or JSON. No animation is involved.

use std::fs;

use inkloom::{segments_to_svg, CompositorSettings, DoodleConfig, FrameCompositor};

use super::common::{
    exit_with_error, parse_run_options, JsonDoodle, JsonSection, JsonSegment, OutputFormat,
};

/// Execute the export command.
pub fn cmd_export(args: &[String]) {
    let options = parse_run_options(args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage();
        std::process::exit(1);
    });

    if options.help {
        print_usage();
        return;
    }

    let document = build_document(&options.config, options.format)
        .unwrap_or_else(|e| exit_with_error(e));

    match options.output.as_deref() {
        Some("-") | None => print!("{}", document),
        Some(path) => {
            fs::write(path, &document)
                .unwrap_or_else(|e| exit_with_error(format!("{}: {}", path, e)));
            eprintln!("Wrote {}", path);
        }
    }
}

fn build_document(config: &DoodleConfig, format: OutputFormat) -> Result<String, String> {
    let catalog = config.layout.to_catalog().map_err(|e| e.to_string())?;
    let compositor = FrameCompositor::new(
        config.canvas.width,
        config.canvas.height,
        catalog,
        CompositorSettings::from(config),
    )
    .map_err(|e| e.to_string())?;

    let sections = compositor.section_segments();

    match format {
        OutputFormat::Svg => Ok(segments_to_svg(
            &sections,
            config.canvas.width as f64,
            config.canvas.height as f64,
            config.stroke_width,
        )),
        OutputFormat::Json => {
            let summaries = compositor.sections();
            let doodle = JsonDoodle {
                width: config.canvas.width,
                height: config.canvas.height,
                layout: config.layout.describe(),
                sections: sections
                    .iter()
                    .zip(summaries.iter())
                    .enumerate()
                    .map(|(index, (segments, summary))| JsonSection {
                        index,
                        boundary_len: summary.boundary_len,
                        segments: segments.iter().map(JsonSegment::from).collect(),
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&doodle).map_err(|e| e.to_string())
        }
    }
}

fn print_usage() {
    eprintln!("Usage: inkloom export [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --format <fmt>     svg or json (default: svg)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!("  -w, --width <px>       Canvas width");
    eprintln!("  -H, --height <px>      Canvas height");
    eprintln!("  --layout <name>        Built-in layout (see 'inkloom layouts')");
    eprintln!("  --svg <file>           Take regions from an SVG file");
    eprintln!("  -c, --config <file>    YAML config file");
}
