//! Common utilities shared across CLI commands.

use std::fs::File;

use serde::Serialize;

use inkloom::{DoodleConfig, Layout, LayoutSource, Segment, EXAMPLE_CONFIG};

/// Output format for exported segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    Svg,
    Json,
}

/// Options shared by every subcommand, after the config file and the
/// per-flag overrides have been merged.
#[derive(Debug)]
pub struct RunOptions {
    pub config: DoodleConfig,
    pub output: Option<String>,
    pub format: OutputFormat,
    /// Simulated seconds for `render`.
    pub seconds: f64,
    /// Run `render` until every stroke is drawn.
    pub complete: bool,
    pub json: bool,
    pub help: bool,
}

/// Parse the flags common to all commands.
///
/// The config file is applied first and flag overrides on top of it, no
/// matter where `-c` appears on the command line.
pub fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let mut config_path: Option<&str> = None;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;
    let mut speed: Option<f64> = None;
    let mut rate: Option<u32> = None;
    let mut layout: Option<LayoutSource> = None;

    let mut options = RunOptions {
        config: DoodleConfig::default(),
        output: None,
        format: OutputFormat::Svg,
        seconds: 5.0,
        complete: false,
        json: false,
        help: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                config_path = Some(value_of(args, &mut i)?);
            }
            "--example-config" => {
                print!("{}", EXAMPLE_CONFIG);
                std::process::exit(0);
            }
            "-w" | "--width" => {
                width = Some(parse_value(args, &mut i)?);
            }
            "-H" | "--height" => {
                height = Some(parse_value(args, &mut i)?);
            }
            "--speed" => {
                speed = Some(parse_value(args, &mut i)?);
            }
            "--rate" => {
                rate = Some(parse_value(args, &mut i)?);
            }
            "--layout" => {
                let name = value_of(args, &mut i)?;
                let parsed = Layout::from_name(name).ok_or_else(|| {
                    format!("Unknown layout: {}. Run 'inkloom layouts' for the list.", name)
                })?;
                layout = Some(parsed.into());
            }
            "--svg" => {
                let path = value_of(args, &mut i)?;
                layout = Some(LayoutSource::Svg { path: path.into() });
            }
            "-o" | "--output" => {
                options.output = Some(value_of(args, &mut i)?.to_string());
            }
            "-f" | "--format" => {
                let name = value_of(args, &mut i)?;
                options.format = match name.to_lowercase().as_str() {
                    "svg" => OutputFormat::Svg,
                    "json" => OutputFormat::Json,
                    _ => return Err(format!("Unknown format: {}. Use 'svg' or 'json'.", name)),
                };
            }
            "-t" | "--seconds" => {
                options.seconds = parse_value(args, &mut i)?;
            }
            "--complete" => options.complete = true,
            "--json" => options.json = true,
            // Consumed by main before logging starts.
            "--log" => {
                value_of(args, &mut i)?;
            }
            "-h" | "--help" => options.help = true,
            other => return Err(format!("Unexpected argument: {}", other)),
        }
        i += 1;
    }

    if let Some(path) = config_path {
        options.config = DoodleConfig::load(path).map_err(|e| format!("{}: {}", path, e))?;
    }
    if let Some(width) = width {
        options.config.canvas.width = width;
    }
    if let Some(height) = height {
        options.config.canvas.height = height;
    }
    if let Some(speed) = speed {
        options.config.ink_speed = speed;
    }
    if rate.is_some() {
        options.config.refresh_rate = rate;
    }
    if let Some(layout) = layout {
        options.config.layout = layout;
    }

    options.config.validate().map_err(|e| e.to_string())?;
    Ok(options)
}

/// The value after flag `args[*i]`, advancing `i` past it.
fn value_of<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize) -> Result<T, String> {
    let flag = args[*i].clone();
    let raw = value_of(args, i)?;
    raw.parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, raw))
}

/// Print `Error: ...` and exit with status 1.
pub fn exit_with_error(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Start `env_logger`. `RUST_LOG` overrides `default_filter`; with a log
/// file, records go there instead of stderr.
pub fn init_logging(default_filter: &str, log_file: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));

    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("Warning: could not open log file {}: {}", path, e),
        }
    }

    builder.init();
}

// ============================================================================
// JSON output
// ============================================================================

#[derive(Serialize)]
pub struct JsonSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Serialize)]
pub struct JsonSection {
    pub index: usize,
    pub boundary_len: usize,
    pub segments: Vec<JsonSegment>,
}

#[derive(Serialize)]
pub struct JsonDoodle {
    pub width: u32,
    pub height: u32,
    pub layout: String,
    pub sections: Vec<JsonSection>,
}

impl From<&Segment> for JsonSegment {
    fn from(segment: &Segment) -> Self {
        Self {
            x1: segment.start.x,
            y1: segment.start.y,
            x2: segment.end.x,
            y2: segment.end.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_without_flags() {
        let options = parse_run_options(&[]).unwrap();
        assert_eq!(options.config, DoodleConfig::default());
        assert_eq!(options.format, OutputFormat::Svg);
        assert!(!options.help);
    }

    #[test]
    fn overrides_apply() {
        let options = parse_run_options(&args(&[
            "-w", "320", "-H", "200", "--speed", "50", "--layout", "single", "--rate", "30",
        ]))
        .unwrap();

        assert_eq!(options.config.canvas.width, 320);
        assert_eq!(options.config.canvas.height, 200);
        assert_eq!(options.config.ink_speed, 50.0);
        assert_eq!(options.config.layout, LayoutSource::Single);
        assert_eq!(options.config.refresh_rate, Some(30));
    }

    #[test]
    fn svg_flag_sets_layout_source() {
        let options = parse_run_options(&args(&["--svg", "shapes.svg"])).unwrap();
        assert_eq!(
            options.config.layout,
            LayoutSource::Svg { path: "shapes.svg".into() }
        );
    }

    #[test]
    fn format_and_output() {
        let options = parse_run_options(&args(&["-f", "JSON", "-o", "out.json"])).unwrap();
        assert_eq!(options.format, OutputFormat::Json);
        assert_eq!(options.output.as_deref(), Some("out.json"));
    }

    #[test]
    fn bad_input_is_reported() {
        assert!(parse_run_options(&args(&["-w"])).is_err());
        assert!(parse_run_options(&args(&["-w", "wide"])).is_err());
        assert!(parse_run_options(&args(&["--layout", "nope"])).is_err());
        assert!(parse_run_options(&args(&["--speed", "0"])).is_err());
        assert!(parse_run_options(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn log_flag_is_skipped() {
        let options = parse_run_options(&args(&["--log", "run.log", "--json"])).unwrap();
        assert!(options.json);
    }
}
