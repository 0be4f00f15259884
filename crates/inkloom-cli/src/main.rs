//! inkloom - terminal player and CLI for animated doodle fills
//!
//! Usage:
//!   inkloom [play] [options]     Animate in the terminal (Sixel)
//!   inkloom render [options]     Simulate headless and save a PNG
//!   inkloom export [options]     Write segments as SVG or JSON
//!   inkloom stats [options]      Per-section segment counts
//!   inkloom layouts              List built-in layouts

mod cli;

use std::env;

use cli::common::init_logging;
use cli::{cmd_export, cmd_layouts, cmd_play, cmd_render, cmd_stats};

fn main() {
    let args: Vec<String> = env::args().collect();

    let command = args.get(1).map(String::as_str).unwrap_or("play");
    let rest: &[String] = if args.len() > 2 { &args[2..] } else { &[] };

    // The TUI owns the screen, so keep stderr quiet unless logs go to a file.
    let log_file = args
        .iter()
        .position(|a| a == "--log")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);
    let default_filter = match (command, log_file) {
        ("play", None) => "error",
        ("play", Some(_)) => "warn",
        _ if command.starts_with('-') => "error",
        _ => "info",
    };
    init_logging(default_filter, log_file);

    match command {
        "play" => cmd_play(rest),
        "render" => cmd_render(rest),
        "export" => cmd_export(rest),
        "stats" => cmd_stats(rest),
        "layouts" => cmd_layouts(),
        "help" | "--help" | "-h" => print_usage(&args[0]),
        // Bare flags go to the player: `inkloom --layout single`
        flag if flag.starts_with('-') => cmd_play(&args[1..]),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!();
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("inkloom - procedural doodle fills, drawn stroke by stroke");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} [play] [options]              Animate in the terminal", prog);
    eprintln!("  {} render [options]              Save a PNG after N simulated seconds", prog);
    eprintln!("  {} export [-f svg|json] [options]", prog);
    eprintln!("  {} stats [--json] [options]", prog);
    eprintln!("  {} layouts", prog);
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  -c, --config <file>    YAML config file");
    eprintln!("  --example-config       Print an example config and exit");
    eprintln!("  -w, --width <px>       Canvas width (render/export/stats, default: 960)");
    eprintln!("  -H, --height <px>      Canvas height (default: 540)");
    eprintln!("  --speed <px/s>         Ink speed (default: 1200)");
    eprintln!("  --rate <hz>            Frame rate (default: display rate, or 60)");
    eprintln!("  --layout <name>        Built-in layout: simple, single");
    eprintln!("  --svg <file>           Take regions from an SVG file");
    eprintln!();
    eprintln!("Render options:");
    eprintln!("  -t, --seconds <n>      Simulated seconds (default: 5)");
    eprintln!("  --complete             Run until every stroke is drawn");
    eprintln!("  -o, --output <file>    PNG path (default: inkloom-<timestamp>.png)");
    eprintln!();
    eprintln!("Export options:");
    eprintln!("  -f, --format <fmt>     svg or json (default: svg)");
    eprintln!("  -o, --output <file>    Output file (- for stdout, default: stdout)");
    eprintln!();
    eprintln!("Logging:");
    eprintln!("  RUST_LOG=debug         Per-section fill statistics");
    eprintln!("  --log <file>           Send log records to a file (useful with play)");
    eprintln!();
    eprintln!("Player controls:");
    eprintln!("  q / Esc       Quit");
}
