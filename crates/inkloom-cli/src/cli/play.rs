//! Play command: the terminal presentation surface.
//!
//! The animator draws on its own thread and pushes every frame into a
//! channel. The UI loop keeps only the newest one, turns it into a Sixel
//! image with ratatui-image, and forwards terminal resizes to the
//! animator.

use std::io::{self, stdout};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use ratatui_image::{picker::{Picker, ProtocolType}, protocol::StatefulProtocol, StatefulImage};

use inkloom::present::Frame as InkFrame;
use inkloom::{Animator, AnimatorOptions, ChannelSink, DoodleConfig, PlaybackState};

use super::common::parse_run_options;

/// Longest canvas side in pixels. Bigger terminals get the image scaled up.
const MAX_CANVAS_SIDE: u32 = 1600;

/// How long the UI waits for input before redrawing.
const UI_POLL: Duration = Duration::from_millis(33);

/// Execute the play command.
pub fn cmd_play(args: &[String]) {
    let options = parse_run_options(args).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        print_usage();
        std::process::exit(1);
    });

    if options.help {
        print_usage();
        return;
    }

    if let Err(e) = run_tui(options.config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct App {
    animator: Animator,
    frames: Receiver<InkFrame>,
    picker: Picker,
    /// Current rendered image protocol state
    image_state: Option<Box<dyn StatefulProtocol>>,
    canvas: (u32, u32),
    layout_name: String,
    should_quit: bool,
}

impl App {
    fn new(config: DoodleConfig, terminal_size: (u16, u16)) -> Result<Self, String> {
        // Initialize image picker - force Sixel protocol
        let mut picker = Picker::from_termios()
            .unwrap_or_else(|_| Picker::new((8, 16)));
        picker.protocol_type = ProtocolType::Sixel;

        let canvas = canvas_for_terminal(terminal_size, picker.font_size);
        let layout_name = config.layout.describe();

        let (sink, frames) = ChannelSink::new();
        let options = AnimatorOptions::from_config(config)
            .map_err(|e| e.to_string())?
            .with_sink(sink);

        let animator =
            Animator::initialize(canvas.0, canvas.1, options).map_err(|e| e.to_string())?;

        Ok(App {
            animator,
            frames,
            picker,
            image_state: None,
            canvas,
            layout_name,
            should_quit: false,
        })
    }

    /// Swap in the newest frame, if one arrived since the last draw.
    fn update_image(&mut self) {
        // Drain all pending frames, keep only the latest
        let mut latest: Option<InkFrame> = None;
        while let Ok(frame) = self.frames.try_recv() {
            latest = Some(frame);
        }

        if let Some(frame) = latest {
            match frame.into_dynamic_image() {
                Ok(img) => self.image_state = Some(self.picker.new_resize_protocol(img)),
                Err(e) => log::error!("dropping frame: {}", e),
            }
        }
    }

    fn on_resize(&mut self, cols: u16, rows: u16) -> Result<(), String> {
        let canvas = canvas_for_terminal((cols, rows), self.picker.font_size);
        if canvas == self.canvas {
            return Ok(());
        }
        self.animator
            .on_resize(canvas.0, canvas.1)
            .map_err(|e| e.to_string())?;
        self.canvas = canvas;
        self.image_state = None;
        Ok(())
    }

    fn status_line(&self) -> String {
        let progress = self.animator.with_compositor(|c| {
            let sections = c.sections();
            let drawing = sections
                .iter()
                .filter(|s| s.state != PlaybackState::Done)
                .count();
            (c.frame_index(), drawing, sections.len(), c.cached_segments())
        });

        match progress {
            Ok((frame, drawing, total, cached)) => format!(
                " frame {}  |  {}/{} sections drawing  |  {} strokes cached  |  {}x{} @ {} Hz  |  q quit",
                frame,
                drawing,
                total,
                cached,
                self.canvas.0,
                self.canvas.1,
                self.animator.refresh_rate()
            ),
            Err(e) => format!(" {}  |  q quit", e),
        }
    }
}

/// Pixel canvas that fills the image area of a `cols` x `rows` terminal.
fn canvas_for_terminal((cols, rows): (u16, u16), font_size: (u16, u16)) -> (u32, u32) {
    // Two columns of border; two rows of border plus the status line.
    let cols = cols.saturating_sub(2).max(1) as u32;
    let rows = rows.saturating_sub(3).max(1) as u32;
    let width = cols * font_size.0.max(1) as u32;
    let height = rows * font_size.1.max(1) as u32;

    let longest = width.max(height);
    if longest <= MAX_CANVAS_SIDE {
        return (width, height);
    }
    let scale = MAX_CANVAS_SIDE as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

fn run_tui(config: DoodleConfig) -> Result<(), String> {
    // Start the animator before taking over the screen so setup warnings
    // land in the normal terminal.
    let size = terminal::size().map_err(|e| e.to_string())?;
    let mut app = App::new(config, size)?;

    // Initialize terminal
    enable_raw_mode().map_err(|e| e.to_string())?;
    stdout().execute(EnterAlternateScreen).map_err(|e| e.to_string())?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))
        .map_err(|e| e.to_string())?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().map_err(|e| e.to_string())?;
    stdout().execute(LeaveAlternateScreen).map_err(|e| e.to_string())?;

    let closed = app.animator.on_close().map_err(|e| e.to_string());
    result.and(closed)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<(), String> {
    loop {
        app.update_image();

        terminal.draw(|frame| ui(frame, app)).map_err(|_| "Draw error".to_string())?;

        if event::poll(UI_POLL).map_err(|e| e.to_string())? {
            match event::read().map_err(|e| e.to_string())? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        app.should_quit = true;
                    }
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    app.on_resize(cols, rows)?;
                }
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let image_block = Block::default()
        .title(format!(" inkloom · {} ", app.layout_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner_area = image_block.inner(main_layout[0]);
    frame.render_widget(image_block, main_layout[0]);

    // Render the image using ratatui-image
    if let Some(ref mut image_state) = app.image_state {
        let image_widget = StatefulImage::new(None);
        frame.render_stateful_widget(image_widget, inner_area, image_state);
    }

    let status = Paragraph::new(app.status_line()).style(Style::default().fg(Color::Gray));
    frame.render_widget(status, main_layout[1]);
}

fn print_usage() {
    eprintln!("Usage: inkloom play [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --speed <px/s>         Ink speed (default: 1200)");
    eprintln!("  --rate <hz>            Frame rate (default: 60)");
    eprintln!("  --layout <name>        Built-in layout (see 'inkloom layouts')");
    eprintln!("  --svg <file>           Take regions from an SVG file");
    eprintln!("  -c, --config <file>    YAML config file");
    eprintln!("  --log <file>           Write log records to a file");
    eprintln!();
    eprintln!("Controls:");
    eprintln!("  q / Esc       Quit");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_fills_the_image_area() {
        assert_eq!(canvas_for_terminal((82, 43), (8, 16)), (640, 640));
    }

    #[test]
    fn canvas_is_capped() {
        let (w, h) = canvas_for_terminal((402, 103), (10, 20));
        assert_eq!(w, MAX_CANVAS_SIDE);
        assert_eq!(h, 800);
    }

    #[test]
    fn tiny_terminal_still_has_a_canvas() {
        let (w, h) = canvas_for_terminal((1, 1), (0, 0));
        assert!(w >= 1 && h >= 1);
    }
}
