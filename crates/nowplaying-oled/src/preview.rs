//! Terminal preview of the panel.
//!
//! Each terminal cell shows two vertically stacked pixels using half-block
//! glyphs, so a 128x64 panel takes 128x32 cells plus a border.

use std::io::{self, Stdout};
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::framebuffer::FrameBuffer;
use crate::sink::{DisplayError, FrameSink};

const PANEL_FG: Color = Color::Rgb(120, 200, 255);

/// One string per pair of pixel rows.
pub fn half_block_lines(frame: &FrameBuffer) -> Vec<String> {
    let (w, h) = (frame.width() as i32, frame.height() as i32);
    (0..h)
        .step_by(2)
        .map(|y| {
            (0..w)
                .map(|x| match (frame.pixel(x, y), frame.pixel(x, y + 1)) {
                    (true, true) => '█',
                    (true, false) => '▀',
                    (false, true) => '▄',
                    (false, false) => ' ',
                })
                .collect()
        })
        .collect()
}

#[derive(Default)]
pub struct TerminalSink {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    /// Set as each step of `init` succeeds, before the terminal exists.
    raw_mode: bool,
    alternate_screen: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn teardown(&mut self) {
        self.terminal = None;
        if std::mem::take(&mut self.alternate_screen) {
            if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
                warn!("Failed to leave alternate screen: {}", e);
            }
        }
        if std::mem::take(&mut self.raw_mode) {
            if let Err(e) = disable_raw_mode() {
                warn!("Failed to leave raw mode: {}", e);
            }
        }
    }

    fn enter(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        self.raw_mode = true;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        self.alternate_screen = true;
        self.terminal = Some(Terminal::new(CrosstermBackend::new(stdout))?);
        Ok(())
    }
}

impl FrameSink for TerminalSink {
    fn init(&mut self) -> Result<(), DisplayError> {
        if let Err(e) = self.enter() {
            self.teardown();
            return Err(DisplayError::Init(e.to_string()));
        }
        debug!("preview terminal ready");
        Ok(())
    }

    fn present(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let terminal = self
            .terminal
            .as_mut()
            .ok_or_else(|| DisplayError::Present("terminal not initialised".into()))?;
        let lines: Vec<Line> = half_block_lines(frame).into_iter().map(Line::from).collect();
        let panel = Rect::new(0, 0, frame.width() as u16 + 2, lines.len() as u16 + 2);

        terminal.draw(|f| {
            let area = panel.intersection(f.area());
            let block = Block::default()
                .borders(Borders::ALL)
                .title(" nowplaying-oled · q to quit ");
            f.render_widget(
                Paragraph::new(lines)
                    .block(block)
                    .style(Style::default().fg(PANEL_FG)),
                area,
            );
        })?;
        Ok(())
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Cancel `cancel` when the user presses `q`, `Esc` or `Ctrl-C`.
///
/// Raw mode swallows SIGINT, so the preview has to watch for it as a key.
pub fn spawn_quit_listener(cancel: CancellationToken) {
    tokio::task::spawn_blocking(move || {
        while !cancel.is_cancelled() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!("Terminal event poll failed: {}", e);
                    break;
                }
            }
            let Ok(Event::Key(key)) = event::read() else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let quit = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => true,
                KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                _ => false,
            };
            if quit {
                debug!("quit key pressed");
                cancel.cancel();
            }
        }
    });
}
