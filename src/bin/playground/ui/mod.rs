//! TUI for the playground
//!
//! Transport bar, scope of the latest rendered audio, spectrum and the
//! current controller values.

mod controls;
mod spectrum;
mod transport;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use sonic_playground::PlaybackStatus;

use crate::app::Controller;

pub use spectrum::SpectrumAnalyzer;
pub use transport::AudioStats;

use controls::render_controls;
use spectrum::render_spectrum;
use transport::render_transport;
use waveform::render_waveform;

/// Everything one frame of the UI needs.
pub struct View<'a> {
    pub label: &'a str,
    pub status: PlaybackStatus,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub progress: f64,
    pub reverse: bool,
    pub stats: AudioStats,
    pub wave: &'a [f32],
    pub spectrum: &'a [(f64, f64)],
    pub controllers: &'a [Controller],
}

pub fn render(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(8),    // Waveform
            Constraint::Length(10), // Spectrum
            Constraint::Length(3), // Controls
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], view);
    render_waveform(frame, chunks[1], view.wave, view.progress);
    render_spectrum(frame, chunks[2], view.spectrum);
    render_controls(frame, chunks[3], view.controllers, view.reverse);

    let help = Paragraph::new(
        " [Space] Play/Pause  [R] Reset  [←/→] Seek  [Home] Start  [↑/↓] Pitch  [a/s] Speed  \
         [[/]] Filter  [w/e] Echo  [f/d] Drive  [-/+] Vol  [,/.] Pan  [V] Reverse  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
