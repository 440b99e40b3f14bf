//! Transport bar widget - shows the sample, play state, position and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use sonic_playground::PlaybackStatus;

use super::View;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// `mm:ss`, truncating fractional seconds.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default()
        .title(" playground ")
        .borders(Borders::ALL);

    let (symbol, state, color) = match view.status {
        PlaybackStatus::Playing => ("▶", "Playing", Color::Green),
        PlaybackStatus::Paused => ("⏸", "Paused", Color::Yellow),
        PlaybackStatus::Stopped => ("■", "Stopped", Color::Red),
    };

    let line = Line::from(vec![
        Span::styled(format!(" {}  ", view.label), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{} {}  ", symbol, state), Style::default().fg(color)),
        Span::styled(
            format!(
                "{} / {}  ",
                format_clock(view.position_secs),
                format_clock(view.duration_secs)
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", view.stats.peak, view.stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
