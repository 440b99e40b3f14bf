//! Controller readout

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{Controller, Knob};

pub fn render_controls(frame: &mut Frame, area: Rect, controllers: &[Controller], reverse: bool) {
    let block = Block::default()
        .title(" Controls ")
        .borders(Borders::ALL);

    let mut spans = Vec::with_capacity(controllers.len() + 1);
    for controller in controllers {
        let text = match controller.knob {
            Knob::Pitch | Knob::Speed => {
                format!(" {} x{:.2} ", controller.knob.name(), controller.current)
            }
            Knob::Pan => format!(" {} {:+.2} ", controller.knob.name(), controller.current),
            _ => format!(" {} {:.2} ", controller.knob.name(), controller.current),
        };
        let color = if controller.current != controller.target {
            Color::Yellow
        } else {
            Color::White
        };
        spans.push(Span::styled(text, Style::default().fg(color)));
    }
    if reverse {
        spans.push(Span::styled(" ◀ reverse", Style::default().fg(Color::Magenta)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
