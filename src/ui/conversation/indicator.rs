use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Animated "typing" row shown while a reply is outstanding
pub struct PendingIndicator {
    frame: u64,
}

impl PendingIndicator {
    /// Indicator for the current wall-clock animation frame
    pub fn now() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self::at_frame((millis / 300) as u64)
    }

    pub fn at_frame(frame: u64) -> Self {
        Self { frame }
    }

    fn dots(&self) -> &'static str {
        match self.frame % 4 {
            0 => ".  ",
            1 => ".. ",
            2 => "...",
            _ => "   ",
        }
    }
}

impl Widget for PendingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let indicator = Line::from(vec![
            Span::styled("Assistant is typing", Style::default().fg(Color::Green)),
            Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &indicator, area.width);
    }
}
