//! Conversation history display component

use crate::events::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the message log, anchored to the newest message
pub struct ConversationHistory<'a> {
    messages: &'a [Message],
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self { messages }
    }

    /// All lines for the log at the given content width, oldest first
    fn lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line<'static>> = Vec::new();
        for message in self.messages {
            all_lines.append(&mut render_message(message, width));
            // spacing between messages
            all_lines.push(Line::from(""));
        }
        all_lines.pop();
        all_lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Conversation");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines = self.lines(inner_area.width);

        // Show the tail so the newest message is always in view
        let height = inner_area.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (i, line) in all_lines[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Render a single message into lines
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(vec![Span::styled(
        message.sender().display_name(),
        sender_style(message.sender()).add_modifier(Modifier::BOLD),
    )]));

    for content_line in wrap_text(message.text(), width.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(content_line, sender_style(message.sender())),
        ]));
    }

    lines
}

fn sender_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Bot => Style::default().fg(Color::Green),
    }
}

/// Wrap text to fit within the given width, keeping explicit line breaks
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current_width + word_width + 1 <= width || current_line.is_empty() {
                if !current_line.is_empty() {
                    current_line.push(' ');
                    current_width += 1;
                }
                current_line.push_str(word);
                current_width += word_width;
            } else {
                lines.push(std::mem::take(&mut current_line));
                current_line.push_str(word);
                current_width = word_width;
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_text(buf: &Buffer) -> Vec<String> {
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf.get(x, y).symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn wrap_text_breaks_on_word_boundaries() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick".to_string(), "brown fox".to_string()]
        );
    }

    #[test]
    fn wrap_text_keeps_overlong_words_whole() {
        assert_eq!(
            wrap_text("supercalifragilistic ok", 5),
            vec!["supercalifragilistic".to_string(), "ok".to_string()]
        );
    }

    #[test]
    fn wrap_text_preserves_newlines() {
        assert_eq!(wrap_text("a\nb", 20), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(wrap_text("", 20), vec![String::new()]);
    }

    #[test]
    fn renders_messages_in_order() {
        let messages = vec![Message::bot("welcome"), Message::user("hi")];
        let area = Rect::new(0, 0, 30, 8);
        let mut buf = Buffer::empty(area);

        ConversationHistory::new(&messages).render(area, &mut buf);

        let rows = buffer_text(&buf);
        let bot_row = rows.iter().position(|r| r.contains("welcome")).unwrap();
        let user_row = rows.iter().position(|r| r.contains("hi ")).unwrap();
        assert!(bot_row < user_row);
    }

    #[test]
    fn shows_newest_message_when_overflowing() {
        let messages: Vec<Message> = (0..10).map(|i| Message::user(format!("msg{}", i))).collect();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);

        ConversationHistory::new(&messages).render(area, &mut buf);

        let rows = buffer_text(&buf).join("\n");
        assert!(rows.contains("msg9"));
        assert!(!rows.contains("msg0"));
    }
}
