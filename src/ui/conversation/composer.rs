use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result of feeding a key to the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// The draft text changed to this value
    Edited(String),
    /// The user asked to send the draft
    Send,
    None,
}

/// Single-line input for the draft.
///
/// The draft itself lives in the conversation store; the composer only
/// tracks the cursor, counted in chars.
#[derive(Debug, Clone, Default)]
pub struct ConversationComposer {
    cursor: usize,
}

impl ConversationComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle key input against the current draft
    pub fn handle_key(&mut self, key: KeyEvent, draft: &str) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        let mut chars: Vec<char> = draft.chars().collect();
        self.cursor = self.cursor.min(chars.len());

        match key.code {
            KeyCode::Enter => return ComposerResult::Send,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return ComposerResult::None;
                }
                self.cursor -= 1;
                chars.remove(self.cursor);
            }
            KeyCode::Delete => {
                if self.cursor >= chars.len() {
                    return ComposerResult::None;
                }
                chars.remove(self.cursor);
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                return ComposerResult::None;
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(chars.len());
                return ComposerResult::None;
            }
            KeyCode::Home => {
                self.cursor = 0;
                return ComposerResult::None;
            }
            KeyCode::End => {
                self.cursor = chars.len();
                return ComposerResult::None;
            }
            _ => return ComposerResult::None,
        }

        ComposerResult::Edited(chars.into_iter().collect())
    }

    /// Move the cursor to the end of a draft that changed outside the composer
    pub fn reset_cursor(&mut self, draft: &str) {
        self.cursor = draft.chars().count();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Render-time view of the composer
pub struct ComposerView<'a> {
    pub draft: &'a str,
    pub placeholder: &'a str,
    pub cursor: usize,
    pub can_send: bool,
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let send_style = if self.can_send {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::raw("Message "),
                Span::styled("[Enter to send]", send_style),
            ]))
            .style(Style::default().fg(Color::Gray));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 {
            return;
        }

        let line = if self.draft.is_empty() {
            Line::from(vec![
                Span::styled("▌", Style::default().fg(Color::White)),
                Span::styled(self.placeholder, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            let mut content: Vec<char> = self.draft.chars().collect();
            let cursor = self.cursor.min(content.len());
            content.insert(cursor, '▌');

            // Keep the cursor visible on long drafts
            let width = inner_area.width as usize;
            let skip = (cursor + 1).saturating_sub(width);
            let visible: String = content.into_iter().skip(skip).collect();
            Line::from(vec![Span::styled(visible, Style::default().fg(Color::White))])
        };
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(composer: &mut ConversationComposer, text: &str) -> String {
        let mut draft = String::new();
        for c in text.chars() {
            if let ComposerResult::Edited(next) = composer.handle_key(press(KeyCode::Char(c)), &draft) {
                draft = next;
            }
        }
        draft
    }

    #[test]
    fn typing_appends_characters() {
        let mut composer = ConversationComposer::new();
        assert_eq!(type_str(&mut composer, "héllo"), "héllo");
        assert_eq!(composer.cursor(), 5);
    }

    #[test]
    fn enter_requests_send_without_editing() {
        let mut composer = ConversationComposer::new();
        assert_eq!(composer.handle_key(press(KeyCode::Enter), "hi"), ComposerResult::Send);
        assert_eq!(composer.handle_key(press(KeyCode::Enter), "   "), ComposerResult::Send);
    }

    #[test]
    fn edits_at_cursor_position() {
        let mut composer = ConversationComposer::new();
        let draft = type_str(&mut composer, "ac");
        composer.handle_key(press(KeyCode::Left), &draft);

        let draft = match composer.handle_key(press(KeyCode::Char('b')), &draft) {
            ComposerResult::Edited(d) => d,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(draft, "abc");

        composer.handle_key(press(KeyCode::Home), &draft);
        assert_eq!(composer.handle_key(press(KeyCode::Backspace), &draft), ComposerResult::None);
        assert_eq!(
            composer.handle_key(press(KeyCode::Delete), &draft),
            ComposerResult::Edited("bc".to_string())
        );
    }

    #[test]
    fn cursor_clamps_after_external_clear() {
        let mut composer = ConversationComposer::new();
        type_str(&mut composer, "hello");

        // Draft cleared by a submission
        assert_eq!(
            composer.handle_key(press(KeyCode::Char('x')), ""),
            ComposerResult::Edited("x".to_string())
        );
        assert_eq!(composer.cursor(), 1);
    }

    #[test]
    fn control_chords_do_not_edit() {
        let mut composer = ConversationComposer::new();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(composer.handle_key(key, "hi"), ComposerResult::None);
    }

    #[test]
    fn placeholder_shown_for_empty_draft() {
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        ComposerView {
            draft: "",
            placeholder: "Type your message...",
            cursor: 0,
            can_send: false,
        }
        .render(area, &mut buf);

        let row: String = (0..area.width).map(|x| buf.get(x, 1).symbol().to_string()).collect();
        assert!(row.contains("Type your message..."));
    }
}
