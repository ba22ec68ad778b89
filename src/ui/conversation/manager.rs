use crate::ui::conversation::{
    ComposerResult, ComposerView, ConversationComposer, ConversationHistory, ConversationStore,
    PendingIndicator,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};
use tracing::debug;

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Wires terminal input and rendering to the conversation store
pub struct ConversationManager {
    store: ConversationStore,
    composer: ConversationComposer,
    placeholder: String,
}

impl ConversationManager {
    pub fn new(store: ConversationStore, placeholder: impl Into<String>) -> Self {
        Self {
            store,
            composer: ConversationComposer::new(),
            placeholder: placeholder.into(),
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind == KeyEventKind::Press {
            let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if ctrl_c || key.code == KeyCode::Esc {
                return ConversationAction::Exit;
            }
        }

        match self.composer.handle_key(key, self.store.draft()) {
            ComposerResult::Edited(text) => self.store.set_draft(text),
            ComposerResult::Send => {
                if self.store.submit() {
                    self.composer.reset_cursor(self.store.draft());
                } else {
                    debug!(phase = %self.store.phase(), "send ignored");
                }
            }
            ComposerResult::None => {}
        }

        ConversationAction::None
    }

    /// Insert pasted text at the end of the draft
    pub fn handle_paste(&mut self, text: &str) {
        let mut draft = self.store.draft().to_string();
        // Single-line input
        draft.push_str(&text.replace(['\r', '\n'], " "));
        self.store.set_draft(draft);
        self.composer.reset_cursor(self.store.draft());
    }

    /// Apply a finished reply, if one arrived. Called every tick.
    pub fn tick(&mut self) -> bool {
        self.store.poll_reply()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Render the conversation UI components
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let pending_rows = if self.store.is_pending() { 1 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),              // History
                Constraint::Length(pending_rows), // Typing indicator
                Constraint::Length(3),           // Composer
            ])
            .split(area);

        ConversationHistory::new(self.store.history()).render(chunks[0], buf);

        if self.store.is_pending() {
            PendingIndicator::now().render(chunks[1], buf);
        }

        ComposerView {
            draft: self.store.draft(),
            placeholder: &self.placeholder,
            cursor: self.composer.cursor(),
            can_send: self.store.can_submit(),
        }
        .render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ResponseClient;
    use crate::error::TransportError;
    use crate::events::{APOLOGY_TEXT, Sender};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoClient;

    #[async_trait]
    impl ResponseClient for EchoClient {
        async fn generate(&self, prompt: &str) -> Result<String, TransportError> {
            if prompt == "fail" {
                Err(TransportError::new("down"))
            } else {
                Ok(format!("echo: {}", prompt))
            }
        }
    }

    fn manager() -> ConversationManager {
        let store = ConversationStore::new(Arc::new(EchoClient), "welcome");
        ConversationManager::new(store, "Type your message...")
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(manager: &mut ConversationManager, text: &str) {
        for c in text.chars() {
            manager.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn screen(manager: &ConversationManager) -> String {
        let area = Rect::new(0, 0, 50, 14);
        let mut buf = Buffer::empty(area);
        manager.render(area, &mut buf);
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf.get(x, y).symbol().to_string()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn typing_then_enter_submits() {
        let mut manager = manager();
        type_str(&mut manager, "hi");
        assert_eq!(manager.store().draft(), "hi");

        assert_eq!(manager.handle_key(press(KeyCode::Enter)), ConversationAction::None);
        assert_eq!(manager.store().history().len(), 2);
        assert_eq!(manager.store().draft(), "");
        assert!(manager.store().is_pending());
        assert!(screen(&manager).contains("Assistant is typing"));

        manager.store.settle().await;
        let last = manager.store().history().last().unwrap();
        assert_eq!(last.sender(), Sender::Bot);
        assert_eq!(last.text(), "echo: hi");
        assert!(!screen(&manager).contains("Assistant is typing"));
    }

    #[tokio::test]
    async fn enter_on_blank_draft_does_nothing() {
        let mut manager = manager();
        type_str(&mut manager, "   ");
        manager.handle_key(press(KeyCode::Enter));

        assert_eq!(manager.store().history().len(), 1);
        assert_eq!(manager.store().draft(), "   ");
        assert!(!manager.store().is_pending());
    }

    #[tokio::test]
    async fn typing_allowed_while_pending() {
        let mut manager = manager();
        type_str(&mut manager, "first");
        manager.handle_key(press(KeyCode::Enter));

        type_str(&mut manager, "second");
        manager.handle_key(press(KeyCode::Enter));

        assert_eq!(manager.store().history().len(), 2);
        assert_eq!(manager.store().draft(), "second");

        manager.store.settle().await;
        assert_eq!(manager.store().history().len(), 3);
        assert!(screen(&manager).contains("second"));
    }

    #[tokio::test]
    async fn failure_renders_apology() {
        let mut manager = manager();
        type_str(&mut manager, "fail");
        manager.handle_key(press(KeyCode::Enter));
        manager.store.settle().await;

        assert_eq!(manager.store().history().last().unwrap().text(), APOLOGY_TEXT);
        assert!(screen(&manager).contains("Sorry, I'm having trouble"));
    }

    #[tokio::test]
    async fn paste_flattens_newlines() {
        let mut manager = manager();
        manager.handle_paste("line one\nline two");
        assert_eq!(manager.store().draft(), "line one line two");
    }

    #[test]
    fn escape_and_ctrl_c_exit() {
        let mut manager = manager();
        assert_eq!(manager.handle_key(press(KeyCode::Esc)), ConversationAction::Exit);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(manager.handle_key(ctrl_c), ConversationAction::Exit);
    }
}
