//! Conversation UI components for chat interface

pub mod composer;
pub mod history;
pub mod indicator;
pub mod manager;
pub mod store;

pub use composer::{ComposerResult, ComposerView, ConversationComposer};
pub use history::ConversationHistory;
pub use indicator::PendingIndicator;
pub use manager::{ConversationAction, ConversationManager};
pub use store::ConversationStore;
