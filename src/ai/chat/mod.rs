pub mod generator;
pub mod history;
pub mod orchestrator;

pub use generator::{FALLBACK_REPLY, Fragments, ResponseGenerator, build_context};
pub use history::{History, HistoryEntry, HistoryStore, MAX_TURNS, Speaker, Turn};
pub use orchestrator::{Conversation, ConversationBuilder};
