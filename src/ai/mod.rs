pub mod chat;
pub mod gate;
pub mod prompt;

pub use gate::{SearchDecision, SearchGate};
