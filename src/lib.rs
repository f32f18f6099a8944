//! LINE chat bot that answers with a hosted language model, searching
//! the web first when the question calls for it.

pub mod ai;
pub mod api;
pub mod cli;
pub mod core;
pub mod line;
pub mod openai;
pub mod search;
