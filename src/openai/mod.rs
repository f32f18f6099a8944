mod client;
mod core;

pub use client::{LanguageModel, OpenAiClient};
pub use self::core::{
    Message, ResponseFormat, Role, TextStream, completion, completion_content, completion_stream,
};
