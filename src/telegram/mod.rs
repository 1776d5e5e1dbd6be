pub mod client;
pub mod error;
pub mod types;

pub use client::{LinkSender, TelegramClient};
pub use error::TelegramError;
pub use types::{SendMessageRequest, SendOptions, SentMessage};
