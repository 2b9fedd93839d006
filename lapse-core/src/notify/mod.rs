//! Alert delivery for domains inside their threshold.

mod message;
mod smtp;

pub use message::{compose_message, Notification};
pub use smtp::EmailNotifier;
