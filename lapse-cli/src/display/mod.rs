pub mod progress;
mod spinner;

pub use progress::{eprint_line, print_line, ProgressWriterFactory};
pub use spinner::Spinner;
