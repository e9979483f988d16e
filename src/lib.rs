pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod session;
pub mod state;
pub mod suggest;
pub mod transcript;
pub mod widget;
pub mod window;

// Re-export main types for convenience
pub use client::{AnswerClient, AnswerService};
pub use config::Config;
pub use dispatch::{Completion, Dispatcher, Outcome};
pub use error::{ClientError, QueryError, SessionError};
pub use session::{FileSession, Greeter, MemorySession, SessionStore};
pub use state::{Message, Role};
pub use transcript::{Entry, Transcript, TypingHandle};
pub use widget::ChatWidget;
pub use window::{Pointer, Position, Window};
