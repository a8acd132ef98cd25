pub mod block;
pub mod session;
pub mod transcript;

pub use block::{ToolStatus, TranscriptBlock};
pub use session::BuilderSession;
pub use transcript::Transcript;
