//! Client engine for the siteloom AI site builder: typed access to the
//! builder API, incremental decoding of its event stream, and the
//! transcript state the product surfaces render from.

pub mod api;
pub mod config;
pub mod state;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_support;

pub use api::ApiClient;
pub use config::Config;
pub use state::{BuilderSession, Transcript};
pub use types::{BuildRequest, ChatMessage, CodeAction, ToolCallEvent};
