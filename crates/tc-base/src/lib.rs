//! Streaming chat-completion core: decoding, channel accumulation, session
//! state and request orchestration. Knows nothing about the terminal.

pub mod cancel;
pub mod channels;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod request;
pub mod session;
pub mod sse;
pub mod transport;

pub use cancel::CancelToken;
pub use channels::{Channel, ChannelAccumulator, ChannelOutput, RenderSink, RequestPhase};
pub use config::{Endpoint, SamplingConfig, SamplingParam};
pub use error::{ChatError, ConfigError};
pub use orchestrator::Orchestrator;
pub use session::{HistoryEntry, Role, SessionState, Turn};
pub use sse::{EventStream, StreamEvent};
pub use transport::{ChatTransport, HttpTransport};
