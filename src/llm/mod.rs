// src/llm/mod.rs
// Upstream LLM providers: registry, key resolution, dispatch and stream relay

pub mod dispatch;
pub mod error;
pub mod keys;
pub mod provider;
pub mod registry;
pub mod relay;
pub mod streaming;
pub mod types;

pub use dispatch::{ChatReply, DispatchRequest, Dispatcher, LEGACY_DEFAULT_MODEL};
pub use error::DispatchError;
pub use keys::ApiKeyResolver;
pub use provider::{Provider, UpstreamTarget, build_provider};
pub use registry::{ApiShape, PROVIDERS, ProviderConfig, ProviderId, ProviderModel};
pub use relay::relay_event_stream;
pub use streaming::{SseDecoder, SseFrame};
pub use types::{ChatTurn, HistoryMessage, Role};
