#[cfg(feature = "local-embeddings")]
mod local;
mod openai;
mod provider;

#[cfg(feature = "local-embeddings")]
pub use local::{FastEmbedConfig, FastEmbedProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::{EmbeddingProvider, ensure_batch_len};

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
