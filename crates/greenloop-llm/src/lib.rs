//! Decision oracle backends for Greenloop.
//!
//! ## Features
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `ollama` | ✅ | Local Ollama server over HTTP |

pub mod backends;

#[cfg(feature = "ollama")]
pub use backends::{OllamaConfig, OllamaOracle};
