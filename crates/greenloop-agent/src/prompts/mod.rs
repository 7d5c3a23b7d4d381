//! Prompt generation for the decision oracle.

mod builder;

pub use builder::{PromptBuilder, CONTROL_HISTORY_LINES, OPTIMIZATION_HISTORY_LINES};
