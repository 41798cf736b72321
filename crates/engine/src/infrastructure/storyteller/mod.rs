//! LLM-backed story collaborators.
//!
//! Each adapter owns its prompt and reply parsing and talks to the model
//! only through `LlmPort`, so any chat-completion backend (or the retrying
//! wrapper around one) can drive them.

mod alignment;
mod cinematography;
mod grounding;
mod identity;
pub mod json;
mod narrative;

pub use alignment::{LlmAlignmentScorer, CONTEXT_TAIL_CHARS};
pub use cinematography::LlmPromptStylist;
pub use grounding::LlmGroundingRetriever;
pub use identity::LlmIdentityGenerator;
pub use narrative::LlmNarrativeGenerator;
