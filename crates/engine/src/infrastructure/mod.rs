//! Infrastructure implementations.
//!
//! Adapters for every port: HTTP clients for the model servers, the file
//! artifact store, the blendshape heuristic and the LLM-backed story
//! collaborators.

pub mod artifacts;
pub mod clock;
pub mod comfyui;
pub mod openai_compat;
pub mod ports;
pub mod resilient_llm;
pub mod speech;
pub mod storyteller;
pub mod vision;
