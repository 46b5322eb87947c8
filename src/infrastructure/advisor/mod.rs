//! Trade advisory implementations

pub mod openai_advisor;

pub use openai_advisor::{AdvisorConfig, AdvisoryService, OpenAiAdvisor};
