// Note analysis: prompt construction, generation, and five-W report extraction.
// All generation goes through llm_client; this module never talks to the backend directly.

pub mod extractor;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod service;
