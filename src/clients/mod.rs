pub mod groq;

pub use groq::{ChatRequest, GroqClient, extract_json_object};
