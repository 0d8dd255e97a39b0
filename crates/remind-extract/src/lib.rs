//! Natural-language appointment extraction for Remind.
//!
//! Wraps the Gemini `generateContent` API: free text goes in, a structured
//! [`Extraction`] comes out, with a confidence score and the list of
//! required fields the model could not find. The client retries transient
//! API failures with exponential backoff and degrades to an error
//! extraction (never a panic) when the model stays unreachable.

mod client;
mod error;
mod types;

pub use client::Extractor;
pub use error::ExtractError;
pub use types::Extraction;
