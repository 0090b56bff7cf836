//! Text detection and extraction for local files, served over the Model
//! Context Protocol.
//!
//! The library entry point is [`extractor::extract_text`]; the `mcp` and
//! `tools` modules expose it to MCP clients over stdio.

pub mod extractor;
pub mod mcp;
pub mod tools;
pub mod utils;

pub use extractor::{extract_text, ExtractError, ExtractedDocument};
