//! Markdown codec tests
//!
//! Tests for document tree ↔ Markdown conversion with embedded `Details` components.

mod export;
mod import;
