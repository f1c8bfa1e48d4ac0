//! Presentation sinks for the terminal and for JSON consumers.

pub mod json;
pub mod text;

pub use json::{AnalyzeOutput, AnalyzeSummary, JsonSink};
pub use text::TextSink;
