//! Output rendering for expanded token streams

pub mod html;

pub use html::render_html;

use crate::parser::{tokens_to_string, Token};

/// Render tokens as plain text, dropping markup
pub fn render_text(tokens: &[Token]) -> String {
    tokens_to_string(tokens)
}
