//! Wikitext tokenizer for transclusion syntax

mod grammar;
pub mod lexer;
pub mod token;

pub use grammar::tokenize;
pub use token::*;
