//! Token types for the intermediate document representation

use serde::Serialize;

/// Discriminator used to register transforms for a class of tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Text,
    Tag,
    EndTag,
    Template,
    TemplateArg,
    End,
}

/// A single token of the document stream
///
/// Tokens are never mutated in place by a transform; every stage produces a
/// new sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Token {
    /// Literal text run
    Text { value: String },
    /// Opening tag with ordered attributes
    Tag {
        name: String,
        attribs: Vec<(String, String)>,
    },
    /// Closing tag
    EndTag { name: String },
    /// Transclusion invocation: `{{target|arg|key=value}}`
    Template {
        target: Vec<Token>,
        args: Vec<Attribute>,
    },
    /// Template argument reference: `{{{name|default}}}`
    TemplateArg {
        name: Vec<Token>,
        default: Option<Vec<Token>>,
    },
    /// End of a token stream
    End,
}

impl Token {
    pub fn text(value: impl Into<String>) -> Self {
        Token::Text {
            value: value.into(),
        }
    }

    pub fn tag(name: impl Into<String>, attribs: Vec<(String, String)>) -> Self {
        Token::Tag {
            name: name.into(),
            attribs,
        }
    }

    pub fn end_tag(name: impl Into<String>) -> Self {
        Token::EndTag { name: name.into() }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Text { .. } => TokenKind::Text,
            Token::Tag { .. } => TokenKind::Tag,
            Token::EndTag { .. } => TokenKind::EndTag,
            Token::Template { .. } => TokenKind::Template,
            Token::TemplateArg { .. } => TokenKind::TemplateArg,
            Token::End => TokenKind::End,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Token::End)
    }
}

/// A key/value pair whose sides are token sequences
///
/// Keys are token lists because they may themselves need expansion, as in
/// `{{foo|{{bar}}=baz}}`. A positional template argument has an empty key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attribute {
    pub key: Vec<Token>,
    pub value: Vec<Token>,
}

impl Attribute {
    pub fn new(key: Vec<Token>, value: Vec<Token>) -> Self {
        Self { key, value }
    }

    /// Positional argument without a key
    pub fn positional(value: Vec<Token>) -> Self {
        Self {
            key: Vec::new(),
            value,
        }
    }

    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

/// Render tokens to plain text
///
/// Markup tokens are dropped. Template constructs that were never expanded
/// are rendered back to their wikitext form so nothing silently disappears.
pub fn tokens_to_string(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text { value } => out.push_str(value),
            Token::Template { .. } | Token::TemplateArg { .. } => {
                out.push_str(&to_wikitext(std::slice::from_ref(token)))
            }
            Token::Tag { .. } | Token::EndTag { .. } | Token::End => {}
        }
    }
    out
}

/// Serialize tokens back to wikitext source
pub fn to_wikitext(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text { value } => out.push_str(value),
            Token::Tag { name, attribs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attribs {
                    out.push_str(&format!(" {}=\"{}\"", key, value));
                }
                out.push('>');
            }
            Token::EndTag { name } => out.push_str(&format!("</{}>", name)),
            Token::Template { target, args } => {
                out.push_str("{{");
                out.push_str(&to_wikitext(target));
                for arg in args {
                    out.push('|');
                    if arg.has_key() {
                        out.push_str(&to_wikitext(&arg.key));
                        out.push('=');
                    }
                    out.push_str(&to_wikitext(&arg.value));
                }
                out.push_str("}}");
            }
            Token::TemplateArg { name, default } => {
                out.push_str("{{{");
                out.push_str(&to_wikitext(name));
                if let Some(default) = default {
                    out.push('|');
                    out.push_str(&to_wikitext(default));
                }
                out.push_str("}}}");
            }
            Token::End => {}
        }
    }
    out
}

/// Merge adjacent text tokens
pub fn merge_text(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Token::Text { value } = &token {
            if value.is_empty() {
                continue;
            }
            if let Some(Token::Text { value: prev }) = out.last_mut() {
                prev.push_str(value);
                continue;
            }
        }
        out.push(token);
    }
    out
}
