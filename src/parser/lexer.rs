//! Lexer for wikitext template syntax using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Lexical units relevant to transclusion syntax
///
/// Everything that is not a brace, pipe, equals sign or link bracket pair is
/// folded into `Text`, so whitespace and newlines are preserved verbatim.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Lexeme {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equals,

    // Link brackets (longer patterns win over single brackets)
    #[token("[[")]
    LinkOpen,
    #[token("]]")]
    LinkClose,

    #[regex(r"[^{}|=\[\]]+", |lex| lex.slice().to_string())]
    #[regex(r"[\[\]]", |lex| lex.slice().to_string())]
    Text(String),
}

impl Lexeme {
    /// Source text this lexeme was produced from
    pub fn source(&self) -> &str {
        match self {
            Lexeme::BraceOpen => "{",
            Lexeme::BraceClose => "}",
            Lexeme::Pipe => "|",
            Lexeme::Equals => "=",
            Lexeme::LinkOpen => "[[",
            Lexeme::LinkClose => "]]",
            Lexeme::Text(s) => s,
        }
    }
}

/// Lex input string into lexemes with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Lexeme, Span)> + '_ {
    Lexeme::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_delimiters() {
        let tokens: Vec<_> = lex("{{Foo|bar}}").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Lexeme::BraceOpen,
                Lexeme::BraceOpen,
                Lexeme::Text("Foo".to_string()),
                Lexeme::Pipe,
                Lexeme::Text("bar".to_string()),
                Lexeme::BraceClose,
                Lexeme::BraceClose,
            ]
        );
    }

    #[test]
    fn test_whitespace_is_text() {
        let tokens: Vec<_> = lex("Hello world\n").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Lexeme::Text("Hello world\n".to_string())]);
    }

    #[test]
    fn test_named_argument() {
        let tokens: Vec<_> = lex("baz=1").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Lexeme::Text("baz".to_string()),
                Lexeme::Equals,
                Lexeme::Text("1".to_string()),
            ]
        );
    }

    #[test]
    fn test_link_brackets() {
        let tokens: Vec<_> = lex("[[a|b]] [x]").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Lexeme::LinkOpen,
                Lexeme::Text("a".to_string()),
                Lexeme::Pipe,
                Lexeme::Text("b".to_string()),
                Lexeme::LinkClose,
                Lexeme::Text(" ".to_string()),
                Lexeme::Text("[".to_string()),
                Lexeme::Text("x".to_string()),
                Lexeme::Text("]".to_string()),
            ]
        );
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("{{a}}").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 3..4, 4..5]);
    }

    #[test]
    fn test_source_round_trip() {
        let input = "{{{1|[[x]]}}} = y";
        let rebuilt: String = lex(input).map(|(t, _)| t.source().to_string()).collect();
        assert_eq!(rebuilt, input);
    }
}
