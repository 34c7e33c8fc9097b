//! Wikitext template grammar using chumsky
//!
//! Only transclusion syntax is recognized. Everything the grammar does not
//! match degrades to text, so tokenization never fails on user input.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use tracing::warn;

use crate::parser::lexer::{self, Lexeme};
use crate::parser::token::{merge_text, Attribute, Token};

/// Tokenize wikitext source into a token sequence (without an end marker)
pub fn tokenize(input: &str) -> Vec<Token> {
    let len = input.len();

    let token_iter = lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Lexeme, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    match wikitext_parser().parse(token_stream).into_result() {
        Ok(tokens) => tokens,
        Err(errors) => {
            warn!(
                errors = errors.len(),
                "wikitext grammar rejected input, keeping it as text"
            );
            vec![Token::text(input)]
        }
    }
}

/// A lexeme that is not part of a recognized construct
fn literal(lexeme: Lexeme) -> Vec<Token> {
    vec![Token::text(lexeme.source())]
}

fn flatten(chunks: Vec<Vec<Token>>) -> Vec<Token> {
    chunks.into_iter().flatten().collect()
}

/// Element of a `|`-separated part inside braces
///
/// `=` is kept apart so an argument can be split into key and value after it
/// has been parsed once.
#[derive(Debug, Clone)]
enum Piece {
    Nodes(Vec<Token>),
    Equals,
}

fn pieces_to_tokens(pieces: Vec<Piece>) -> Vec<Token> {
    let tokens = pieces
        .into_iter()
        .flat_map(|piece| match piece {
            Piece::Nodes(tokens) => tokens,
            Piece::Equals => vec![Token::text("=")],
        })
        .collect();
    merge_text(tokens)
}

/// Split an argument at its first unnested `=`
fn argument(mut pieces: Vec<Piece>) -> Attribute {
    match pieces.iter().position(|piece| matches!(piece, Piece::Equals)) {
        Some(at) => {
            let value = pieces.split_off(at + 1);
            pieces.truncate(at);
            Attribute::new(pieces_to_tokens(pieces), pieces_to_tokens(value))
        }
        None => Attribute::positional(pieces_to_tokens(pieces)),
    }
}

/// `{{target|arg|key=value}}`, or plain text when the target is empty
fn template(parts: Vec<Vec<Piece>>) -> Vec<Token> {
    let mut parts = parts.into_iter();
    let target = pieces_to_tokens(parts.next().unwrap_or_default());
    if target.is_empty() {
        let mut out = vec![Token::text("{{")];
        for part in parts {
            out.push(Token::text("|"));
            out.extend(pieces_to_tokens(part));
        }
        out.push(Token::text("}}"));
        return out;
    }
    vec![Token::Template {
        target,
        args: parts.map(argument).collect(),
    }]
}

/// `{{{name|default}}}`; parts after the default are ignored
fn template_arg(parts: Vec<Vec<Piece>>) -> Vec<Token> {
    let mut parts = parts.into_iter();
    let name = pieces_to_tokens(parts.next().unwrap_or_default());
    let default = parts.next().map(pieces_to_tokens);
    vec![Token::TemplateArg { name, default }]
}

fn wikitext_parser<'a, I>() -> impl Parser<'a, I, Vec<Token>, extra::Err<Rich<'a, Lexeme>>> + Clone
where
    I: ValueInput<'a, Token = Lexeme, Span = SimpleSpan>,
{
    let construct = recursive(|construct| {
        let piece = choice((
            construct.clone().map(Piece::Nodes),
            just(Lexeme::Equals).to(Piece::Equals),
            none_of([Lexeme::Pipe, Lexeme::BraceClose]).map(|lexeme| Piece::Nodes(literal(lexeme))),
        ));

        // Contents between the braces, each part parsed exactly once
        let parts = piece
            .repeated()
            .collect::<Vec<_>>()
            .separated_by(just(Lexeme::Pipe))
            .at_least(1)
            .collect::<Vec<_>>();

        let close = just(Lexeme::BraceClose).then(just(Lexeme::BraceClose));

        // `{{{...}}` without the third closing brace is `{` before a transclusion
        let triple = just(Lexeme::BraceOpen)
            .ignore_then(parts.clone())
            .then_ignore(close.clone())
            .then(just(Lexeme::BraceClose).or_not())
            .map(|(parts, third)| match third {
                Some(_) => template_arg(parts),
                None => {
                    let mut out = vec![Token::text("{")];
                    out.extend(template(parts));
                    out
                }
            });

        let double = parts.then_ignore(close).map(template);

        // Both forms share the `{{` prefix
        let braced = just(Lexeme::BraceOpen)
            .then(just(Lexeme::BraceOpen))
            .ignore_then(choice((triple, double)));

        // Links stay text, but their pipes must not split template arguments
        let link = just(Lexeme::LinkOpen)
            .ignore_then(
                choice((
                    construct.clone(),
                    none_of([Lexeme::LinkClose]).map(literal),
                ))
                .repeated()
                .collect::<Vec<_>>(),
            )
            .then_ignore(just(Lexeme::LinkClose))
            .map(|inner| {
                let mut out = vec![Token::text("[[")];
                out.extend(flatten(inner));
                out.push(Token::text("]]"));
                merge_text(out)
            });

        // A construct that failed at a position is not attempted there again
        choice((braced, link)).memoized().boxed()
    });

    choice((construct, any().map(literal)))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
        .map(|chunks| merge_text(flatten(chunks)))
}
