//! Per-invocation expansion state

use tracing::debug;

use crate::parser::{tokens_to_string, Attribute, Token};
use crate::pipeline::{FrameArgs, TokenSink};

/// Assign positional keys to arguments written without one
///
/// Keys are `"1"`, `"2"`, ... counted over unnamed arguments only, in
/// call-site order. Named arguments keep their key and do not advance the
/// counter. This must run before argument expansion so numbering follows the
/// source text.
pub fn name_args(args: Vec<Attribute>) -> Vec<Attribute> {
    let mut position = 0usize;
    args.into_iter()
        .map(|arg| {
            if arg.has_key() {
                arg
            } else {
                position += 1;
                Attribute::new(vec![Token::text(position.to_string())], arg.value)
            }
        })
        .collect()
}

/// Trim whitespace at both ends of a token list's text
fn trim_tokens(mut tokens: Vec<Token>) -> Vec<Token> {
    if let Some(Token::Text { value }) = tokens.first_mut() {
        *value = value.trim_start().to_string();
    }
    if let Some(Token::Text { value }) = tokens.last_mut() {
        *value = value.trim_end().to_string();
    }
    tokens.retain(|t| !matches!(t, Token::Text { value } if value.is_empty()));
    tokens
}

/// Build the argument map from expanded attributes
///
/// Keys are rendered to text and trimmed. Values of named arguments are
/// trimmed as well; positional values keep their whitespace. A repeated key
/// keeps its first position but takes the last value.
pub fn frame_args(attributes: Vec<Attribute>, positional: &[bool]) -> FrameArgs {
    let mut args = FrameArgs::new();
    for (index, attr) in attributes.into_iter().enumerate() {
        let key = tokens_to_string(&attr.key).trim().to_string();
        let is_positional = positional.get(index).copied().unwrap_or(false);
        let value = if is_positional {
            attr.value
        } else {
            trim_tokens(attr.value)
        };
        args.insert(key, value);
    }
    args
}

/// Where an invocation is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Target and arguments are being expanded
    ResolvingAttributes,
    /// Target and arguments are known, source is being obtained
    AttributesResolved,
    /// Child pipeline is streaming chunks
    Expanding,
    /// The end of the child pipeline has been seen
    Complete,
}

/// State of a single transclusion invocation
///
/// Created when a template token is seen and consumed when its result is
/// delivered. Once deferred, a frame stays deferred.
///
/// `state` and the deferred flag only record progress for tracing. Whether a
/// result is delivered immediately or later is decided by the [`Completion`]
/// values the handler chains together, not by these fields.
///
/// [`Completion`]: crate::completion::Completion
#[derive(Debug)]
pub struct ExpansionFrame {
    original_token: Token,
    target: Vec<Token>,
    args: FrameArgs,
    result_tokens: Vec<Token>,
    state: FrameState,
    deferred: bool,
}

impl ExpansionFrame {
    pub fn new(original_token: Token) -> Self {
        let target = match &original_token {
            Token::Template { target, .. } => target.clone(),
            _ => Vec::new(),
        };
        Self {
            original_token,
            target,
            args: FrameArgs::new(),
            result_tokens: Vec::new(),
            state: FrameState::ResolvingAttributes,
            deferred: false,
        }
    }

    pub fn original_token(&self) -> &Token {
        &self.original_token
    }

    pub fn target(&self) -> &[Token] {
        &self.target
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    /// Switch to deferred completion; there is no way back
    pub fn promote(&mut self) {
        if !self.deferred {
            debug!(target_text = %tokens_to_string(&self.target), "frame promoted to deferred");
        }
        self.deferred = true;
    }

    /// Record the expanded target and arguments
    pub fn resolve_attributes(&mut self, target: Vec<Token>, args: FrameArgs) {
        self.target = target;
        self.args = args;
        self.state = FrameState::AttributesResolved;
    }

    /// Take the argument map for the child pipeline
    pub fn take_args(&mut self) -> FrameArgs {
        std::mem::take(&mut self.args)
    }

    /// Consume the frame and return its output
    ///
    /// A single trailing end marker from the child pipeline is dropped.
    pub fn finish(mut self) -> Vec<Token> {
        if self.result_tokens.last().is_some_and(Token::is_end) {
            self.result_tokens.pop();
        }
        self.result_tokens
    }
}

impl TokenSink for ExpansionFrame {
    fn on_chunk(&mut self, chunk: Vec<Token>) {
        self.state = FrameState::Expanding;
        self.result_tokens.extend(chunk);
    }

    fn on_deferred(&mut self) {
        self.promote();
    }

    fn on_end(&mut self) {
        self.state = FrameState::Complete;
        debug!(
            tokens = self.result_tokens.len(),
            deferred = self.deferred,
            "frame complete"
        );
    }
}
