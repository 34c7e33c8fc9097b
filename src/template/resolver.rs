//! Template expansion transform
//!
//! Handles `{{target|args}}` invocations and `{{{name|default}}}` references.
//! An invocation runs through the following steps:
//!
//! 1. name positional arguments
//! 2. expand target and arguments in the caller's scope
//! 3. resolve the title and check the loop guard
//! 4. obtain the source from the registry
//! 5. run the source through a child pipeline bound to the arguments
//!
//! Each step may complete immediately or be deferred. The invocation is
//! deferred as soon as any step is.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::completion::Completion;
use crate::parser::{to_wikitext, tokens_to_string, Attribute, Token, TokenKind};
use crate::pipeline::{AttributeExpander, Scope, TokenTransform, TransformManager};

use super::frame::{frame_args, name_args, ExpansionFrame};
use super::guard::{GuardError, LoopGuard};
use super::title::{resolve_title, TEMPLATE_NAMESPACE};

/// Rank of the template handler among token transforms
pub const TEMPLATE_RANK: f64 = 1.1;

/// Transform expanding transclusions and argument references
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateHandler;

impl TemplateHandler {
    pub fn new() -> Self {
        Self
    }

    /// Register the handler for template and template argument tokens
    pub fn register(manager: &mut TransformManager) {
        let handler = Rc::new(Self::new());
        manager.add_transform(handler.clone(), TEMPLATE_RANK, TokenKind::Template);
        manager.add_transform(handler, TEMPLATE_RANK, TokenKind::TemplateArg);
    }

    fn on_template(&self, token: Token, scope: &Scope) -> Completion<Vec<Token>> {
        let (target, args) = match &token {
            Token::Template { target, args } => (target.clone(), args.clone()),
            _ => return Completion::Done(vec![token]),
        };

        // Which arguments were written without a key, before naming hides it
        let positional: Vec<bool> = args.iter().map(|arg| !arg.has_key()).collect();
        let mut attributes = vec![Attribute::positional(target)];
        attributes.extend(name_args(args));

        let mut frame = ExpansionFrame::new(token);
        let expanded = AttributeExpander::new(scope).process(attributes);
        if expanded.is_pending() {
            frame.promote();
        }

        let scope = scope.clone();
        expanded.and_then(move |attributes| {
            let mut attributes = attributes.into_iter();
            let target = attributes.next().map(|attr| attr.value).unwrap_or_default();
            let args = frame_args(attributes.collect(), &positional);
            frame.resolve_attributes(target, args);
            expand_frame(frame, scope)
        })
    }

    fn on_template_arg(&self, token: Token, scope: &Scope) -> Completion<Vec<Token>> {
        let (name, default) = match token {
            Token::TemplateArg { name, default } => (name, default),
            other => return Completion::Done(vec![other]),
        };

        let expanded = AttributeExpander::new(scope).expand_tokens(name);
        let scope = scope.clone();
        expanded.and_then(move |name| {
            let key = tokens_to_string(&name).trim().to_string();
            if let Some(value) = scope.args().get(&key) {
                return Completion::Done(value.clone());
            }
            match default {
                Some(default) => AttributeExpander::new(&scope).expand_tokens(default),
                None => {
                    debug!(%key, "unbound template argument");
                    Completion::Done(vec![Token::text(format!(
                        "{{{{{{{}}}}}}}",
                        tokens_to_string(&name)
                    ))])
                }
            }
        })
    }
}

impl TokenTransform for TemplateHandler {
    fn transform(&self, token: Token, scope: &Scope) -> Completion<Vec<Token>> {
        match token.kind() {
            TokenKind::Template => self.on_template(token, scope),
            TokenKind::TemplateArg => self.on_template_arg(token, scope),
            _ => Completion::Done(vec![token]),
        }
    }
}

/// Resolve, guard, fetch and expand a frame whose attributes are known
fn expand_frame(mut frame: ExpansionFrame, scope: Scope) -> Completion<Vec<Token>> {
    let title = resolve_title(&tokens_to_string(frame.target()), TEMPLATE_NAMESPACE);
    if title.is_empty() {
        let source = to_wikitext(std::slice::from_ref(frame.original_token()));
        warn!(%source, "template invocation without a target");
        return Completion::Done(vec![Token::text(source)]);
    }

    let guard = match scope.guard().enter(&title) {
        Ok(guard) => guard,
        Err(err) => {
            warn!(%err, depth = scope.guard().depth(), "template not expanded");
            return Completion::Done(guard_error_tokens(&err));
        }
    };

    debug!(%title, depth = guard.depth(), "expanding template");
    let fetched = scope.env().registry().fetch(&title);
    if fetched.is_pending() {
        frame.promote();
    }

    fetched.and_then(move |result| match result {
        Ok(source) => run_child(frame, &scope, guard, &source),
        Err(err) => Completion::Done(vec![Token::text(err.to_string())]),
    })
}

/// Feed template source through a child pipeline and collect it into the frame
fn run_child(
    mut frame: ExpansionFrame,
    scope: &Scope,
    guard: LoopGuard,
    source: &str,
) -> Completion<Vec<Token>> {
    let args = frame.take_args();
    scope
        .child_pipeline(args, guard)
        .process(source)
        .collect_into(frame)
        .map(ExpansionFrame::finish)
}

/// Visible rendering of a refused expansion: message plus a link to the title
fn guard_error_tokens(err: &GuardError) -> Vec<Token> {
    let title = err.title();
    vec![
        Token::text(err.message()),
        Token::tag("a", vec![("href".to_string(), title.to_string())]),
        Token::text(title),
        Token::end_tag("a"),
    ]
}
