//! Expansion of attribute key/value token lists

use crate::completion::Completion;
use crate::parser::{Attribute, Token};

use super::scope::Scope;

/// Expands keys and values of an attribute list in a scope
///
/// Every token of every key and value is dispatched through the scope's
/// transforms. The result is immediate when all of them are, and deferred
/// otherwise.
pub struct AttributeExpander<'s> {
    scope: &'s Scope,
}

impl<'s> AttributeExpander<'s> {
    pub fn new(scope: &'s Scope) -> Self {
        Self { scope }
    }

    pub fn process(&self, attributes: Vec<Attribute>) -> Completion<Vec<Attribute>> {
        let expanded = attributes
            .into_iter()
            .map(|attr| {
                let sides = vec![self.expand_tokens(attr.key), self.expand_tokens(attr.value)];
                Completion::join_all(sides).map(|mut sides| {
                    let value = sides.pop().unwrap_or_default();
                    let key = sides.pop().unwrap_or_default();
                    Attribute::new(key, value)
                })
            })
            .collect();
        Completion::join_all(expanded)
    }

    /// Expand a single token list
    pub fn expand_tokens(&self, tokens: Vec<Token>) -> Completion<Vec<Token>> {
        let results = tokens
            .into_iter()
            .map(|token| self.scope.transform(token))
            .collect();
        Completion::join_all(results)
            .map(|chunks: Vec<Vec<Token>>| chunks.into_iter().flatten().collect::<Vec<_>>())
    }
}
