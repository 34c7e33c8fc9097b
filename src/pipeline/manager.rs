//! Rank-ordered dispatch of tokens to transforms

use std::fmt;
use std::rc::Rc;

use crate::completion::Completion;
use crate::parser::{Token, TokenKind};

use super::scope::Scope;

/// A transform over a single token
///
/// Returns the replacement tokens, either immediately or deferred.
pub trait TokenTransform {
    fn transform(&self, token: Token, scope: &Scope) -> Completion<Vec<Token>>;
}

struct Registration {
    rank: f64,
    kind: TokenKind,
    transform: Rc<dyn TokenTransform>,
}

/// Registry of transforms keyed by token kind and rank
///
/// A token is handed to the lowest-ranked transform registered for its kind.
/// Every token that transform produces is dispatched again, but only to
/// transforms of strictly higher rank, so a transform never sees its own
/// output.
#[derive(Default)]
pub struct TransformManager {
    registrations: Vec<Registration>,
}

impl TransformManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for one token kind at the given rank
    pub fn add_transform(&mut self, transform: Rc<dyn TokenTransform>, rank: f64, kind: TokenKind) {
        self.registrations.push(Registration {
            rank,
            kind,
            transform,
        });
        // Stable: equal ranks keep registration order
        self.registrations.sort_by(|a, b| a.rank.total_cmp(&b.rank));
    }

    /// Run a token through all interested transforms
    pub fn transform_token(&self, token: Token, scope: &Scope) -> Completion<Vec<Token>> {
        self.transform_after(token, scope, f64::NEG_INFINITY)
    }

    fn transform_after(&self, token: Token, scope: &Scope, min_rank: f64) -> Completion<Vec<Token>> {
        let kind = token.kind();
        let Some(registration) = self
            .registrations
            .iter()
            .find(|r| r.kind == kind && r.rank > min_rank)
        else {
            return Completion::Done(vec![token]);
        };

        let rank = registration.rank;
        let scope = scope.clone();
        registration
            .transform
            .transform(token, &scope)
            .and_then(move |tokens| {
                let manager = scope.manager();
                let results = tokens
                    .into_iter()
                    .map(|t| manager.transform_after(t, &scope, rank))
                    .collect();
                Completion::join_all(results)
                    .map(|chunks: Vec<Vec<Token>>| chunks.into_iter().flatten().collect::<Vec<_>>())
            })
    }
}

impl fmt::Debug for TransformManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.registrations.iter().map(|r| (r.rank, r.kind)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::env::Environment;
    use crate::template::TemplateRegistry;

    /// Upper-cases text tokens
    struct Shout;

    impl TokenTransform for Shout {
        fn transform(&self, token: Token, _scope: &Scope) -> Completion<Vec<Token>> {
            match token {
                Token::Text { value } => Completion::Done(vec![Token::text(value.to_uppercase())]),
                other => Completion::Done(vec![other]),
            }
        }
    }

    /// Doubles text tokens
    struct Echo;

    impl TokenTransform for Echo {
        fn transform(&self, token: Token, _scope: &Scope) -> Completion<Vec<Token>> {
            Completion::Done(vec![token.clone(), token])
        }
    }

    fn scope_with(manager: TransformManager) -> Scope {
        let env = Environment::with_registry(ParserConfig::default(), TemplateRegistry::offline());
        Scope::root(Rc::new(env), Rc::new(manager))
    }

    #[test]
    fn test_unhandled_token_passes_through() {
        let scope = scope_with(TransformManager::new());
        let out = scope.transform(Token::text("a")).into_done();
        assert_eq!(out, Some(vec![Token::text("a")]));
    }

    #[test]
    fn test_lower_rank_runs_first_and_output_is_redispatched() {
        let mut manager = TransformManager::new();
        manager.add_transform(Rc::new(Shout), 2.0, TokenKind::Text);
        manager.add_transform(Rc::new(Echo), 1.0, TokenKind::Text);
        let scope = scope_with(manager);

        let out = scope.transform(Token::text("a")).into_done();
        assert_eq!(out, Some(vec![Token::text("A"), Token::text("A")]));
    }

    #[test]
    fn test_transform_does_not_see_its_own_output() {
        let mut manager = TransformManager::new();
        manager.add_transform(Rc::new(Echo), 1.0, TokenKind::Text);
        let scope = scope_with(manager);

        let out = scope.transform(Token::text("a")).into_done();
        assert_eq!(out, Some(vec![Token::text("a"), Token::text("a")]));
    }

    #[test]
    fn test_kind_filter() {
        let mut manager = TransformManager::new();
        manager.add_transform(Rc::new(Echo), 1.0, TokenKind::Tag);
        let scope = scope_with(manager);

        let out = scope.transform(Token::text("a")).into_done();
        assert_eq!(out, Some(vec![Token::text("a")]));
    }

    #[test]
    fn test_debug_lists_ranks() {
        let mut manager = TransformManager::new();
        manager.add_transform(Rc::new(Shout), 2.0, TokenKind::Text);
        manager.add_transform(Rc::new(Echo), 1.0, TokenKind::Tag);
        assert_eq!(format!("{:?}", manager), "[(1.0, Tag), (2.0, Text)]");
    }
}
