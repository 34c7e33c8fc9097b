//! Per-pipeline expansion scope

use std::rc::Rc;

use indexmap::IndexMap;

use crate::completion::Completion;
use crate::env::Environment;
use crate::parser::Token;
use crate::template::LoopGuard;

use super::manager::TransformManager;
use super::stream::Pipeline;

/// Argument bindings of an expansion frame, in call-site order
pub type FrameArgs = IndexMap<String, Vec<Token>>;

/// Everything a transform needs to know about where it runs
///
/// The root scope has no arguments and an empty loop guard. Each nested
/// template expansion gets a child scope bound to that invocation's
/// arguments, so `{{{name}}}` resolves against the direct caller only.
#[derive(Clone)]
pub struct Scope {
    env: Rc<Environment>,
    manager: Rc<TransformManager>,
    args: Rc<FrameArgs>,
    guard: LoopGuard,
}

impl Scope {
    /// Scope for a top-level document
    pub fn root(env: Rc<Environment>, manager: Rc<TransformManager>) -> Self {
        let guard = LoopGuard::new(env.config().max_depth);
        Self {
            env,
            manager,
            args: Rc::new(FrameArgs::new()),
            guard,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn manager(&self) -> &TransformManager {
        &self.manager
    }

    pub fn args(&self) -> &FrameArgs {
        &self.args
    }

    pub fn guard(&self) -> &LoopGuard {
        &self.guard
    }

    /// Dispatch a token through the registered transforms
    pub fn transform(&self, token: Token) -> Completion<Vec<Token>> {
        self.manager.transform_token(token, self)
    }

    /// Create a pipeline for a nested expansion
    ///
    /// The child shares the environment and transforms but sees only `args`
    /// and the extended loop guard.
    pub fn child_pipeline(&self, args: FrameArgs, guard: LoopGuard) -> Pipeline {
        Pipeline::new(Scope {
            env: self.env.clone(),
            manager: self.manager.clone(),
            args: Rc::new(args),
            guard,
        })
    }
}
