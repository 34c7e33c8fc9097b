//! Loop and depth guard for nested expansions

use std::rc::Rc;

use thiserror::Error;

/// Reasons an expansion may not descend into a title
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    /// The title is already being expanded further up the chain
    #[error("Template loop detected: {title}")]
    Loop { title: String },

    /// The chain is already at its maximum depth
    #[error("Template expansion depth limit exceeded: {title}")]
    DepthExceeded { title: String, max_depth: usize },
}

impl GuardError {
    pub fn title(&self) -> &str {
        match self {
            GuardError::Loop { title } | GuardError::DepthExceeded { title, .. } => title,
        }
    }

    /// Leading diagnostic text, without the title
    pub fn message(&self) -> &'static str {
        match self {
            GuardError::Loop { .. } => "Template loop detected: ",
            GuardError::DepthExceeded { .. } => "Template expansion depth limit exceeded: ",
        }
    }
}

#[derive(Debug)]
struct Link {
    title: String,
    parent: Option<Rc<Link>>,
}

/// Chain of titles currently being expanded from the document root
///
/// The guard is an immutable value. [`LoopGuard::enter`] returns an extended
/// copy for the nested expansion and leaves the caller's guard untouched, so
/// leaving a branch needs no explicit pop and sibling branches never see each
/// other's titles.
#[derive(Debug, Clone)]
pub struct LoopGuard {
    head: Option<Rc<Link>>,
    depth: usize,
    max_depth: usize,
}

impl LoopGuard {
    pub fn new(max_depth: usize) -> Self {
        Self {
            head: None,
            depth: 0,
            max_depth,
        }
    }

    /// Number of titles on the chain
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles().any(|t| t == title)
    }

    /// Titles from innermost to outermost
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(self.head.as_deref(), |link| link.parent.as_deref())
            .map(|link| link.title.as_str())
    }

    /// Check a title and return the guard for its expansion
    pub fn enter(&self, title: &str) -> Result<LoopGuard, GuardError> {
        if self.contains(title) {
            return Err(GuardError::Loop {
                title: title.to_string(),
            });
        }
        if self.depth >= self.max_depth {
            return Err(GuardError::DepthExceeded {
                title: title.to_string(),
                max_depth: self.max_depth,
            });
        }
        Ok(LoopGuard {
            head: Some(Rc::new(Link {
                title: title.to_string(),
                parent: self.head.clone(),
            })),
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self::new(40)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_detect_loop() {
        let root = LoopGuard::default();
        let a = root.enter("Template:A").unwrap();
        let b = a.enter("Template:B").unwrap();
        assert_eq!(
            b.enter("Template:A").unwrap_err(),
            GuardError::Loop {
                title: "Template:A".to_string()
            }
        );
    }

    #[test]
    fn test_direct_self_reference() {
        let a = LoopGuard::default().enter("Template:A").unwrap();
        let err = a.enter("Template:A").unwrap_err();
        assert_eq!(err.to_string(), "Template loop detected: Template:A");
        assert_eq!(err.title(), "Template:A");
    }

    #[test]
    fn test_enter_leaves_parent_untouched() {
        let root = LoopGuard::default();
        let a = root.enter("Template:A").unwrap();
        assert_eq!(root.depth(), 0);
        assert!(!root.contains("Template:A"));
        assert_eq!(a.depth(), 1);
    }

    #[test]
    fn test_siblings_do_not_interfere() {
        let root = LoopGuard::default();
        let parent = root.enter("Template:P").unwrap();
        let first = parent.enter("Template:X").unwrap();
        // A sibling branch may expand the same title again
        let second = parent.enter("Template:X").unwrap();
        assert_eq!(first.depth(), second.depth());
        assert_eq!(
            second.titles().collect::<Vec<_>>(),
            vec!["Template:X", "Template:P"]
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut guard = LoopGuard::new(2);
        guard = guard.enter("A").unwrap();
        guard = guard.enter("B").unwrap();
        let err = guard.enter("C").unwrap_err();
        assert!(matches!(err, GuardError::DepthExceeded { max_depth: 2, .. }));
        assert_eq!(err.message(), "Template expansion depth limit exceeded: ");
    }
}
