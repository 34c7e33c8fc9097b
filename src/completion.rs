//! Two-outcome completion protocol shared by every expansion step
//!
//! An operation either finishes while it is being called ([`Completion::Done`])
//! or hands back a deferred result ([`Completion::Pending`]) that completes
//! later. Combining completions is monotonic: once any part of a computation
//! is pending, everything derived from it is pending too, which is how the
//! deferred mode propagates upward through nested expansions.
//!
//! Delivery happens exactly once by construction. A `Done` value is moved out
//! of the completion, and a pending future is consumed by awaiting it.

use std::fmt;
use std::future::Future;

use futures::future::{self, FutureExt, LocalBoxFuture};

/// Deferred result of a pending completion
pub type Deferred<T> = LocalBoxFuture<'static, T>;

/// Result of an operation that may need to wait on external input
#[must_use = "a completion must be delivered to the caller"]
pub enum Completion<T> {
    /// The result was available immediately
    Done(T),
    /// The result will be delivered when the future completes
    Pending(Deferred<T>),
}

impl<T: 'static> Completion<T> {
    /// Wrap a future as a pending completion
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = T> + 'static,
    {
        Completion::Pending(future.boxed_local())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Completion::Pending(_))
    }

    /// The immediate value, if there is one
    pub fn into_done(self) -> Option<T> {
        match self {
            Completion::Done(value) => Some(value),
            Completion::Pending(_) => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Completion<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        match self {
            Completion::Done(value) => Completion::Done(f(value)),
            Completion::Pending(future) => Completion::deferred(future.map(f)),
        }
    }

    /// Chain a step that may itself be pending
    ///
    /// A pending input always yields a pending output, even if `f` would
    /// complete immediately.
    pub fn and_then<U, F>(self, f: F) -> Completion<U>
    where
        U: 'static,
        F: FnOnce(T) -> Completion<U> + 'static,
    {
        match self {
            Completion::Done(value) => f(value),
            Completion::Pending(future) => {
                Completion::deferred(async move { f(future.await).resolve().await })
            }
        }
    }

    /// Wait for the result regardless of mode
    pub async fn resolve(self) -> T {
        match self {
            Completion::Done(value) => value,
            Completion::Pending(future) => future.await,
        }
    }

    /// Combine completions, preserving order
    ///
    /// The result is `Done` only if every member is `Done`. Otherwise the
    /// remaining members are polled concurrently behind a single pending
    /// completion.
    pub fn join_all(items: Vec<Completion<T>>) -> Completion<Vec<T>> {
        let mut done = Vec::with_capacity(items.len());
        let mut rest = items.into_iter();
        while let Some(item) = rest.next() {
            match item {
                Completion::Done(value) => done.push(value),
                Completion::Pending(first) => {
                    let tail = future::join_all(
                        std::iter::once(Completion::Pending(first))
                            .chain(rest)
                            .map(Completion::resolve),
                    );
                    return Completion::deferred(async move {
                        done.extend(tail.await);
                        done
                    });
                }
            }
        }
        Completion::Done(done)
    }
}

impl<T: fmt::Debug> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Done(value) => f.debug_tuple("Done").field(value).finish(),
            Completion::Pending(_) => f.write_str("Pending"),
        }
    }
}
