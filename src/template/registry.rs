//! Template source registry: cache in front of an optional fetcher

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::completion::Completion;

use super::fetch::{FetchError, TemplateFetcher};

type FetchResult = Result<String, FetchError>;

struct RegistryInner {
    cache: RefCell<HashMap<String, String>>,
    in_flight: RefCell<HashMap<String, Vec<oneshot::Sender<FetchResult>>>>,
    fetcher: Option<Rc<dyn TemplateFetcher>>,
}

/// Cache of template source keyed by normalized title
///
/// Entries are added on the first successful fetch and never re-fetched.
/// Failed fetches are not cached, so a later request retries. Concurrent
/// first requests for the same title share a single fetch.
///
/// Cloning yields another handle on the same cache.
#[derive(Clone)]
pub struct TemplateRegistry {
    inner: Rc<RegistryInner>,
}

impl TemplateRegistry {
    /// Registry that fetches cache misses with `fetcher`
    pub fn new(fetcher: Rc<dyn TemplateFetcher>) -> Self {
        Self::build(Some(fetcher))
    }

    /// Registry with fetching disabled
    pub fn offline() -> Self {
        Self::build(None)
    }

    fn build(fetcher: Option<Rc<dyn TemplateFetcher>>) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                cache: RefCell::new(HashMap::new()),
                in_flight: RefCell::new(HashMap::new()),
                fetcher,
            }),
        }
    }

    /// Preload source for several titles
    pub fn with_templates<I, K, V>(self, templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (title, source) in templates {
            self.insert(title, source);
        }
        self
    }

    pub fn insert(&self, title: impl Into<String>, source: impl Into<String>) {
        self.inner
            .cache
            .borrow_mut()
            .insert(title.into(), source.into());
    }

    pub fn get(&self, title: &str) -> Option<String> {
        self.inner.cache.borrow().get(title).cloned()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.inner.cache.borrow().contains_key(title)
    }

    pub fn len(&self) -> usize {
        self.inner.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fetching_enabled(&self) -> bool {
        self.inner.fetcher.is_some()
    }

    /// Number of titles with a fetch currently running
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.borrow().len()
    }

    /// Obtain the source of a fully qualified title
    ///
    /// A cache hit or a disabled fetcher completes immediately. Anything that
    /// needs the fetcher is deferred.
    pub fn fetch(&self, title: &str) -> Completion<FetchResult> {
        if let Some(source) = self.get(title) {
            debug!(%title, "template cache hit");
            return Completion::Done(Ok(source));
        }

        let Some(fetcher) = self.inner.fetcher.clone() else {
            debug!(%title, "fetching disabled and no cache entry");
            return Completion::Done(Err(FetchError::Disabled {
                title: title.to_string(),
            }));
        };

        let title = title.to_string();
        {
            let mut in_flight = self.inner.in_flight.borrow_mut();
            if let Some(waiters) = in_flight.get_mut(&title) {
                debug!(%title, "joining in-flight fetch");
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                return Completion::deferred(async move {
                    rx.await
                        .unwrap_or_else(|_| Err(FetchError::Abandoned { title }))
                });
            }
            in_flight.insert(title.clone(), Vec::new());
        }

        let flight = Flight {
            registry: self.clone(),
            title: title.clone(),
        };
        let request = fetcher.fetch(&title);
        Completion::deferred(async move {
            let result = request.await;
            match &result {
                Ok(source) => flight.registry.insert(title, source.clone()),
                Err(e) => warn!(error = %e, "template fetch failed"),
            }
            flight.complete(&result);
            result
        })
    }
}

/// Marks a title as being fetched until the fetch completes or is dropped
struct Flight {
    registry: TemplateRegistry,
    title: String,
}

impl Flight {
    fn complete(self, result: &FetchResult) {
        let waiters = self
            .registry
            .inner
            .in_flight
            .borrow_mut()
            .remove(&self.title)
            .unwrap_or_default();
        for waiter in waiters {
            // A waiter that went away no longer needs the result
            let _ = waiter.send(result.clone());
        }
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        // Waiters of a dropped fetch see their channel close
        self.registry.inner.in_flight.borrow_mut().remove(&self.title);
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("cached", &self.len())
            .field("in_flight", &self.in_flight())
            .field("fetching_enabled", &self.fetching_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use futures::future::{FutureExt, LocalBoxFuture};

    /// Serves fixed responses after a yield and counts requests
    struct CountingFetcher {
        calls: Rc<Cell<usize>>,
        response: FetchResult,
    }

    impl TemplateFetcher for CountingFetcher {
        fn fetch(&self, _title: &str) -> LocalBoxFuture<'static, FetchResult> {
            self.calls.set(self.calls.get() + 1);
            let response = self.response.clone();
            async move {
                tokio::task::yield_now().await;
                response
            }
            .boxed_local()
        }
    }

    fn counting(response: FetchResult) -> (TemplateRegistry, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let fetcher = CountingFetcher {
            calls: calls.clone(),
            response,
        };
        (TemplateRegistry::new(Rc::new(fetcher)), calls)
    }

    #[test]
    fn test_cache_hit_is_immediate() {
        let registry = TemplateRegistry::offline().with_templates([("Template:Foo", "src")]);
        let result = registry.fetch("Template:Foo").into_done();
        assert_eq!(result, Some(Ok("src".to_string())));
    }

    #[test]
    fn test_disabled_miss_is_immediate_error() {
        let registry = TemplateRegistry::offline();
        let result = registry.fetch("Template:Bar").into_done();
        assert_eq!(
            result,
            Some(Err(FetchError::Disabled {
                title: "Template:Bar".to_string()
            }))
        );
    }

    #[tokio::test]
    async fn test_successful_fetch_populates_cache() {
        let (registry, calls) = counting(Ok("body".to_string()));
        let pending = registry.fetch("Template:Foo");
        assert!(pending.is_pending());
        assert_eq!(pending.resolve().await, Ok("body".to_string()));
        assert!(registry.contains("Template:Foo"));

        // Memoized: the second lookup does not reach the fetcher
        assert!(!registry.fetch("Template:Foo").is_pending());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let (registry, calls) = counting(Err(FetchError::Transport {
            title: "Template:Foo".to_string(),
            message: "connection refused".to_string(),
        }));
        assert!(registry.fetch("Template:Foo").resolve().await.is_err());
        assert!(!registry.contains("Template:Foo"));

        assert!(registry.fetch("Template:Foo").resolve().await.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let (registry, calls) = counting(Ok("body".to_string()));
        let first = registry.fetch("Template:Foo");
        let second = registry.fetch("Template:Foo");
        assert_eq!(registry.in_flight(), 1);

        let (a, b) = futures::join!(first.resolve(), second.resolve());
        assert_eq!(a, Ok("body".to_string()));
        assert_eq!(b, Ok("body".to_string()));
        assert_eq!(calls.get(), 1);
        assert_eq!(registry.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropped_fetch_releases_waiters() {
        let (registry, _calls) = counting(Ok("body".to_string()));
        let leader = registry.fetch("Template:Foo");
        let follower = registry.fetch("Template:Foo");
        drop(leader);
        assert_eq!(registry.in_flight(), 0);
        assert_eq!(
            follower.resolve().await,
            Err(FetchError::Abandoned {
                title: "Template:Foo".to_string()
            })
        );
    }
}
