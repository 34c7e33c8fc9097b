//! Pipelines and the ordered delivery of their output chunks

use futures::stream::{FuturesOrdered, StreamExt};
use futures::FutureExt;
use tracing::debug;

use crate::completion::{Completion, Deferred};
use crate::parser::{tokenize, Token};

use super::scope::Scope;

/// Receiver of pipeline output
pub trait TokenSink {
    /// Called for every chunk, in emission order
    fn on_chunk(&mut self, chunk: Vec<Token>);

    /// Called once, before the first chunk that had to be waited for
    fn on_deferred(&mut self) {}

    /// Called once after the last chunk
    fn on_end(&mut self) {}
}

impl TokenSink for Vec<Token> {
    fn on_chunk(&mut self, chunk: Vec<Token>) {
        self.extend(chunk);
    }
}

/// Ordered output chunks of a pipeline, some possibly still pending
pub struct ChunkStream {
    chunks: Vec<Completion<Vec<Token>>>,
}

impl ChunkStream {
    pub fn new(chunks: Vec<Completion<Vec<Token>>>) -> Self {
        Self { chunks }
    }

    /// Deliver every chunk to `sink` in order, then signal the end
    ///
    /// Chunks that are ready before the first pending one are delivered
    /// right away. If nothing is pending the sink is returned immediately;
    /// otherwise the pending chunks are polled concurrently and delivered
    /// FIFO, and the sink is returned once the last one arrives.
    pub fn collect_into<S>(self, mut sink: S) -> Completion<S>
    where
        S: TokenSink + 'static,
    {
        let mut chunks = self.chunks.into_iter();
        while let Some(chunk) = chunks.next() {
            match chunk {
                Completion::Done(tokens) => sink.on_chunk(tokens),
                Completion::Pending(first) => {
                    sink.on_deferred();
                    let mut ordered: FuturesOrdered<Deferred<Vec<Token>>> = std::iter::once(first)
                        .chain(chunks.map(|c| c.resolve().boxed_local()))
                        .collect();
                    return Completion::deferred(async move {
                        while let Some(tokens) = ordered.next().await {
                            sink.on_chunk(tokens);
                        }
                        sink.on_end();
                        sink
                    });
                }
            }
        }
        sink.on_end();
        Completion::Done(sink)
    }
}

impl FromIterator<Completion<Vec<Token>>> for ChunkStream {
    fn from_iter<I: IntoIterator<Item = Completion<Vec<Token>>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Tokenizer plus transform chain bound to a scope
pub struct Pipeline {
    scope: Scope,
}

impl Pipeline {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    /// Tokenize and transform wikitext source
    ///
    /// Emits one chunk per source token, terminated by a chunk holding the
    /// end marker.
    pub fn process(&self, source: &str) -> ChunkStream {
        let mut tokens = tokenize(source);
        tokens.push(Token::End);
        debug!(
            tokens = tokens.len(),
            depth = self.scope.guard().depth(),
            "processing source"
        );
        tokens
            .into_iter()
            .map(|token| self.scope.transform(token))
            .collect()
    }
}
