//! Token transform pipeline
//!
//! A [`Pipeline`] tokenizes wikitext and runs every token through the
//! transforms registered with a [`TransformManager`]. Nested template
//! expansions re-enter the same machinery through
//! [`Scope::child_pipeline`] with their own argument bindings.

mod attributes;
mod manager;
mod scope;
mod stream;

pub use attributes::AttributeExpander;
pub use manager::{TokenTransform, TransformManager};
pub use scope::{FrameArgs, Scope};
pub use stream::{ChunkStream, Pipeline, TokenSink};
