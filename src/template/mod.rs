//! Template transclusion engine
//!
//! This module expands `{{name|args}}` invocations by fetching the named
//! template's source and running it through a nested pipeline bound to the
//! invocation's arguments. Argument references `{{{name|default}}}` inside
//! the template body resolve against the direct caller.
//!
//! # Example
//!
//! ```text
//! Template:Greet  =>  Hello {{{1}}}, welcome to {{{site|the wiki}}}
//!
//! {{Greet|Alice}}              =>  Hello Alice, welcome to the wiki
//! {{Greet|Bob|site=Example}}   =>  Hello Bob, welcome to Example
//! ```

mod fetch;
mod frame;
mod guard;
mod registry;
mod resolver;
mod title;

pub use fetch::{parse_api_response, ApiFetcher, FetchError, TemplateFetcher};
pub use frame::{frame_args, name_args, ExpansionFrame, FrameState};
pub use guard::{GuardError, LoopGuard};
pub use registry::TemplateRegistry;
pub use resolver::{TemplateHandler, TEMPLATE_RANK};
pub use title::{normalize_title, resolve_title, TEMPLATE_NAMESPACE};
