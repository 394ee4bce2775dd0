//! Namespace path stacks for class autoloading.
//!
//! A [`PathStack`] maps namespace prefixes to ordered directories. Resolving a
//! namespaced resource name walks the namespaces that occur in it, most
//! specific first and the `*` wildcard last, turns the rest of the name into a
//! relative path under each directory, and hands every candidate to a
//! [`Watch`] until one is accepted.

mod config;
mod error;
mod stack;
mod watch;

pub use config::{ConfigFormat, Directories, StackMap};
pub use error::{Error, Result};
pub use stack::{MatchOrder, PathStack, StackSource, WILDCARD};
pub use watch::{FileExists, TryWatch, Watch, WithExtension};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{
        Error,
        Result,
        PathStack,
        StackMap,
        StackSource,
        MatchOrder,
        Watch,
        TryWatch,
        FileExists,
        WithExtension,
    };
}
