use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::StackMap;
use crate::error::{Error, Result};
use crate::watch::{FileExists, TryWatch, Watch};

/// Namespace consulted after every substring match has been tried.
pub const WILDCARD: &str = "*";

const NAMESPACE_SEPARATOR: char = '\\';

/// How namespaces that occur in a resource name are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchOrder {
    /// Walk namespaces in registration order; a match longer than every match
    /// seen so far goes to the front, anything else to the back.
    #[default]
    Discovery,
    /// Longest namespace first, ties kept in registration order.
    Specificity,
}

/// Anything [`PathStack::from`] accepts.
#[derive(Debug, Clone)]
pub enum StackSource {
    File(PathBuf),
    Map(StackMap),
    Pair { namespace: String, dir: String },
}

impl From<PathBuf> for StackSource {
    fn from(path: PathBuf) -> Self {
        StackSource::File(path)
    }
}

impl From<&Path> for StackSource {
    fn from(path: &Path) -> Self {
        StackSource::File(path.to_path_buf())
    }
}

impl From<&str> for StackSource {
    fn from(path: &str) -> Self {
        StackSource::File(PathBuf::from(path))
    }
}

impl From<StackMap> for StackSource {
    fn from(map: StackMap) -> Self {
        StackSource::Map(map)
    }
}

impl<N: Into<String>, D: Into<String>> From<(N, D)> for StackSource {
    fn from((namespace, dir): (N, D)) -> Self {
        StackSource::Pair {
            namespace: namespace.into(),
            dir: dir.into(),
        }
    }
}

/// Registered namespaces, each spliced onto an ordered list of directories.
///
/// Entries can only be added. Resolution borrows the stack immutably.
#[derive(Debug, Clone, Default)]
pub struct PathStack {
    stacks: IndexMap<String, Vec<String>>,
    order: MatchOrder,
}

impl PathStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_order(mut self, order: MatchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn match_order(&self) -> MatchOrder {
        self.order
    }

    /// Appends `dir` to the directories of `namespace`.
    ///
    /// Leading and trailing `\` are trimmed from the namespace. It may be
    /// [`WILDCARD`].
    pub fn set_stack(&mut self, namespace: impl AsRef<str>, dir: impl Into<String>) -> &mut Self {
        let dir = dir.into();
        debug!(namespace = namespace.as_ref(), dir = %dir, "registering directory");
        self.stack_mut(namespace.as_ref()).push(dir);
        self
    }

    pub fn from_map(&mut self, map: StackMap) -> &mut Self {
        for (namespace, dirs) in map {
            // Touch the entry even for an empty list
            self.stack_mut(&namespace);
            for dir in dirs {
                self.set_stack(&namespace, dir);
            }
        }
        self
    }

    /// Loads a TOML or JSON mapping. A missing file adds nothing.
    pub fn from_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        match StackMap::load(path)? {
            Some(map) => {
                debug!(path = %path.display(), namespaces = map.len(), "loaded path stacks");
                Ok(self.from_map(map))
            }
            None => {
                debug!(path = %path.display(), "path stack file not found, skipping");
                Ok(self)
            }
        }
    }

    pub fn from(&mut self, source: impl Into<StackSource>) -> Result<&mut Self> {
        match source.into() {
            StackSource::File(path) => self.from_file(path),
            StackSource::Map(map) => Ok(self.from_map(map)),
            StackSource::Pair { namespace, dir } => Ok(self.set_stack(namespace, dir)),
        }
    }

    /// Dynamic form of [`PathStack::from`]: a string is a file path, an
    /// object is a mapping. Anything else is an invalid configuration.
    pub fn from_value(&mut self, value: Value) -> Result<&mut Self> {
        match value {
            Value::String(path) => self.from_file(path),
            value @ Value::Object(_) => Ok(self.from_map(StackMap::from_value(value)?)),
            other => Err(Error::InvalidConfiguration(format!(
                "expected a file path or a mapping, got {}",
                other
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.stacks.contains_key(namespace.trim_matches(NAMESPACE_SEPARATOR))
    }

    /// Registered namespaces in registration order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }

    pub fn directories(&self, namespace: &str) -> Option<&[String]> {
        self.stacks
            .get(namespace.trim_matches(NAMESPACE_SEPARATOR))
            .map(Vec::as_slice)
    }

    /// Every candidate path for `resource`, in the order they are probed.
    pub fn candidates<'a>(&'a self, resource: &'a str) -> impl Iterator<Item = String> + 'a {
        self.matched_namespaces(resource)
            .into_iter()
            .flat_map(move |namespace| {
                let masked = mask_off(resource, namespace);
                self.stacks[namespace]
                    .iter()
                    .map(move |dir| normalize_dir(dir) + &masked)
            })
    }

    /// Returns the first candidate accepted by `watch`, as left by the watch.
    pub fn resolve<W: Watch>(&self, resource: &str, mut watch: W) -> Option<String> {
        let resolved = self.candidates(resource).find_map(|mut candidate| {
            trace!(resource, candidate = %candidate, "probing");
            watch.watch(&mut candidate).then_some(candidate)
        });

        match &resolved {
            Some(path) => trace!(resource, path = %path, "resolved"),
            None => trace!(resource, "no candidate accepted"),
        }
        resolved
    }

    /// [`PathStack::resolve`] with [`FileExists`].
    pub fn resolve_existing(&self, resource: &str) -> Option<String> {
        self.resolve(resource, FileExists)
    }

    /// Like [`PathStack::resolve`], stopping at the first watch error.
    pub fn try_resolve<W: TryWatch>(&self, resource: &str, mut watch: W) -> Result<Option<String>> {
        for mut candidate in self.candidates(resource) {
            trace!(resource, candidate = %candidate, "probing");
            if watch.try_watch(&mut candidate)? {
                trace!(resource, path = %candidate, "resolved");
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    fn stack_mut(&mut self, namespace: &str) -> &mut Vec<String> {
        self.stacks
            .entry(namespace.trim_matches(NAMESPACE_SEPARATOR).to_string())
            .or_default()
    }

    fn matched_namespaces(&self, resource: &str) -> Vec<&str> {
        let mut matched = VecDeque::new();
        let mut nearest = 0;

        for namespace in self.stacks.keys() {
            if namespace == WILDCARD || !resource.contains(namespace.as_str()) {
                continue;
            }

            if self.order == MatchOrder::Discovery && namespace.len() > nearest {
                matched.push_front(namespace.as_str());
                nearest = namespace.len();
            } else {
                matched.push_back(namespace.as_str());
            }
        }

        let mut matched = Vec::from(matched);
        if self.order == MatchOrder::Specificity {
            matched.sort_by(|a, b| b.len().cmp(&a.len()));
        }

        if self.stacks.contains_key(WILDCARD) {
            matched.push(WILDCARD);
        }

        trace!(resource, ?matched, "matched namespaces");
        matched
    }
}

/// Drops the first `namespace.len()` bytes of `resource` (the whole name for
/// the wildcard) and turns the rest into a `/`-rooted relative path.
fn mask_off(resource: &str, namespace: &str) -> String {
    let masked = if namespace == WILDCARD {
        resource
    } else {
        let mut at = namespace.len().min(resource.len());
        while !resource.is_char_boundary(at) {
            at += 1;
        }
        &resource[at..]
    };

    format!("/{}", normalize_dir(masked.trim_start_matches(NAMESPACE_SEPARATOR)))
}

fn normalize_dir(dir: &str) -> String {
    dir.replace(NAMESPACE_SEPARATOR, "/")
        .trim_end_matches('/')
        .to_string()
}
