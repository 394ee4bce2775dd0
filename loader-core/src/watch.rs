use std::path::Path;

/// Decides whether a candidate path ends resolution.
///
/// The candidate is handed over by mutable reference so a watch may rewrite
/// it (e.g. append a file extension) before accepting it. Returning `true`
/// stops the search and the rewritten candidate becomes the result.
pub trait Watch {
    fn watch(&mut self, resolved: &mut String) -> bool;
}

impl<F> Watch for F
where
    F: FnMut(&mut String) -> bool,
{
    fn watch(&mut self, resolved: &mut String) -> bool {
        self(resolved)
    }
}

/// Fallible counterpart of [`Watch`]. An error aborts resolution.
pub trait TryWatch {
    fn try_watch(&mut self, resolved: &mut String) -> anyhow::Result<bool>;
}

impl<F> TryWatch for F
where
    F: FnMut(&mut String) -> anyhow::Result<bool>,
{
    fn try_watch(&mut self, resolved: &mut String) -> anyhow::Result<bool> {
        self(resolved)
    }
}

/// Default watch: accepts a candidate when something exists at that path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExists;

impl Watch for FileExists {
    fn watch(&mut self, resolved: &mut String) -> bool {
        Path::new(resolved.as_str()).exists()
    }
}

/// Appends `.{extension}` to each candidate, then checks it exists.
#[derive(Debug, Clone)]
pub struct WithExtension {
    extension: String,
}

impl WithExtension {
    pub fn new(extension: impl AsRef<str>) -> Self {
        Self {
            extension: extension.as_ref().trim_start_matches('.').to_string(),
        }
    }
}

impl Watch for WithExtension {
    fn watch(&mut self, resolved: &mut String) -> bool {
        resolved.push('.');
        resolved.push_str(&self.extension);
        FileExists.watch(resolved)
    }
}
