use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One directory or an ordered list of directories registered under a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Directories {
    One(String),
    Many(Vec<String>),
}

impl Directories {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let dirs: &[String] = match self {
            Directories::One(dir) => std::slice::from_ref(dir),
            Directories::Many(dirs) => dirs,
        };
        dirs.iter().map(String::as_str)
    }

}

impl IntoIterator for Directories {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Directories::One(dir) => vec![dir].into_iter(),
            Directories::Many(dirs) => dirs.into_iter(),
        }
    }
}

impl From<&str> for Directories {
    fn from(dir: &str) -> Self {
        Directories::One(dir.to_string())
    }
}

impl From<String> for Directories {
    fn from(dir: String) -> Self {
        Directories::One(dir)
    }
}

impl From<Vec<String>> for Directories {
    fn from(dirs: Vec<String>) -> Self {
        Directories::Many(dirs)
    }
}

impl From<Vec<&str>> for Directories {
    fn from(dirs: Vec<&str>) -> Self {
        Directories::Many(dirs.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Directories {
    fn from(dirs: [&str; N]) -> Self {
        Directories::Many(dirs.iter().map(|dir| dir.to_string()).collect())
    }
}

/// Namespace to directories mapping, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackMap {
    entries: IndexMap<String, Directories>,
}

/// File formats a [`StackMap`] can be loaded from, picked by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            _ => Err(Error::InvalidConfiguration(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }
}

impl StackMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any directories already given for `namespace`.
    pub fn with(mut self, namespace: impl Into<String>, dirs: impl Into<Directories>) -> Self {
        self.entries.insert(namespace.into(), dirs.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Directories)> {
        self.entries.iter().map(|(namespace, dirs)| (namespace.as_str(), dirs))
    }

    /// Builds a mapping from a dynamic value; the root must be an object whose
    /// values are strings or arrays of strings.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(invalid)
    }

    /// Syntax errors surface as `Toml`/`Json`, a well-formed document of the
    /// wrong shape as `InvalidConfiguration`.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        match format {
            ConfigFormat::Toml => {
                let table: toml::Table = toml::from_str(content)?;
                let map: StackMap = toml::Value::Table(table).try_into().map_err(invalid)?;
                Ok(map)
            }
            ConfigFormat::Json => Self::from_value(serde_json::from_str(content)?),
        }
    }

    /// Reads a mapping from disk. A file that does not exist yields `None`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format).map(Some)
    }
}

impl<K, D> FromIterator<(K, D)> for StackMap
where
    K: Into<String>,
    D: Into<Directories>,
{
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(namespace, dirs)| (namespace.into(), dirs.into()))
                .collect(),
        }
    }
}

impl IntoIterator for StackMap {
    type Item = (String, Directories);
    type IntoIter = indexmap::map::IntoIter<String, Directories>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn invalid(err: impl std::fmt::Display) -> Error {
    Error::InvalidConfiguration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_document_order() {
        let map = StackMap::from_value(json!({
            "Zeta": "/z",
            "App\\Models": ["/src/models", "/vendor/models"],
            "*": "/fallback",
        }))
        .unwrap();

        let namespaces: Vec<_> = map.iter().map(|(namespace, _)| namespace).collect();
        assert_eq!(namespaces, vec!["Zeta", "App\\Models", "*"]);

        let (_, dirs) = map.iter().nth(1).unwrap();
        assert_eq!(dirs.iter().collect::<Vec<_>>(), vec!["/src/models", "/vendor/models"]);
    }

    #[test]
    fn test_from_value_rejects_non_mapping() {
        for value in [json!(42), json!(["/src"]), json!(null), json!(true)] {
            let err = StackMap::from_value(value).unwrap_err();
            assert!(matches!(err, Error::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn test_from_value_rejects_bad_directories() {
        let err = StackMap::from_value(json!({ "App": 7 })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = StackMap::from_value(json!({ "App": ["/src", { "nested": true }] })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
"App\\Models" = ["/src/models", "/lib/models"]
"*" = "/fallback"
"#;
        let map = StackMap::parse(content, ConfigFormat::Toml).unwrap();
        let expected = StackMap::new()
            .with("App\\Models", ["/src/models", "/lib/models"])
            .with("*", "/fallback");
        assert_eq!(map, expected);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = StackMap::parse("{ not json", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = StackMap::parse("App = [\"/src\"", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn test_parse_wrong_shape_is_invalid_configuration() {
        let err = StackMap::parse(r#"{ "App": 7 }"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = StackMap::parse("App = 7\n", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));

        let err = StackMap::parse(r#"["/src"]"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_load_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacks.toml");
        std::fs::create_dir(&path).unwrap();

        let err = StackMap::load(&path).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = StackMap::load(dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacks.json");
        std::fs::write(&path, r#"{ "App": "/src", "Lib": ["/a", "/b"] }"#).unwrap();

        let map = StackMap::load(&path).unwrap().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map, StackMap::new().with("App", "/src").with("Lib", ["/a", "/b"]));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacks.php");
        std::fs::write(&path, "<?php return [];").unwrap();

        let err = StackMap::load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
