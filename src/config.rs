// File: ./src/config.rs
// Free-form key/value settings stored next to the schedule file.
//
// No schema is enforced here: the presentation layer owns the meaning of every
// key. Unlike the schedule file, saving the config takes no backup.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    entries: Map<String, Value>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `config.json`. A missing file yields an empty config.
    /// A file that exists but is not a JSON object is an error.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_path()?;
        let json = serde_json::to_string_pretty(self)?;
        LocalStorage::atomic_write(&path, json)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Stores a command-line value: JSON scalars (`true`, `3`, `null`, `"x"`)
    /// keep their type, anything else is stored as a plain string.
    pub fn set_from_str(&mut self, key: &str, raw: &str) -> Option<Value> {
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v) if !v.is_object() && !v.is_array() => v,
            _ => Value::String(raw.to_string()),
        };
        self.set(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_from_str_keeps_scalar_types() {
        let mut c = Config::new();
        c.set_from_str("dark", "true");
        c.set_from_str("width", "32");
        c.set_from_str("theme", "solarized");
        c.set_from_str("quoted", "\"ja\"");
        c.set_from_str("list", "[1,2]");

        assert_eq!(c.get("dark"), Some(&json!(true)));
        assert_eq!(c.get("width"), Some(&json!(32)));
        assert_eq!(c.get_str("theme"), Some("solarized"));
        assert_eq!(c.get_str("quoted"), Some("ja"));
        assert_eq!(c.get_str("list"), Some("[1,2]"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut c = Config::new();
        c.set("language", "ja");
        assert_eq!(serde_json::to_value(&c).unwrap(), json!({"language": "ja"}));
    }
}
