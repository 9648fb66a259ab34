//! # Configuration
//!
//! A minimal, framework-agnostic configuration store: string keys to
//! string values, layered however the application likes. The app
//! container exposes `set`/`get`, and hooks receive an immutable
//! `ConfigSnapshot` so a request never observes a half-applied change.
//!
//! Applications typically load defaults in code and let the environment
//! override them (see `gadisewa-server`'s `GADISEWA__`-prefixed loader).

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct GadiConfig {
    values: HashMap<String, String>,
}

impl GadiConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Example: config.set("tenancy.local_suffix", "localhost")
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            map: self.values.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }

    /// Comma-separated list value; entries are trimmed, empties dropped.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_values_are_trimmed() {
        let mut cfg = GadiConfig::new();
        cfg.set("tenancy.reserved_subdomains", "www, api ,admin,");
        let snap = cfg.snapshot();
        assert_eq!(
            snap.get_list("tenancy.reserved_subdomains"),
            Some(vec!["www".into(), "api".into(), "admin".into()])
        );
    }
}
