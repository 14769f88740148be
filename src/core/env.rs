use std::collections::HashMap;

/// Name of the variable holding a pull secret injected directly into the process.
pub const PULL_SECRET_ENV_VAR: &str = "PULL_SECRET";

/// Name of the variable holding the additional log fields blob.
pub const ADDITIONAL_LOG_FIELDS_ENV_VAR: &str = "HIVE_ADDITIONAL_LOG_FIELDS";

/// Read access to environment variables.
///
/// Resolvers receive one of these at construction instead of reading the
/// process environment themselves, so tests can supply a plain map.
pub trait EnvProvider: Send + Sync {
    /// Returns the value of `key`, `None` when unset or not valid unicode.
    fn var(&self, key: &str) -> Option<String>;

    /// Like [`EnvProvider::var`] but treats an empty value as unset.
    fn non_empty_var(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvProvider for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<E: EnvProvider + ?Sized> EnvProvider for &E {
    fn var(&self, key: &str) -> Option<String> {
        (**self).var(key)
    }
}
