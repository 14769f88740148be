use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::core::env::{EnvProvider, PULL_SECRET_ENV_VAR};
use crate::core::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullSecretSource {
    Environment,
    Explicit,
    File,
}

/// Registry credentials blob. The value never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PullSecret {
    value: String,
    source: Option<PullSecretSource>,
}

impl PullSecret {
    fn new(value: String, source: PullSecretSource) -> Self {
        Self { value, source: Some(source) }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Which source supplied the secret, `None` when nothing did.
    pub fn source(&self) -> Option<PullSecretSource> {
        self.source
    }
}

impl fmt::Debug for PullSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullSecret")
            .field("value", &"<redacted>")
            .field("len", &self.value.len())
            .field("source", &self.source)
            .finish()
    }
}

pub struct PullSecretService<E> {
    env: E,
}

impl<E: EnvProvider> PullSecretService<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    /// Picks the first non-empty of: the `PULL_SECRET` variable, `explicit_secret`,
    /// the trimmed contents of `explicit_secret_file`. An empty secret is not an error.
    pub fn resolve(&self, explicit_secret: &str, explicit_secret_file: Option<&Path>) -> Result<PullSecret> {
        if let Some(secret) = self.env.non_empty_var(PULL_SECRET_ENV_VAR) {
            log::debug!("Using pull secret from {PULL_SECRET_ENV_VAR} environment variable");
            return Ok(PullSecret::new(secret, PullSecretSource::Environment));
        }
        if !explicit_secret.is_empty() {
            return Ok(PullSecret::new(String::from(explicit_secret), PullSecretSource::Explicit));
        }
        match explicit_secret_file {
            Some(path) if !path.as_os_str().is_empty() => {
                let data = fs::read_to_string(path)
                    .map_err(|source| Error::SecretFileRead { path: path.to_path_buf(), source })?;
                Ok(PullSecret::new(String::from(data.trim()), PullSecretSource::File))
            }
            _ => Ok(PullSecret::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn env_with_secret(secret: Option<&str>) -> HashMap<String, String> {
        secret
            .map(|s| HashMap::from([(String::from(PULL_SECRET_ENV_VAR), String::from(s))]))
            .unwrap_or_default()
    }

    fn secret_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Error creating temp file");
        file.write_all(content.as_bytes()).expect("Error writing temp file");
        file
    }

    #[test]
    fn highest_precedence_source_wins() {
        let file = secret_file("F");
        for env in [None, Some("E")] {
            for explicit in ["", "X"] {
                for with_file in [false, true] {
                    let svc = PullSecretService::new(env_with_secret(env));
                    let path = with_file.then(|| file.path());
                    let secret = svc.resolve(explicit, path).expect("Error resolving secret");

                    let expected = match (env, explicit, with_file) {
                        (Some(e), _, _) => (e, Some(PullSecretSource::Environment)),
                        (None, "X", _) => ("X", Some(PullSecretSource::Explicit)),
                        (None, _, true) => ("F", Some(PullSecretSource::File)),
                        (None, _, false) => ("", None),
                    };
                    assert_eq!((secret.as_str(), secret.source()), expected);
                }
            }
        }
    }

    #[test]
    fn env_beats_explicit_value() {
        let svc = PullSecretService::new(env_with_secret(Some("E")));
        let secret = svc.resolve("X", None).unwrap();
        assert_eq!(secret.as_str(), "E");
    }

    #[test]
    fn empty_env_value_is_skipped() {
        let svc = PullSecretService::new(env_with_secret(Some("")));
        let secret = svc.resolve("X", None).unwrap();
        assert_eq!(secret.as_str(), "X");
    }

    #[test]
    fn no_source_yields_empty_secret() {
        let svc = PullSecretService::new(env_with_secret(None));
        let secret = svc.resolve("", None).unwrap();
        assert!(secret.is_empty());
        assert_eq!(secret.source(), None);

        let secret = svc.resolve("", Some(Path::new(""))).unwrap();
        assert!(secret.is_empty());
    }

    #[test]
    fn file_content_is_trimmed() {
        let file = secret_file("  secretvalue\n");
        let svc = PullSecretService::new(env_with_secret(None));
        let secret = svc.resolve("", Some(file.path())).unwrap();
        assert_eq!(secret.into_string(), "secretvalue");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");
        let svc = PullSecretService::new(env_with_secret(None));

        let err = svc.resolve("", Some(&path)).unwrap_err();
        assert!(matches!(err, Error::SecretFileRead { path: p, .. } if p == path));
    }

    #[test]
    fn debug_output_hides_value() {
        let svc = PullSecretService::new(env_with_secret(Some("{\"auths\":{}}")));
        let secret = svc.resolve("", None).unwrap();
        assert!(!format!("{secret:?}").contains("auths"));
    }
}
