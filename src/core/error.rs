use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read pull secret file '{}' - {source}", path.display())]
    SecretFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error fetching release image source '{url}' - {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Release image source '{url}' answered with status {status}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Error reading release image response body - {0}")]
    BodyRead(#[source] reqwest::Error),
    #[error("Error decoding release payload - {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Release image fetch from '{url}' timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("Cannot get client config - {0}")]
    ClientConfig(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Kubeconfig error - {0}")]
    Kubeconfig(#[source] kube::config::KubeconfigError),
    #[error("Cannot build kubernetes client - {0}")]
    Client(#[source] kube::Error),
    #[error("Invalid log level '{level}'")]
    InvalidLogLevel { level: String },
}
