use std::error::Error as StdError;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};

use crate::core::env::EnvProvider;
use crate::core::error::{Error, Result};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const SERVICE_ACCOUNT_NAMESPACE_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

const KUBECONFIG_ENV_VAR: &str = "KUBECONFIG";
const SERVICE_HOST_ENV_VAR: &str = "KUBERNETES_SERVICE_HOST";

type BoxError = Box<dyn StdError + Send + Sync>;

/// Resolves the kube API configuration of the local environment.
pub struct ClientContextService<E> {
    env: E,
    namespace_file: PathBuf,
}

impl<E: EnvProvider> ClientContextService<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            namespace_file: PathBuf::from(SERVICE_ACCOUNT_NAMESPACE_PATH),
        }
    }

    pub fn with_namespace_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.namespace_file = path.into();
        self
    }

    /// Discovers the REST configuration: in-cluster service account first, then kubeconfig files.
    pub async fn client_config(&self) -> Result<kube::Config> {
        self.discover_client_config().await.map_err(|cause| {
            log::error!("Cannot get client config - {cause}");
            Error::ClientConfig(cause)
        })
    }

    pub async fn client(&self) -> Result<kube::Client> {
        let config = self.client_config().await?;
        kube::Client::try_from(config).map_err(Error::Client)
    }

    /// Namespace of the current kubeconfig context, `default` when the context sets none.
    ///
    /// Loader errors are returned as they are, without logging.
    pub fn default_namespace(&self) -> Result<String> {
        match self.load_kubeconfig().map_err(Error::Kubeconfig)? {
            Some(kubeconfig) => context_namespace(&kubeconfig).map_err(Error::Kubeconfig),
            None => Ok(self.in_cluster_namespace().unwrap_or_else(|| String::from(DEFAULT_NAMESPACE))),
        }
    }

    async fn discover_client_config(&self) -> std::result::Result<kube::Config, BoxError> {
        let mut in_cluster_err: Option<BoxError> = None;
        // Only this gate goes through the env provider, `Config::incluster` reads the process environment.
        if self.env.non_empty_var(SERVICE_HOST_ENV_VAR).is_some() {
            match kube::Config::incluster() {
                Ok(config) => return Ok(config),
                Err(err) => {
                    log::debug!("In-cluster config unavailable - {err}");
                    in_cluster_err = Some(Box::new(err));
                }
            }
        }

        match self.load_kubeconfig()? {
            Some(kubeconfig) => {
                let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
                Ok(config)
            }
            None => Err(in_cluster_err.unwrap_or_else(|| "no in-cluster environment and no kubeconfig file found".into())),
        }
    }

    /// Reads and merges every existing kubeconfig file, `None` if there is none.
    fn load_kubeconfig(&self) -> std::result::Result<Option<Kubeconfig>, KubeconfigError> {
        let mut merged: Option<Kubeconfig> = None;
        for path in self.kubeconfig_paths().into_iter().filter(|p| p.is_file()) {
            let next = Kubeconfig::read_from(&path)?;
            merged = Some(match merged {
                Some(current) => current.merge(next)?,
                None => next,
            });
        }
        Ok(merged)
    }

    fn kubeconfig_paths(&self) -> Vec<PathBuf> {
        match self.env.non_empty_var(KUBECONFIG_ENV_VAR) {
            Some(list) => std::env::split_paths(&OsString::from(list))
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => self.env.non_empty_var("HOME")
                .map(|home| Path::new(&home).join(".kube").join("config"))
                .into_iter()
                .collect(),
        }
    }

    fn in_cluster_namespace(&self) -> Option<String> {
        fs::read_to_string(&self.namespace_file)
            .ok()
            .map(|ns| String::from(ns.trim()))
            .filter(|ns| !ns.is_empty())
    }
}

fn context_namespace(kubeconfig: &Kubeconfig) -> std::result::Result<String, KubeconfigError> {
    let Some(current) = kubeconfig.current_context.as_deref().filter(|c| !c.is_empty()) else {
        return Ok(String::from(DEFAULT_NAMESPACE));
    };
    let context = kubeconfig.contexts.iter()
        .find(|named| named.name == current)
        .ok_or_else(|| KubeconfigError::LoadContext(String::from(current)))?;

    Ok(context.context.as_ref()
        .and_then(|ctx| ctx.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_NAMESPACE)))
}
