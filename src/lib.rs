//! Startup configuration resolution for cluster provisioning.
//!
//! Resolves the pull secret, the release image, the kube client context and
//! builds the decorated logger a provisioning run starts from.

pub mod core;
pub mod dto;
pub mod service;

pub use crate::core::env::{EnvProvider, ProcessEnv};
pub use crate::core::error::{Error, Result};
