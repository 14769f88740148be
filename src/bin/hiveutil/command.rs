use std::future::Future;

use serde::Serialize;
use serde_json::json;

use hiveutil::service::pull_secret_service::PullSecretSource;

use crate::args::OutFormat;

pub async fn execute_command<Cmd, FutRes, Res>(out_format: OutFormat, command: Cmd) -> bool
where
    Cmd: FnOnce() -> FutRes,
    FutRes: Future<Output = anyhow::Result<Res>>,
    Res: Printable,
{
    match (command().await, out_format) {
        (Ok(result), fmt) => {
            result.print(fmt);
            true
        }
        (Err(error), OutFormat::Plain) => {
            eprintln!("Error during command execution - {error:#}");
            false
        }
        (Err(error), OutFormat::Json) => {
            eprintln!("{}", json!({ "out": "error", "message": format!("{error:#}") }));
            false
        }
    }
}

pub trait Printable {
    fn print(&self, format: OutFormat);
}

impl<T> Printable for T
where
    T: PrintFormat<JsonFormat> + PrintFormat<PlainFormat>,
{
    fn print(&self, format: OutFormat) {
        match format {
            OutFormat::Plain => PrintFormat::<PlainFormat>::print(self),
            OutFormat::Json => PrintFormat::<JsonFormat>::print(self),
        }
    }
}

pub struct JsonFormat;
pub struct PlainFormat;
pub trait PrintFormat<F> {
    fn print(&self);
}

impl<S> PrintFormat<JsonFormat> for S
where
    S: Serialize,
{
    fn print(&self) {
        match serde_json::to_string(self) {
            Ok(serialized) => println!("{serialized}"),
            Err(err) => eprintln!("Error serializing result in json format - {err}"),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PullSecretOutcome {
    pub source: Option<PullSecretSource>,
    pub length: usize,
}

impl PrintFormat<PlainFormat> for PullSecretOutcome {
    fn print(&self) {
        match self.source {
            Some(source) => println!("Pull secret resolved from {source:?} ({} bytes)", self.length),
            None => println!("No pull secret configured"),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseImageOutcome {
    pub pull_spec: String,
}

impl PrintFormat<PlainFormat> for ReleaseImageOutcome {
    fn print(&self) {
        println!("{}", self.pull_spec);
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ContextOutcome {
    pub cluster_url: String,
    pub default_namespace: String,
}

impl PrintFormat<PlainFormat> for ContextOutcome {
    fn print(&self) {
        println!("{0: <12} | {1}", "SERVER", self.cluster_url);
        println!("{0: <12} | {1}", "NAMESPACE", self.default_namespace);
    }
}
