use std::fmt::{self, Write as _};
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local, SecondsFormat};
use log::kv::{self, VisitSource};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::core::env::{EnvProvider, ProcessEnv, ADDITIONAL_LOG_FIELDS_ENV_VAR};
use crate::core::error::{Error, Result};
use crate::service::log_fields::{FieldParser, JsonFieldParser, LogFieldSet};

/// Severity, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }

    /// `log` has no level above error, fatal and panic filter like error.
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => LevelFilter::Error,
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let level = match s.to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "fatal" => LogLevel::Fatal,
            "panic" => LogLevel::Panic,
            _ => return Err(Error::InvalidLogLevel { level: String::from(s) }),
        };
        Ok(level)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    pub level: log::Level,
    pub target: String,
    pub message: String,
    pub fields: LogFieldSet,
}

/// Write target for formatted entries.
pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry);

    fn flush(&self) {}
}

/// Human readable text on standard output, one entry per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write(&self, entry: &LogEntry) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", format_entry(entry));
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

/// Keeps entries in memory, clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry.clone());
    }
}

/// `time="2006-01-02T15:04:05+07:00" level=info msg="..." key=value ...`
pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = String::new();
    let time = entry.time.to_rfc3339_opts(SecondsFormat::Secs, false);
    let _ = write!(line, "time={:?} level={}", time, entry.level.as_str().to_ascii_lowercase());
    append_field(&mut line, "msg", &entry.message);
    for (key, value) in &entry.fields {
        append_field(&mut line, key, value);
    }
    line
}

fn append_field(line: &mut String, key: &str, value: &str) {
    if needs_quoting(value) {
        let _ = write!(line, " {key}={value:?}");
    } else {
        let _ = write!(line, " {key}={value}");
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || "-._/@^+:".contains(c))
}

struct FieldCollector<'a>(&'a mut LogFieldSet);

impl<'kvs> VisitSource<'kvs> for FieldCollector<'_> {
    fn visit_pair(&mut self, key: kv::Key<'kvs>, value: kv::Value<'kvs>) -> std::result::Result<(), kv::Error> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Leveled logger decorating every entry with a fixed set of fields.
pub struct Logger {
    level: LogLevel,
    fields: LogFieldSet,
    sink: Box<dyn LogSink>,
}

impl Logger {
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn fields(&self) -> &LogFieldSet {
        &self.fields
    }

    /// Makes this logger the target of the `log` macros for the rest of the process.
    pub fn install(self) -> std::result::Result<(), SetLoggerError> {
        let filter = self.level.level_filter();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(filter);
        Ok(())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.level_filter()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut fields = self.fields.clone();
        let _ = record.key_values().visit(&mut FieldCollector(&mut fields));

        self.sink.write(&LogEntry {
            time: Local::now(),
            level: record.level(),
            target: String::from(record.target()),
            message: record.args().to_string(),
            fields,
        });
    }

    fn flush(&self) {
        self.sink.flush()
    }
}

pub struct LoggerBuilder<E> {
    env: E,
    parser: Box<dyn FieldParser>,
}

impl<E: EnvProvider> LoggerBuilder<E> {
    pub fn new(env: E) -> Self {
        Self {
            env,
            parser: Box::new(JsonFieldParser),
        }
    }

    pub fn with_field_parser(mut self, parser: impl FieldParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    /// Builds a logger writing text to standard output.
    pub fn build(&self, level_name: &str) -> Result<Logger> {
        self.build_with_sink(level_name, StdoutSink)
    }

    pub fn build_with_sink(&self, level_name: &str, sink: impl LogSink + 'static) -> Result<Logger> {
        let level = level_name.parse::<LogLevel>().map_err(|err| {
            log::error!("Cannot parse log level - {err}");
            err
        })?;

        Ok(Logger {
            level,
            fields: self.additional_fields(),
            sink: Box::new(sink),
        })
    }

    fn additional_fields(&self) -> LogFieldSet {
        let Some(blob) = self.env.non_empty_var(ADDITIONAL_LOG_FIELDS_ENV_VAR) else {
            return LogFieldSet::new();
        };
        self.parser.parse(&blob).unwrap_or_else(|err| {
            log::warn!("Ignoring malformed {ADDITIONAL_LOG_FIELDS_ENV_VAR} - {err}");
            LogFieldSet::new()
        })
    }
}

/// Builds a stdout logger from the process environment.
pub fn new_logger(level_name: &str) -> Result<Logger> {
    LoggerBuilder::new(ProcessEnv).build(level_name)
}
