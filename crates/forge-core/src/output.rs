//! Structured output records.
//!
//! The core only produces [`Record`] values; a [`RecordSink`] decides how
//! they are rendered. [`JsonSink`] writes each record as pretty-printed JSON
//! with a four-space indent.

use std::{
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{
    remote::{Identity, RateBucket},
    token::Token,
};

/// Token paired with the identity its credentials resolve to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentityRecord {
    /// Token used for the lookup (`None` for unauthenticated probes).
    pub token: Option<Token>,
    /// Identity, or `None` when the lookup failed.
    pub info: Option<Identity>,
}

/// One structured output value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// Token attributes.
    Token(Token),
    /// Quota snapshot.
    Quota(RateBucket),
    /// Identity lookup result.
    Identity(IdentityRecord),
}

/// Consumer of output records.
pub trait RecordSink: Send + Sync {
    /// Renders one record. Rendering failures are the sink's to report.
    fn emit(&self, record: &Record);
}

/// Writes records as indented JSON, one document per record.
#[derive(Debug)]
pub struct JsonSink<W> {
    writer: Mutex<W>,
}

impl JsonSink<io::Stdout> {
    /// A sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serializes one value followed by a newline.
    pub fn write_value<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let rendered = to_pretty_json(value)?;
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&rendered)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

impl<W: Write + Send> RecordSink for JsonSink<W> {
    fn emit(&self, record: &Record) {
        if let Err(e) = self.write_value(record) {
            tracing::error!("failed writing record: {}", e);
        }
    }
}

/// Renders a value as JSON with a four-space indent.
pub fn to_pretty_json<T: Serialize>(value: &T) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer).map_err(io::Error::from)?;
    Ok(buffer)
}
