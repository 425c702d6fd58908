//! Wire format: one JSON object per line in each direction.
//!
//! A request names an operation with positional and keyword arguments plus
//! transport options. The reply is either one `unit` frame, or for a split
//! mapping/sequence result a `begin` frame, the `chunk` frames and an `end`
//! marker.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// How a result travels back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Send the computed result back
    pub return_result: bool,
    /// Send the serialized result back
    pub return_pickle: bool,
    /// Persist the serialized result here
    pub save_pickle: Option<PathBuf>,
    /// Number of chunks to split a container result into; 0 sends one unit
    pub split_results: usize,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            return_result: true,
            return_pickle: false,
            save_pickle: None,
            split_results: 0,
        }
    }
}

impl TransportOptions {
    pub fn sends_back(&self) -> bool {
        self.return_result || self.return_pickle
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    #[serde(default)]
    pub options: TransportOptions,
}

impl Request {
    pub fn new(op: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            args: Vec::new(),
            kwargs: Map::new(),
            options: TransportOptions::default(),
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.to_string(), value.into());
        self
    }

    pub fn options(mut self, options: TransportOptions) -> Self {
        self.options = options;
        self
    }

    /// String argument by position, falling back to keyword
    pub fn string_arg(&self, index: usize, name: &str) -> Option<&str> {
        self.args
            .get(index)
            .or_else(|| self.kwargs.get(name))
            .and_then(Value::as_str)
    }
}

/// Container type of a split result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Map,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "lowercase")]
pub enum Frame {
    /// Whole result, its serialized form, or just an acknowledgement
    Unit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        serialized: Option<String>,
    },
    Begin { container: ContainerKind },
    /// A slice of the container announced by the last `begin`
    Chunk { items: Value },
    End,
    /// The operation failed; the session is still usable
    Failed { op: String, message: String },
}

impl Frame {
    pub fn ack() -> Self {
        Frame::Unit {
            result: None,
            serialized: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Frame::Failed { .. })
    }
}

/// Read the next non-blank line; `None` at end of input
pub fn read_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            return Ok(Some(line));
        }
    }
}

/// Write one frame as a line
pub fn write_frame(writer: &mut impl Write, frame: &Frame) -> Result<(), crate::BridgeError> {
    serde_json::to_writer(&mut *writer, frame)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Chunk frames for a container result, or `None` for a scalar
pub fn split_frames(result: &Value, parts: usize) -> Option<Vec<Frame>> {
    let (container, chunks) = match result {
        Value::Object(map) => {
            let entries: Vec<(&String, &Value)> = map.iter().collect();
            let size = chunk_size(entries.len(), parts);
            let chunks = entries
                .chunks(size)
                .map(|chunk| {
                    let part: Map<String, Value> = chunk
                        .iter()
                        .map(|(k, v)| ((*k).clone(), (*v).clone()))
                        .collect();
                    Value::Object(part)
                })
                .collect::<Vec<_>>();
            (ContainerKind::Map, chunks)
        }
        Value::Array(items) => {
            let size = chunk_size(items.len(), parts);
            let chunks = items
                .chunks(size)
                .map(|chunk| Value::Array(chunk.to_vec()))
                .collect::<Vec<_>>();
            (ContainerKind::List, chunks)
        }
        _ => return None,
    };

    let mut frames = Vec::with_capacity(chunks.len() + 2);
    frames.push(Frame::Begin { container });
    frames.extend(chunks.into_iter().map(|items| Frame::Chunk { items }));
    frames.push(Frame::End);
    Some(frames)
}

fn chunk_size(len: usize, parts: usize) -> usize {
    (len / parts.max(1)).max(1)
}
