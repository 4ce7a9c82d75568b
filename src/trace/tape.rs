use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::trace::{Trace, TraceItem};

pub const TRACE_TAPE_SCHEMA_VERSION: u32 = 1;

/// Error reading or writing a trace fixture.
#[derive(Debug, thiserror::Error)]
pub enum TapeError {
    #[error("tape I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tape JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed tape: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TapeLine<E, C, S> {
    Header { schema_version: u32 },
    Item { item: TraceItem<E, C, S> },
}

/// Write a trace as JSONL: a header line, then one line per top-level item.
///
/// This is a fixture format for tests, not a stable storage contract.
pub fn write_trace<E, C, S>(path: &Path, trace: &[TraceItem<E, C, S>]) -> Result<(), TapeError>
where
    E: Serialize + Clone,
    C: Serialize + Clone,
    S: Serialize + Clone,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let header: TapeLine<E, C, S> = TapeLine::Header {
        schema_version: TRACE_TAPE_SCHEMA_VERSION,
    };
    writeln!(writer, "{}", serde_json::to_string(&header)?)?;
    for item in trace {
        let line = TapeLine::Item { item: item.clone() };
        writeln!(writer, "{}", serde_json::to_string(&line)?)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a trace written by [`write_trace`]. The header must be the first
/// non-empty line.
pub fn read_trace<E, C, S>(path: &Path) -> Result<Trace<E, C, S>, TapeError>
where
    E: DeserializeOwned,
    C: DeserializeOwned,
    S: DeserializeOwned,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut saw_header = false;
    let mut items = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: TapeLine<E, C, S> = serde_json::from_str(&line)?;
        match parsed {
            TapeLine::Header { .. } => {
                if saw_header || !items.is_empty() {
                    return Err(TapeError::Malformed(
                        "tape header must be the first line".to_string(),
                    ));
                }
                saw_header = true;
            }
            TapeLine::Item { item } => {
                if !saw_header {
                    return Err(TapeError::Malformed("missing tape header".to_string()));
                }
                items.push(item);
            }
        }
    }

    if !saw_header {
        return Err(TapeError::Malformed("missing tape header".to_string()));
    }
    Ok(items)
}
