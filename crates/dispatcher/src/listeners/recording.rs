//! RecordingListener - writes subscribed messages to a JSONL recording

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{ListeningType, MessageListener, OutputMessage, PointResult, StreamError};
use serde::Serialize;
use tracing::{error, info, warn};

/// Record written to the JSONL stream.
///
/// Carries the same `kind` tag as the stream message envelope, so a
/// finished recording replays without conversion.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Output(&'a OutputMessage),
    PointResult(&'a PointResult),
}

/// Session counters written next to the recording on shutdown
#[derive(Debug, Default, Clone, Serialize)]
pub struct RecordingMeta {
    /// Messages written to the recording
    pub messages: u64,
    /// Of which output messages
    pub output_messages: u64,
    /// Of which point results
    pub point_results: u64,
    /// Faults observed (not written to the stream)
    pub faults: u64,
}

/// Listener that persists every subscribed message as one JSON line.
///
/// Faults are counted in the session metadata but never written to the
/// message stream.
#[derive(Debug)]
pub struct RecordingListener {
    name: String,
    subscriptions: ListeningType,
    writer: BufWriter<File>,
    path: PathBuf,
    meta_path: PathBuf,
    meta: RecordingMeta,
}

impl RecordingListener {
    /// Create a new RecordingListener writing into `dir`
    pub fn new(
        name: impl Into<String>,
        subscriptions: ListeningType,
        dir: &Path,
    ) -> io::Result<Self> {
        let name = name.into();
        fs::create_dir_all(dir)?;

        let path = dir.join("messages.jsonl");
        let meta_path = dir.join("meta.json");
        let writer = BufWriter::new(File::create(&path)?);

        info!(listener = %name, path = %path.display(), "recording started");

        Ok(Self {
            name,
            subscriptions,
            writer,
            path,
            meta_path,
            meta: RecordingMeta::default(),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        subscriptions: ListeningType,
        params: &HashMap<String, String>,
    ) -> io::Result<Self> {
        let dir = params.get("dir").ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "missing required param 'dir'")
        })?;
        Self::new(name, subscriptions, Path::new(dir))
    }

    /// Path of the JSONL recording file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session counters so far
    pub fn meta(&self) -> &RecordingMeta {
        &self.meta
    }

    fn write_record(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")
    }
}

impl MessageListener for RecordingListener {
    fn subscriptions(&self) -> ListeningType {
        self.subscriptions
    }

    fn on_output_message(&mut self, message: &OutputMessage) {
        match self.write_record(&Record::Output(message)) {
            Ok(()) => {
                self.meta.messages += 1;
                self.meta.output_messages += 1;
            }
            Err(e) => {
                error!(listener = %self.name, error = %e, "recording write failed");
            }
        }
    }

    fn on_point_result(&mut self, result: &PointResult) {
        match self.write_record(&Record::PointResult(result)) {
            Ok(()) => {
                self.meta.messages += 1;
                self.meta.point_results += 1;
            }
            Err(e) => {
                error!(listener = %self.name, error = %e, "recording write failed");
            }
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        self.meta.faults += 1;
        warn!(
            listener = %self.name,
            kind = error.kind(),
            error = %error,
            "fault during recording"
        );
    }
}

impl Drop for RecordingListener {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!(listener = %self.name, error = %e, "recording flush failed");
        }

        let result = File::create(&self.meta_path)
            .and_then(|file| {
                serde_json::to_writer_pretty(file, &self.meta)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            });
        if let Err(e) = result {
            error!(listener = %self.name, error = %e, "meta write failed");
        }

        info!(
            listener = %self.name,
            messages = self.meta.messages,
            faults = self.meta.faults,
            "recording closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::StreamMessage;
    use tempfile::tempdir;

    #[test]
    fn test_recording_writes_replayable_lines() {
        let dir = tempdir().unwrap();

        let mut listener =
            RecordingListener::new("rec", ListeningType::all(), dir.path()).unwrap();
        listener.on_output_message(&OutputMessage {
            timestamp: 1.5,
            stream: None,
            event: None,
        });
        listener.on_point_result(&PointResult {
            timestamp: 2.5,
            clouds: vec![],
        });
        drop(listener);

        let content = fs::read_to_string(dir.path().join("messages.jsonl")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        // Every line parses back through the stream message envelope.
        let first: StreamMessage = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.category_label(), "output_message");
        let second: StreamMessage = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.category_label(), "point_result");
        assert_eq!(second.timestamp(), 2.5);

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("meta.json")).unwrap())
                .unwrap();
        assert_eq!(meta["messages"], 2);
        assert_eq!(meta["output_messages"], 1);
        assert_eq!(meta["point_results"], 1);
    }

    #[test]
    fn test_faults_counted_but_not_written() {
        let dir = tempdir().unwrap();

        let mut listener =
            RecordingListener::new("rec", ListeningType::all(), dir.path()).unwrap();
        listener.on_error(&StreamError::connection("gone"));
        drop(listener);

        let content = fs::read_to_string(dir.path().join("messages.jsonl")).unwrap();
        assert!(content.is_empty());

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("meta.json")).unwrap())
                .unwrap();
        assert_eq!(meta["messages"], 0);
        assert_eq!(meta["faults"], 1);
    }

    #[test]
    fn test_missing_dir_param_errors() {
        let params = HashMap::new();
        let result = RecordingListener::from_params("rec", ListeningType::all(), &params);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
