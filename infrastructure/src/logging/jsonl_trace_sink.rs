//! JSONL file writer for decision traces and debate transcripts.
//!
//! Each [`TraceRecord`] is serialized as a single JSON line with `type`,
//! `timestamp` and `task_id` fields plus the record payload under `data`,
//! appended to `<dir>/<task_id>.jsonl`.

use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tandem_application::{TraceRecord, TraceSink};
use tandem_domain::TaskId;
use tracing::warn;

/// Trace sink writing one JSONL file per task.
///
/// Appends are serialised through a `Mutex`, so records of concurrent
/// tasks never interleave within a line.
pub struct JsonlTraceSink {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlTraceSink {
    /// Create a sink under `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the records of `task_id`
    pub fn path_for(&self, task_id: &TaskId) -> PathBuf {
        self.dir.join(format!("{}.jsonl", task_id))
    }

    fn payload(record: &TraceRecord) -> Result<Value, serde_json::Error> {
        match record {
            TraceRecord::Decisions(trace) => serde_json::to_value(trace),
            TraceRecord::Debate(transcript) => serde_json::to_value(transcript),
            TraceRecord::Outcome {
                outcome,
                approved,
                iterations,
            } => Ok(json!({
                "outcome": outcome,
                "approved": approved,
                "iterations": iterations,
            })),
        }
    }

    fn write_line(&self, path: &Path, line: &str) -> io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", line)?;
        file.flush()
    }
}

impl TraceSink for JsonlTraceSink {
    fn append(&self, task_id: &TaskId, record: TraceRecord) {
        let data = match Self::payload(&record) {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not serialize {} for {}: {}", record.kind(), task_id, e);
                return;
            }
        };

        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let line = json!({
            "type": record.kind(),
            "timestamp": timestamp,
            "task_id": task_id.as_str(),
            "data": data,
        })
        .to_string();

        let path = self.path_for(task_id);
        if let Err(e) = self.write_line(&path, &line) {
            warn!("Could not write trace record to {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_domain::{DecisionTrace, TraceEvent, WorkflowOutcome};

    fn read_lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_records_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlTraceSink::new(dir.path().join("transcripts")).unwrap();
        let task_id = TaskId::new("task-1");

        let mut trace = DecisionTrace::new(task_id.clone());
        trace.record(TraceEvent::RefinementRequested { iteration: 1 });
        sink.append(&task_id, TraceRecord::Decisions(trace));
        sink.append(
            &task_id,
            TraceRecord::Outcome {
                outcome: WorkflowOutcome::Accepted,
                approved: true,
                iterations: 2,
            },
        );

        let lines = read_lines(&sink.path_for(&task_id));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "decision_trace");
        assert_eq!(lines[0]["task_id"], "task-1");
        assert!(lines[0]["timestamp"].is_string());
        assert_eq!(lines[1]["type"], "outcome");
        assert_eq!(lines[1]["data"]["iterations"], 2);
        assert_eq!(lines[1]["data"]["approved"], true);
    }

    #[test]
    fn test_tasks_get_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlTraceSink::new(dir.path()).unwrap();
        let outcome = || TraceRecord::Outcome {
            outcome: WorkflowOutcome::Exhausted,
            approved: false,
            iterations: 3,
        };

        sink.append(&TaskId::new("a"), outcome());
        sink.append(&TaskId::new("b"), outcome());

        assert_eq!(read_lines(&dir.path().join("a.jsonl")).len(), 1);
        assert_eq!(read_lines(&dir.path().join("b.jsonl")).len(), 1);
    }
}
