use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

pub type EventPayload = Map<String, Value>;

/// Run log for one venue job, one compact JSON object per line.
///
/// Every event carries `type`, `run_id` and `ts`; payload keys are merged
/// last and win on collision. Clones share the file and its lock, so the
/// progress sink and the CLI can write from the same run.
#[derive(Debug, Clone)]
pub struct EventWriter {
    shared: Arc<RunLog>,
}

#[derive(Debug)]
struct RunLog {
    path: PathBuf,
    run_id: String,
    append: Mutex<()>,
}

impl EventWriter {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(RunLog {
                path: path.into(),
                run_id: run_id.into(),
                append: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    pub fn run_id(&self) -> &str {
        &self.shared.run_id
    }

    pub fn emit(&self, event_type: &str, payload: EventPayload) -> Result<Value> {
        let mut event = EventPayload::new();
        event.insert("type".into(), event_type.into());
        event.insert("run_id".into(), self.shared.run_id.as_str().into());
        event.insert(
            "ts".into(),
            Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false).into(),
        );
        event.extend(payload);

        let event = Value::Object(event);
        self.append_line(&serde_json::to_string(&event)?)?;
        Ok(event)
    }

    /// Records a transient pipeline status line as a `progress` event.
    pub fn emit_progress(&self, stage: &str, message: &str) -> Result<Value> {
        let mut payload = EventPayload::new();
        payload.insert("stage".into(), stage.into());
        payload.insert("message".into(), message.into());
        self.emit("progress", payload)
    }

    fn append_line(&self, line: &str) -> Result<()> {
        let path = &self.shared.path;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let _guard = self
            .shared
            .append
            .lock()
            .map_err(|_| anyhow!("run log lock poisoned"))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}
