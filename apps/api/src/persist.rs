#![allow(dead_code)]

//! Interview record persistence: one JSON file per completed interview,
//! keyed by timestamp, written once.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::conversation::ConversationTurn;
use crate::models::project::ProjectContext;

/// The persisted shape of a completed interview.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewRecord {
    pub project_info: ProjectContext,
    pub conversation_history: Vec<ConversationTurn>,
    pub analysis: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResultsStore {
    dir: PathBuf,
}

impl ResultsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes the record to `<dir>/interview_<YYYYmmdd_HHMMSS>.json` and
    /// returns the path. Creates the directory on first use.
    pub async fn write_record(&self, record: &InterviewRecord) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating results directory {:?}", self.dir))?;

        let filename = format!(
            "interview_{}.json",
            record.completed_at.format("%Y%m%d_%H%M%S")
        );
        let path = self.dir.join(filename);

        let json = serde_json::to_vec_pretty(record).context("serializing interview record")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("writing interview record to {path:?}"))?;

        info!("Interview record written to {}", path.display());
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
