//! Stage tracking for a single query

use serde::Serialize;
use std::fmt;
use std::time::Instant;

/// Where a query is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStage {
    Received,
    Rewritten,
    Retrieved,
    Answered,
    HistoryAppended,
    RenderedAudio,
    Responded,
    Failed,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStage::Received => "received",
            QueryStage::Rewritten => "rewritten",
            QueryStage::Retrieved => "retrieved",
            QueryStage::Answered => "answered",
            QueryStage::HistoryAppended => "history_appended",
            QueryStage::RenderedAudio => "rendered_audio",
            QueryStage::Responded => "responded",
            QueryStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One recorded transition
#[derive(Debug, Clone, Serialize)]
pub struct StageEntry {
    pub stage: QueryStage,
    /// Milliseconds since the query was received
    pub elapsed_ms: u64,
}

/// Ordered record of the stages a query went through
#[derive(Debug, Clone, Serialize)]
pub struct QueryTrace {
    #[serde(skip)]
    started: Instant,
    entries: Vec<StageEntry>,
}

impl QueryTrace {
    /// Start a trace in `Received`
    pub fn start() -> Self {
        let mut trace = Self {
            started: Instant::now(),
            entries: Vec::with_capacity(7),
        };
        trace.advance(QueryStage::Received);
        trace
    }

    pub fn advance(&mut self, stage: QueryStage) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        tracing::debug!("query stage -> {} (+{}ms)", stage, elapsed_ms);
        self.entries.push(StageEntry { stage, elapsed_ms });
    }

    pub fn fail(&mut self) {
        self.advance(QueryStage::Failed);
    }

    /// Most recent stage
    pub fn current(&self) -> QueryStage {
        self.entries
            .last()
            .map(|e| e.stage)
            .unwrap_or(QueryStage::Received)
    }

    pub fn stages(&self) -> Vec<QueryStage> {
        self.entries.iter().map(|e| e.stage).collect()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
