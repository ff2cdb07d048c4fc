//! Plan execution
//!
//! Runs an ordered operation list sequentially against the transport and
//! the local filesystem. One file failing never aborts the rest; every
//! attempted operation gets a report and the caller derives the exit
//! status from the aggregate.

use crate::error::IglooError;
use crate::fs::FileSystem;
use crate::planner::{ConflictPolicy, Direction, TransferOperation};
use crate::stream::StreamSource;
use crate::transport::Transport;

/// Outcome of a single operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Bytes copied to the destination
    Transferred,
    /// Destination existed and overwrite was not requested
    Skipped,
    /// Pulled and the remote source removed (move semantics)
    Deleted,
    /// Transfer did not happen
    Failed(String),
}

/// Per-file result handed back to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationReport {
    /// Destination-side name, what the user sees in the status line
    pub file: String,
    pub status: OperationStatus,
    /// Remote cleanup failed after a successful pull; the local copy is
    /// intact, so this is reported separately instead of as `Failed`
    pub cleanup_error: Option<String>,
}

impl OperationReport {
    pub fn failed(&self) -> bool {
        matches!(self.status, OperationStatus::Failed(_))
    }
}

/// Whether any operation in a report set failed (drives the exit code)
pub fn any_failed(reports: &[OperationReport]) -> bool {
    reports.iter().any(|r| r.failed() || r.cleanup_error.is_some())
}

/// Sequential executor over the transport and filesystem collaborators
pub struct TransferExecutor<'a> {
    transport: &'a dyn Transport,
    fs: &'a dyn FileSystem,
}

impl<'a> TransferExecutor<'a> {
    pub fn new(transport: &'a dyn Transport, fs: &'a dyn FileSystem) -> Self {
        Self { transport, fs }
    }

    /// Run every operation in order, collecting one report per file
    ///
    /// `stream` backs the push operation whose remote name matches the
    /// captured stdin source, if any.
    pub fn execute(
        &self,
        operations: &[TransferOperation],
        stream: Option<&StreamSource>,
    ) -> Vec<OperationReport> {
        operations
            .iter()
            .map(|op| self.run_one(op, stream))
            .collect()
    }

    fn run_one(
        &self,
        op: &TransferOperation,
        stream: Option<&StreamSource>,
    ) -> OperationReport {
        match op.direction {
            Direction::Push => self.run_push(op, stream),
            Direction::Pull => self.run_pull(op),
        }
    }

    fn run_push(
        &self,
        op: &TransferOperation,
        stream: Option<&StreamSource>,
    ) -> OperationReport {
        let file = op.remote_name.clone();

        if op.on_conflict == ConflictPolicy::Skip && self.transport.exists(&op.remote_name) {
            return report(file, OperationStatus::Skipped);
        }

        let streamed = stream.filter(|s| s.name == op.remote_name);
        let bytes = match streamed {
            Some(source) => source.bytes.clone(),
            None => match self.fs.read_bytes(&op.local_path) {
                Ok(bytes) => bytes,
                Err(err) => return report(file, OperationStatus::Failed(err.to_string())),
            },
        };

        match self.transport.push(&bytes, &op.remote_name) {
            Ok(()) => report(file, OperationStatus::Transferred),
            Err(err) => report(file, OperationStatus::Failed(failure_message(err))),
        }
    }

    fn run_pull(&self, op: &TransferOperation) -> OperationReport {
        let file = op.local_path.display().to_string();

        if op.on_conflict == ConflictPolicy::Skip && self.fs.exists(&op.local_path) {
            return report(file, OperationStatus::Skipped);
        }

        let bytes = match self.transport.pull(&op.remote_name) {
            Ok(bytes) => bytes,
            Err(err) => return report(file, OperationStatus::Failed(failure_message(err))),
        };
        if let Err(err) = self.fs.write_bytes(&op.local_path, &bytes) {
            return report(file, OperationStatus::Failed(err.to_string()));
        }

        // Delete only after the local copy is confirmed written. A failed
        // cleanup still counts as a successful transfer.
        if op.delete_source_after {
            return match self.transport.delete(&op.remote_name) {
                Ok(()) => report(file, OperationStatus::Deleted),
                Err(err) => OperationReport {
                    file,
                    status: OperationStatus::Transferred,
                    cleanup_error: Some(failure_message(err)),
                },
            };
        }

        report(file, OperationStatus::Transferred)
    }
}

fn report(file: String, status: OperationStatus) -> OperationReport {
    OperationReport {
        file,
        status,
        cleanup_error: None,
    }
}

fn failure_message(err: IglooError) -> String {
    match err {
        IglooError::Transport { message, .. } => message,
        other => other.to_string(),
    }
}
