use thiserror::Error;

/// Errors surfaced by the history-retrieval path.
///
/// This is the only member of the timeline error taxonomy that reaches
/// the caller: unresolved annotation references are silently dropped,
/// an exhausted placement search is a normal insert-at-front signal,
/// and an overlapping history request is a silent no-op.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The protocol collaborator's request failed or timed out. The
    /// room's outstanding-request flag is cleared and no state is
    /// mutated.
    #[error("history fetch failed: {0}")]
    FetchFailed(String),
}
