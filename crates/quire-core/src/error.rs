use thiserror::Error;

/// Local state transitions that the client refuses to perform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The action is reserved to the document owner, or ownership is still unknown
    #[error("only the document owner can do this")]
    NotOwner,
    /// No document has been loaded yet
    #[error("no document is loaded")]
    NoDocument,
    /// A confirmation was requested but nothing was staged
    #[error("nothing is awaiting confirmation")]
    NothingPending,
}
