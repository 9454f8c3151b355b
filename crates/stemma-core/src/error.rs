pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Edge or operation references an unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Node already participates in a spouse edge: {id}")]
    SpouseConflict { id: String },

    #[error("Node not found: {id}")]
    NodeNotFound { id: String },
}
