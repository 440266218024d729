pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate node id in tree: {id}")]
    DuplicateNodeId { id: String },

    #[error("Unknown node id: {id}")]
    UnknownNode { id: String },
}
