use providers::ServerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("folder path is empty")]
    EmptyFolderPath,
    #[error("batch content is empty")]
    EmptyBatchContent,
    #[error("no image selected")]
    NoSelection,
    #[error(transparent)]
    Server(#[from] ServerError),
}
