use std::io::Error as IoError;
use std::string::FromUtf8Error;
use thiserror::Error;

// --- Error Type ---
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO Error: {0}")]
    Io(#[from] IoError),
    #[error("UTF8 Error: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("Invalid Data: {0}")]
    InvalidData(String),
    #[error("Unsupported Block Type: {0}")]
    UnsupportedBlockType(String),
    #[error("Block {block} links to {link}, which is missing or of the wrong type")]
    DanglingLink { block: usize, link: usize },
    #[error("Scene contains no mesh")]
    NoMesh,
    #[error("Mesh on node '{0}' has no skin deformer")]
    NoSkin(String),
}

// Define a crate-wide Result type alias
pub type Result<T> = std::result::Result<T, ImportError>;
