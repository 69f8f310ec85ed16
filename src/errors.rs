//! Error types for the notopia client.
//!
//! This module defines custom error types that categorize the failures
//! that can occur while working with pastes, folders, the offline buffer,
//! and the remote document store.

use std::io;

use thiserror::Error;

/// The main error type for the notopia client.
#[derive(Error, Debug)]
pub enum NotopiaError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No paste exists for the given slug or document ID.
    #[error("Paste not found: {id}")]
    PasteNotFound { id: String },

    /// No folder exists for the given document ID.
    #[error("Folder not found: {id}")]
    FolderNotFound { id: String },

    /// The current session does not own the targeted paste. Carries the
    /// document ID only, never the content.
    #[error("Unauthorized access to paste: {id}")]
    Unauthorized { id: String },

    /// No session is available for an operation that stamps ownership.
    #[error("Not signed in")]
    NotSignedIn,

    /// Invalid paste shape (empty title or content).
    #[error("Invalid paste: {message}")]
    InvalidPaste { message: String },

    /// Invalid folder shape (empty name).
    #[error("Invalid folder: {message}")]
    InvalidFolder { message: String },

    /// A call to the remote document store failed. Recoverable during
    /// sync: the offline buffer is left intact so a later reconnect can
    /// retry.
    #[error("Remote store error: {message}")]
    RemoteStore { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },

    /// for mutex lock acquisition issues
    #[error("{message}")]
    LockAcquisitionFailed { message: String },

    /// file not found
    #[error("File not found: {file_path}")]
    FileNotFound { file_path: String },

    #[error("{message}")]
    EditorError { message: String },
}
