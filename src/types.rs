//! Shared types for the notopia client.
//!
//! This module holds the crate-wide Result alias, the sync agent's
//! outcome/event types, list filtering options and the CLI command
//! definitions.

use clap::Subcommand;

use crate::NotopiaError;

/// A specialized Result type for notopia operations.
pub type Result<T> = std::result::Result<T, NotopiaError>;

/// Result of a single `SyncAgent::sync` attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The buffered paste was created remotely and the buffer cleared.
    Synced { id: String, slug: String },
    /// The offline buffer was empty; nothing to do.
    NothingPending,
    /// No session is available to stamp ownership; the buffer is kept.
    NoSession,
    /// Another sync attempt is already in flight; this call did nothing.
    AlreadyInFlight,
}

/// Notification broadcast to sync observers.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The buffered paste reached the remote store.
    Succeeded { slug: String },
    /// The remote create failed; the buffer is intact for a later retry.
    Failed { message: String },
}

/// Ordering applied to paste listings, after pinned-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Filters applied when listing pastes.
#[derive(Debug, Clone, Default)]
pub struct PasteFilter {
    /// Keep only pastes in this folder
    pub folder_id: Option<String>,
    /// Keep pastes carrying at least one of these tags
    pub tags: Vec<String>,
    /// Case-insensitive substring match against title or content
    pub query: Option<String>,
    /// Creation-date ordering
    pub sort: SortOrder,
}

/// Available subcommands for the notopia CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Create a new paste
    Create {
        /// Title of the paste
        #[clap(short = 'T', long)]
        title: String,

        /// Content of the paste, can be markdown formatted
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the paste (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Path to a file containing the paste's content
        #[clap(short, long)]
        file: Option<std::path::PathBuf>,

        /// Folder ID to file the paste under
        #[clap(short = 'F', long)]
        folder: Option<String>,
    },

    /// View a paste by its public slug (read-only)
    View {
        /// Slug of the paste to view
        slug: String,

        /// Format output as raw JSON
        #[clap(short, long)]
        json: bool,

        /// Render the markdown content as HTML
        #[clap(long)]
        html: bool,
    },

    /// List pastes with optional filtering
    List {
        /// Filter pastes by tag
        #[clap(short, long)]
        tag: Option<String>,

        /// Filter pastes by folder ID
        #[clap(short = 'F', long)]
        folder: Option<String>,

        /// Sort order: newest or oldest
        #[clap(short, long, value_parser = ["newest", "oldest"], default_value = "newest")]
        sort: String,

        /// Limit the number of pastes returned
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Search pastes by title or content
    Search {
        /// Search query text
        query: String,

        /// Limit the number of search results
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Edit an existing paste
    Edit {
        /// ID of the paste to edit
        id: String,

        /// New title for the paste
        #[clap(short = 'T', long)]
        title: Option<String>,

        /// New content for the paste
        #[clap(short, long)]
        content: Option<String>,

        /// Open content in editor before saving
        #[clap(short, long)]
        edit: bool,

        /// Tags to associate with the paste (comma-separated)
        #[clap(short = 't', long)]
        tags: Option<String>,

        /// Move the paste to this folder ID ("none" to unfile)
        #[clap(short = 'F', long)]
        folder: Option<String>,
    },

    /// Delete a paste by ID
    Delete {
        /// ID of the paste to delete
        id: String,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// Pin or unpin a paste
    Pin {
        /// ID of the paste to toggle
        id: String,
    },

    /// Folder operations (create, rename, delete, list)
    Folder {
        /// Create a folder with this name
        #[clap(short, long)]
        create: Option<String>,

        /// ID of the folder to rename (use with --name)
        #[clap(short, long)]
        rename: Option<String>,

        /// New name for the folder being renamed
        #[clap(short, long)]
        name: Option<String>,

        /// ID of the folder to delete
        #[clap(short, long)]
        delete: Option<String>,

        /// List all folders
        #[clap(short, long)]
        list: bool,
    },

    /// Flush the offline buffer to the remote store
    Sync,

    /// Show connectivity and offline-buffer status
    Status,

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },
}
