//! CLI module for the notopia application
//!
//! This module handles the command-line interface for interacting with
//! the client: paste and folder commands, the offline buffer, and sync.

use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    content_preview, parse_tags, render_markdown, Commands, Config, NewPaste, NotopiaClient,
    NotopiaError, Paste, PasteFilter, PasteUpdate, Result, SortOrder, SyncOutcome,
};

/// CLI application handler - processes CLI commands through the client
pub struct App {
    /// The notopia client
    client: NotopiaClient,

    /// Application configuration
    config: Config,

    /// Where the configuration file lives
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given client and config
    pub fn new(
        client: NotopiaClient,
        config: Config,
        config_path: PathBuf,
        verbose: bool,
    ) -> Self {
        Self {
            client,
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                content,
                edit,
                tags,
                file,
                folder,
            } => {
                self.create_paste(title, content, file, tags, folder, edit)
                    .await?
            }

            Commands::View { slug, json, html } => self.view_paste(slug, json, html).await?,

            Commands::List {
                tag,
                folder,
                sort,
                limit,
                json,
            } => self.list_pastes(tag, folder, sort, limit, json).await?,

            Commands::Search { query, limit, json } => {
                self.search_pastes(query, limit, json).await?
            }

            Commands::Edit {
                id,
                title,
                content,
                edit,
                tags,
                folder,
            } => self.edit_paste(id, title, content, tags, folder, edit).await?,

            Commands::Delete { id, force } => self.delete_paste(id, force).await?,

            Commands::Pin { id } => {
                let pinned = self.client.toggle_pin(&id).await?;
                println!("Paste {} is now {}", id, if pinned { "pinned" } else { "unpinned" });
            }

            Commands::Folder {
                create,
                rename,
                name,
                delete,
                list,
            } => self.handle_folder(create, rename, name, delete, list).await?,

            Commands::Sync => self.run_sync().await?,

            Commands::Status => self.show_status().await?,

            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
        }

        Ok(())
    }

    async fn create_paste(
        &self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        tags: Option<String>,
        folder: Option<String>,
        use_editor: bool,
    ) -> Result<()> {
        let parsed_tags = parse_tags(tags);

        // Get content based on the provided options
        let paste_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(NotopiaError::FileNotFound {
                        file_path: file_path.display().to_string(),
                    });
                }
                read_to_string(file_path)?
            }
            (None, None) => {
                if use_editor {
                    self.open_editor_for_content(&title, "")?
                } else {
                    String::new()
                }
            }
        };

        let paste = self
            .client
            .create_paste(NewPaste {
                title,
                content: paste_content,
                tags: parsed_tags,
                folder_id: folder,
            })
            .await?;

        match &paste.id {
            Some(id) => {
                println!("Paste created with ID: {}", id);
                if let Some(slug) = &paste.slug {
                    println!("Share link: /pastes/{}", slug);
                }
            }
            None => {
                println!("Offline: paste buffered, it will sync on reconnect.");
                println!("Run `notopia sync` to flush it manually.");
            }
        }
        Ok(())
    }

    async fn view_paste(&self, slug: String, json: bool, html: bool) -> Result<()> {
        let paste = self.client.view_by_slug(&slug).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&paste)?);
            return Ok(());
        }
        if html {
            println!("{}", render_markdown(&paste.content));
            return Ok(());
        }

        println!("Title: {}", console::style(&paste.title).bold());
        if !paste.tags.is_empty() {
            let tags = paste
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ");
            println!("Tags: {}", console::style(tags).cyan());
        }
        println!("Created: {}", paste.created_at.format("%Y-%m-%d %H:%M"));
        println!("\n{}", paste.content);
        Ok(())
    }

    async fn list_pastes(
        &self,
        tag: Option<String>,
        folder: Option<String>,
        sort: String,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        let filter = PasteFilter {
            folder_id: folder,
            tags: tag.into_iter().collect(),
            query: None,
            sort: if sort == "oldest" {
                SortOrder::Oldest
            } else {
                SortOrder::Newest
            },
        };

        let mut pastes = self.client.list_pastes(&filter).await?;
        pastes.truncate(limit);
        self.display_pastes(&pastes, json)
    }

    async fn search_pastes(&self, query: String, limit: usize, json: bool) -> Result<()> {
        info!("Searching pastes for '{}'", query);
        let pastes = self.client.search_pastes(&query, limit).await?;
        self.display_pastes(&pastes, json)
    }

    async fn edit_paste(
        &self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
        folder: Option<String>,
        use_editor: bool,
    ) -> Result<()> {
        let content = match (content, use_editor) {
            (Some(c), _) => Some(c),
            (None, true) => {
                // Prefill the editor with the current content.
                let current = self.client.get_paste(&id).await?;
                Some(self.open_editor_for_content(&current.title, &current.content)?)
            }
            (None, false) => None,
        };

        let folder_id = folder.map(|f| if f == "none" { None } else { Some(f) });

        let updated = self
            .client
            .update_paste(
                &id,
                PasteUpdate {
                    title,
                    content,
                    tags: tags.map(|t| parse_tags(Some(t))),
                    folder_id,
                },
            )
            .await?;

        println!("Paste {} updated", id);
        if self.verbose {
            if let Some(slug) = &updated.slug {
                println!("Share link unchanged: /pastes/{}", slug);
            }
        }
        Ok(())
    }

    async fn delete_paste(&self, id: String, force: bool) -> Result<()> {
        if !force {
            print!("Delete paste {}? [y/N] ", id);
            stdout().flush()?;
            let mut answer = String::new();
            stdin().read_line(&mut answer)?;
            if !answer.trim().eq_ignore_ascii_case("y") {
                println!("Aborted.");
                return Ok(());
            }
        }

        self.client.delete_paste(&id).await?;
        println!("Paste {} deleted", id);
        Ok(())
    }

    async fn handle_folder(
        &self,
        create: Option<String>,
        rename: Option<String>,
        name: Option<String>,
        delete: Option<String>,
        list: bool,
    ) -> Result<()> {
        if let Some(folder_name) = create {
            let folder = self.client.create_folder(&folder_name).await?;
            println!(
                "Folder '{}' created with ID: {}",
                folder.name,
                folder.id.unwrap_or_default()
            );
        }

        if let Some(folder_id) = rename {
            let new_name = name.ok_or_else(|| NotopiaError::ApplicationError {
                message: "--rename requires --name".to_string(),
            })?;
            self.client.rename_folder(&folder_id, &new_name).await?;
            println!("Folder {} renamed to '{}'", folder_id, new_name);
        }

        if let Some(folder_id) = delete {
            self.client.delete_folder(&folder_id).await?;
            println!("Folder {} deleted (pastes inside keep their folder reference)", folder_id);
        }

        if list {
            let folders = self.client.list_folders().await?;
            if folders.is_empty() {
                println!("No folders yet.");
            }
            for folder in folders {
                println!(
                    "{} | {} | created {}",
                    folder.id.unwrap_or_default(),
                    console::style(&folder.name).bold(),
                    folder.created_at.format("%Y-%m-%d")
                );
            }
        }

        Ok(())
    }

    async fn run_sync(&self) -> Result<()> {
        // A manual sync implies we believe we are reachable again.
        self.client.monitor().set_online(true);

        match self.client.sync_now().await {
            Ok(SyncOutcome::Synced { id, slug }) => {
                println!("Offline paste synced as {} (share link /pastes/{})", id, slug);
            }
            Ok(SyncOutcome::NothingPending) => println!("Nothing to sync."),
            Ok(SyncOutcome::NoSession) => println!("Not signed in; buffered paste kept."),
            Ok(SyncOutcome::AlreadyInFlight) => println!("A sync is already running."),
            Err(e) => {
                // Non-fatal: the buffer is intact for the next attempt.
                println!("Sync failed ({}); the paste is kept for a later retry.", e);
            }
        }
        Ok(())
    }

    async fn show_status(&self) -> Result<()> {
        println!(
            "Connectivity: {}",
            if self.client.is_online() { "online" } else { "offline" }
        );

        match self.client.offline_buffer().load()? {
            Some(paste) => println!("Offline buffer: pending paste '{}'", paste.title),
            None => println!("Offline buffer: empty"),
        }

        if let Ok(pastes) = self.client.list_pastes(&PasteFilter::default()).await {
            println!("Pastes: {}", pastes.len());
        }
        if let Ok(folders) = self.client.list_folders().await {
            println!("Folders: {}", folders.len());
        }
        Ok(())
    }

    fn handle_config(&mut self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        if reset {
            self.config = Config::default();
            self.config.save(&self.config_path)?;
            println!("Configuration reset to defaults.");
        }

        if let Some(assignment) = set {
            self.config.set(&assignment)?;
            self.config.save(&self.config_path)?;
            println!("Configuration updated.");
        }

        if show {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
        }
        Ok(())
    }

    /// Display pastes in text or JSON format
    fn display_pastes(&self, pastes: &[Paste], json: bool) -> Result<()> {
        if pastes.is_empty() {
            println!("No pastes found matching the criteria.");
            return Ok(());
        }

        if json {
            println!("{}", serde_json::to_string_pretty(pastes)?);
            return Ok(());
        }

        // Use terminal width for separators if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, paste) in pastes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let created_at = paste.created_at.format("%Y-%m-%d %H:%M");
            println!(
                "ID: {} | Created: {}{}",
                paste.id.as_deref().unwrap_or("(unsynced)"),
                created_at,
                if paste.is_pinned { " | pinned" } else { "" }
            );
            println!("Title: {}", console::style(&paste.title).bold());

            if let Some(slug) = &paste.slug {
                println!("Link: /pastes/{}", slug);
            }

            if !paste.tags.is_empty() {
                let tags = paste
                    .tags
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("Tags: {}", console::style(tags).cyan());
            }

            if self.verbose {
                println!("\n{}", paste.content);
            } else {
                let preview = content_preview(&paste.content, 100);
                if !preview.is_empty() {
                    println!("\n{}", preview);
                }
            }
        }

        println!(
            "\nFound {} paste{}",
            pastes.len(),
            if pastes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn open_editor_for_content(&self, title: &str, existing: &str) -> Result<String> {
        // Create a temporary file with .md extension
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        let editor_cmd = self.config.get_editor_command();

        self.write_editor_template(&temp_path, title, existing)?;

        info!("Opening editor to write paste content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(self.process_editor_content(content))
    }

    fn write_editor_template(&self, path: &Path, title: &str, existing: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).open(path)?;

        if existing.is_empty() {
            writeln!(file, "<!-- ")?;
            writeln!(
                file,
                "Write the content for '{}' below. Markdown is supported.",
                title
            )?;
            writeln!(
                file,
                "Lines that start with <!-- and end with --> are comments and will be ignored."
            )?;
            writeln!(file, "Save and exit the editor when you're done.")?;
            writeln!(file, "-->")?;
            writeln!(file)?;
        } else {
            write!(file, "{}", existing)?;
        }

        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let path_str = file_path.to_string_lossy();

        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| NotopiaError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        if args.is_empty() {
            return Err(NotopiaError::EditorError {
                message: "Empty editor command".to_string(),
            });
        }

        let program = &args[0];
        let mut command = Command::new(program);
        if args.len() > 1 {
            command.args(&args[1..]);
        }
        command.arg(path_str.as_ref());

        let status = command.status()?;
        if !status.success() {
            return Err(NotopiaError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn process_editor_content(&self, content: String) -> String {
        // Remove HTML comments from content
        content
            .lines()
            .filter(|line| {
                !line.trim_start().starts_with("<!--") && !line.trim_end().ends_with("-->")
            })
            .collect::<Vec<&str>>()
            .join("\n")
    }
}
