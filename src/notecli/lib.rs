//! # notecli Architecture
//!
//! notecli is a command-line client for a remote note service. The library holds
//! everything except the terminal: the CLI in `cli/` is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - NoteApi (store + service) and UserApi (store only)       │
//! │  - Normalizes inputs (selectors, notebook names)            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, including the edit orchestrator          │
//! │  - Returns CmdResult values, never prints                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collaborators                                              │
//! │  - store/: LocalStore (FileStore, InMemoryStore)            │
//! │  - service/: NoteService (FileService, InMemoryService)     │
//! │  - codec.rs, editor.rs                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Indexes, not GUIDs
//!
//! Users never type service identifiers. Every listing (`note list`,
//! `notebook list`) is saved as an [`index::IndexTable`] and later commands
//! resolve the numbers against it. Destructive batches go through
//! [`batch::remove_in_order`] so that removing entry 1 does not change what
//! "3" meant.
//!
//! ## Edits never lose content
//!
//! Before the editor starts, the buffer is written to a recovery checkpoint
//! ([`checkpoint`]). It is cleared only after the service confirmed the save.
//! Anything that goes wrong in between can be resumed with
//! `notecli note edit --recover`.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facades, entry point for all operations
//! - [`commands`]: Business logic for each command
//! - [`store`]: Local persistence (listings, credentials, settings, checkpoint)
//! - [`service`]: The remote note service abstraction
//! - [`checkpoint`]: Recovery checkpoint manager
//! - [`credentials`]: Credential registry
//! - [`index`]: Listing index tables and selectors
//! - [`batch`]: Shift-safe batch removal
//! - [`codec`]: ENML to Markdown conversion
//! - [`editor`]: External editor integration
//! - [`config`], [`init`]: Configuration and path resolution
//! - [`error`], [`model`]: Error and data types
//! - `cli`: Argument parsing and printing for the binary (not part of the lib API)

pub mod api;
pub mod batch;
pub mod checkpoint;
pub mod codec;
pub mod commands;
pub mod config;
pub mod credentials;
pub mod editor;
pub mod error;
pub mod index;
pub mod init;
pub mod model;
pub mod service;
pub mod store;
