#![forbid(unsafe_code)]
//! egonav-core library.
//!
//! Keeps a large knowledge graph legible by showing one node's capped
//! neighborhood at a time and recording the path taken through it.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`], each with a stable code.
//! - **Logging**: Use `tracing` macros (`debug!`, `trace!`); the binary installs the subscriber.
//! - **Time**: the engine never reads a clock. Callers pass `now` to
//!   [`explorer::Explorer::tick`].

pub mod config;
pub mod connections;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod focus;
pub mod index;
pub mod input;
pub mod label;
pub mod layout;
pub mod model;
pub mod palette;
pub mod region;
pub mod scene;
pub mod session;
pub mod trail;
pub mod viewport;

pub use config::ExplorerConfig;
pub use dataset::Dataset;
pub use explorer::Explorer;
pub use focus::FocusState;
pub use index::GraphIndex;
pub use input::{Input, Key, Target};
pub use layout::{LayoutSource, StaticLayout};
pub use model::{Edge, Node, Point};
