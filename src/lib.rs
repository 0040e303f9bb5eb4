//! Bounding-box scale tool for a level editor
//!
//! The user grabs a face, edge or corner handle of the selection's bounding
//! box with a pick ray and drags it to rescale the selection. Every drag is
//! one undoable document transaction.
//!
//! # Module Organization
//!
//! - `geometry` - Vectors, rays, boxes and the picking camera
//! - `document` - The document contract, grid, notifications and an in-memory document
//! - `tool` - Handle catalog, picking, drag projection and the tool state machine
//! - `config` - User preferences (RON)
//! - `replay` - Scripted interaction scenarios
//! - `error` - Tool errors

pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod replay;
pub mod tool;

pub use error::{ToolError, ToolResult};
