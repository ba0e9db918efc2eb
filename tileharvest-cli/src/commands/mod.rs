//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path, show)
//! - [`download`] - Download a region's tiles with live progress
//! - [`regions`] - List known regions
//! - [`stats`] - Tile store statistics
//! - [`tiles`] - Tile counts per zoom level (dry run)

pub mod config;
pub mod download;
pub mod regions;
pub mod stats;
pub mod tiles;
