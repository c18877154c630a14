//! GitHub release download and tarball extraction
//!
//! This module handles discovering the latest agent release, downloading the
//! platform tarball, and extracting the agent binary.
//!
//! ## Module Organization
//!
//! - `platform` - Architecture detection and release asset naming
//! - `github` - GitHub API interaction for release discovery
//! - `extract` - Tarball extraction and binary lookup
//! - `core` - Streaming download with progress reporting

pub mod core;
pub mod extract;
pub mod github;
pub mod platform;
