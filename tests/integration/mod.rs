//! Integration tests for stage ordering, optimistic mutations and progress
//!
//! These drive the public API end to end: mutation sequences against the
//! in-memory and file-backed services, rollback and conflict recovery, and
//! the `stagehand` binary itself.

pub mod cli_flow;
pub mod density;
pub mod file_service;
pub mod helpers;
pub mod rollback;
