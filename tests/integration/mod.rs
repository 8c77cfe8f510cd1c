//! Integration test suite for quill-contract
//!
//! End-to-end tests exercising the public API against real files and real
//! Git repositories created on the fly. Everything here runs offline: Git
//! fixtures are local repositories cloned by path, and the one test that
//! reaches for the network points at an unroutable address on purpose.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by functionality area:
//! - **cache_maintenance**: Cache root creation and stale lock sweeping
//! - **contract_flow**: Descriptor load / update-hashes / save lifecycle
//! - **file_resolution**: Absolute and relative file reference resolution
//! - **git_repos**: Repository operations against local upstream fixtures

// Shared helpers for building contract directories on disk
mod support;

// Integration tests
mod cache_maintenance;
mod contract_flow;
mod file_resolution;
mod git_repos;
