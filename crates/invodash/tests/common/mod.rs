//! Shared test utilities for invodash integration tests.
//!
//! This module provides:
//! - `MockBackend`: an axum stand-in for the invoice/incident REST backend
//! - `MockChannel`: a WebSocket server scripted from the test body
//! - small polling helpers for asynchronous assertions

#![allow(dead_code)]

pub mod backend;
pub mod channel;

pub use backend::MockBackend;
pub use channel::{Directive, MockChannel};

use std::time::Duration;

/// Polls `cond` until it holds or a 5 second deadline passes.
pub async fn wait_for<F: FnMut() -> bool>(mut cond: F, what: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !cond() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Writes a small spreadsheet-looking file into `dir` and returns its path.
pub fn sample_spreadsheet(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("invoices.xlsx");
    std::fs::write(&path, b"PK\x03\x04 not a real workbook").unwrap();
    path
}
