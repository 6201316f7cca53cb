//! Integration tests for the pixfx crates.
//!
//! End-to-end checks across the core buffers, the engines and the job
//! runner: pinned scenarios, SHA-256 golden digests and job files on disk.

#[cfg(test)]
mod golden;
