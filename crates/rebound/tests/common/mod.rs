//! Shared helpers for rebound integration tests.

#![allow(dead_code)]

pub mod mock_timer;
