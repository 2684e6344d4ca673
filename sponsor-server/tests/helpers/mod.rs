//! Test Helper Utilities
//!
//! Shared utilities for testing sponsor-server

#![allow(dead_code, unused_imports)]

pub mod db_utils;
pub mod documents;
pub mod memory_store;
pub mod resume_server;
pub mod ticker;

pub use db_utils::{create_test_db, participant_rows};
pub use documents::{oid, resume_doc, user_doc};
pub use memory_store::MemoryDocumentStore;
pub use resume_server::spawn_resume_server;
pub use ticker::{wait_for_cycle, wait_for_state, ChannelTicker, TickSender};
