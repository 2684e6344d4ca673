//! Participant table access
//!
//! The sync writer is the only code that modifies `participants`; API
//! handlers and the resume archiver only read it.

mod participants;

pub use participants::{list_participants, parse_grad_year, replace_participants};
