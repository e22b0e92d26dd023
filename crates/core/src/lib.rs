//! Domain core for the boss time-of-death tracker.
//!
//! Zero internal dependencies: the respawn window engine, catalog types,
//! command parsing, reply formatting, the storage contract with its
//! in-memory backend, and the interpreter that ties them together.

pub mod catalog;
pub mod command;
pub mod error;
pub mod interpreter;
pub mod reply;
pub mod store;
pub mod time;
pub mod types;
pub mod window;
