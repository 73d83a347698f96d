//! Data models module
//!
//! Wire types for the chat widget and the upstream completion API

pub mod chat;
pub mod upstream;
