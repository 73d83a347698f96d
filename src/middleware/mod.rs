//! HTTP middleware module
//!
//! Request observability applied around the router

pub mod logging;
