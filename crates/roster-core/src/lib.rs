//! Core types and operations for the Roster records service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::RecordStore`]; the HTTP layer calls the
//! functions in [`ops`], which gate every call through [`access::authorize`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod contact;
pub mod edit;
pub mod error;
pub mod material;
pub mod ops;
pub mod store;
pub mod student;
pub mod validate;

pub use error::{Error, Result};
