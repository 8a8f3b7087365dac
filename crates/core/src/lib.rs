//! Haberdash Core - Shared types library.
//!
//! This crate provides common types used across all Haberdash components:
//! - `client` - API client and client-side state stores
//! - `cli` - Command-line front end for the stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the order status enum

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
