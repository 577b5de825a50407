//! # chainlog-core
//!
//! Trait seams for the CHAINLOG workspace.
//!
//! This crate defines the storage boundary (`LogStore`) that every other
//! crate builds against. Reference implementations live in
//! `chainlog-audit`; callers with their own storage medium implement the
//! trait there instead.

pub mod traits;

pub use traits::LogStore;
