//! game-host server library
//!
//! HTTP front door for the virtual game namespace, plus the local backends
//! a standalone host runs on: a sandboxed directory as the file store and a
//! JSON snapshot as the record store.

pub mod api;
pub mod config;
pub mod filer;
pub mod records;
