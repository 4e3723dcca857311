//! Truss - A task dependency tracker.
//!
//! This crate provides both a CLI application and a library for managing
//! tasks and the dependency edges between them: cycle prevention,
//! start-readiness checks, and dependency statistics on top of pluggable
//! storage backends.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod auth;
pub mod domain;
pub mod error;
pub mod id_generation;
pub mod manager;
pub mod storage;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

// Application context and output formatting
pub mod app;
pub mod output;
