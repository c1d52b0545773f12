//! xnav CLI library.
//!
//! This crate provides the output formatting shared by the `xnav-cli`
//! subcommands.

pub mod output;
