//! CLI module for funcloop - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
