//! Library crate for lasertag-console, exposing modules to the console binary.

/// Console configuration loading.
pub mod config;
/// Wire-level request and event shapes.
pub mod dto;
/// Failure taxonomy.
pub mod error;
/// Stream client and command gateway.
pub mod services;
/// The view model store and its collaborators.
pub mod state;
