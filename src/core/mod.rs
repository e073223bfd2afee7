// src/core/mod.rs

/// Host normalization applied to raw user input.
pub mod domain;

/// The one error a scan request can return.
pub mod error;

/// Report types, sentinels and timestamp helpers.
pub mod models;

/// The probes (DNS, WHOIS, HTTP) and the `Scanner` that runs them together.
pub mod scanner;
