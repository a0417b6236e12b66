//! Document merge backend: turns sheet rows into merged documents that are
//! emailed or stored as PDFs.

pub mod backends;
pub mod config;
pub mod engine;
pub mod job_controller;
pub mod services;
