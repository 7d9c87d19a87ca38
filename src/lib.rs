// src/lib.rs — Library root for Scribe

pub mod cli;
pub mod core;
pub mod infra;
pub mod persona;
pub mod provider;
pub mod session;
