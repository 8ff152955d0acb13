//! Sage Bistro API library.
//!
//! This crate provides the ordering backend as a library, allowing it to be
//! tested and reused. The `bistro-api` binary is a thin wrapper around it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod authz;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
