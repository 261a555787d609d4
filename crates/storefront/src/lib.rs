//! Lixmath storefront library.
//!
//! Catalog, session cart, simulated checkout and downloads for engineering
//! templates, plus the translation and subtitle proxies used by the page
//! widgets. The binary in `main.rs` wires this library to a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
