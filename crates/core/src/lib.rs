//! Core library: image registry, tag index, filtering, annotation editing and
//! the session that keeps them in sync with the annotation server.

pub mod config;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod filter;
pub mod models;
pub mod registry;
pub mod session;
pub mod state;
pub mod tags;
pub mod theme;
pub mod view;
