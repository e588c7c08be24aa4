//! Local Jarvis chat client library
//!
//! A desktop chat front-end for a local personal assistant backend: lists
//! available agents, lets the user select one, and exchanges text messages
//! with it over REST. The core (store, API client, controller) is exposed
//! here so it can be tested without a UI runtime; the main binary is in
//! `src/main.rs`.

pub mod api;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
/// Application state management
///
/// The reducer-backed store is the sole mutation path for UI state.
pub mod state;
pub mod ui;
