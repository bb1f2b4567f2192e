//! Bilingual - Interactive Arabic/English Translation
//!
//! A web demo that loads one translation pipeline per direction, caches it for
//! the life of the process, and serves a form for translating text with it.

pub mod cli;
pub mod config;
pub mod controller;
pub mod direction;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod setup;
pub mod web;
