//! services/api/src/lib.rs
//!
//! The Lumina journal API service: Postgres and OpenAI adapters for the
//! `lumina_core` ports, plus the axum web layer that exposes them.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
