//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., WebGateway)
//! and hosts the filesystem-facing executor.

pub mod paths;
pub mod terminal;
pub mod tools;
pub mod web;
