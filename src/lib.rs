//! # Foreman
//!
//! Approval-gated action core for terminal coding sessions. Proposals
//! arrive as JSON objects, pass validation and a repetition guard, and
//! run only after an explicit user decision.
//!
//! - `domain`: actions, results, errors, collaborator traits
//! - `application`: validation, approval gate, loop guard, session loop
//! - `infrastructure`: path resolver, executor, web gateway, terminal

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
