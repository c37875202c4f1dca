//! # Footbot Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components that provide
//! foundational functionality for Footbot: configuration, error management,
//! and the prompt templating used when a language model phrases a reply.
//!
//! ## Architecture
//!
//! - `config`: Configuration loading, merging, environment overrides and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `templating`: Tera rendering of the language-model prompt
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{FootbotError, Result}; // For error handling
//! use crate::core::templating; // For prompt rendering
//! ```
//!
pub mod config;
pub mod error;
pub mod templating;
