//! Skilldata - skill data compiler and lookup service
//!
//! Compiles declarative skill documents (per-level values, variables,
//! bracket expressions, named effects and conditions) into immutable
//! per-level skill objects, and serves them through a reloadable table.

// ============================================
// Core Modules
// ============================================

/// Loader configuration (YAML)
pub mod config;
/// Configuration node tree and document sources
pub mod document;
/// Definition model, compiler and skill table
pub mod skills;

// ============================================
// Runtime
// ============================================

/// Effect and condition factories
pub mod handlers;
/// Published skill table and dependent tables
pub mod database;
