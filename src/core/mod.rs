//! Core domain models
//!
//! This module defines the repositories, forks and gathered activity the
//! crawler works with, plus the run configuration and state.

pub mod activity;
pub mod config;
pub mod repository;
pub mod state;

pub use activity::*;
pub use repository::*;
pub use state::*;
