//! Core types and identifiers for the access controller
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the controller.
//!
//! # Overview
//!
//! - **Identifiers**: the normalized badge identifier and per-scan correlation ids
//! - **Enums**: controller state, decision reasons, audit outcomes, backend selection
//! - **Configuration**: controller configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use badge_access_controller::types::*;
//!
//! let badge = BadgeId::parse("aa11bb22").unwrap();
//! assert_eq!(badge.as_str(), "AA11BB22");
//!
//! let config = ControllerConfig {
//!     zone: "IT".to_string(),
//!     admin_badge_id: "AA11BB22".to_string(),
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
