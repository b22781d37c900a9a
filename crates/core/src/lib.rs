//! Core business logic for Rentra's financial ledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry posting rules and balance calculations
//! - `numbering` - Document number series and formatting
//! - `reconciliation` - Statement reconciliation state machine
//! - `adjustment` - Financial adjustment resolution

pub mod adjustment;
pub mod ledger;
pub mod numbering;
pub mod reconciliation;
