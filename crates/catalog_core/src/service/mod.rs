//! Catalog use-case services.
//!
//! # Responsibility
//! - Compose repository calls into transactional use-cases.
//! - Keep CLI callers decoupled from SQL and transaction plumbing.
//!
//! # Invariants
//! - Every multi-step use-case runs inside `run_in_transaction`, so it
//!   either commits fully or leaves nothing behind.

pub mod category_service;
pub mod error;
pub mod product_service;
