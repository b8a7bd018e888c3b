//! Persistence contracts and the SQLite implementation behind them.
//!
//! # Responsibility
//! - Expose goal/activity CRUD and secondary-index lookups.
//! - Provide one transaction primitive spanning both collections.
//!
//! # Invariants
//! - Write paths validate records before issuing SQL.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Repositories never compute derived fields; they persist what the
//!   service layer hands them.

pub mod activity_repo;
pub mod goal_repo;
pub mod store;
