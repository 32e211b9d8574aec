//! # Storage Module
//!
//! Durable storage for accounts, leave requests, chat and sessions using redb.
//!
//! Uses redb embedded database for:
//! - ACID transactions
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)

mod redb_store;

pub use redb_store::RedbStore;
