//! # Repository Module
//!
//! Database repository implementations for the broker.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Resolver / handler                                                    │
//! │       │                                                                 │
//! │       │  db.sequences().allocate("STORE01")                            │
//! │       ▼                                                                 │
//! │  SequenceRepository   allocate / current / list                        │
//! │  DeviceRepository     find / create / upsert / delete / list           │
//! │  SessionRepository    create / get / list / latest_pending / mark_paid │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each repository owns a clone of the pool; creating one is free.

pub mod device;
pub mod sequence;
pub mod session;
