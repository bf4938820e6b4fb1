//! # taskpad-store
//!
//! In-process document store exposing the operation surface of the hosted
//! document database the application is written against: schemaless,
//! collection-oriented, with equality-filtered and single-field-ordered
//! queries, and live subscriptions that deliver the *full* current result
//! set on every underlying change.
//!
//! Identifiers and creation timestamps are store-assigned; timestamps are
//! monotonic per store. Single-document operations are atomic; there are
//! no multi-document transactions and no referential integrity.

pub mod document;
pub mod query;
pub mod store;
pub mod subscription;

mod error;

pub use document::Document;
pub use error::{Result, StoreError};
pub use query::{Direction, Query, CREATED_AT};
pub use store::{Collection, Store};
pub use subscription::Subscription;
