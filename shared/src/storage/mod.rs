//! Storage traits and implementations.
//!
//! Profiles are kept so that a panel, or the explain action, can refer back
//! to the queries of an earlier request by token. The `ProfileStore` trait
//! allows different implementations; the in-memory one keeps a bounded
//! window of recent profiles.

pub mod profile_store;

pub use profile_store::{
    generate_token, InMemoryProfileStore, Profile, ProfileStore, ProfileStoreError,
    DEFAULT_CAPACITY,
};
