//! Create, edit, and delete network profile records and keep them in a local
//! store.
//!
//! Nothing here touches real network interfaces. A [`Repository`] bundles the
//! user's configuration with a [`Store`](repository::Store) backed by a single
//! JSON blob, every change is validated by [`validation::validate`] before it is
//! committed, and [`session::Session`] models the editor a front end drives.

pub mod error;
pub mod fs;
pub mod repository;
pub mod session;
pub mod validation;

pub use error::{Error, Result};
pub use repository::Repository;
