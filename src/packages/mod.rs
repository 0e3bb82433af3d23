// src/packages/mod.rs

//! Package query layer
//!
//! Answers "is it installed?" and "can it be installed?" for batches of OS
//! packages. Backends implement [`PackageBackend`]; the reconciler only sees
//! the resulting [`PackageFacts`] snapshot.

pub mod apt;
pub mod apt_policy;
pub mod dpkg_query;
pub mod traits;

pub use apt::AptBackend;
pub use traits::{PackageBackend, PackageFacts, base_name};

