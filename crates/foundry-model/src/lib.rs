// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Foundry Model - Shared types and traits for family parameter mapping
//!
//! This crate provides the core abstractions for moving values between the
//! parameters of a family document. It defines the document surface a host
//! binding must provide, so the mapping engine can work against any host
//! (or against an in-memory table in tests) without knowing which one.
//!
//! # Architecture
//!
//! The crate is organized around a few key pieces:
//!
//! - [`ParameterValue`] - Closed set of value kinds a parameter slot can hold
//! - [`Parameter`] - Named, typed slot with a storage kind and data type
//! - [`FamilyDocument`] - Type table with a current type and get/set access
//! - [`UnitService`] - Display-unit lookup and conversion to internal units
//! - [`ActiveType`] - Handle proving a family type was made current
//!
//! # Example
//!
//! ```ignore
//! use foundry_model::{ActiveType, FamilyDocument, ParameterValue};
//!
//! for family_type in document.family_types() {
//!     let mut active = ActiveType::activate(&mut *document, &family_type)?;
//!     if let Some(value) = active.value(&width) {
//!         active.set_value(&depth, value)?;
//!     }
//! }
//! ```

pub mod active;
pub mod error;
pub mod records;
pub mod traits;
pub mod types;

// Re-export all public types
pub use active::*;
pub use error::*;
pub use records::*;
pub use traits::*;
pub use types::*;
