// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Foundry Params - Parameter value coercion and remapping
//!
//! This crate moves values between family parameters whose storage kinds or
//! data types differ. It works against the traits defined in
//! `foundry-model`, so any host binding can drive it.
//!
//! # Features
//!
//! - **Named coercion policies** - Strict, StorageTypeCoercion,
//!   ElectricalCoercion and SimpleCoercion, plus first-match chains
//! - **Numeric extraction** from free text using `nom` combinators
//! - **Nominal voltage collapse** using `memchr` substring search
//! - **Per-type batch remap** that switches each family type exactly once
//! - **In-memory family document** for callers without a live host
//!
//! # Example
//!
//! ```ignore
//! use foundry_params::{map_value, remap, MemoryFamilyDocument};
//! use foundry_model::{with_transaction, FamilyDocument};
//!
//! let target = document.parameter("Voltage").unwrap();
//! map_value(&mut document, "208V", &target, Some("ElectricalCoercion"))?;
//!
//! with_transaction(&mut document, "Remap Poles", |doc| {
//!     remap(doc, &old_poles, &poles, Some(1.into()))
//! })?;
//! ```

mod context;
pub mod electrical;
mod labels;
mod mapper;
mod memory;
pub mod numeric;
mod registry;
mod remap;
mod strategies;
pub mod units;

pub use context::{CoercionContext, MappingSource};
pub use electrical::{VoltageBand, VoltageBands};
pub use labels::LabelCache;
pub use mapper::ParameterValueMapper;
pub use memory::MemoryFamilyDocument;
pub use registry::{
    default_policy, get_all_strategies, get_strategy, map_value, BoundStrategy, StrategyRegistry,
};
pub use remap::{remap, remap_coalesce, remap_record, remap_with_policy};
pub use strategies::{
    ChainStrategy, ElectricalCoercion, MappingStrategy, SimpleCoercion, StorageTypeCoercion,
    StrictStrategy,
};
pub use units::UnitTable;
