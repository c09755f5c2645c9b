//! Engine-owned state.
//!
//! Overview
//! - `componentstore` – component name → (entity → value), pruned when empty
//! - `entitystore` – entity records and filtered queries
//! - `filter` – component filters used by queries and entity handlers
//! - `gameconfig` – INI-backed engine configuration
//! - `identifiers` – id newtypes and the id generator
//! - `input` – per-engine pointer state fed by the host
//! - `modules` – registry of named extension modules
//! - `rooms` – rooms, their membership lists and the current room
//! - `spritestore` – sprite definitions keyed by name
//! - `viewports` – camera-like viewport records
//! - `worldtime` – frame clock
pub mod componentstore;
pub mod entitystore;
pub mod filter;
pub mod gameconfig;
pub mod identifiers;
pub mod input;
pub mod modules;
pub mod rooms;
pub mod spritestore;
pub mod viewports;
pub mod worldtime;
