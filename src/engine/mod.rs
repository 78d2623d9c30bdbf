//! # Engine Module
//!
//! Internal ECS engine implementation.
//!
//! This module contains all core ECS building blocks such as:
//! - Component kinds, instances and attribute values
//! - Entity management
//! - Reactive trigger dispatch
//! - Systems, scenes and the stage
//! - Grouped queries
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod value;
pub mod config;
pub mod component;
pub mod entity;
pub mod triggers;
pub mod query;
pub mod systems;
pub mod scene;
pub mod scheduler;
pub mod order;
pub mod manager;
