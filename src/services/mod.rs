// src/services/mod.rs

//! Transactional core. Handlers stay thin and call into these functions.

pub mod attempt;
pub mod authoring;
pub mod grading;
pub mod play;
pub mod stats;
pub mod store;
