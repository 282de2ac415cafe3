#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod classifier;
pub mod config;
pub mod data;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod scaler;
pub mod types;

#[path = "../price/mod.rs"]
pub mod price;

#[path = "../portfolio/mod.rs"]
pub mod portfolio;
