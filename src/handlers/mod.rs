// src/handlers/mod.rs
pub mod error;
pub mod macro_inputs;
pub mod report;
