// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod restaurant;
pub mod statistics;

pub use restaurant::*;
pub use statistics::*;
