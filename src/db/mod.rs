// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export document store components

pub mod repository;

pub use repository::*;
