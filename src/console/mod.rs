// src/console/mod.rs
// DOCUMENTATION: Console module organization
// PURPOSE: Re-export console components

pub mod view;

pub use view::*;
