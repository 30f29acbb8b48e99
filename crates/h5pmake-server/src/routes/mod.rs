//! HTTP routes

pub mod generate;
