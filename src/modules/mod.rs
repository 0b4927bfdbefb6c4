//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for the local photo storage and outbound mail delivery.

pub mod mail;
pub mod storage;
