//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the object storage adapter that holds report attachments.

pub mod storage;
