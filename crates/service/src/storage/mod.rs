//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores so services that persist a single
//! JSON document share one read/replace implementation.

pub mod json_document_store;
