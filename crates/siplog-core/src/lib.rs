//! Core domain models for siplog
//!
//! This crate contains:
//! - Batch model (Batch, LogEntry and the metadata carried with them)
//! - Dispatch and redaction policies
//! - The error taxonomy shared by the pipeline and its callers

pub mod batch;
pub mod error;
pub mod policy;

pub use batch::{Batch, BatchMetaInfo, EntryMetaInfo, LogEntry, ParticipantInfo, SIP_ENTRY_TYPE};
pub use error::{Error, Result};
pub use policy::{DispatchPolicy, ExecutionStrategy, RedactionConfig};
