//! MIME message construction
//!
//! This module holds the message model and renders it into a flat
//! `multipart/mixed` payload with base64-encoded attachments.

pub mod builder;
pub mod encoding;
pub mod types;

pub use builder::{BoundaryGenerator, FixedBoundary, MessageBuilder, RandomBoundary};
pub use types::{Attachment, Envelope, Message};
