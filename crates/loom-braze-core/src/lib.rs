// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Record types for the Braze CRM client.
//!
//! This crate provides:
//! - [`UserRecord`] and [`EventRecord`], the two things the track endpoint accepts
//! - [`Attributes`], an ordered trait/property mapping of [`TraitValue`]s
//! - Best-effort serialization that reports unrenderable values as
//!   [`SerializeIssue`]s instead of failing the record
//! - [`ClientHandle`], the non-owning link from a record to its client

pub mod attributes;
pub mod error;
pub mod event;
pub mod handle;
pub mod record;
pub mod user;
pub mod value;

pub use attributes::{Attributes, SerializeIssue};
pub use error::{RecordError, Result};
pub use event::EventRecord;
pub use handle::ClientHandle;
pub use record::{Record, Serialized};
pub use user::UserRecord;
pub use value::{format_timestamp, TraitValue};
