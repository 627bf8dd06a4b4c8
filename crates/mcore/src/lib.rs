// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Foundation core of the metering SDK.
//!
//! Everything the higher protocol layers ride on:
//!
//! - **[`variant`]**: dynamically typed [`Variant`] value with
//!   copy-on-write storage, promotion arithmetic, Pythonic indexing, and
//!   the MDL textual round-trip form.
//! - **[`reflect`]**: runtime reflection over registered classes; named
//!   properties, enumerations, and services discoverable and invokable by
//!   name.
//! - **[`stream`]**: uniform I/O with pluggable processors (buffering,
//!   text mode, encryption) and a reflected raw codec for every variant
//!   kind.
//! - **[`crypto`]**: AES-128 and the C12.22 EAX' authenticated-encryption
//!   mode.
//! - **[`regexp`]**: POSIX-like regular expressions with ten capture
//!   slots and replace templates.
//! - **[`codec`]**: BCD, RAD40, DSP numerics, hex, numeric byte strings,
//!   and Base64.
//! - **[`xml`]**: DOM-style XML document over the value model.
//! - **[`cli`]**: typed-slot command-line parser for front-end tools.
//! - **[`error`]**: the structured error taxonomy shared by all of the
//!   above.
//!
//! Objects are single-owner for mutation: two threads may own disjoint
//! object graphs and work independently, but a single variant, stream, or
//! object must not be mutated concurrently.

pub mod cli;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod pathsub;
pub mod reflect;
pub mod regexp;
pub mod stream;
pub mod variant;
pub mod xml;

pub use error::{MError, MErrorCode, MErrorKind, MResult};
pub use reflect::{get_class, get_existing_class, register_class, MClass, MObject};
pub use variant::{Variant, VariantKind};
