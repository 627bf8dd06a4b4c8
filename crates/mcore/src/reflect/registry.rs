// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide class registry.
//!
//! One fixed-capacity table of class descriptors, scanned by name. Core
//! classes register themselves on first access; applications add their own
//! through [`register_class`]. Overflow and duplicate names fail loudly.

use super::{object::OBJECT_CLASS, MClass};
use crate::error::{MError, MErrorCode, MResult};
use parking_lot::RwLock;
use std::sync::OnceLock;

/// Maximum number of reflected classes per process.
pub const MAXIMUM_NUMBER_OF_CLASSES: usize = 256;

fn classes() -> &'static RwLock<Vec<&'static MClass>> {
    static CLASSES: OnceLock<RwLock<Vec<&'static MClass>>> = OnceLock::new();
    CLASSES.get_or_init(|| {
        let mut list: Vec<&'static MClass> = Vec::with_capacity(MAXIMUM_NUMBER_OF_CLASSES);
        for cls in [
            &OBJECT_CLASS,
            &crate::regexp::REGEXP_CLASS,
            &crate::stream::STREAM_CLASS,
            &crate::stream::STREAM_MEMORY_CLASS,
            &crate::crypto::AES_CLASS,
            &crate::crypto::AES_EAX_CLASS,
            &crate::xml::XML_DOCUMENT_CLASS,
        ] {
            log::debug!("registering core class {}", cls.name);
            list.push(cls);
        }
        RwLock::new(list)
    })
}

/// Register an application class.
pub fn register_class(cls: &'static MClass) -> MResult<()> {
    debug_assert!(cls.name.len() <= super::MAXIMUM_CLASS_NAME_LENGTH);
    let mut list = classes().write();
    if list.len() >= MAXIMUM_NUMBER_OF_CLASSES {
        return Err(MError::software(
            MErrorCode::ClassRegistryFull,
            format!(
                "Class registry is full, {} classes are already registered",
                MAXIMUM_NUMBER_OF_CLASSES
            ),
        ));
    }
    if list.iter().any(|c| c.name == cls.name) {
        return Err(MError::software(
            MErrorCode::UnknownItem,
            format!("Class '{}' is already registered", cls.name),
        ));
    }
    log::debug!("registering class {}", cls.name);
    list.push(cls);
    Ok(())
}

/// Find a registered class by name.
pub fn get_class(name: &str) -> Option<&'static MClass> {
    classes().read().iter().copied().find(|c| c.name == name)
}

/// Find a registered class by name or fail with `ClassNotFound`.
pub fn get_existing_class(name: &str) -> MResult<&'static MClass> {
    get_class(name).ok_or_else(|| {
        MError::plain(MErrorCode::ClassNotFound, format!("Class {} not found", name))
    })
}

/// Whether a class with the given name is registered.
pub fn is_class_present(name: &str) -> bool {
    get_class(name).is_some()
}

/// Names of every registered class, in registration order.
pub fn all_class_names() -> Vec<String> {
    classes().read().iter().map(|c| c.name.to_string()).collect()
}
