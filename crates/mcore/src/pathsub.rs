// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scoped substitution of the process current directory.

use crate::error::{MError, MResult};
use std::path::{Path, PathBuf};

/// RAII helper that replaces the process current working directory on
/// construction and restores it when dropped. Restoration failures are
/// swallowed: at teardown there is nowhere to report them.
pub struct CurrentPathSubstitutor {
    saved: PathBuf,
}

impl CurrentPathSubstitutor {
    /// Switch the process into `path`, remembering where it was.
    pub fn new(path: impl AsRef<Path>) -> MResult<Self> {
        let saved = std::env::current_dir()
            .map_err(|e| MError::from_system(&e, "Cannot get current directory"))?;
        std::env::set_current_dir(path.as_ref()).map_err(|e| {
            MError::from_system(
                &e,
                &format!("Cannot change directory to '{}'", path.as_ref().display()),
            )
        })?;
        Ok(CurrentPathSubstitutor { saved })
    }

    /// The directory that will be restored.
    pub fn saved_path(&self) -> &Path {
        &self.saved
    }
}

impl Drop for CurrentPathSubstitutor {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.saved) {
            log::warn!("could not restore current directory: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_and_restore() {
        let before = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        {
            let sub = CurrentPathSubstitutor::new(dir.path()).unwrap();
            assert_eq!(sub.saved_path(), before.as_path());
            let now = std::env::current_dir().unwrap();
            assert_eq!(now.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
        }
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_target_reported() {
        assert!(CurrentPathSubstitutor::new("/definitely/not/a/directory").is_err());
    }
}
