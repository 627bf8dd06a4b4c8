// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AES-128 primitives for ANSI C12.22 message security.
//!
//! [`Aes`] holds the 128-bit key and exposes single-block ECB encryption;
//! [`AesEax`] composes it into the EAX' authenticated-encryption mode used
//! by C12.22 (CMAC + CTR with a 32-bit MAC). Key material is zeroized on
//! re-assign and drop.

mod eax;

pub use eax::{AesEax, AES_EAX_CLASS, EAX_MAC_SIZE};

use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::{MClass, PropertyGetter, PropertySetter, PropertyDef, ServiceDef, ServiceMethod};
use crate::variant::{Variant, VariantKind};
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes128;
use zeroize::Zeroize;

/// AES block and key size in bytes; only 128-bit keys are supported.
pub const KEY_SIZE: usize = 16;

/// AES-128 key holder with single-block ECB encryption.
pub struct Aes {
    key: Option<[u8; KEY_SIZE]>,
    cipher: Option<Aes128>,
}

impl Aes {
    pub fn new() -> Self {
        Aes {
            key: None,
            cipher: None,
        }
    }

    pub fn with_key(key: &[u8]) -> MResult<Self> {
        let mut aes = Aes::new();
        aes.set_key(key)?;
        Ok(aes)
    }

    /// Validate a candidate key size without building a context.
    pub fn check_key_size_valid(key: &[u8]) -> MResult<()> {
        if key.len() != KEY_SIZE {
            return Err(MError::new(
                crate::error::MErrorKind::Security,
                MErrorCode::InvalidKeySize,
                format!("Key size {} is invalid, expected {} bytes", key.len(), KEY_SIZE),
            ));
        }
        Ok(())
    }

    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    pub fn key(&self) -> Option<&[u8; KEY_SIZE]> {
        self.key.as_ref()
    }

    /// Assign the key, scrubbing any previous material.
    pub fn set_key(&mut self, key: &[u8]) -> MResult<()> {
        Self::check_key_size_valid(key)?;
        self.destroy_context();
        let mut material = [0u8; KEY_SIZE];
        material.copy_from_slice(key);
        self.cipher = Some(Aes128::new_from_slice(&material).map_err(|_| {
            MError::new(
                crate::error::MErrorKind::Security,
                MErrorCode::InvalidKeySize,
                "Key rejected by the cipher",
            )
        })?);
        self.key = Some(material);
        Ok(())
    }

    /// Forget the key and zero the stored material.
    pub fn destroy_context(&mut self) {
        if let Some(ref mut key) = self.key {
            key.zeroize();
        }
        self.key = None;
        self.cipher = None;
    }

    /// Encrypt exactly one 16-byte block in place (ECB).
    pub fn encrypt_block(&self, block: &mut [u8; KEY_SIZE]) -> MResult<()> {
        match &self.cipher {
            Some(cipher) => {
                cipher.encrypt_block(block.into());
                Ok(())
            }
            None => Err(Self::throw_no_key()),
        }
    }

    /// Decrypt exactly one 16-byte block in place (ECB).
    pub fn decrypt_block(&self, block: &mut [u8; KEY_SIZE]) -> MResult<()> {
        match &self.cipher {
            Some(cipher) => {
                cipher.decrypt_block(block.into());
                Ok(())
            }
            None => Err(Self::throw_no_key()),
        }
    }

    #[track_caller]
    fn throw_no_key() -> MError {
        MError::new(
            crate::error::MErrorKind::Security,
            MErrorCode::InvalidKeySize,
            "Key is not set",
        )
    }
}

impl Default for Aes {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Aes {
    fn clone(&self) -> Self {
        Aes {
            key: self.key,
            cipher: self.cipher.clone(),
        }
    }
}

impl Drop for Aes {
    fn drop(&mut self) {
        self.destroy_context();
    }
}

// Reflection -------------------------------------------------------------

impl crate::reflect::MObject for Aes {
    fn class(&self) -> &'static MClass {
        &AES_CLASS
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

pub static AES_CLASS: MClass = MClass {
    name: "Aes",
    type_name: "Aes",
    parent: Some(&crate::reflect::OBJECT_CLASS),
    properties: &[
        PropertyDef::enumeration("KeySize", KEY_SIZE as u32),
        PropertyDef::read_write(
            "Key",
            VariantKind::ByteString,
            PropertyGetter::Object(|o| {
                let aes = o.downcast_ref::<Aes>()?;
                match aes.key() {
                    Some(key) => Ok(Variant::byte_string(key)),
                    None => Ok(Variant::byte_string([])),
                }
            }),
            PropertySetter::Object(|o, v| {
                o.downcast_mut::<Aes>()?.set_key(&v.as_byte_string()?)
            }),
        ),
    ],
    services: &[
        ServiceDef::of(
            "DestroyContext",
            ServiceMethod::Mut0(|o| {
                o.downcast_mut::<Aes>()?.destroy_context();
                Ok(Variant::Empty)
            }),
            "()",
        ),
        ServiceDef::of(
            "CheckKeySizeValid",
            ServiceMethod::Class1(|key| {
                Aes::check_key_size_valid(&key.as_byte_string()?)?;
                Ok(Variant::Empty)
            }),
            "(key: ByteString)",
        ),
        ServiceDef::of(
            "New",
            ServiceMethod::Class0(|| Ok(Variant::from_object(std::sync::Arc::new(Aes::new())))),
            "() -> Aes",
        ),
    ],
};
