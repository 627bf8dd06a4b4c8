// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! EAX' (EAX-prime) authenticated encryption for ANSI C12.22.
//!
//! Encrypt and decrypt carry a 32-bit MAC over an associated "clear text"
//! nonce and a variable-length payload: the nonce is CMACed under a
//! D-seeded state, the payload CTR-encrypted with the nonce CMAC as the
//! starting counter, and the ciphertext CMACed under a Q-seeded state;
//! the MAC is the low 32 bits of the XOR of the two CMACs. The ciphertext
//! layout returned by encrypt is `payload || 4-byte MAC`.
//!
//! The BADCODE option reproduces, bit for bit, the erroneous code printed
//! in the last draft of C12.22 (different CTR byte-clear offsets and a
//! byte-reversed MAC). It exists for interoperability testing only and is
//! never the default.

use super::{Aes, KEY_SIZE};
use crate::error::{MError, MErrorCode, MResult};
use crate::reflect::{MClass, ServiceDef, ServiceMethod};
use crate::variant::Variant;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Size of the MAC appended to the ciphertext.
pub const EAX_MAC_SIZE: usize = 4;

/// Derived key blocks: `L = E(0)`, `D = dbl(L)`, `Q = dbl(D)`.
#[derive(Clone)]
struct EaxContext {
    d: [u8; KEY_SIZE],
    q: [u8; KEY_SIZE],
}

impl Drop for EaxContext {
    fn drop(&mut self) {
        self.d.zeroize();
        self.q.zeroize();
    }
}

/// AES-128 EAX' cipher.
pub struct AesEax {
    aes: Aes,
    context: Option<EaxContext>,
    badcode: bool,
}

impl AesEax {
    pub fn new() -> Self {
        AesEax {
            aes: Aes::new(),
            context: None,
            badcode: false,
        }
    }

    pub fn with_key(key: &[u8]) -> MResult<Self> {
        let mut eax = AesEax::new();
        eax.set_key(key)?;
        Ok(eax)
    }

    /// Interoperability-testing variant matching the erroneous draft
    /// standard; see the module notes.
    pub fn with_badcode(key: &[u8]) -> MResult<Self> {
        let mut eax = AesEax::with_key(key)?;
        eax.badcode = true;
        Ok(eax)
    }

    /// Validate a candidate key size.
    pub fn check_key_size_valid(key: &[u8]) -> MResult<()> {
        Aes::check_key_size_valid(key)
    }

    pub fn has_key(&self) -> bool {
        self.aes.has_key()
    }

    pub fn set_key(&mut self, key: &[u8]) -> MResult<()> {
        self.context = None;
        self.aes.set_key(key)
    }

    /// Authenticate-and-encrypt: returns `data || MAC`.
    pub fn eax_encrypt(&mut self, clear_text: &[u8], data: &[u8]) -> MResult<Vec<u8>> {
        let mut result = Vec::with_capacity(data.len() + EAX_MAC_SIZE);
        result.extend_from_slice(data);
        let mac = self.encrypt_buffer(clear_text, &mut result)?;
        result.extend_from_slice(&mac.to_le_bytes());
        Ok(result)
    }

    /// Decrypt-and-verify `data || MAC`; fails without returning any
    /// plaintext when the MAC does not match.
    pub fn eax_decrypt(&mut self, clear_text: &[u8], data: &[u8]) -> MResult<Vec<u8>> {
        if data.len() < EAX_MAC_SIZE {
            return Err(MError::software(
                MErrorCode::NumberOutOfRange,
                "Data block is expected to be no less than four bytes",
            ));
        }
        let (payload, trailer) = data.split_at(data.len() - EAX_MAC_SIZE);
        let mut result = payload.to_vec();
        let mac = self.decrypt_buffer(clear_text, &mut result)?;
        // Constant-time comparison against the trailing MAC bytes
        if mac.to_le_bytes().as_slice().ct_eq(trailer).unwrap_u8() != 1 {
            result.zeroize();
            return Err(self.throw_validation_error());
        }
        Ok(result)
    }

    /// MAC over the clear text alone; equals the zero-payload encrypt.
    pub fn eax_authenticate(&mut self, clear_text: &[u8]) -> MResult<u32> {
        let context = self.prepare_context()?;
        let mut wsn = context.d;
        self.cmac(&mut wsn, clear_text)?;
        let mac = self.extract_mac(&wsn);
        wsn.zeroize();
        Ok(mac)
    }

    /// One-shot encrypt with a throwaway context.
    pub fn static_eax_encrypt(key: &[u8], clear_text: &[u8], data: &[u8]) -> MResult<Vec<u8>> {
        AesEax::with_key(key)?.eax_encrypt(clear_text, data)
    }

    /// One-shot decrypt with a throwaway context.
    pub fn static_eax_decrypt(key: &[u8], clear_text: &[u8], data: &[u8]) -> MResult<Vec<u8>> {
        AesEax::with_key(key)?.eax_decrypt(clear_text, data)
    }

    /// One-shot authenticate with a throwaway context.
    pub fn static_eax_authenticate(key: &[u8], clear_text: &[u8]) -> MResult<u32> {
        AesEax::with_key(key)?.eax_authenticate(clear_text)
    }

    // Internals ---------------------------------------------------------

    /// In-place encrypt of `data`, returning the MAC.
    fn encrypt_buffer(&mut self, clear_text: &[u8], data: &mut [u8]) -> MResult<u32> {
        let context = self.prepare_context()?;
        let q = context.q;
        let mut wsn = context.d;
        self.cmac(&mut wsn, clear_text)?;

        if data.is_empty() {
            let mac = self.extract_mac(&wsn);
            wsn.zeroize();
            return Ok(mac);
        }

        self.ctr(&wsn, data)?;
        let mut wsc = q;
        self.cmac(&mut wsc, data)?;
        for (c, n) in wsc.iter_mut().zip(wsn.iter()) {
            *c ^= n;
        }
        let mac = self.extract_mac(&wsc);
        wsn.zeroize();
        wsc.zeroize();
        Ok(mac)
    }

    /// In-place decrypt of `data`, returning the expected MAC. The
    /// payload CMAC runs over the still-encrypted bytes before CTR turns
    /// them into plaintext.
    fn decrypt_buffer(&mut self, clear_text: &[u8], data: &mut [u8]) -> MResult<u32> {
        let context = self.prepare_context()?;
        let q = context.q;
        let mut wsn = context.d;
        self.cmac(&mut wsn, clear_text)?;

        let mac;
        if data.is_empty() {
            mac = self.extract_mac(&wsn);
        } else {
            let mut wsc = q;
            self.cmac(&mut wsc, data)?;
            for (c, n) in wsc.iter_mut().zip(wsn.iter()) {
                *c ^= n;
            }
            mac = self.extract_mac(&wsc);
            wsc.zeroize();
            self.ctr(&wsn, data)?;
        }
        wsn.zeroize();
        Ok(mac)
    }

    /// Derive L, D, Q once per key.
    fn prepare_context(&mut self) -> MResult<EaxContext> {
        if self.context.is_none() {
            let mut l = [0u8; KEY_SIZE];
            self.aes.encrypt_block(&mut l)?;
            let d = dbl(&l);
            let q = dbl(&d);
            l.zeroize();
            self.context = Some(EaxContext { d, q });
        }
        Ok(self.context.as_ref().expect("just prepared").clone())
    }

    /// CMAC chaining over `message` into the seeded state `ws`. The final
    /// block XORs D when exactly one full block remains, otherwise pads
    /// with 0x80 and XORs Q; an empty message leaves the seed untouched.
    fn cmac(&self, ws: &mut [u8; KEY_SIZE], message: &[u8]) -> MResult<()> {
        let context = self.context.as_ref().expect("context prepared");
        let (d, q) = (context.d, context.q);
        let mut rest = message;
        while rest.len() > KEY_SIZE {
            for (w, m) in ws.iter_mut().zip(rest[..KEY_SIZE].iter()) {
                *w ^= m;
            }
            self.aes.encrypt_block(ws)?;
            rest = &rest[KEY_SIZE..];
        }
        if rest.len() == KEY_SIZE {
            for (w, m) in ws.iter_mut().zip(rest.iter()) {
                *w ^= m;
            }
            for (w, k) in ws.iter_mut().zip(d.iter()) {
                *w ^= k;
            }
            self.aes.encrypt_block(ws)?;
        } else if !rest.is_empty() {
            for (w, m) in ws.iter_mut().zip(rest.iter()) {
                *w ^= m;
            }
            ws[rest.len()] ^= 0x80; // the pad byte
            for (w, k) in ws.iter_mut().zip(q.iter()) {
                *w ^= k;
            }
            self.aes.encrypt_block(ws)?;
        }
        Ok(())
    }

    /// CTR keystream XORed over `data`. The counter is the nonce CMAC
    /// with two bits cleared to avoid inter-word carries, incremented as
    /// a big-endian integer.
    fn ctr(&self, ws: &[u8; KEY_SIZE], data: &mut [u8]) -> MResult<()> {
        let mut ctr = *ws;
        if self.badcode {
            ctr[1] &= 0x7F;
            ctr[3] &= 0x7F;
        } else {
            ctr[12] &= 0x7F;
            ctr[14] &= 0x7F;
        }

        let mut nn = [0u8; KEY_SIZE];
        let mut offset = 0;
        while data.len() - offset >= KEY_SIZE {
            nn = ctr;
            self.aes.encrypt_block(&mut nn)?;
            for (b, k) in data[offset..offset + KEY_SIZE].iter_mut().zip(nn.iter()) {
                *b ^= k;
            }
            offset += KEY_SIZE;
            for i in (0..KEY_SIZE).rev() {
                ctr[i] = ctr[i].wrapping_add(1);
                if ctr[i] != 0 {
                    break;
                }
            }
        }
        if offset < data.len() {
            nn = ctr;
            self.aes.encrypt_block(&mut nn)?;
            for (b, k) in data[offset..].iter_mut().zip(nn.iter()) {
                *b ^= k;
            }
        }
        nn.zeroize();
        ctr.zeroize();
        Ok(())
    }

    /// The MAC is the last four bytes of the block as a little-endian
    /// word; BADCODE byte-reverses it.
    fn extract_mac(&self, ws: &[u8; KEY_SIZE]) -> u32 {
        let mac = u32::from_le_bytes([ws[12], ws[13], ws[14], ws[15]]);
        if self.badcode {
            mac.swap_bytes()
        } else {
            mac
        }
    }

    #[track_caller]
    fn throw_validation_error(&self) -> MError {
        MError::new(
            crate::error::MErrorKind::Security,
            MErrorCode::ValidationFailed,
            "Authentication check failed, the data is invalid or was tampered with",
        )
    }
}

impl Default for AesEax {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AesEax {
    fn clone(&self) -> Self {
        AesEax {
            aes: self.aes.clone(),
            context: self.context.clone(),
            badcode: self.badcode,
        }
    }
}

/// Left-shift by one bit with the minimal irreducible-polynomial
/// reduction. The shift runs from byte 0 upward; a carry out of the last
/// byte folds 0x87 into byte 0.
fn dbl(input: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    let mut out = [0u8; KEY_SIZE];
    let mut carry = 0u8;
    for i in 0..KEY_SIZE {
        out[i] = (input[i] << 1) | carry;
        carry = u8::from(input[i] & 0x80 != 0);
    }
    if carry != 0 {
        out[0] ^= 0x87;
    }
    out
}

// Reflection -------------------------------------------------------------

impl crate::reflect::MObject for AesEax {
    fn class(&self) -> &'static MClass {
        &AES_EAX_CLASS
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

pub static AES_EAX_CLASS: MClass = MClass {
    name: "AesEax",
    type_name: "AesEax",
    parent: Some(&super::AES_CLASS),
    properties: &[],
    services: &[
        ServiceDef::of(
            "EaxEncrypt",
            ServiceMethod::Mut2(|o, clear, data| {
                let result = o
                    .downcast_mut::<AesEax>()?
                    .eax_encrypt(&clear.as_byte_string()?, &data.as_byte_string()?)?;
                Ok(Variant::byte_string(result))
            }),
            "(clearText: ByteString, data: ByteString) -> ByteString",
        ),
        ServiceDef::of(
            "EaxDecrypt",
            ServiceMethod::Mut2(|o, clear, data| {
                let result = o
                    .downcast_mut::<AesEax>()?
                    .eax_decrypt(&clear.as_byte_string()?, &data.as_byte_string()?)?;
                Ok(Variant::byte_string(result))
            }),
            "(clearText: ByteString, data: ByteString) -> ByteString",
        ),
        ServiceDef::of(
            "EaxAuthenticate",
            ServiceMethod::Mut1(|o, clear| {
                let mac = o
                    .downcast_mut::<AesEax>()?
                    .eax_authenticate(&clear.as_byte_string()?)?;
                Ok(Variant::UInt(mac))
            }),
            "(clearText: ByteString) -> UInt",
        ),
        ServiceDef::of(
            "StaticEaxEncrypt",
            ServiceMethod::Class3(|key, clear, data| {
                Ok(Variant::byte_string(AesEax::static_eax_encrypt(
                    &key.as_byte_string()?,
                    &clear.as_byte_string()?,
                    &data.as_byte_string()?,
                )?))
            }),
            "(key: ByteString, clearText: ByteString, data: ByteString) -> ByteString",
        ),
        ServiceDef::of(
            "StaticEaxDecrypt",
            ServiceMethod::Class3(|key, clear, data| {
                Ok(Variant::byte_string(AesEax::static_eax_decrypt(
                    &key.as_byte_string()?,
                    &clear.as_byte_string()?,
                    &data.as_byte_string()?,
                )?))
            }),
            "(key: ByteString, clearText: ByteString, data: ByteString) -> ByteString",
        ),
        ServiceDef::of(
            "StaticEaxAuthenticate",
            ServiceMethod::Class2(|key, clear| {
                Ok(Variant::UInt(AesEax::static_eax_authenticate(
                    &key.as_byte_string()?,
                    &clear.as_byte_string()?,
                )?))
            }),
            "(key: ByteString, clearText: ByteString) -> UInt",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class0(|| Ok(Variant::from_object(std::sync::Arc::new(AesEax::new())))),
            0,
            "() -> AesEax",
        ),
        ServiceDef::overloaded(
            "New",
            ServiceMethod::Class1(|key| {
                Ok(Variant::from_object(std::sync::Arc::new(AesEax::with_key(
                    &key.as_byte_string()?,
                )?)))
            }),
            1,
            "(key: ByteString) -> AesEax",
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        0x0F,
    ];

    #[test]
    fn test_roundtrip() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let ciphertext = eax.eax_encrypt(b"abcdef", b"hello").unwrap();
        assert_eq!(ciphertext.len(), 5 + EAX_MAC_SIZE);
        assert_ne!(&ciphertext[..5], b"hello");
        let plain = eax.eax_decrypt(b"abcdef", &ciphertext).unwrap();
        assert_eq!(plain, b"hello");
    }

    #[test]
    fn test_roundtrip_block_sizes() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        for size in [0usize, 1, 15, 16, 17, 32, 33, 100] {
            let data: Vec<u8> = (0..size as u32).map(|i| (i * 7 + 3) as u8).collect();
            let nonce = b"a nonce that is longer than one block";
            let ciphertext = eax.eax_encrypt(nonce, &data).unwrap();
            let plain = eax.eax_decrypt(nonce, &ciphertext).unwrap();
            assert_eq!(plain, data, "size {}", size);
        }
    }

    #[test]
    fn test_tampering_detected() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let ciphertext = eax.eax_encrypt(b"abcdef", b"hello").unwrap();
        for bit in 0..ciphertext.len() * 8 {
            let mut bad = ciphertext.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            let err = eax.eax_decrypt(b"abcdef", &bad).unwrap_err();
            assert_eq!(err.code(), MErrorCode::ValidationFailed);
        }
    }

    #[test]
    fn test_wrong_nonce_rejected() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let ciphertext = eax.eax_encrypt(b"abcdef", b"hello").unwrap();
        assert!(eax.eax_decrypt(b"abcdeg", &ciphertext).is_err());
    }

    #[test]
    fn test_zero_payload_equals_authenticate() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let ciphertext = eax.eax_encrypt(b"abcdef", b"").unwrap();
        assert_eq!(ciphertext.len(), EAX_MAC_SIZE);
        let mac = eax.eax_authenticate(b"abcdef").unwrap();
        assert_eq!(ciphertext, mac.to_le_bytes());
        // And the zero-payload decrypt verifies it
        assert_eq!(eax.eax_decrypt(b"abcdef", &ciphertext).unwrap(), b"");
    }

    #[test]
    fn test_empty_nonce_mac_is_d_tail() {
        // A zero-length message leaves the CMAC seed untouched, so the
        // MAC over an empty nonce and payload is the low word of D.
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let mut l = [0u8; KEY_SIZE];
        Aes::with_key(&KEY).unwrap().encrypt_block(&mut l).unwrap();
        let d = dbl(&l);
        let mac = eax.eax_authenticate(b"").unwrap();
        assert_eq!(mac, u32::from_le_bytes([d[12], d[13], d[14], d[15]]));
    }

    #[test]
    fn test_short_input_rejected() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let err = eax.eax_decrypt(b"abcdef", b"abc").unwrap_err();
        assert_eq!(err.code(), MErrorCode::NumberOutOfRange);
    }

    #[test]
    fn test_static_forms_match_instance() {
        let mut eax = AesEax::with_key(&KEY).unwrap();
        let a = eax.eax_encrypt(b"nonce", b"payload").unwrap();
        let b = AesEax::static_eax_encrypt(&KEY, b"nonce", b"payload").unwrap();
        assert_eq!(a, b);
        assert_eq!(
            AesEax::static_eax_authenticate(&KEY, b"nonce").unwrap(),
            eax.eax_authenticate(b"nonce").unwrap()
        );
    }

    #[test]
    fn test_badcode_differs_and_roundtrips() {
        let mut good = AesEax::with_key(&KEY).unwrap();
        let mut bad = AesEax::with_badcode(&KEY).unwrap();
        let standard = good.eax_encrypt(b"abcdef", b"hello").unwrap();
        let draft = bad.eax_encrypt(b"abcdef", b"hello").unwrap();
        assert_ne!(standard, draft);
        assert_eq!(bad.eax_decrypt(b"abcdef", &draft).unwrap(), b"hello");
        assert!(bad.eax_decrypt(b"abcdef", &standard).is_err());
    }

    #[test]
    fn test_dbl_reduction() {
        // Top bit of the last byte folds 0x87 into byte 0
        let mut block = [0u8; KEY_SIZE];
        block[15] = 0x80;
        let out = dbl(&block);
        assert_eq!(out[0], 0x87);
        assert_eq!(out[15], 0x00);

        // A set bit shifts toward the following byte
        let mut block = [0u8; KEY_SIZE];
        block[0] = 0x80;
        let out = dbl(&block);
        assert_eq!(out[1], 0x01);
    }
}
