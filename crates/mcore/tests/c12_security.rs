// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end scenarios across the core: EAX' message authentication with
//! the C12.22 layout, reflection-driven invocation, and values crossing
//! stream boundaries.

use mcore::crypto::{Aes, AesEax, EAX_MAC_SIZE};
use mcore::stream::Stream;
use mcore::variant::{from_mdl_constant, to_mdl_constant, Variant};

const KEY: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
    0x0F,
];

#[test]
fn test_eax_zero_payload_mac_is_nonce_cmac() {
    // The MAC over an empty payload is the low word of the D-seeded CMAC
    // of the nonce, and equals the authenticate-only path.
    let mut eax = AesEax::with_key(&KEY).unwrap();
    let ciphertext = eax.eax_encrypt(b"abcdef", b"").unwrap();
    assert_eq!(ciphertext.len(), EAX_MAC_SIZE);
    let mac = eax.eax_authenticate(b"abcdef").unwrap();
    assert_eq!(ciphertext, mac.to_le_bytes());
}

#[test]
fn test_eax_round_trip_and_tamper() {
    let mut eax = AesEax::with_key(&KEY).unwrap();
    let ciphertext = eax.eax_encrypt(b"abcdef", b"hello").unwrap();
    assert_eq!(eax.eax_decrypt(b"abcdef", &ciphertext).unwrap(), b"hello");

    let mut bad = ciphertext.clone();
    *bad.last_mut().unwrap() ^= 0x01;
    assert!(eax.eax_decrypt(b"abcdef", &bad).is_err());
}

#[test]
fn test_eax_wire_layout() {
    // payload bytes first, then the 4-byte MAC
    let ciphertext = AesEax::static_eax_encrypt(&KEY, b"nonce", b"payload").unwrap();
    assert_eq!(ciphertext.len(), 7 + EAX_MAC_SIZE);
    let mut eax = AesEax::with_key(&KEY).unwrap();
    let mac = {
        let payload = &ciphertext[..7];
        let mut once = AesEax::with_key(&KEY).unwrap();
        let again = once.eax_encrypt(b"nonce", b"payload").unwrap();
        assert_eq!(&again[..7], payload);
        u32::from_le_bytes(again[7..].try_into().unwrap())
    };
    assert_eq!(
        eax.eax_decrypt(b"nonce", &ciphertext).unwrap(),
        b"payload"
    );
    assert_eq!(&ciphertext[7..], mac.to_le_bytes());
}

#[test]
fn test_reflected_crypto_invocation() {
    // Drive the cipher through the class registry, by name only.
    let cls = mcore::get_existing_class("AesEax").unwrap();
    let key = Variant::byte_string(KEY);
    let ciphertext = cls
        .call_v(
            "StaticEaxEncrypt",
            &[key.clone(), Variant::byte_string(b"abcdef"), Variant::byte_string(b"hello")],
        )
        .unwrap();
    let plain = cls
        .call_v(
            "StaticEaxDecrypt",
            &[key.clone(), Variant::byte_string(b"abcdef"), ciphertext.clone()],
        )
        .unwrap();
    assert_eq!(plain.as_byte_string().unwrap(), b"hello");

    // The same cipher as a reflected object
    let mut object = cls.call1("New", &key).unwrap();
    let obj = object.object_mut().unwrap();
    let mac = obj
        .call1("EaxAuthenticate", &Variant::byte_string(b"abcdef"))
        .unwrap();
    let expected = AesEax::static_eax_authenticate(&KEY, b"abcdef").unwrap();
    assert_eq!(mac.as_uint().unwrap(), expected);

    // The key size gate is reachable by name too
    assert!(mcore::get_existing_class("Aes")
        .unwrap()
        .call1("CheckKeySizeValid", &Variant::byte_string([0u8; 5]))
        .is_err());
    assert!(Aes::check_key_size_valid(&KEY).is_ok());
}

#[test]
fn test_values_cross_stream_and_text_boundaries() {
    // A configuration-shaped map travels as MDL text through a stream.
    let config = from_mdl_constant("{\"device\":\"C12 meter\",\"tables\":{1,2,3},\"secure\":TRUE}")
        .unwrap();
    let text = to_mdl_constant(&config).unwrap();

    let mut stream = Stream::memory();
    stream.write_raw_variant(&Variant::from(text.clone())).unwrap();
    stream.write_raw_variant(&Variant::Int(-1)).unwrap();
    stream.set_position(0).unwrap();

    let text_again = stream.read_raw_variant().unwrap().as_string().unwrap();
    assert_eq!(text_again, text);
    assert_eq!(stream.read_raw_variant().unwrap().as_int().unwrap(), -1);

    let config_again = from_mdl_constant(&text_again).unwrap();
    assert!(config.try_eq(&config_again).unwrap());
    assert_eq!(
        config_again
            .get_item(&Variant::from("device"))
            .unwrap()
            .as_string()
            .unwrap(),
        "C12 meter"
    );
}

#[test]
fn test_encrypted_stream_carries_raw_values() {
    const KEY_HEX: &str = "000102030405060708090A0B0C0D0E0F";

    let mut writer = Stream::memory();
    writer.set_key(KEY_HEX).unwrap();
    writer.write_raw_variant(&Variant::from("meter record")).unwrap();
    writer.close().unwrap();
    let stored = writer.memory_buffer().unwrap();
    assert_eq!(stored.len() % 16, 0);
    assert!(!stored.windows(5).any(|w| w == b"meter"));

    let mut reader = Stream::memory_from_bytes(&stored, mcore::stream::FLAG_READ_WRITE);
    reader.set_key(KEY_HEX).unwrap();
    assert_eq!(
        reader.read_raw_variant().unwrap().as_string().unwrap(),
        "meter record"
    );
}
