//! Typed values example: wide address units and custom decoders
//!
//! This example demonstrates:
//! - Schemas whose address unit is wider than one byte
//! - Integers wider than any primitive
//! - Custom decoders producing caller-defined types
//! - Inspecting the declared schema

use register_decoder::prelude::*;

/// Operating mode packed into the low bits of a 16-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Measure,
    Calibrate,
}

fn decode_mode(raw: &[u8]) -> Result<Mode, String> {
    match u16::from_le_bytes([raw[0], raw[1]]) & 0x3 {
        0 => Ok(Mode::Idle),
        1 => Ok(Mode::Measure),
        2 => Ok(Mode::Calibrate),
        other => Err(format!("reserved mode {other}")),
    }
}

pub fn main() {
    // 16-bit address units, as on many SPI register files
    let schema = RegisterSchema::builder()
        .address_unit_width(2)
        .register(
            "mode",
            Register::builder(0x0)
                .description("Operating mode")
                .decoder(decode_mode)
                .build()
                .unwrap(),
        )
        .register("counter", Register::unsigned(0x1, 2, ByteOrder::Little).unwrap())
        .register("uid", Register::unsigned(0x4, 10, ByteOrder::Big).unwrap())
        .build()
        .unwrap();

    println!("{schema}");
    assert_eq!(schema.get("mode").unwrap().value_type_name(), core::any::type_name::<Mode>());

    let mut map = RegisterMap::new(&schema);

    // ========== Custom decoder ==========
    map.observe(0x0, &[0x02, 0x00]).unwrap();
    let mode = map.deserialize_named("mode").unwrap();
    assert_eq!(mode.downcast_ref::<Mode>(), Some(&Mode::Calibrate));

    // Decoder errors surface verbatim
    map.observe(0x0, &[0x03, 0x00]).unwrap();
    match map.deserialize_named("mode") {
        Err(RegisterError::Decoder { source, .. }) => {
            assert_eq!(source.to_string(), "reserved mode 3");
        }
        other => panic!("expected decoder error, got {other:?}"),
    }

    // ========== 32-bit counter across two units ==========
    map.observe(0x1, &[0x78, 0x56, 0x34, 0x12]).unwrap();
    let counter = map.deserialize_named("counter").unwrap();
    assert_eq!(counter.as_int().and_then(|v| v.to_u32()), Some(0x1234_5678));

    // ========== 160-bit identifier ==========
    let uid_bytes: Vec<u8> = (1..=20).collect();
    map.observe(0x4, &uid_bytes).unwrap();
    let uid = map.deserialize_named("uid").unwrap();
    let uid = uid.as_int().unwrap();
    assert_eq!(uid.byte_len(), 20);
    assert_eq!(uid.to_u128(), None, "too wide for a primitive");
    assert_eq!(uid.to_be_bytes(), uid_bytes);
    println!("uid = {uid}");
}
