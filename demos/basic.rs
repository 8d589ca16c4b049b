//! Basic example: decoding a sensor's registers from observed I2C traffic
//!
//! This example demonstrates:
//! - Declaring a register schema with the builder
//! - Feeding decoded bus transactions into a register map
//! - Reading back registers once all their bytes were seen
//! - Telling "not observed yet" apart from real decode failures

#![no_std]

use register_decoder::prelude::*;

// ============ Register Layout ============
// A small temperature sensor with byte-wide addresses:
//   0x00 WHO_AM_I  (1 byte, raw)
//   0x01 CTRL      (1 byte, unsigned)
//   0x02 TEMP      (2 bytes, signed big-endian, 1/100 degC)
//   0x10 SERIAL    (4 bytes, ASCII)

pub fn main() {
    let schema = RegisterSchema::builder()
        .register(
            "who_am_i",
            Register::builder(0x00)
                .description("Device identification")
                .build()
                .unwrap(),
        )
        .register("ctrl", Register::unsigned(0x01, 1, ByteOrder::Big).unwrap())
        .register("temp", Register::signed(0x02, 2, ByteOrder::Big).unwrap())
        .register("serial", Register::text(0x10, 4, TextEncoding::Ascii).unwrap())
        .build()
        .unwrap();

    assert_eq!(schema.address_space_size(), 0x14);

    let mut map = RegisterMap::new(&schema);

    // ========== Observed transactions ==========
    // Nothing seen yet: every register is pending
    let temp = schema.get("temp").unwrap();
    let err = map.deserialize(temp).unwrap_err();
    assert!(err.is_recoverable(), "should wait for more traffic");

    // Burst read of WHO_AM_I, CTRL and the high byte of TEMP
    let touched = map.observe(0x00, &[0x5A, 0x03, 0x09]).unwrap();
    assert_eq!(touched.len(), 3, "who_am_i, ctrl and temp are touched");

    // TEMP is only half observed
    assert!(!map.is_observed(temp));
    assert!(map.deserialize(temp).is_err());

    // The low byte arrives in a later transaction
    map.observe(0x03, &[0xC4]).unwrap();
    let value = map.deserialize(temp).unwrap();
    assert_eq!(value.as_int().and_then(|v| v.to_i16()), Some(2500)); // 25.00 degC

    // Raw and unsigned registers
    let who = map.deserialize_named("who_am_i").unwrap();
    assert_eq!(who.as_bytes(), Some(&[0x5A][..]));
    let ctrl = map.deserialize_named("ctrl").unwrap();
    assert_eq!(ctrl.as_int().and_then(|v| v.to_u8()), Some(3));

    // Traffic to undeclared addresses beyond the schema is ignored
    assert!(map.observe(0x40, &[0xFF, 0xFF]).unwrap().is_empty());

    // ========== Text register ==========
    map.observe(0x10, b"SN42").unwrap();
    let serial = map.deserialize_named("serial").unwrap();
    assert_eq!(serial.as_str(), Some("SN42"));
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_example() {
        super::main();
    }
}
