//! Shared map example: several producers feeding one register map
//!
//! This example demonstrates:
//! - One immutable schema shared by several instances
//! - A `SharedRegisterMap` fed from two threads (e.g. a read decoder and a
//!   write decoder), serialised through critical sections
//! - Checking which registers are complete afterwards

use register_decoder::prelude::*;
use std::thread;

pub fn main() {
    let schema = RegisterSchema::builder()
        .register("config", Register::unsigned(0x00, 2, ByteOrder::Little).unwrap())
        .register("status", Register::bytes(0x02, 1).unwrap())
        .register("fifo", Register::bytes(0x08, 8).unwrap())
        .build()
        .unwrap();

    let shared = SharedRegisterMap::new(&schema);

    thread::scope(|s| {
        // Writes issued by the host controller
        s.spawn(|| {
            shared.observe(0x00, &[0x34, 0x12]).unwrap();
        });

        // Reads returned by the device, one FIFO byte at a time
        s.spawn(|| {
            shared.observe(0x02, &[0x80]).unwrap();
            for (i, byte) in (0x08..0x10).zip(0xA0u8..) {
                shared.observe(i, &[byte]).unwrap();
            }
        });
    });

    let map = shared.into_inner();
    for register in &schema {
        assert!(map.is_observed(register), "{:?} should be complete", register);
    }

    let config = map.deserialize_named("config").unwrap();
    assert_eq!(config.as_int().and_then(|v| v.to_u16()), Some(0x1234));
    let fifo = map.deserialize_named("fifo").unwrap();
    assert_eq!(fifo.as_bytes().map(|b| b.len()), Some(8));

    // A second session against the same schema starts from scratch
    let fresh = RegisterMap::new(&schema);
    assert_eq!(fresh.observed_units(), 0);
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_shared_example() {
        super::main();
    }
}
