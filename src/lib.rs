//! A `no_std` register-map decoder for passively observed bus traffic.
//!
//! Declare a device's registers once as a [`RegisterSchema`](map::RegisterSchema),
//! feed each decoded bus transaction (for example from a logic-analyzer I2C or
//! SPI decoder) into a [`RegisterMap`](map::RegisterMap), and read back typed
//! register values once all of their bytes have been seen.
//!
//! # Features
//!
//! - **Validated schemas** - overlapping registers and mismatched value options
//!   are rejected when the schema is built
//! - **O(log n) lookups** - point and range queries by binary search over
//!   address-sorted registers
//! - **Partial observation tracking** - "never seen" is distinct from "seen as
//!   zero"; registers decode only once every address unit has been observed
//! - **Typed values** - raw bytes, arbitrary-width integers in either byte
//!   order, fixed-encoding text, or a caller-supplied decoder
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  shared   ┌──────────────────────────┐
//! │ RegisterSchema   │──────────▶│ RegisterMap (per device) │
//! │ (immutable,      │  &'s ref  │                          │
//! │  sorted by addr) │           │  observe(addr, bytes)    │
//! │                  │◀──────────│  (fills buffer + mask)   │
//! │ register_        │  lookups  │                          │
//! │  containing()    │           │  deserialize(register)   │
//! │ registers_       │           │  (decodes when complete) │
//! │  intersecting()  │           │                          │
//! └──────────────────┘           └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use register_decoder::prelude::*;
//!
//! let schema = RegisterSchema::builder()
//!     .register("status", Register::bytes(0x00, 1)?)
//!     .register("temp", Register::signed(0x01, 2, ByteOrder::Big)?)
//!     .build()?;
//!
//! let mut map = RegisterMap::new(&schema);
//!
//! // A burst read of three bytes starting at 0x00
//! let touched = map.observe(0x00, &[0x80, 0xFF, 0x38])?;
//! assert_eq!(touched.len(), 2);
//!
//! let temp = map.deserialize_named("temp")?;
//! assert_eq!(temp.as_int().and_then(|v| v.to_i16()), Some(-200));
//! # Ok::<(), RegisterError>(())
//! ```

#![deny(unsafe_code)]
#![no_std]

extern crate alloc;

pub mod map;

pub mod prelude {
    pub use crate::map::prelude::*;
}
