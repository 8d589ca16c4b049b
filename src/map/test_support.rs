//! Test support utilities - only compiled in test builds.

use alloc::vec::Vec;

use crate::map::{Register, RegisterError, RegisterSchema, Value};

/// `status` at 0 and `data` at 1, one byte-wide unit each.
pub fn status_data_schema() -> RegisterSchema {
    RegisterSchema::builder()
        .register(
            "status",
            Register::builder(0x00)
                .description("Status of device")
                .build()
                .unwrap(),
        )
        .register(
            "data",
            Register::builder(0x01)
                .description("Data from device")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

/// Registers with gaps: `a` = [2, 5), `b` = [5, 6), `c` = [10, 14).
pub fn spaced_schema() -> RegisterSchema {
    RegisterSchema::builder()
        .register("c", Register::bytes(10, 4).unwrap())
        .register("a", Register::bytes(2, 3).unwrap())
        .register("b", Register::bytes(5, 1).unwrap())
        .build()
        .unwrap()
}

/// Names of bound registers, in iteration order.
pub fn register_names<'a>(registers: impl IntoIterator<Item = &'a Register>) -> Vec<&'a str> {
    registers.into_iter().map(|r| r.name().unwrap()).collect()
}

/// Asserts that the result is a NotObserved error for `name`.
pub fn assert_not_observed(result: Result<Value, RegisterError>, name: &str) {
    match result {
        Err(RegisterError::NotObserved { name: got, .. }) => assert_eq!(got, name),
        other => panic!("expected NotObserved for {name}, got {other:?}"),
    }
}
