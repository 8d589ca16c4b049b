//! Utility functions for address-unit and byte-span calculations.
//!
//! Addresses are counted in address units; the byte buffer behind a
//! [`RegisterMap`](crate::map::RegisterMap) is indexed in bytes. These helpers
//! convert between the two and validate observed payloads.

use core::ops::Range;

use crate::map::RegisterError;

/// Address units covered by an observed payload of `len` bytes at `address`.
///
/// The end is saturated at `usize::MAX`; callers clamp it to the address space.
///
/// # Errors
/// * [`RegisterError::MalformedObservation`] - if `len` is zero or not a
///   multiple of `unit_width`
///
/// # Example
/// ```
/// use register_decoder::map::helpers::observation_units;
///
/// // 6 bytes of 2-byte units starting at unit 4 cover units 4..7
/// assert_eq!(observation_units(4, 6, 2).unwrap(), 4..7);
/// assert!(observation_units(4, 5, 2).is_err());
/// ```
pub fn observation_units(
    address: usize,
    len: usize,
    unit_width: usize,
) -> Result<Range<usize>, RegisterError> {
    if len == 0 || unit_width == 0 || len % unit_width != 0 {
        return Err(RegisterError::MalformedObservation {
            address,
            len,
            unit_width,
        });
    }

    Ok(address..address.saturating_add(len / unit_width))
}

/// Clamps a span of address units to `[0, limit)`.
///
/// Returns `None` if the span starts at or beyond `limit`.
///
/// # Example
/// ```
/// use register_decoder::map::helpers::clamp_units;
///
/// assert_eq!(clamp_units(2..6, 4), Some(2..4));
/// assert_eq!(clamp_units(4..6, 4), None);
/// ```
pub fn clamp_units(units: Range<usize>, limit: usize) -> Option<Range<usize>> {
    if units.start >= limit {
        return None;
    }
    Some(units.start..units.end.min(limit))
}

/// Byte offsets `[start, end)` backing a span of address units.
///
/// The span must lie within an address space whose byte size fits `usize`,
/// which [`RegisterSchema`](crate::map::RegisterSchema) guarantees for its own range.
pub fn byte_span(units: &Range<usize>, unit_width: usize) -> Range<usize> {
    units.start * unit_width..units.end * unit_width
}

#[test]
fn observation_units_edge_cases() {
    // Empty payload
    assert!(matches!(
        observation_units(0, 0, 1),
        Err(RegisterError::MalformedObservation { len: 0, .. })
    ));

    // Partial unit
    assert!(matches!(
        observation_units(3, 3, 2),
        Err(RegisterError::MalformedObservation {
            address: 3,
            len: 3,
            unit_width: 2
        })
    ));

    // Whole units
    assert_eq!(observation_units(3, 8, 4).unwrap(), 3..5);
    assert_eq!(observation_units(0, 1, 1).unwrap(), 0..1);

    // End saturates instead of wrapping
    assert_eq!(
        observation_units(usize::MAX - 1, 4, 1).unwrap(),
        usize::MAX - 1..usize::MAX
    );
}

#[test]
fn clamp_and_byte_span() {
    assert_eq!(clamp_units(0..2, 2), Some(0..2));
    assert_eq!(clamp_units(1..10, 2), Some(1..2));
    assert_eq!(clamp_units(2..3, 2), None);
    assert_eq!(clamp_units(0..1, 0), None);

    assert_eq!(byte_span(&(0..1), 1), 0..1);
    assert_eq!(byte_span(&(2..5), 4), 8..20);
}
