//! Decoded register values.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::any::Any;

use thiserror::Error;

/// Byte order of a multi-byte integer register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
}

/// A decoded register value.
#[derive(Debug)]
pub enum Value {
    /// Raw bytes, unchanged.
    Bytes(Vec<u8>),
    /// Fixed-width signed or unsigned integer.
    Int(Integer),
    /// Decoded text.
    Text(String),
    /// Output of a caller-supplied decoder.
    Custom(CustomValue),
}

impl Value {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&Integer> {
        match self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the custom value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Custom(c) => c.downcast_ref(),
            _ => None,
        }
    }
}

/// Type-erased output of a custom decoder.
pub struct CustomValue {
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl CustomValue {
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: core::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Name of the concrete type produced by the decoder.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Takes the value out as `T`, or gives `self` back on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(value) => Err(Self { type_name, value }),
        }
    }
}

impl core::fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CustomValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The integer does not fit in the requested primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("integer value out of range for the target type")]
pub struct IntegerOverflow;

/// Arbitrary-width integer decoded from a register.
///
/// Stored as little-endian bytes of the register's exact width. Signed
/// integers are two's complement. Two values compare equal only if their
/// width, signedness and bits match.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Integer {
    le: Vec<u8>,
    signed: bool,
}

/// Generates a checked conversion to an unsigned primitive.
macro_rules! impl_to_unsigned {
    ($type:ty) => {
        paste::paste! {
            #[doc = "Returns the value as `" $type "`, or `None` if it does not fit."]
            #[inline]
            pub fn [<to_ $type>](&self) -> Option<$type> {
                const SIZE: usize = core::mem::size_of::<$type>();
                if self.is_negative() || (SIZE..self.le.len()).any(|i| self.le[i] != 0) {
                    return None;
                }
                Some(<$type>::from_le_bytes(self.le_window::<SIZE>()))
            }
        }
    };
}

/// Generates a checked conversion to a signed primitive.
macro_rules! impl_to_signed {
    ($type:ty) => {
        paste::paste! {
            #[doc = "Returns the value as `" $type "`, or `None` if it does not fit."]
            #[inline]
            pub fn [<to_ $type>](&self) -> Option<$type> {
                const SIZE: usize = core::mem::size_of::<$type>();
                let fill = self.fill();
                if (SIZE..self.le.len()).any(|i| self.le[i] != fill) {
                    return None;
                }
                // Sign bit of the target must agree with the source sign.
                if (self.byte_at(SIZE - 1) & 0x80 != 0) != self.is_negative() {
                    return None;
                }
                Some(<$type>::from_le_bytes(self.le_window::<SIZE>()))
            }
        }
    };
}

/// Generates `TryFrom<&Integer>` for primitives with a `to_*` method.
macro_rules! impl_try_from_integer {
    ($($type:ty),*) => {
        $(
            paste::paste! {
                impl TryFrom<&Integer> for $type {
                    type Error = IntegerOverflow;

                    fn try_from(value: &Integer) -> Result<Self, Self::Error> {
                        value.[<to_ $type>]().ok_or(IntegerOverflow)
                    }
                }
            }
        )*
    };
}

impl Integer {
    /// Interprets `raw` as an integer of exactly `raw.len()` bytes.
    pub fn from_bytes(raw: &[u8], order: ByteOrder, signed: bool) -> Self {
        let mut le = raw.to_vec();
        if order == ByteOrder::Big {
            le.reverse();
        }
        Self { le, signed }
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Returns true for signed integers with the sign bit set.
    pub fn is_negative(&self) -> bool {
        self.signed && self.le.last().is_some_and(|b| b & 0x80 != 0)
    }

    /// Width of the integer in bytes.
    pub fn byte_len(&self) -> usize {
        self.le.len()
    }

    pub fn as_le_bytes(&self) -> &[u8] {
        &self.le
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.le.iter().rev().copied().collect()
    }

    fn fill(&self) -> u8 {
        if self.is_negative() { 0xFF } else { 0x00 }
    }

    /// Byte `i` of the sign- or zero-extended value.
    fn byte_at(&self, i: usize) -> u8 {
        self.le.get(i).copied().unwrap_or_else(|| self.fill())
    }

    fn le_window<const N: usize>(&self) -> [u8; N] {
        core::array::from_fn(|i| self.byte_at(i))
    }

    impl_to_unsigned!(u8);
    impl_to_unsigned!(u16);
    impl_to_unsigned!(u32);
    impl_to_unsigned!(u64);
    impl_to_unsigned!(u128);
    impl_to_signed!(i8);
    impl_to_signed!(i16);
    impl_to_signed!(i32);
    impl_to_signed!(i64);
    impl_to_signed!(i128);
}

impl_try_from_integer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl core::fmt::Display for Integer {
    /// Decimal when the value fits 128 bits, two's-complement hex otherwise.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_negative() {
            if let Some(v) = self.to_i128() {
                return write!(f, "{v}");
            }
        } else if let Some(v) = self.to_u128() {
            return write!(f, "{v}");
        }

        f.write_str("0x")?;
        for b in self.le.iter().rev() {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for Integer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = if self.signed { "i" } else { "u" };
        write!(f, "Integer({}_{}{})", self, kind, self.le.len() * 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn byte_order_scenarios() {
        let le = Integer::from_bytes(&[0x34, 0x12], ByteOrder::Little, false);
        let be = Integer::from_bytes(&[0x12, 0x34], ByteOrder::Big, false);
        assert_eq!(le, be);
        assert_eq!(le.to_u16(), Some(0x1234));
        assert_eq!(be.to_be_bytes(), [0x12, 0x34]);
    }

    #[test]
    fn signed_conversions() {
        let minus_two = Integer::from_bytes(&[0xFE, 0xFF, 0xFF], ByteOrder::Little, true);
        assert!(minus_two.is_negative());
        assert_eq!(minus_two.to_i8(), Some(-2));
        assert_eq!(minus_two.to_i32(), Some(-2));
        assert_eq!(minus_two.to_u32(), None);

        let unsigned = Integer::from_bytes(&[0xFE, 0xFF, 0xFF], ByteOrder::Little, false);
        assert!(!unsigned.is_negative());
        assert_eq!(unsigned.to_u32(), Some(0x00FF_FFFE));
        assert_eq!(unsigned.to_i32(), Some(0x00FF_FFFE));
        assert_eq!(unsigned.to_i16(), None);
        assert_eq!(unsigned.to_u16(), None);
    }

    #[test]
    fn sign_boundary_checks() {
        let x80 = Integer::from_bytes(&[0x80], ByteOrder::Little, false);
        assert_eq!(x80.to_u8(), Some(0x80));
        assert_eq!(x80.to_i8(), None);
        assert_eq!(x80.to_i16(), Some(0x80));

        let min = Integer::from_bytes(&[0x80], ByteOrder::Little, true);
        assert_eq!(min.to_i8(), Some(i8::MIN));
        assert_eq!(i64::try_from(&min), Ok(-128));
        assert_eq!(u64::try_from(&min), Err(IntegerOverflow));
    }

    #[test]
    fn wide_integer_display() {
        let mut raw = [0u8; 20];
        raw[19] = 0x01;
        let wide = Integer::from_bytes(&raw, ByteOrder::Little, false);
        assert_eq!(wide.to_u128(), None);
        assert!(wide.to_string().starts_with("0x01"));

        let small = Integer::from_bytes(&[0xFF; 20], ByteOrder::Big, true);
        assert_eq!(small.to_string(), "-1");
        assert_eq!(small.to_i8(), Some(-1));
    }

    #[test]
    fn custom_value_downcast() {
        let value = Value::Custom(CustomValue::new(7u16));
        assert_eq!(value.downcast_ref::<u16>(), Some(&7));
        assert_eq!(value.downcast_ref::<u32>(), None);

        let Value::Custom(custom) = value else {
            panic!("expected custom value");
        };
        assert_eq!(custom.type_name(), "u16");
        let custom = custom.downcast::<u8>().unwrap_err();
        assert_eq!(custom.downcast::<u16>().unwrap(), 7);
    }
}
