use alloc::{boxed::Box, string::String};
use core::ops::Range;

use thiserror::Error;

use crate::map::encoding::TextDecodeError;

/// Boxed error produced by a caller-supplied decoder.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Alias for `Result<T, RegisterError>`.
pub type Result<T, E = RegisterError> = core::result::Result<T, E>;

/// Why a register declaration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionIssue {
    /// `address_width` was zero.
    ZeroWidth,
    /// Integer kind declared without a byte order.
    MissingByteOrder,
    /// Integer kind declared without signedness.
    MissingSigned,
    /// Text kind declared without an encoding.
    MissingTextEncoding,
    /// The text encoding label is not one we can decode.
    UnknownTextEncoding,
    /// Byte order given for a register that is not a built-in integer.
    ByteOrderNotAllowed,
    /// Signedness given for a register that is not a built-in integer.
    SignedNotAllowed,
    /// Text encoding given for a register that is not built-in text.
    TextEncodingNotAllowed,
    /// `address + address_width` does not fit in `usize`.
    AddressOverflow,
}

impl core::fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DefinitionIssue::ZeroWidth => write!(f, "address_width must be at least 1"),
            DefinitionIssue::MissingByteOrder => {
                write!(f, "byte_order is required when value_type=int")
            }
            DefinitionIssue::MissingSigned => write!(f, "signed is required when value_type=int"),
            DefinitionIssue::MissingTextEncoding => {
                write!(f, "text_encoding is required when value_type=text")
            }
            DefinitionIssue::UnknownTextEncoding => write!(f, "unknown text_encoding"),
            DefinitionIssue::ByteOrderNotAllowed => {
                write!(f, "byte_order is only allowed when value_type=int")
            }
            DefinitionIssue::SignedNotAllowed => {
                write!(f, "signed is only allowed when value_type=int")
            }
            DefinitionIssue::TextEncodingNotAllowed => {
                write!(f, "text_encoding is only allowed when value_type=text")
            }
            DefinitionIssue::AddressOverflow => write!(f, "register range overflows usize"),
        }
    }
}

/// Errors raised while declaring schemas, observing traffic, or decoding registers.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// A register's options do not match its value kind.
    #[error("invalid register definition at {address:#x}: {issue}")]
    InvalidDefinition {
        address: usize,
        issue: DefinitionIssue,
    },
    /// Two registers claim intersecting address ranges.
    #[error(
        "the registers {name} ({range:#x?}) and {existing} ({existing_range:#x?}) overlap"
    )]
    Overlap {
        name: String,
        range: Range<usize>,
        existing: String,
        existing_range: Range<usize>,
    },
    /// The same name was declared twice in one schema.
    #[error("register name {0:?} is declared more than once")]
    DuplicateName(String),
    /// The register has already been bound into a schema.
    #[error("register {name:?} is already bound to a schema")]
    AlreadyBound { name: String },
    /// Address units must be at least one byte wide.
    #[error("address_unit_width must be at least 1")]
    InvalidUnitWidth,
    /// The schema's address space does not fit in memory.
    #[error("address space of {units} units x {unit_width} bytes overflows usize")]
    AddressOverflow { units: usize, unit_width: usize },
    /// The register's name was queried before it was bound into a schema.
    #[error("register at {address:#x} is not bound to a schema")]
    Unbound { address: usize },
    /// Observed payload is empty or not a whole number of address units.
    #[error(
        "malformed observation at {address:#x}: {len} bytes is not a positive multiple of the {unit_width}-byte address unit"
    )]
    MalformedObservation {
        address: usize,
        len: usize,
        unit_width: usize,
    },
    /// At least one address unit of the register has not been observed yet.
    #[error("register {name:?} has not been observed (first missing unit {missing:#x})")]
    NotObserved { name: String, missing: usize },
    /// The register does not belong to the instance's schema.
    #[error("register {name:?} does not belong to this schema")]
    ForeignRegister { name: String },
    /// No register with this name exists in the schema.
    #[error("no register named {0:?}")]
    UnknownRegister(String),
    /// Raw bytes are not valid under the register's text encoding.
    #[error("register {name:?}: {source}")]
    TextDecode {
        name: String,
        #[source]
        source: TextDecodeError,
    },
    /// A caller-supplied decoder failed.
    #[error("register {name:?}: custom decoder failed: {source}")]
    Decoder {
        name: String,
        #[source]
        source: BoxError,
    },
}

impl RegisterError {
    /// Returns true if retrying after more traffic has been observed can succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RegisterError::NotObserved { .. })
    }
}
