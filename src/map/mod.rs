pub mod encoding;
pub mod error;
pub mod helpers;
pub mod instance;
pub(crate) mod mask;
pub mod register;
pub mod schema;
pub mod shared;
pub mod value;

#[cfg(test)]
mod test_support;

pub use encoding::{TextDecodeError, TextEncoding};
pub use error::{BoxError, DefinitionIssue, RegisterError, Result};
pub use instance::RegisterMap;
pub use register::{CustomDecoder, Register, RegisterBuilder, ValueKind, ValueType};
pub use schema::{RegisterSchema, SchemaBuilder};
pub use shared::SharedRegisterMap;
pub use value::{ByteOrder, CustomValue, Integer, IntegerOverflow, Value};

pub mod prelude {
    pub use super::{
        ByteOrder, CustomValue, DefinitionIssue, Integer, Register, RegisterBuilder,
        RegisterError, RegisterMap, RegisterSchema, SchemaBuilder, SharedRegisterMap,
        TextEncoding, Value, ValueKind, ValueType,
    };
}
