use alloc::{string::String, sync::Arc};
use core::{any::Any, ops::Range};

use crate::map::{
    encoding::TextEncoding,
    error::{BoxError, DefinitionIssue, RegisterError, Result},
    value::{ByteOrder, CustomValue, Integer, Value},
};

type DecodeFn = dyn Fn(&[u8]) -> core::result::Result<CustomValue, BoxError> + Send + Sync;

/// Value type tag of a register declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bytes,
    Int,
    Text,
}

impl ValueType {
    pub fn label(&self) -> &'static str {
        match self {
            ValueType::Bytes => "bytes",
            ValueType::Int => "int",
            ValueType::Text => "text",
        }
    }
}

/// Caller-supplied decoder, shared between clones of a register.
#[derive(Clone)]
pub struct CustomDecoder {
    decode: Arc<DecodeFn>,
    annotation: &'static str,
}

impl CustomDecoder {
    /// Kind annotation: the explicit value type tag, or the decoder's return type.
    pub fn annotation(&self) -> &'static str {
        self.annotation
    }
}

impl core::fmt::Debug for CustomDecoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CustomDecoder({})", self.annotation)
    }
}

/// How a register's raw bytes turn into a [`Value`].
#[derive(Debug, Clone)]
pub enum ValueKind {
    RawBytes,
    UnsignedInt { byte_order: ByteOrder },
    SignedInt { byte_order: ByteOrder },
    Text { encoding: TextEncoding },
    Custom(CustomDecoder),
}

/// One named, addressed field of a device's register space.
///
/// Registers are declared with [`RegisterBuilder`] and get their name when a
/// [`RegisterSchema`](crate::map::RegisterSchema) is built from them.
///
/// A clone keeps the name but is a separate register: schemas and maps only
/// recognise their own instances.
#[derive(Clone)]
pub struct Register {
    address: usize,
    address_width: usize,
    description: Option<String>,
    kind: ValueKind,
    pub(crate) name: Option<String>,
}

impl Register {
    pub fn builder(address: usize) -> RegisterBuilder {
        RegisterBuilder::new(address)
    }

    /// Raw-bytes register spanning `width` address units.
    pub fn bytes(address: usize, width: usize) -> Result<Self> {
        Self::builder(address).width(width).build()
    }

    pub fn unsigned(address: usize, width: usize, byte_order: ByteOrder) -> Result<Self> {
        Self::builder(address)
            .width(width)
            .value_type(ValueType::Int)
            .byte_order(byte_order)
            .signed(false)
            .build()
    }

    pub fn signed(address: usize, width: usize, byte_order: ByteOrder) -> Result<Self> {
        Self::builder(address)
            .width(width)
            .value_type(ValueType::Int)
            .byte_order(byte_order)
            .signed(true)
            .build()
    }

    pub fn text(address: usize, width: usize, encoding: TextEncoding) -> Result<Self> {
        Self::builder(address)
            .width(width)
            .value_type(ValueType::Text)
            .text_encoding(encoding.label())
            .build()
    }

    pub fn custom<T, E, F>(address: usize, width: usize, decoder: F) -> Result<Self>
    where
        F: Fn(&[u8]) -> core::result::Result<T, E> + Send + Sync + 'static,
        T: Any + Send + Sync,
        E: Into<BoxError>,
    {
        Self::builder(address).width(width).decoder(decoder).build()
    }

    pub fn address(&self) -> usize {
        self.address
    }

    /// Number of address units this register spans.
    pub fn address_width(&self) -> usize {
        self.address_width
    }

    /// First address past this register.
    pub fn end(&self) -> usize {
        // Checked at construction
        self.address + self.address_width
    }

    pub fn range(&self) -> Range<usize> {
        self.address..self.end()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Returns the name assigned when the register was bound into a schema.
    pub fn name(&self) -> Result<&str> {
        self.name.as_deref().ok_or(RegisterError::Unbound {
            address: self.address,
        })
    }

    pub fn is_bound(&self) -> bool {
        self.name.is_some()
    }

    /// Introspection label for the decoded value type.
    pub fn value_type_name(&self) -> &'static str {
        match &self.kind {
            ValueKind::RawBytes => ValueType::Bytes.label(),
            ValueKind::UnsignedInt { .. } | ValueKind::SignedInt { .. } => ValueType::Int.label(),
            ValueKind::Text { .. } => ValueType::Text.label(),
            ValueKind::Custom(decoder) => decoder.annotation(),
        }
    }

    pub(crate) fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| alloc::format!("<unbound@{:#x}>", self.address))
    }

    /// Decodes `raw` according to this register's value kind.
    ///
    /// `raw` is expected to be exactly `address_width * address_unit_width`
    /// bytes; [`RegisterMap::deserialize`](crate::map::RegisterMap::deserialize)
    /// guarantees this.
    pub fn decode(&self, raw: &[u8]) -> Result<Value> {
        match &self.kind {
            ValueKind::RawBytes => Ok(Value::Bytes(raw.to_vec())),
            ValueKind::UnsignedInt { byte_order } => {
                Ok(Value::Int(Integer::from_bytes(raw, *byte_order, false)))
            }
            ValueKind::SignedInt { byte_order } => {
                Ok(Value::Int(Integer::from_bytes(raw, *byte_order, true)))
            }
            ValueKind::Text { encoding } => {
                encoding
                    .decode(raw)
                    .map(Value::Text)
                    .map_err(|source| RegisterError::TextDecode {
                        name: self.display_name(),
                        source,
                    })
            }
            ValueKind::Custom(decoder) => {
                (decoder.decode)(raw)
                    .map(Value::Custom)
                    .map_err(|source| RegisterError::Decoder {
                        name: self.display_name(),
                        source,
                    })
            }
        }
    }
}

impl core::fmt::Debug for Register {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Register({:#x}", self.address)?;
        if let Some(description) = &self.description {
            write!(f, ", description={description:?}")?;
        }
        if self.address_width != 1 {
            write!(f, ", address_width={}", self.address_width)?;
        }
        match &self.kind {
            ValueKind::RawBytes => {}
            ValueKind::UnsignedInt { byte_order } => {
                write!(f, ", value_type=int, byte_order={byte_order:?}, signed=false")?
            }
            ValueKind::SignedInt { byte_order } => {
                write!(f, ", value_type=int, byte_order={byte_order:?}, signed=true")?
            }
            ValueKind::Text { encoding } => {
                write!(f, ", value_type=text, text_encoding={encoding}")?
            }
            ValueKind::Custom(decoder) => write!(f, ", decoder={}", decoder.annotation())?,
        }
        write!(f, ")")
    }
}

/// Declaration of a [`Register`] with loosely typed options.
///
/// Options are checked against the value type in [`build`](Self::build).
#[derive(Clone)]
pub struct RegisterBuilder {
    address: usize,
    address_width: usize,
    description: Option<String>,
    value_type: Option<ValueType>,
    decoder: Option<(Arc<DecodeFn>, &'static str)>,
    byte_order: Option<ByteOrder>,
    signed: Option<bool>,
    text_encoding: Option<String>,
}

impl RegisterBuilder {
    pub fn new(address: usize) -> Self {
        Self {
            address,
            address_width: 1,
            description: None,
            value_type: None,
            decoder: None,
            byte_order: None,
            signed: None,
            text_encoding: None,
        }
    }

    /// Number of address units the register spans. Defaults to 1.
    pub fn width(mut self, address_width: usize) -> Self {
        self.address_width = address_width;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value type tag. Defaults to bytes, or annotates a custom decoder.
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = Some(byte_order);
        self
    }

    pub fn signed(mut self, signed: bool) -> Self {
        self.signed = Some(signed);
        self
    }

    /// Encoding label, e.g. `"utf-8"`, `"ascii"` or `"utf-16-le"`.
    pub fn text_encoding(mut self, label: impl Into<String>) -> Self {
        self.text_encoding = Some(label.into());
        self
    }

    pub fn decoder<T, E, F>(mut self, decoder: F) -> Self
    where
        F: Fn(&[u8]) -> core::result::Result<T, E> + Send + Sync + 'static,
        T: Any + Send + Sync,
        E: Into<BoxError>,
    {
        let decode: Arc<DecodeFn> =
            Arc::new(move |raw: &[u8]| -> core::result::Result<CustomValue, BoxError> {
                decoder(raw).map(CustomValue::new).map_err(Into::into)
            });
        self.decoder = Some((decode, core::any::type_name::<T>()));
        self
    }

    /// Validates the options against the value type and builds the register.
    ///
    /// Checks run in a fixed order and the first failure is reported: width,
    /// integer options, text options, then address overflow.
    pub fn build(self) -> Result<Register> {
        let address = self.address;
        let invalid = |issue| RegisterError::InvalidDefinition { address, issue };

        if self.address_width < 1 {
            return Err(invalid(DefinitionIssue::ZeroWidth));
        }

        let value_type = self.value_type.unwrap_or(ValueType::Bytes);
        let builtin = self.decoder.is_none();

        let int_kind = if builtin && value_type == ValueType::Int {
            let byte_order = self
                .byte_order
                .ok_or_else(|| invalid(DefinitionIssue::MissingByteOrder))?;
            match self.signed {
                Some(true) => Some(ValueKind::SignedInt { byte_order }),
                Some(false) => Some(ValueKind::UnsignedInt { byte_order }),
                None => return Err(invalid(DefinitionIssue::MissingSigned)),
            }
        } else if self.byte_order.is_some() {
            return Err(invalid(DefinitionIssue::ByteOrderNotAllowed));
        } else if self.signed.is_some() {
            return Err(invalid(DefinitionIssue::SignedNotAllowed));
        } else {
            None
        };

        let text_kind = if builtin && value_type == ValueType::Text {
            let label = self
                .text_encoding
                .as_deref()
                .ok_or_else(|| invalid(DefinitionIssue::MissingTextEncoding))?;
            let encoding = TextEncoding::from_label(label)
                .ok_or_else(|| invalid(DefinitionIssue::UnknownTextEncoding))?;
            Some(ValueKind::Text { encoding })
        } else if self.text_encoding.is_some() {
            return Err(invalid(DefinitionIssue::TextEncodingNotAllowed));
        } else {
            None
        };

        if self.address.checked_add(self.address_width).is_none() {
            return Err(invalid(DefinitionIssue::AddressOverflow));
        }

        let kind = match (self.decoder.clone(), int_kind.or(text_kind)) {
            (Some((decode, type_name)), _) => {
                let annotation = match self.value_type {
                    Some(tag) => tag.label(),
                    None => type_name,
                };
                ValueKind::Custom(CustomDecoder { decode, annotation })
            }
            (None, Some(kind)) => kind,
            (None, None) => ValueKind::RawBytes,
        };

        Ok(Register {
            address: self.address,
            address_width: self.address_width,
            description: self.description,
            kind,
            name: None,
        })
    }
}

impl core::fmt::Debug for RegisterBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterBuilder")
            .field("address", &self.address)
            .field("address_width", &self.address_width)
            .field("value_type", &self.value_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    fn issue(result: Result<Register>) -> DefinitionIssue {
        match result {
            Err(RegisterError::InvalidDefinition { issue, .. }) => issue,
            other => panic!("expected invalid definition, got {other:?}"),
        }
    }

    #[test]
    fn defaults_to_raw_bytes() {
        let reg = Register::builder(0x10).description("status").build().unwrap();
        assert_eq!(reg.address(), 0x10);
        assert_eq!(reg.address_width(), 1);
        assert_eq!(reg.range(), 0x10..0x11);
        assert_eq!(reg.description(), Some("status"));
        assert!(matches!(reg.kind(), ValueKind::RawBytes));
        assert_eq!(reg.value_type_name(), "bytes");
    }

    #[test]
    fn zero_width_rejected() {
        assert_eq!(
            issue(Register::bytes(0, 0)),
            DefinitionIssue::ZeroWidth
        );
        assert_eq!(
            issue(Register::bytes(usize::MAX, 1)),
            DefinitionIssue::AddressOverflow
        );
    }

    #[test]
    fn integer_option_scenarios() {
        let int = || Register::builder(0).value_type(ValueType::Int);

        assert_eq!(
            issue(int().signed(false).build()),
            DefinitionIssue::MissingByteOrder
        );
        assert_eq!(
            issue(int().byte_order(ByteOrder::Big).build()),
            DefinitionIssue::MissingSigned
        );
        assert_eq!(
            issue(
                int()
                    .byte_order(ByteOrder::Big)
                    .signed(true)
                    .text_encoding("utf-8")
                    .build()
            ),
            DefinitionIssue::TextEncodingNotAllowed
        );
        assert_eq!(
            issue(Register::builder(0).byte_order(ByteOrder::Little).build()),
            DefinitionIssue::ByteOrderNotAllowed
        );
        assert_eq!(
            issue(Register::builder(0).signed(true).build()),
            DefinitionIssue::SignedNotAllowed
        );

        let reg = int().byte_order(ByteOrder::Big).signed(true).build().unwrap();
        assert!(matches!(
            reg.kind(),
            ValueKind::SignedInt {
                byte_order: ByteOrder::Big
            }
        ));
    }

    #[test]
    fn checks_run_in_declaration_order() {
        // Integer options before text options
        let mixed = Register::builder(0)
            .value_type(ValueType::Int)
            .signed(true)
            .text_encoding("utf-8")
            .build();
        assert_eq!(issue(mixed), DefinitionIssue::MissingByteOrder);

        let mixed = Register::builder(0)
            .value_type(ValueType::Text)
            .byte_order(ByteOrder::Big)
            .build();
        assert_eq!(issue(mixed), DefinitionIssue::ByteOrderNotAllowed);

        // Address overflow is checked last
        let late = Register::builder(usize::MAX)
            .width(2)
            .value_type(ValueType::Text)
            .text_encoding("klingon")
            .build();
        assert_eq!(issue(late), DefinitionIssue::UnknownTextEncoding);

        // Width comes first
        let early = Register::builder(0).width(0).signed(true).build();
        assert_eq!(issue(early), DefinitionIssue::ZeroWidth);
    }

    #[test]
    fn text_option_scenarios() {
        let text = || Register::builder(0).value_type(ValueType::Text);

        assert_eq!(
            issue(text().build()),
            DefinitionIssue::MissingTextEncoding
        );
        assert_eq!(
            issue(text().text_encoding("klingon").build()),
            DefinitionIssue::UnknownTextEncoding
        );
        assert_eq!(
            issue(text().text_encoding("ascii").signed(false).build()),
            DefinitionIssue::SignedNotAllowed
        );
        assert_eq!(
            issue(Register::builder(0).text_encoding("ascii").build()),
            DefinitionIssue::TextEncodingNotAllowed
        );

        let reg = text().width(4).text_encoding("ASCII").build().unwrap();
        assert_eq!(reg.decode(b"ABCD").unwrap().as_str(), Some("ABCD"));
    }

    #[test]
    fn custom_decoder_rejects_builtin_options() {
        let custom = || Register::builder(0).decoder(|raw: &[u8]| Ok::<_, BoxError>(raw[0] == 1));

        assert_eq!(
            issue(custom().byte_order(ByteOrder::Little).build()),
            DefinitionIssue::ByteOrderNotAllowed
        );
        assert_eq!(
            issue(custom().signed(true).build()),
            DefinitionIssue::SignedNotAllowed
        );
        assert_eq!(
            issue(custom().text_encoding("utf-8").build()),
            DefinitionIssue::TextEncodingNotAllowed
        );
    }

    #[test]
    fn custom_decoder_annotation() {
        let inferred =
            Register::custom(0, 1, |raw: &[u8]| Ok::<_, BoxError>(raw[0] as u32)).unwrap();
        assert_eq!(inferred.value_type_name(), "u32");
        assert_eq!(
            inferred.decode(&[9]).unwrap().downcast_ref::<u32>(),
            Some(&9)
        );

        let tagged = Register::builder(0)
            .value_type(ValueType::Int)
            .decoder(|raw: &[u8]| Ok::<_, BoxError>(raw[0] as i64))
            .build()
            .unwrap();
        assert_eq!(tagged.value_type_name(), "int");
    }

    #[test]
    fn custom_decoder_error_propagates() {
        let reg = Register::custom(0, 1, |raw: &[u8]| {
            if raw[0] > 3 {
                Err("mode out of range")
            } else {
                Ok(raw[0])
            }
        })
        .unwrap();

        match reg.decode(&[7]) {
            Err(RegisterError::Decoder { source, .. }) => {
                assert_eq!(format!("{source}"), "mode out of range")
            }
            other => panic!("expected decoder error, got {other:?}"),
        }
    }

    #[test]
    fn text_decode_error_surfaces() {
        let reg = Register::text(0, 2, TextEncoding::Utf8).unwrap();
        assert!(matches!(
            reg.decode(&[0xC3, 0x28]),
            Err(RegisterError::TextDecode { .. })
        ));
    }

    #[test]
    fn name_is_unbound_until_schema_build() {
        let reg = Register::bytes(0x20, 1).unwrap();
        assert!(!reg.is_bound());
        assert!(matches!(
            reg.name(),
            Err(RegisterError::Unbound { address: 0x20 })
        ));
    }

    #[test]
    fn debug_renders_declaration() {
        let reg = Register::builder(0x10)
            .width(2)
            .value_type(ValueType::Int)
            .byte_order(ByteOrder::Little)
            .signed(true)
            .build()
            .unwrap();
        assert_eq!(
            format!("{reg:?}"),
            "Register(0x10, address_width=2, value_type=int, byte_order=Little, signed=true)"
        );
    }
}
