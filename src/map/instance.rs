use alloc::{vec, vec::Vec};

use crate::map::{
    error::{RegisterError, Result},
    helpers::{byte_span, clamp_units, observation_units},
    mask::ObservedMask,
    register::Register,
    schema::RegisterSchema,
    value::Value,
};

/// Observed register state of one device, bound to a [`RegisterSchema`].
///
/// Holds a byte buffer covering the schema's address space and a per-unit
/// observed mask. Bytes at unobserved units are never handed out.
///
/// Not synchronised: concurrent producers must serialise their calls, for
/// example through [`SharedRegisterMap`](crate::map::SharedRegisterMap).
pub struct RegisterMap<'s> {
    schema: &'s RegisterSchema,
    bytes: Vec<u8>,
    observed: ObservedMask,
}

impl<'s> RegisterMap<'s> {
    pub fn new(schema: &'s RegisterSchema) -> Self {
        Self {
            schema,
            bytes: vec![0; schema.byte_len()],
            observed: ObservedMask::new(schema.address_space_size()),
        }
    }

    pub fn schema(&self) -> &'s RegisterSchema {
        self.schema
    }

    /// Records bytes read from or written to the device starting at `address`.
    ///
    /// Returns every register overlapping the observed span, whether or not it
    /// is now fully observed. Traffic starting beyond the schema's address
    /// space is ignored, and the part of a span running past its end is dropped.
    ///
    /// # Errors
    /// * [`RegisterError::MalformedObservation`] - `data` is empty or not a whole
    ///   number of address units; nothing is recorded
    pub fn observe(&mut self, address: usize, data: &[u8]) -> Result<&'s [Register]> {
        let schema = self.schema;
        let unit_width = schema.address_unit_width();
        let units = observation_units(address, data.len(), unit_width)?;

        let Some(in_range) = clamp_units(units.clone(), schema.address_space_size()) else {
            log::trace!(
                "ignoring {} bytes at {:#x}: outside register space",
                data.len(),
                address
            );
            return Ok(&[]);
        };

        let span = byte_span(&in_range, unit_width);
        let len = span.len();
        self.bytes[span].copy_from_slice(&data[..len]);
        self.observed.mark(in_range);

        let touched = schema.registers_intersecting(units);
        log::trace!(
            "observed {} bytes at {:#x}, {} registers touched",
            data.len(),
            address,
            touched.len()
        );
        Ok(touched)
    }

    /// Decodes `register` from the observed bytes.
    ///
    /// `register` must be a reference into this map's schema, as returned by
    /// [`RegisterSchema::get`], iteration or [`observe`](Self::observe). A
    /// clone, even of one of the schema's own registers, is not accepted.
    ///
    /// # Errors
    /// * [`RegisterError::ForeignRegister`] - `register` is not from this schema
    /// * [`RegisterError::NotObserved`] - some unit of the register is unobserved
    /// * [`RegisterError::TextDecode`] / [`RegisterError::Decoder`] - decoding failed
    pub fn deserialize(&self, register: &Register) -> Result<Value> {
        if !self.schema.contains(register) {
            return Err(RegisterError::ForeignRegister {
                name: register.display_name(),
            });
        }

        let units = register.range();
        if let Some(missing) = self.observed.first_unobserved(units.clone()) {
            log::debug!(
                "register {} not yet observed, unit {:#x} missing",
                register.display_name(),
                missing
            );
            return Err(RegisterError::NotObserved {
                name: register.display_name(),
                missing,
            });
        }

        let span = byte_span(&units, self.schema.address_unit_width());
        register.decode(&self.bytes[span]).inspect_err(|err| {
            log::debug!("register {} failed to decode: {}", register.display_name(), err);
        })
    }

    /// Decodes the register called `name`.
    pub fn deserialize_named(&self, name: &str) -> Result<Value> {
        let register = self
            .schema
            .get(name)
            .ok_or_else(|| RegisterError::UnknownRegister(name.into()))?;
        self.deserialize(register)
    }

    /// Returns true if every unit of `register` has been observed.
    pub fn is_observed(&self, register: &Register) -> bool {
        self.observed.first_unobserved(register.range()).is_none()
    }

    pub fn is_unit_observed(&self, address: usize) -> bool {
        self.observed.is_observed(address)
    }

    /// Number of address units observed so far.
    pub fn observed_units(&self) -> usize {
        self.observed.count()
    }
}

impl core::fmt::Debug for RegisterMap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterMap")
            .field("address_space_size", &self.observed.len())
            .field("observed_units", &self.observed_units())
            .finish_non_exhaustive()
    }
}
