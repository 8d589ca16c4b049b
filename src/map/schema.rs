use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};
use core::ops::Range;

use crate::map::{
    error::{RegisterError, Result},
    register::Register,
};

/// Index of the first register whose end is past `address`.
fn first_ending_after(registers: &[Register], address: usize) -> usize {
    registers.partition_point(|r| r.end() <= address)
}

/// Index of the first register starting at or after `address`.
fn first_starting_from(registers: &[Register], address: usize) -> usize {
    registers.partition_point(|r| r.address() < address)
}

/// Registers of a sorted, non-overlapping slice that intersect `range`.
/// An empty range intersects nothing.
///
/// Everything from `left` on intersects `[start, inf)` and everything before
/// `right` intersects `[0, stop)`, so the answer is the contiguous `left..right`.
fn intersecting(registers: &[Register], range: Range<usize>) -> &[Register] {
    if range.is_empty() {
        return &[];
    }
    let left = first_ending_after(registers, range.start);
    let right = first_starting_from(registers, range.end);
    if left < right {
        &registers[left..right]
    } else {
        &[]
    }
}

/// Immutable, validated set of named registers sorted by address.
///
/// Built once with [`SchemaBuilder`] and shared read-only by any number of
/// [`RegisterMap`](crate::map::RegisterMap) instances.
pub struct RegisterSchema {
    registers: Vec<Register>,
    names: BTreeMap<String, usize>,
    address_unit_width: usize,
    address_space_size: usize,
}

impl RegisterSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Builds a schema from `(name, register)` pairs.
    pub fn new<N, I>(address_unit_width: usize, registers: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Register)>,
    {
        Self::builder()
            .address_unit_width(address_unit_width)
            .registers(registers)
            .build()
    }

    /// Bytes per address unit.
    pub fn address_unit_width(&self) -> usize {
        self.address_unit_width
    }

    /// One past the highest address covered by any register, or 0 if empty.
    pub fn address_space_size(&self) -> usize {
        self.address_space_size
    }

    /// Size of the address space in bytes.
    pub fn byte_len(&self) -> usize {
        // Checked at build
        self.address_space_size * self.address_unit_width
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }

    /// Registers in ascending address order.
    pub fn iter(&self) -> core::slice::Iter<'_, Register> {
        self.registers.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Register> {
        self.names.get(name).map(|&idx| &self.registers[idx])
    }

    /// Returns the register whose range contains `address`.
    pub fn register_containing(&self, address: usize) -> Option<&Register> {
        // Only candidate: anything earlier ends at or before `address`, anything
        // later starts at or after this register's end.
        let idx = first_ending_after(&self.registers, address);
        self.registers
            .get(idx)
            .filter(|r| r.address() <= address)
    }

    /// Returns the registers overlapping the half-open `range`, in address order.
    /// Empty ranges, including `start > end`, give an empty slice.
    pub fn registers_intersecting(&self, range: Range<usize>) -> &[Register] {
        intersecting(&self.registers, range)
    }

    /// Returns true if `register` is this schema's own instance.
    pub fn contains(&self, register: &Register) -> bool {
        self.register_containing(register.address())
            .is_some_and(|r| core::ptr::eq(r, register))
    }
}

impl<'a> IntoIterator for &'a RegisterSchema {
    type Item = &'a Register;
    type IntoIter = core::slice::Iter<'a, Register>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl core::fmt::Debug for RegisterSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterSchema")
            .field("address_unit_width", &self.address_unit_width)
            .field("address_space_size", &self.address_space_size)
            .field("registers", &self.registers)
            .finish()
    }
}

impl core::fmt::Display for RegisterSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "RegisterSchema:")?;
        if self.address_unit_width != 1 {
            writeln!(f, "  address_unit_width = {}", self.address_unit_width)?;
        }
        for register in self {
            writeln!(f, "  {} = {:?}", register.display_name(), register)?;
        }
        Ok(())
    }
}

/// Collects `(name, register)` declarations and validates them into a
/// [`RegisterSchema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    address_unit_width: usize,
    entries: Vec<(String, Register)>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            address_unit_width: 1,
            entries: Vec::new(),
        }
    }

    /// Bytes per address unit. Defaults to 1.
    pub fn address_unit_width(mut self, address_unit_width: usize) -> Self {
        self.address_unit_width = address_unit_width;
        self
    }

    pub fn register(mut self, name: impl Into<String>, register: Register) -> Self {
        self.entries.push((name.into(), register));
        self
    }

    /// Declares every register of `parent` under its existing name.
    ///
    /// The registers are copied unbound, so `parent` stays usable and the new
    /// schema owns its own instances.
    pub fn extend_from(mut self, parent: &RegisterSchema) -> Self {
        for register in parent {
            let mut copy = register.clone();
            if let Some(name) = copy.name.take() {
                self.entries.push((name, copy));
            }
        }
        self
    }

    pub fn registers<N, I>(mut self, registers: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Register)>,
    {
        self.entries
            .extend(registers.into_iter().map(|(name, reg)| (name.into(), reg)));
        self
    }

    /// Binds names and inserts registers in declaration order.
    ///
    /// # Errors
    /// * [`RegisterError::InvalidUnitWidth`] - address unit width is zero
    /// * [`RegisterError::AlreadyBound`] - a register already belongs to a schema
    /// * [`RegisterError::DuplicateName`] - a name is declared twice
    /// * [`RegisterError::Overlap`] - a register intersects an earlier one; the
    ///   lowest-addressed earlier register it intersects is reported
    /// * [`RegisterError::AddressOverflow`] - the address space in bytes overflows `usize`
    pub fn build(self) -> Result<RegisterSchema> {
        let unit_width = self.address_unit_width;
        if unit_width == 0 {
            return Err(RegisterError::InvalidUnitWidth);
        }

        let mut sorted: Vec<Register> = Vec::with_capacity(self.entries.len());
        let mut seen = BTreeSet::new();

        for (name, mut register) in self.entries {
            if let Some(bound) = &register.name {
                return Err(RegisterError::AlreadyBound {
                    name: bound.clone(),
                });
            }
            if !seen.insert(name.clone()) {
                return Err(RegisterError::DuplicateName(name));
            }

            if let Some(existing) = intersecting(&sorted, register.range()).first() {
                return Err(RegisterError::Overlap {
                    range: register.range(),
                    name,
                    existing: existing.display_name(),
                    existing_range: existing.range(),
                });
            }

            register.name = Some(name);
            let idx = first_starting_from(&sorted, register.address());
            sorted.insert(idx, register);
        }

        let address_space_size = sorted.last().map_or(0, Register::end);
        if address_space_size.checked_mul(unit_width).is_none() {
            return Err(RegisterError::AddressOverflow {
                units: address_space_size,
                unit_width,
            });
        }

        let names = sorted
            .iter()
            .enumerate()
            .filter_map(|(idx, r)| r.name.clone().map(|name| (name, idx)))
            .collect();

        log::debug!(
            "built register schema: {} registers, {} address units x {} bytes",
            sorted.len(),
            address_space_size,
            unit_width
        );

        Ok(RegisterSchema {
            registers: sorted,
            names,
            address_unit_width: unit_width,
            address_space_size,
        })
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
