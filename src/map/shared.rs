use core::cell::RefCell;

use critical_section::Mutex;

use crate::map::{
    error::Result, instance::RegisterMap, register::Register, schema::RegisterSchema, value::Value,
};

/// A [`RegisterMap`] that several producers can feed.
///
/// Every call runs inside a critical section, so observations from an ISR, a
/// main loop or several decode threads are applied one at a time.
pub struct SharedRegisterMap<'s> {
    inner: Mutex<RefCell<RegisterMap<'s>>>,
}

impl<'s> SharedRegisterMap<'s> {
    pub fn new(schema: &'s RegisterSchema) -> Self {
        Self::from_map(RegisterMap::new(schema))
    }

    pub fn from_map(map: RegisterMap<'s>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(map)),
        }
    }

    /// See [`RegisterMap::observe`].
    pub fn observe(&self, address: usize, data: &[u8]) -> Result<&'s [Register]> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).observe(address, data))
    }

    /// See [`RegisterMap::deserialize`].
    pub fn deserialize(&self, register: &Register) -> Result<Value> {
        critical_section::with(|cs| self.inner.borrow_ref(cs).deserialize(register))
    }

    /// Runs `f` with exclusive access to the underlying map.
    pub fn with_map<R>(&self, f: impl FnOnce(&mut RegisterMap<'s>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    pub fn into_inner(self) -> RegisterMap<'s> {
        self.inner.into_inner().into_inner()
    }
}

impl core::fmt::Debug for SharedRegisterMap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedRegisterMap").finish_non_exhaustive()
    }
}
