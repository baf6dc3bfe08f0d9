// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use alloc::string::String;
use alloc::vec::Vec;

use crate::fdt::FdtProperty;

/// A mutable, in-memory device tree property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTreeProperty {
    name: String,
    value: Vec<u8>,
}

impl DeviceTreeProperty {
    /// Creates a property with the given name and value bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the name of this property.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw value bytes of this property.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replaces the full value of this property.
    pub fn set_value(&mut self, value: impl Into<Vec<u8>>) {
        self.value = value.into();
    }

    /// Appends bytes to the existing value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qcdt_device_tree::model::DeviceTreeProperty;
    /// let mut prop = DeviceTreeProperty::new("id", 1u32.to_be_bytes());
    /// prop.append_value(2u32.to_be_bytes());
    /// assert_eq!(prop.value().len(), 8);
    /// ```
    pub fn append_value(&mut self, bytes: impl AsRef<[u8]>) {
        self.value.extend_from_slice(bytes.as_ref());
    }

    /// Interprets the value as a single big-endian `u32`, if it is
    /// exactly 4 bytes long.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        self.value
            .as_slice()
            .try_into()
            .map(u32::from_be_bytes)
            .ok()
    }
}

impl<'a> From<FdtProperty<'a>> for DeviceTreeProperty {
    fn from(prop: FdtProperty<'a>) -> Self {
        DeviceTreeProperty::new(prop.name(), prop.value())
    }
}
