//! Option registry: typed get/set over a device's option list

use super::{OptionDescriptor, SetInfo, Value, ValueType};
use crate::backend::DeviceHandle;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Snapshot of a device's option descriptors with name lookup
///
/// The registry holds metadata only. Values are read from and written to
/// the device on every call. The snapshot goes stale when a set reports
/// [`SetInfo::RELOAD_OPTIONS`]; refetching is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    descriptors: Vec<OptionDescriptor>,
    index: HashMap<String, usize>,
}

impl OptionRegistry {
    /// Build a registry from descriptors in device order
    ///
    /// If a name appears twice, the first occurrence wins.
    pub fn new(descriptors: Vec<OptionDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, desc) in descriptors.iter().enumerate() {
            if index.contains_key(&desc.name) {
                log::warn!("Duplicate option name '{}' at index {}, ignoring", desc.name, i);
                continue;
            }
            index.insert(desc.name.clone(), i);
        }
        Self { descriptors, index }
    }

    /// Fetch descriptors from the device
    pub fn fetch(handle: &mut dyn DeviceHandle) -> Result<Self> {
        let descriptors = handle.option_descriptors()?;
        log::debug!("Fetched {} option descriptors", descriptors.len());
        Ok(Self::new(descriptors))
    }

    /// All descriptors, in device order
    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the device exposes no options
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Look up a descriptor by name
    pub fn get(&self, name: &str) -> Option<&OptionDescriptor> {
        self.index.get(name).map(|&i| &self.descriptors[i])
    }

    fn lookup(&self, name: &str) -> Result<(usize, &OptionDescriptor)> {
        self.index
            .get(name)
            .map(|&i| (i, &self.descriptors[i]))
            .ok_or_else(|| Error::UnknownOption {
                name: name.to_string(),
            })
    }

    /// Read an option value from the device
    ///
    /// Inactive options are rejected without touching the device. The value
    /// returned by the device is checked against the declared type.
    pub fn get_value(&self, handle: &mut dyn DeviceHandle, name: &str) -> Result<Value> {
        let (index, desc) = self.lookup(name)?;
        if !desc.is_active() {
            return Err(Error::InactiveOption {
                name: name.to_string(),
            });
        }

        let value = handle.get_option(index)?;
        if !desc.value_type.accepts(&value) {
            return Err(Error::TypeMismatch {
                name: name.to_string(),
                expected: desc.value_type,
                actual: value.kind(),
            });
        }

        log::trace!("get {} = {}", name, value);
        Ok(value)
    }

    /// Validate a value and write it to the device
    ///
    /// An integer given to a float option is widened. Nothing reaches the
    /// device unless the value passes the type and constraint checks, so a
    /// rejected set leaves the device's value unchanged.
    pub fn set_value(
        &self,
        handle: &mut dyn DeviceHandle,
        name: &str,
        value: Value,
    ) -> Result<SetInfo> {
        let (index, desc) = self.lookup(name)?;
        if !desc.is_active() {
            return Err(Error::InactiveOption {
                name: name.to_string(),
            });
        }
        if !desc.is_settable() {
            return Err(Error::ReadOnly {
                name: name.to_string(),
            });
        }

        let value = match (desc.value_type, value) {
            (ValueType::Float, Value::Int(i)) => Value::Float(f64::from(i)),
            (_, value) => value,
        };
        if !desc.value_type.accepts(&value) {
            return Err(Error::TypeMismatch {
                name: name.to_string(),
                expected: desc.value_type,
                actual: value.kind(),
            });
        }
        desc.constraint
            .check(&value)
            .map_err(|reason| Error::ConstraintViolation {
                name: name.to_string(),
                reason,
            })?;

        let info = handle.set_option(index, &value)?;
        log::debug!("set {} = {} ({:?})", name, value, info);
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeDevice;

    fn setup() -> (FakeDevice, OptionRegistry) {
        let mut dev = FakeDevice::new();
        let registry = OptionRegistry::fetch(&mut dev).unwrap();
        (dev, registry)
    }

    #[test]
    fn test_order_preserved() {
        let (_, registry) = setup();
        let names: Vec<&str> = registry
            .descriptors()
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["mode", "resolution", "br-x", "scan", "depth", "broken"]
        );
    }

    #[test]
    fn test_get_value() {
        let (mut dev, registry) = setup();
        assert_eq!(
            registry.get_value(&mut dev, "resolution").unwrap(),
            Value::Int(300)
        );
        assert_eq!(
            registry.get_value(&mut dev, "scan").unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_get_unknown() {
        let (mut dev, registry) = setup();
        assert!(matches!(
            registry.get_value(&mut dev, "nope"),
            Err(Error::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_get_inactive_skips_device() {
        let (mut dev, registry) = setup();
        assert!(matches!(
            registry.get_value(&mut dev, "depth"),
            Err(Error::InactiveOption { .. })
        ));
        assert_eq!(dev.gets, 0);
    }

    #[test]
    fn test_get_type_mismatch() {
        let (mut dev, registry) = setup();
        match registry.get_value(&mut dev, "broken") {
            Err(Error::TypeMismatch {
                name,
                expected,
                actual,
            }) => {
                assert_eq!(name, "broken");
                assert_eq!(expected, ValueType::Int);
                assert_eq!(actual, ValueType::String);
            }
            other => panic!("expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_set_constraint_violation_leaves_value() {
        let (mut dev, registry) = setup();
        assert!(matches!(
            registry.set_value(&mut dev, "resolution", Value::Int(4800)),
            Err(Error::ConstraintViolation { .. })
        ));
        assert!(matches!(
            registry.set_value(&mut dev, "mode", Value::from("Infrared")),
            Err(Error::ConstraintViolation { .. })
        ));
        assert_eq!(dev.sets, 0);
        assert_eq!(
            registry.get_value(&mut dev, "resolution").unwrap(),
            Value::Int(300)
        );
    }

    #[test]
    fn test_set_read_only_and_inactive() {
        let (mut dev, registry) = setup();
        assert!(matches!(
            registry.set_value(&mut dev, "scan", Value::Bool(true)),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(
            registry.set_value(&mut dev, "depth", Value::Int(8)),
            Err(Error::InactiveOption { .. })
        ));
        assert_eq!(dev.sets, 0);
    }

    #[test]
    fn test_set_type_checks_and_widens() {
        let (mut dev, registry) = setup();
        assert!(matches!(
            registry.set_value(&mut dev, "resolution", Value::from("300")),
            Err(Error::TypeMismatch { .. })
        ));

        let info = registry
            .set_value(&mut dev, "br-x", Value::Int(150))
            .unwrap();
        assert!(info.contains(SetInfo::RELOAD_PARAMS));
        assert_eq!(
            registry.get_value(&mut dev, "br-x").unwrap(),
            Value::Float(150.0)
        );
    }
}
