//! Option descriptor and value types

use bitflags::bitflags;
use core::fmt;

/// Declared type of a scanner option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean flag
    Bool,
    /// 32-bit signed integer
    Int,
    /// Floating-point number
    Float,
    /// Text
    String,
    /// Physical control or action; reads as a boolean, never set by the client
    Trigger,
}

impl ValueType {
    /// Whether a value of this runtime kind is valid for an option of this type
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueType::Bool | ValueType::Trigger, Value::Bool(_))
                | (ValueType::Int, Value::Int(_))
                | (ValueType::Float, Value::Float(_))
                | (ValueType::String, Value::String(_))
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Trigger => "button",
        };
        f.write_str(name)
    }
}

/// Physical unit of an option value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// Unitless
    #[default]
    None,
    /// Pixels
    Pixel,
    /// Bits
    Bit,
    /// Millimeters
    Millimeter,
    /// Dots per inch
    Dpi,
    /// Percent
    Percent,
    /// Milliseconds
    Millisecond,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self {
            Unit::None => "",
            Unit::Pixel => "px",
            Unit::Bit => "bit",
            Unit::Millimeter => "mm",
            Unit::Dpi => "dpi",
            Unit::Percent => "%",
            Unit::Millisecond => "ms",
        };
        f.write_str(suffix)
    }
}

/// Dynamically typed option value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean (also used for trigger options)
    Bool(bool),
    /// Integer
    Int(i32),
    /// Floating-point
    Float(f64),
    /// String
    String(String),
}

impl Value {
    /// Runtime kind of this value
    ///
    /// Booleans report [`ValueType::Bool`]; whether a boolean is acceptable
    /// for a trigger option is decided by [`ValueType::accepts`].
    pub fn kind(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
        }
    }

    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Parse text into a value of the given option type
    ///
    /// Booleans accept `true/false`, `yes/no`, `on/off` and `1/0`.
    /// Trigger options cannot be given a value.
    pub fn parse_as(ty: ValueType, s: &str) -> Result<Self, String> {
        let s = s.trim();
        match ty {
            ValueType::Bool => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("invalid boolean: '{}'", s)),
            },
            ValueType::Int => s
                .parse::<i32>()
                .map(Value::Int)
                .map_err(|e| format!("invalid integer '{}': {}", s, e)),
            ValueType::Float => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("invalid number '{}': {}", s, e)),
            ValueType::String => Ok(Value::String(s.to_string())),
            ValueType::Trigger => Err("button options do not take a value".to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Restriction on the values an option accepts
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Constraint {
    /// Any value of the declared type
    #[default]
    None,
    /// Integer range, inclusive; `quant` of 0 allows every step
    IntRange {
        /// Minimum value
        min: i32,
        /// Maximum value
        max: i32,
        /// Quantization step
        quant: i32,
    },
    /// Float range, inclusive; `quant` of 0.0 allows every step
    FloatRange {
        /// Minimum value
        min: f64,
        /// Maximum value
        max: f64,
        /// Quantization step
        quant: f64,
    },
    /// Permitted integers
    IntList(Vec<i32>),
    /// Permitted floats
    FloatList(Vec<f64>),
    /// Permitted strings
    StringList(Vec<String>),
}

const FLOAT_QUANT_EPSILON: f64 = 1e-9;

impl Constraint {
    /// Check a (type-checked) value against this constraint
    ///
    /// Returns a human readable reason on violation.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Constraint::None, _) => Ok(()),
            (Constraint::IntRange { min, max, quant }, Value::Int(v)) => {
                if v < min || v > max {
                    return Err(format!("{} is outside range {}..={}", v, min, max));
                }
                // i32 differences overflow on ranges wider than i32::MAX
                if *quant > 0 && (i64::from(*v) - i64::from(*min)) % i64::from(*quant) != 0 {
                    return Err(format!("{} is not a multiple of {} from {}", v, quant, min));
                }
                Ok(())
            }
            (Constraint::FloatRange { min, max, quant }, Value::Float(v)) => {
                if !v.is_finite() || v < min || v > max {
                    return Err(format!("{} is outside range {}..={}", v, min, max));
                }
                if *quant > 0.0 {
                    let steps = (v - min) / quant;
                    if (steps - steps.round()).abs() > FLOAT_QUANT_EPSILON {
                        return Err(format!("{} is not a multiple of {} from {}", v, quant, min));
                    }
                }
                Ok(())
            }
            (Constraint::IntList(list), Value::Int(v)) => {
                if list.contains(v) {
                    Ok(())
                } else {
                    Err(format!("{} is not one of {:?}", v, list))
                }
            }
            (Constraint::FloatList(list), Value::Float(v)) => {
                if list.iter().any(|x| (x - v).abs() <= FLOAT_QUANT_EPSILON) {
                    Ok(())
                } else {
                    Err(format!("{} is not one of {:?}", v, list))
                }
            }
            (Constraint::StringList(list), Value::String(s)) => {
                if list.iter().any(|x| x == s) {
                    Ok(())
                } else {
                    Err(format!("{:?} is not one of {:?}", s, list))
                }
            }
            (constraint, value) => Err(format!(
                "{} value cannot satisfy constraint {}",
                value.kind(),
                constraint
            )),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::None => Ok(()),
            Constraint::IntRange { min, max, quant } => {
                write!(f, "{}..{}", min, max)?;
                if *quant > 1 {
                    write!(f, " (step {})", quant)?;
                }
                Ok(())
            }
            Constraint::FloatRange { min, max, quant } => {
                write!(f, "{}..{}", min, max)?;
                if *quant > 0.0 {
                    write!(f, " (step {})", quant)?;
                }
                Ok(())
            }
            Constraint::IntList(list) => {
                let items: Vec<String> = list.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", items.join("|"))
            }
            Constraint::FloatList(list) => {
                let items: Vec<String> = list.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", items.join("|"))
            }
            Constraint::StringList(list) => write!(f, "{}", list.join("|")),
        }
    }
}

bitflags! {
    /// Option capability flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Client can set the value in software
        const SOFT_SELECT = 1 << 0;
        /// Value is selected by a physical control on the device
        const HARD_SELECT = 1 << 1;
        /// Client can read the value
        const SOFT_DETECT = 1 << 2;
        /// Feature is emulated by the backend
        const EMULATED    = 1 << 3;
        /// Backend can pick the value automatically
        const AUTOMATIC   = 1 << 4;
        /// Option is currently inactive
        const INACTIVE    = 1 << 5;
        /// Option is meant for advanced users
        const ADVANCED    = 1 << 6;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::SOFT_SELECT | Capabilities::SOFT_DETECT
    }
}

bitflags! {
    /// Side effects reported by a successful set
    ///
    /// Callers must act on these: the registry never refreshes itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SetInfo: u32 {
        /// The device rounded the value to something it supports
        const INEXACT        = 1 << 0;
        /// Option descriptors changed; refetch the option list
        const RELOAD_OPTIONS = 1 << 1;
        /// Frame parameters changed
        const RELOAD_PARAMS  = 1 << 2;
    }
}

impl Default for SetInfo {
    fn default() -> Self {
        SetInfo::empty()
    }
}

/// Metadata describing one scanner option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Unique name within the session (e.g. "resolution")
    pub name: String,
    /// Short display title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Group the option belongs to (informational only)
    pub group: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Physical unit
    pub unit: Unit,
    /// Value constraint
    pub constraint: Constraint,
    /// Capability flags
    pub capabilities: Capabilities,
}

impl OptionDescriptor {
    /// Create a descriptor with default capabilities and no constraint
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            description: String::new(),
            group: String::new(),
            value_type,
            unit: Unit::None,
            constraint: Constraint::None,
            capabilities: Capabilities::default(),
        }
    }

    /// Set the title
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Set the description
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Set the group
    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    /// Set the unit
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Set the constraint
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Set the capability flags
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether the option is currently active
    pub fn is_active(&self) -> bool {
        !self.capabilities.contains(Capabilities::INACTIVE)
    }

    /// Whether the client may set this option
    pub fn is_settable(&self) -> bool {
        self.value_type != ValueType::Trigger
            && self.capabilities.contains(Capabilities::SOFT_SELECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_accepts_bool_only() {
        assert!(ValueType::Trigger.accepts(&Value::Bool(true)));
        assert!(!ValueType::Trigger.accepts(&Value::Int(1)));
        assert!(!ValueType::Float.accepts(&Value::Int(1)));
    }

    #[test]
    fn test_int_range_quant() {
        let c = Constraint::IntRange {
            min: 50,
            max: 1200,
            quant: 50,
        };
        assert!(c.check(&Value::Int(300)).is_ok());
        assert!(c.check(&Value::Int(325)).is_err());
        assert!(c.check(&Value::Int(1250)).is_err());
        assert!(c.check(&Value::Int(0)).is_err());
    }

    #[test]
    fn test_int_range_quant_full_width() {
        let c = Constraint::IntRange {
            min: i32::MIN,
            max: i32::MAX,
            quant: 2,
        };
        assert!(c.check(&Value::Int(i32::MIN)).is_ok());
        assert!(c.check(&Value::Int(0)).is_ok());
        assert!(c.check(&Value::Int(i32::MAX)).is_err());
        assert!(c.check(&Value::Int(i32::MAX - 1)).is_ok());
    }

    #[test]
    fn test_float_range() {
        let c = Constraint::FloatRange {
            min: 0.0,
            max: 215.9,
            quant: 0.0,
        };
        assert!(c.check(&Value::Float(100.25)).is_ok());
        assert!(c.check(&Value::Float(-0.1)).is_err());
        assert!(c.check(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_string_list() {
        let c = Constraint::StringList(vec!["Gray".into(), "Color".into()]);
        assert!(c.check(&Value::from("Color")).is_ok());
        assert!(c.check(&Value::from("color")).is_err());
    }

    #[test]
    fn test_parse_as() {
        assert_eq!(Value::parse_as(ValueType::Int, "300"), Ok(Value::Int(300)));
        assert_eq!(Value::parse_as(ValueType::Bool, "yes"), Ok(Value::Bool(true)));
        assert_eq!(
            Value::parse_as(ValueType::Float, "12.5"),
            Ok(Value::Float(12.5))
        );
        assert!(Value::parse_as(ValueType::Int, "abc").is_err());
        assert!(Value::parse_as(ValueType::Trigger, "true").is_err());
    }

    #[test]
    fn test_settable() {
        let button = OptionDescriptor::new("scan", ValueType::Trigger)
            .capabilities(Capabilities::SOFT_DETECT | Capabilities::HARD_SELECT);
        assert!(!button.is_settable());
        assert!(button.is_active());

        let inactive = OptionDescriptor::new("depth", ValueType::Int)
            .capabilities(Capabilities::default() | Capabilities::INACTIVE);
        assert!(!inactive.is_active());
        assert!(inactive.is_settable());
    }
}
