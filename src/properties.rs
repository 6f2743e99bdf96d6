use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

/// Type alias for a HashMap representing a key-value property bag.
///
/// Keys are strings naming the property. Used for event properties, identify
/// traits, and the static context bundle alike.
///
/// # Examples
/// ```
/// # use beacon::{Properties, PropertyValue};
/// let properties = [
///     ("plan".to_owned(), "pro".into()),
///     ("seats".to_owned(), 5.into()),
///     ("trial".to_owned(), false.into()),
/// ].into_iter().collect::<Properties>();
/// ```
pub type Properties = HashMap<String, PropertyValue>;

/// Enum representing any value that can appear in an event property bag.
///
/// This is the universal JSON value: every variant round-trips exactly
/// through serialization, including the integer/float distinction.
///
/// Conveniently implements `From` conversions for `String`, `&str`, `i64`,
/// `f64`, and `bool` types.
///
/// Examples:
/// ```
/// # use beacon::PropertyValue;
/// let string_prop: PropertyValue = "example".into();
/// let integer_prop: PropertyValue = 42.into();
/// let number_prop: PropertyValue = 0.25.into();
/// let bool_prop: PropertyValue = true.into();
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, From, Clone)]
#[serde(untagged)]
pub enum PropertyValue {
    /// A null value or absence of value.
    Null,
    /// A boolean value.
    #[from]
    Boolean(bool),
    /// An integer value.
    #[from]
    Integer(i64),
    /// A floating-point value.
    #[from]
    Number(f64),
    /// A string value.
    #[from]
    String(String),
    /// An ordered list of values.
    #[from]
    Array(Vec<PropertyValue>),
    /// A string-keyed map of values.
    #[from]
    Object(HashMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Returns the string slice if the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        if let PropertyValue::String(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}
