use std::collections::HashMap;

/// Typed scalar attached to a frame by the acquisition framework.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl AttributeValue {
    /// Numeric value converted to `i32` the way the framework's typed getter
    /// does: integers are truncated to 32 bits, floats toward zero.
    /// Strings have no integer value.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            AttributeValue::Int8(v) => Some(v as i32),
            AttributeValue::UInt8(v) => Some(v as i32),
            AttributeValue::Int16(v) => Some(v as i32),
            AttributeValue::UInt16(v) => Some(v as i32),
            AttributeValue::Int32(v) => Some(v),
            AttributeValue::UInt32(v) => Some(v as i32),
            AttributeValue::Int64(v) => Some(v as i32),
            AttributeValue::UInt64(v) => Some(v as i32),
            AttributeValue::Float32(v) => Some(v as i32),
            AttributeValue::Float64(v) => Some(v as i32),
            AttributeValue::String(_) => None,
        }
    }
}

/// Named attributes carried alongside a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeList {
    entries: HashMap<String, AttributeValue>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.entries.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries.get(name)
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(AttributeValue::as_i32)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
