//! Attribute validators
//!
//! Validators run against configuration values after type conformance.
//! Null and unknown values are always accepted; requiredness is checked by
//! the schema itself.

use crate::diag::Diagnostics;
use crate::value::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

pub trait Validator: Send + Sync + fmt::Debug {
    /// Human readable description used in schema listings.
    fn description(&self) -> String;

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics);
}

/// String value must be one of a fixed set.
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<&'static str>,
}

impl OneOf {
    pub fn new(allowed: &[&'static str]) -> Self {
        Self {
            allowed: allowed.to_vec(),
        }
    }
}

impl Validator for OneOf {
    fn description(&self) -> String {
        format!("value must be one of: {}", quoted(&self.allowed))
    }

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        let Some(s) = value.as_str() else {
            return;
        };
        if !self.allowed.contains(&s) {
            diags.add_attribute_error(
                path,
                "Invalid Attribute Value Match",
                format!(
                    "Attribute {path} value must be one of: {}, got: {s:?}",
                    quoted(&self.allowed)
                ),
            );
        }
    }
}

/// List must contain at least `min` elements.
#[derive(Debug, Clone, Copy)]
pub struct SizeAtLeast(pub usize);

impl Validator for SizeAtLeast {
    fn description(&self) -> String {
        format!("list must contain at least {} elements", self.0)
    }

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        let Some(items) = value.as_list() else {
            return;
        };
        if items.len() < self.0 {
            diags.add_attribute_error(
                path,
                "Invalid Attribute Value",
                format!(
                    "Attribute {path} list must contain at least {} elements, got: {}",
                    self.0,
                    items.len()
                ),
            );
        }
    }
}

/// List elements must be distinct.
#[derive(Debug, Clone, Copy)]
pub struct UniqueValues;

impl Validator for UniqueValues {
    fn description(&self) -> String {
        "all list elements must be unique".to_string()
    }

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        let Some(items) = value.as_list() else {
            return;
        };
        let mut seen = HashSet::new();
        for item in items.iter().filter(|v| !v.is_absent()) {
            let key = item.to_json().to_string();
            if !seen.insert(key) {
                diags.add_attribute_error(
                    path,
                    "Duplicate List Value",
                    format!("This attribute contains duplicate values of: {item}"),
                );
            }
        }
    }
}

/// List must not contain null elements.
#[derive(Debug, Clone, Copy)]
pub struct NoNullValues;

impl Validator for NoNullValues {
    fn description(&self) -> String {
        "list elements must not be null".to_string()
    }

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        let Some(items) = value.as_list() else {
            return;
        };
        if items.iter().any(Value::is_null) {
            diags.add_attribute_error(
                path,
                "Null List Value",
                "This attribute contains a null value.",
            );
        }
    }
}

/// Applies a validator to each element of a list.
#[derive(Debug, Clone)]
pub struct ValueStringsAre(pub Arc<dyn Validator>);

impl ValueStringsAre {
    pub fn new(inner: impl Validator + 'static) -> Self {
        Self(Arc::new(inner))
    }
}

impl Validator for ValueStringsAre {
    fn description(&self) -> String {
        format!("each element: {}", self.0.description())
    }

    fn validate(&self, path: &str, value: &Value, diags: &mut Diagnostics) {
        let Some(items) = value.as_list() else {
            return;
        };
        for (i, item) in items.iter().enumerate() {
            self.0.validate(&format!("{path}[{i}]"), item, diags);
        }
    }
}

fn quoted(values: &[&str]) -> String {
    let inner: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
    format!("[{}]", inner.join(" "))
}
