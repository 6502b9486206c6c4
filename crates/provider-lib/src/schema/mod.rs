//! Resource schemas
//!
//! A [`Schema`] describes the attributes of one resource type. It is used
//! three ways:
//!
//! - [`Schema::conform`] type-checks a configuration document and runs the
//!   attribute validators.
//! - [`Schema::plan`] merges configuration with prior state: static
//!   defaults are applied, computed attributes keep their prior value or
//!   become unknown.
//! - [`Schema::load_state`] reads a stored state document back into typed
//!   values.

pub mod validators;

use crate::diag::Diagnostics;
use crate::value::Value;
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use validators::Validator;

#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Bool,
    Int32,
    Int64,
    Float32,
    List(Box<AttributeType>),
    Map(Box<AttributeType>),
    /// Single nested object
    Object(Block),
    /// List of nested objects
    ObjectList(Block),
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::Int32 => write!(f, "int32"),
            AttributeType::Int64 => write!(f, "int64"),
            AttributeType::Float32 => write!(f, "float32"),
            AttributeType::List(elem) => write!(f, "list({elem})"),
            AttributeType::Map(elem) => write!(f, "map({elem})"),
            AttributeType::Object(_) => write!(f, "object"),
            AttributeType::ObjectList(_) => write!(f, "list(object)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub ty: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub default: Option<serde_json::Value>,
    pub description: &'static str,
    pub validators: Vec<Arc<dyn Validator>>,
    /// Keep the prior state value instead of planning an unknown.
    pub use_state_for_unknown: bool,
}

impl Attribute {
    pub fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            default: None,
            description: "",
            validators: Vec::new(),
            use_state_for_unknown: false,
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeType::String)
    }

    pub fn bool() -> Self {
        Self::new(AttributeType::Bool)
    }

    pub fn int32() -> Self {
        Self::new(AttributeType::Int32)
    }

    pub fn int64() -> Self {
        Self::new(AttributeType::Int64)
    }

    pub fn float32() -> Self {
        Self::new(AttributeType::Float32)
    }

    pub fn string_list() -> Self {
        Self::new(AttributeType::List(Box::new(AttributeType::String)))
    }

    pub fn string_map() -> Self {
        Self::new(AttributeType::Map(Box::new(AttributeType::String)))
    }

    pub fn object(block: Block) -> Self {
        Self::new(AttributeType::Object(block))
    }

    pub fn object_list(block: Block) -> Self {
        Self::new(AttributeType::ObjectList(block))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Static default. Implies optional and computed.
    pub fn default(mut self, value: serde_json::Value) -> Self {
        self.optional = true;
        self.computed = true;
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn validate(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone().map(Value::from)
    }

    fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        }
        if self.optional {
            flags.push("optional");
        }
        if self.computed {
            flags.push("computed");
        }
        if self.sensitive {
            flags.push("sensitive");
        }
        flags.join(", ")
    }
}

/// Ordered set of named attributes.
#[derive(Debug, Clone, Default)]
pub struct Block {
    attributes: Vec<(&'static str, Attribute)>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.push((name, attribute));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(n, a)| (*n, a))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// One flattened row of a schema listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AttributeRow {
    pub path: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub flags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub description: &'static str,
    pub block: Block,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Config,
    State,
}

impl Schema {
    pub fn new(description: &'static str, block: Block) -> Self {
        Self { description, block }
    }

    /// Type-checks a configuration document and runs validators.
    pub fn conform(&self, config: &serde_json::Value) -> Result<Value, Diagnostics> {
        let mut diags = Diagnostics::new();
        let value = conform_block(&self.block, config, "", Mode::Config, &mut diags);
        diags.into_result().map(|()| value)
    }

    /// Reads stored state. Unrecognized fields are dropped.
    pub fn load_state(&self, state: &serde_json::Value) -> Result<Value, Diagnostics> {
        let mut diags = Diagnostics::new();
        let value = conform_block(&self.block, state, "", Mode::State, &mut diags);
        diags.into_result().map(|()| value)
    }

    /// Computes the planned value from configuration and optional prior state.
    ///
    /// Computed attributes without configuration keep their prior value
    /// when nothing else changes. When the plan differs from prior state they
    /// become unknown, unless marked `use_state_for_unknown`.
    pub fn plan(&self, config: &Value, prior: Option<&Value>) -> Value {
        let creating = prior.is_none();
        let prior_value = prior.unwrap_or(&Value::Null);
        let mut planned = plan_block(&self.block, config, prior_value, creating);

        if let Some(prior) = prior {
            if &planned != prior {
                mark_computed_unknown(&self.block, config, &mut planned, prior);
            }
        }
        planned
    }

    /// An all-null object with only `id` set, as written by import.
    pub fn import_state(&self, id: &str) -> Value {
        Value::Object(
            self.block
                .iter()
                .map(|(name, _)| {
                    let value = if name == "id" {
                        Value::string(id)
                    } else {
                        Value::Null
                    };
                    (name.to_string(), value)
                })
                .collect(),
        )
    }

    /// Flattens the schema into rows for display.
    pub fn rows(&self) -> Vec<AttributeRow> {
        let mut rows = Vec::new();
        collect_rows(&self.block, "", &mut rows);
        rows
    }

    /// Paths of sensitive attributes.
    pub fn sensitive_paths(&self) -> Vec<String> {
        self.rows()
            .into_iter()
            .filter(|r| r.flags.contains("sensitive"))
            .map(|r| r.path)
            .collect()
    }
}

fn child_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn type_error(path: &str, expected: &str, diags: &mut Diagnostics) -> Value {
    diags.add_attribute_error(
        path,
        "Incorrect attribute value type",
        format!("Inappropriate value for attribute \"{path}\": {expected} required."),
    );
    Value::Null
}

fn conform_block(
    block: &Block,
    json: &serde_json::Value,
    path: &str,
    mode: Mode,
    diags: &mut Diagnostics,
) -> Value {
    let Some(fields) = json.as_object() else {
        let at = if path.is_empty() { "(root)" } else { path };
        return type_error(at, "object", diags);
    };

    if mode == Mode::Config {
        for key in fields.keys().filter(|k| block.get(k).is_none()) {
            diags.add_attribute_error(
                child_path(path, key),
                "Unsupported argument",
                format!("An argument named \"{key}\" is not expected here."),
            );
        }
    }

    let mut out = BTreeMap::new();
    for (name, attribute) in block.iter() {
        let attr_path = child_path(path, name);
        let raw = fields.get(name).unwrap_or(&serde_json::Value::Null);

        let value = if raw.is_null() {
            if mode == Mode::Config && attribute.required {
                diags.add_attribute_error(
                    &attr_path,
                    "Missing required argument",
                    format!("The argument \"{name}\" is required, but no definition was found."),
                );
            }
            Value::Null
        } else if mode == Mode::Config && attribute.computed && !attribute.optional {
            diags.add_attribute_error(
                &attr_path,
                "Invalid Configuration for Read-Only Attribute",
                "Cannot set value for this attribute as the provider has marked it as read-only. \
                 Remove the configuration line setting the value.",
            );
            Value::Null
        } else {
            let value = conform_value(&attribute.ty, raw, &attr_path, mode, diags);
            if mode == Mode::Config {
                for validator in &attribute.validators {
                    validator.validate(&attr_path, &value, diags);
                }
            }
            value
        };
        out.insert(name.to_string(), value);
    }
    Value::Object(out)
}

fn conform_value(
    ty: &AttributeType,
    json: &serde_json::Value,
    path: &str,
    mode: Mode,
    diags: &mut Diagnostics,
) -> Value {
    if json.is_null() {
        return Value::Null;
    }
    match ty {
        AttributeType::String => match json.as_str() {
            Some(s) => Value::string(s),
            None => type_error(path, "string", diags),
        },
        AttributeType::Bool => match json.as_bool() {
            Some(b) => Value::Bool(b),
            None => type_error(path, "bool", diags),
        },
        AttributeType::Int32 => match json.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(n) => Value::Number(n.into()),
            None => type_error(path, "32-bit integer", diags),
        },
        AttributeType::Int64 => match json.as_i64() {
            Some(n) => Value::Number(n.into()),
            None => type_error(path, "64-bit integer", diags),
        },
        AttributeType::Float32 => match json.as_f64().and_then(Number::from_f64) {
            Some(n) => Value::Number(n),
            None => type_error(path, "number", diags),
        },
        AttributeType::List(elem) => match json.as_array() {
            Some(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| conform_value(elem, item, &format!("{path}[{i}]"), mode, diags))
                    .collect(),
            ),
            None => type_error(path, "list", diags),
        },
        AttributeType::Map(elem) => match json.as_object() {
            Some(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let value = conform_value(elem, v, &format!("{path}[{k:?}]"), mode, diags);
                        (k.clone(), value)
                    })
                    .collect(),
            ),
            None => type_error(path, "map", diags),
        },
        AttributeType::Object(block) => conform_block(block, json, path, mode, diags),
        AttributeType::ObjectList(block) => match json.as_array() {
            Some(items) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| conform_block(block, item, &format!("{path}[{i}]"), mode, diags))
                    .collect(),
            ),
            None => type_error(path, "list of objects", diags),
        },
    }
}

fn plan_block(block: &Block, config: &Value, prior: &Value, creating: bool) -> Value {
    Value::Object(
        block
            .iter()
            .map(|(name, attribute)| {
                let planned = plan_attribute(attribute, config.get(name), prior.get(name), creating);
                (name.to_string(), planned)
            })
            .collect(),
    )
}

fn plan_attribute(attribute: &Attribute, config: &Value, prior: &Value, creating: bool) -> Value {
    if !config.is_null() {
        return match (&attribute.ty, config) {
            (AttributeType::Object(block), _) => plan_block(block, config, prior, creating),
            (AttributeType::ObjectList(block), Value::List(items)) => Value::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let prior_item = prior.as_list().and_then(|p| p.get(i)).unwrap_or(&Value::Null);
                        plan_block(block, item, prior_item, creating)
                    })
                    .collect(),
            ),
            _ => config.clone(),
        };
    }

    if let Some(default) = attribute.default_value() {
        return match &attribute.ty {
            // Nested defaults fill in the object default itself.
            AttributeType::Object(block) => plan_block(block, &default, prior, creating),
            _ => default,
        };
    }

    if attribute.computed {
        if creating {
            Value::Unknown
        } else {
            prior.clone()
        }
    } else {
        Value::Null
    }
}

fn mark_computed_unknown(block: &Block, config: &Value, planned: &mut Value, prior: &Value) {
    let Value::Object(fields) = planned else {
        return;
    };
    for (name, attribute) in block.iter() {
        let config_value = config.get(name);
        let Some(slot) = fields.get_mut(name) else {
            continue;
        };

        if let AttributeType::Object(nested) = &attribute.ty {
            if !config_value.is_null() {
                mark_computed_unknown(nested, config_value, slot, prior.get(name));
                continue;
            }
        }

        if !attribute.computed || !config_value.is_null() || attribute.default.is_some() {
            continue;
        }
        let prior_value = prior.get(name);
        *slot = if attribute.use_state_for_unknown && !prior_value.is_null() {
            prior_value.clone()
        } else {
            Value::Unknown
        };
    }
}

fn collect_rows(block: &Block, path: &str, rows: &mut Vec<AttributeRow>) {
    for (name, attribute) in block.iter() {
        let attr_path = child_path(path, name);
        rows.push(AttributeRow {
            path: attr_path.clone(),
            ty: attribute.ty.to_string(),
            flags: attribute.flags(),
            default: attribute.default.clone(),
            description: attribute.description.to_string(),
        });
        match &attribute.ty {
            AttributeType::Object(nested) => collect_rows(nested, &attr_path, rows),
            AttributeType::ObjectList(nested) => {
                collect_rows(nested, &format!("{attr_path}[*]"), rows)
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validators::OneOf;
    use super::*;
    use serde_json::json;

    fn sample_schema() -> Schema {
        Schema::new(
            "sample",
            Block::new()
                .attribute("id", Attribute::string().computed().use_state_for_unknown())
                .attribute("name", Attribute::string().required())
                .attribute("weight", Attribute::int32().default(json!(10)))
                .attribute("revision", Attribute::string().computed())
                .attribute(
                    "scaling",
                    Attribute::object(
                        Block::new()
                            .attribute("enabled", Attribute::bool().default(json!(true)))
                            .attribute("ratio", Attribute::float32().optional())
                            .attribute(
                                "metric",
                                Attribute::string().optional().validate(OneOf::new(&["cpu", "memory"])),
                            ),
                    )
                    .optional(),
                )
                .attribute(
                    "raw",
                    Attribute::object_list(
                        Block::new().attribute("yaml", Attribute::string().default(json!(""))),
                    )
                    .optional(),
                ),
        )
    }

    #[test]
    fn test_conform_reports_missing_and_unsupported() {
        let err = sample_schema()
            .conform(&json!({ "nmae": "typo" }))
            .unwrap_err();

        let summaries: Vec<_> = err.iter().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Unsupported argument"));
        assert!(summaries.contains(&"Missing required argument"));
    }

    #[test]
    fn test_conform_rejects_read_only_attribute() {
        let err = sample_schema()
            .conform(&json!({ "name": "a", "id": "x" }))
            .unwrap_err();
        let diag = err.iter().next().unwrap();
        assert_eq!(diag.summary, "Invalid Configuration for Read-Only Attribute");
        assert_eq!(diag.attribute.as_deref(), Some("id"));
    }

    #[test]
    fn test_conform_type_mismatch_has_nested_path() {
        let err = sample_schema()
            .conform(&json!({ "name": "a", "scaling": { "enabled": "yes" } }))
            .unwrap_err();
        let diag = err.iter().next().unwrap();
        assert_eq!(diag.summary, "Incorrect attribute value type");
        assert_eq!(diag.attribute.as_deref(), Some("scaling.enabled"));
    }

    #[test]
    fn test_conform_runs_nested_validators() {
        let err = sample_schema()
            .conform(&json!({ "name": "a", "scaling": { "metric": "disk" } }))
            .unwrap_err();
        assert_eq!(
            err.iter().next().unwrap().attribute.as_deref(),
            Some("scaling.metric")
        );
    }

    #[test]
    fn test_conform_normalizes_integral_floats() {
        let value = sample_schema()
            .conform(&json!({ "name": "a", "scaling": { "ratio": 2 } }))
            .unwrap();
        assert_eq!(
            value.get("scaling").get("ratio"),
            &Value::Number(Number::from_f64(2.0).unwrap())
        );
    }

    #[test]
    fn test_plan_create_fills_defaults_and_unknowns() {
        let schema = sample_schema();
        let config = schema
            .conform(&json!({ "name": "a", "scaling": {}, "raw": [{}] }))
            .unwrap();

        let planned = schema.plan(&config, None);

        assert!(planned.get("id").is_unknown());
        assert!(planned.get("revision").is_unknown());
        assert_eq!(planned.get("weight"), &Value::Number(10.into()));
        assert_eq!(planned.get("scaling").get("enabled"), &Value::Bool(true));
        assert_eq!(planned.get("raw").as_list().unwrap()[0].get("yaml"), &Value::string(""));
    }

    #[test]
    fn test_plan_without_changes_matches_prior() {
        let schema = sample_schema();
        let config = schema.conform(&json!({ "name": "a" })).unwrap();
        let prior = Value::object([
            ("id", Value::string("p-1")),
            ("name", Value::string("a")),
            ("weight", Value::Number(10.into())),
            ("revision", Value::string("r1")),
            ("scaling", Value::Null),
            ("raw", Value::Null),
        ]);

        let planned = schema.plan(&config, Some(&prior));
        assert_eq!(planned, prior);
    }

    #[test]
    fn test_plan_update_marks_computed_unknown_except_state_for_unknown() {
        let schema = sample_schema();
        let config = schema.conform(&json!({ "name": "b" })).unwrap();
        let prior = Value::object([
            ("id", Value::string("p-1")),
            ("name", Value::string("a")),
            ("weight", Value::Number(10.into())),
            ("revision", Value::string("r1")),
            ("scaling", Value::Null),
            ("raw", Value::Null),
        ]);

        let planned = schema.plan(&config, Some(&prior));

        assert_eq!(planned.get("id"), &Value::string("p-1"));
        assert!(planned.get("revision").is_unknown());
        assert_eq!(planned.get("name"), &Value::string("b"));
    }

    #[test]
    fn test_load_state_ignores_unknown_fields() {
        let state = sample_schema()
            .load_state(&json!({ "id": "p-1", "name": "a", "legacy": true }))
            .unwrap();
        assert_eq!(state.get("id"), &Value::string("p-1"));
        assert!(state.as_object().unwrap().get("legacy").is_none());
    }

    #[test]
    fn test_rows_flatten_nested_blocks() {
        let rows = sample_schema().rows();
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        assert!(paths.contains(&"scaling.enabled"));
        assert!(paths.contains(&"raw[*].yaml"));
    }

    #[test]
    fn test_import_state_sets_only_id() {
        let state = sample_schema().import_state("abc");
        assert_eq!(state.get("id"), &Value::string("abc"));
        assert!(state.get("name").is_null());
    }
}
