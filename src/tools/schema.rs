//! Declarative argument schemas for tool invocations
//!
//! Every tool declares its arguments as a list of [`FieldSpec`] records. One
//! generic routine checks presence and primitive type, fills documented
//! defaults, and hands the handler a typed [`ToolArgs`] bag, so no handler has
//! to inspect raw JSON.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::WorkspaceError;

/// Primitive type accepted for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// Two-dimensional array of cell values, given either as a JSON array of
    /// arrays or as a string containing one.
    Grid,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Grid => "string",
            FieldKind::Number => "number",
        }
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Argument name as it appears in the invocation.
    pub name: &'static str,
    /// Expected primitive type.
    pub kind: FieldKind,
    /// Human-readable description for the published schema.
    pub description: &'static str,
    /// Whether the argument must be supplied.
    pub required: bool,
    /// Value used when an optional argument is absent.
    pub default: Option<Value>,
}

impl FieldSpec {
    /// A field that must be present.
    pub fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
        }
    }

    /// An optional field with a documented default.
    pub fn optional(
        name: &'static str,
        kind: FieldKind,
        description: &'static str,
        default: Value,
    ) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: Some(default),
        }
    }
}

/// A validated argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// String argument.
    Text(String),
    /// Numeric argument.
    Number(f64),
    /// Parsed grid of cell values.
    Grid(Vec<Vec<Value>>),
}

/// Typed arguments produced by [`ArgumentSchema::validate`].
///
/// Every required field and every field with a default is guaranteed to be
/// present with the declared type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: HashMap<&'static str, ArgValue>,
}

impl ToolArgs {
    /// String argument `name`.
    pub fn str(&self, name: &str) -> Result<&str, WorkspaceError> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Ok(s),
            _ => Err(WorkspaceError::Validation(format!(
                "missing string argument '{name}'"
            ))),
        }
    }

    /// Numeric argument `name`.
    pub fn number(&self, name: &str) -> Result<f64, WorkspaceError> {
        match self.values.get(name) {
            Some(ArgValue::Number(n)) => Ok(*n),
            _ => Err(WorkspaceError::Validation(format!(
                "missing number argument '{name}'"
            ))),
        }
    }

    /// Grid argument `name`.
    pub fn grid(&self, name: &str) -> Result<&[Vec<Value>], WorkspaceError> {
        match self.values.get(name) {
            Some(ArgValue::Grid(rows)) => Ok(rows),
            _ => Err(WorkspaceError::Validation(format!(
                "missing grid argument '{name}'"
            ))),
        }
    }

    /// Number of arguments present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments are present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The argument schema of one tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentSchema {
    fields: Vec<FieldSpec>,
}

impl ArgumentSchema {
    /// Creates a schema from its field list.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// A schema with no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Checks `arguments` against the schema.
    ///
    /// Fields are checked in declaration order, so the first missing or
    /// mistyped field is the one reported. `null` counts as absent. Unknown
    /// arguments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Validation`] naming the offending field.
    ///
    /// # Examples
    ///
    /// ```
    /// use gg_workspace_mcp::tools::schema::{ArgumentSchema, FieldKind, FieldSpec};
    /// use serde_json::json;
    ///
    /// let schema = ArgumentSchema::new(vec![
    ///     FieldSpec::required("title", FieldKind::String, "Title"),
    ///     FieldSpec::optional("sheet_name", FieldKind::String, "Tab", json!("Sheet1")),
    /// ]);
    /// let args = json!({"title": "Budget"});
    /// let parsed = schema.validate(args.as_object().unwrap()).unwrap();
    /// assert_eq!(parsed.str("sheet_name").unwrap(), "Sheet1");
    ///
    /// assert!(schema.validate(json!({}).as_object().unwrap()).is_err());
    /// ```
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<ToolArgs, WorkspaceError> {
        let mut values = HashMap::with_capacity(self.fields.len());

        for field in &self.fields {
            let supplied = arguments.get(field.name).filter(|v| !v.is_null());
            let raw = match (supplied, &field.default) {
                (Some(v), _) => v,
                (None, Some(default)) => default,
                (None, None) if field.required => {
                    return Err(WorkspaceError::Validation(format!(
                        "missing required field '{}'",
                        field.name
                    )));
                }
                (None, None) => continue,
            };
            values.insert(field.name, convert(field, raw)?);
        }

        Ok(ToolArgs { values })
    }

    /// Renders the schema as a JSON Schema object for `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = Map::new();
            prop.insert("type".to_string(), json!(field.kind.json_type()));
            prop.insert("description".to_string(), json!(field.description));
            if let Some(default) = &field.default {
                prop.insert("default".to_string(), default.clone());
            }
            properties.insert(field.name.to_string(), Value::Object(prop));
            if field.required {
                required.push(json!(field.name));
            }
        }

        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

fn convert(field: &FieldSpec, raw: &Value) -> Result<ArgValue, WorkspaceError> {
    let mistyped = |expected: &str| {
        WorkspaceError::Validation(format!(
            "field '{}' must be {}",
            field.name, expected
        ))
    };

    match field.kind {
        FieldKind::String => raw
            .as_str()
            .map(|s| ArgValue::Text(s.to_string()))
            .ok_or_else(|| mistyped("a string")),
        FieldKind::Number => raw
            .as_f64()
            .map(ArgValue::Number)
            .ok_or_else(|| mistyped("a number")),
        FieldKind::Grid => {
            let parsed = match raw {
                Value::String(s) => serde_json::from_str::<Vec<Vec<Value>>>(s).ok(),
                Value::Array(_) => serde_json::from_value::<Vec<Vec<Value>>>(raw.clone()).ok(),
                _ => None,
            };
            parsed
                .map(ArgValue::Grid)
                .ok_or_else(|| mistyped("a JSON array of arrays"))
        }
    }
}
