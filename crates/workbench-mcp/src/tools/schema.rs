//! Declarative tool input schemas.
//!
//! A [`Schema`] renders the JSON Schema advertised by `tools/list` and
//! validates call arguments against the same description, so the two
//! cannot drift apart.

use serde_json::{json, Map, Value};

use crate::types::{McpError, McpResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    StringArray,
}

impl FieldType {
    fn json_type(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::StringArray => "array",
        }
    }

    fn describe(self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::Integer => "an integer",
            FieldType::Number => "a number",
            FieldType::StringArray => "an array of strings",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Number => value.is_number(),
            FieldType::StringArray => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    name: &'static str,
    description: &'static str,
    ty: FieldType,
    required: bool,
    default: Option<Value>,
    allowed: Option<&'static [&'static str]>,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

impl Field {
    fn new(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            description,
            ty,
            required: false,
            default: None,
            allowed: None,
            minimum: None,
            maximum: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::Integer, description)
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::Number, description)
    }

    pub fn string_array(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::StringArray, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    /// Inclusive numeric bounds.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.minimum = Some(min);
        self.maximum = Some(max);
        self
    }

    pub fn at_least(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn to_json(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.ty.json_type()));
        if self.ty == FieldType::StringArray {
            prop.insert("items".into(), json!({ "type": "string" }));
        }
        prop.insert("description".into(), json!(self.description));
        if let Some(allowed) = self.allowed {
            prop.insert("enum".into(), json!(allowed));
        }
        if let Some(min) = self.minimum {
            prop.insert("minimum".into(), json!(min));
        }
        if let Some(max) = self.maximum {
            prop.insert("maximum".into(), json!(max));
        }
        if let Some(default) = &self.default {
            prop.insert("default".into(), default.clone());
        }
        Value::Object(prop)
    }

    fn validate(&self, value: &Value) -> McpResult<()> {
        if !self.ty.matches(value) {
            return Err(McpError::InvalidParams(format!(
                "Argument '{}' must be {}",
                self.name,
                self.ty.describe()
            )));
        }

        if let (Some(allowed), Some(s)) = (self.allowed, value.as_str()) {
            if !allowed.contains(&s) {
                return Err(McpError::InvalidParams(format!(
                    "Argument '{}' must be one of: {}",
                    self.name,
                    allowed.join(", ")
                )));
            }
        }

        if let Some(n) = value.as_f64() {
            let violated = match (self.minimum, self.maximum) {
                (Some(min), Some(max)) if n < min || n > max => {
                    Some(format!("between {min} and {max}"))
                }
                (Some(min), None) if n < min => Some(format!("at least {min}")),
                (None, Some(max)) if n > max => Some(format!("at most {max}")),
                _ => None,
            };
            if let Some(bounds) = violated {
                return Err(McpError::InvalidParams(format!(
                    "Argument '{}' must be {bounds}",
                    self.name
                )));
            }
        }

        Ok(())
    }
}

/// Input schema of one tool.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.to_json()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Check presence, type, enum membership and bounds. Unknown extra
    /// arguments are ignored.
    pub fn validate(&self, args: &Value) -> McpResult<()> {
        let obj = args
            .as_object()
            .ok_or_else(|| McpError::InvalidParams("Arguments must be an object".to_string()))?;

        for field in &self.fields {
            match obj.get(field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(McpError::InvalidParams(format!(
                        "Missing required argument '{}'",
                        field.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) => field.validate(value)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPS: &[&str] = &["add", "subtract"];

    fn schema() -> Schema {
        Schema::new()
            .field(Field::string("operation", "op").required().one_of(OPS))
            .field(Field::number("a", "first").required())
            .field(Field::integer("steps", "steps").range(1.0, 100.0).default(json!(5)))
            .field(Field::string_array("tags", "tags"))
    }

    fn message(err: McpError) -> String {
        match err {
            McpError::InvalidParams(m) => m,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_renders_json_schema() {
        let value = schema().to_json();
        assert_eq!(value["type"], "object");
        assert_eq!(value["required"], json!(["operation", "a"]));
        assert_eq!(value["properties"]["operation"]["enum"], json!(OPS));
        assert_eq!(value["properties"]["steps"]["default"], 5);
        assert_eq!(value["properties"]["tags"]["items"]["type"], "string");
    }

    #[test]
    fn test_missing_field_is_named() {
        let err = schema().validate(&json!({"operation": "add"})).unwrap_err();
        assert_eq!(message(err), "Missing required argument 'a'");
    }

    #[test]
    fn test_wrong_type_is_named() {
        let err = schema()
            .validate(&json!({"operation": "add", "a": "five"}))
            .unwrap_err();
        assert_eq!(message(err), "Argument 'a' must be a number");
    }

    #[test]
    fn test_enum_membership() {
        let err = schema()
            .validate(&json!({"operation": "modulo", "a": 1}))
            .unwrap_err();
        assert!(message(err).contains("must be one of: add, subtract"));
    }

    #[test]
    fn test_range_and_integer() {
        assert!(schema()
            .validate(&json!({"operation": "add", "a": 1, "steps": 0}))
            .is_err());
        assert!(schema()
            .validate(&json!({"operation": "add", "a": 1, "steps": 2.5}))
            .is_err());
        assert!(schema()
            .validate(&json!({"operation": "add", "a": 1, "steps": 100, "extra": true}))
            .is_ok());
    }

    #[test]
    fn test_arguments_must_be_object() {
        assert!(schema().validate(&json!([1, 2])).is_err());
    }
}
