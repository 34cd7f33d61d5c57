//! Tool `calculate`: Basic arithmetic.

use serde::Deserialize;
use serde_json::Value;

use workbench::Operation;

use crate::types::{McpError, McpResult, ToolCallResult};

use super::{Field, Schema, ToolContext, ToolSpec};

pub const NAME: &str = "calculate";

const OPERATIONS: &[&str] = &["add", "subtract", "multiply", "divide"];

#[derive(Debug, Deserialize)]
struct CalculateParams {
    operation: Operation,
    a: f64,
    b: f64,
}

pub fn spec() -> ToolSpec {
    ToolSpec {
        name: NAME,
        description: "Perform basic arithmetic",
        schema: Schema::new()
            .field(
                Field::string("operation", "Operation to perform")
                    .required()
                    .one_of(OPERATIONS),
            )
            .field(Field::number("a", "First operand").required())
            .field(Field::number("b", "Second operand").required()),
        required_scope: None,
    }
}

pub async fn execute(args: Value, _ctx: &ToolContext<'_>) -> McpResult<ToolCallResult> {
    let params: CalculateParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match workbench::calculate(params.operation, params.a, params.b) {
        Ok(calc) => Ok(ToolCallResult::text(calc.to_string())),
        Err(e) => Ok(ToolCallResult::error(format!("Error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_matches_operations() {
        let names: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
        assert_eq!(names, OPERATIONS);
    }
}
