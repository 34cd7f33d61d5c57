//! Basic arithmetic for the `calculate` tool.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{WorkbenchError, WorkbenchResult};

/// Supported arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    /// Name as it appears in tool arguments.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "*",
            Operation::Divide => "/",
        }
    }

    /// Apply the operation.
    pub fn apply(self, a: f64, b: f64) -> WorkbenchResult<f64> {
        let value = match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b == 0.0 {
                    return Err(WorkbenchError::DivisionByZero);
                }
                a / b
            }
        };
        if !value.is_finite() {
            return Err(WorkbenchError::InvalidInput(format!(
                "result of {} {} {} is not a finite number",
                format_number(a),
                self.symbol(),
                format_number(b)
            )));
        }
        Ok(value)
    }
}

impl FromStr for Operation {
    type Err = WorkbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| WorkbenchError::UnknownOperation(s.to_string()))
    }
}

/// A finished calculation, rendered as `a <op> b = result`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
    pub result: f64,
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} = {}",
            format_number(self.a),
            self.operation.symbol(),
            format_number(self.b),
            format_number(self.result)
        )
    }
}

/// Evaluate `a <op> b`.
pub fn calculate(operation: Operation, a: f64, b: f64) -> WorkbenchResult<Calculation> {
    let result = operation.apply(a, b)?;
    Ok(Calculation {
        operation,
        a,
        b,
        result,
    })
}

/// Render whole numbers without a trailing `.0`.
pub fn format_number(value: f64) -> String {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if value.fract() == 0.0 && value.abs() < MAX_EXACT {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
