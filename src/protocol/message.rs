//! Built-in message schemas for the calculator exchange.
//!
//! These are ordinary instances of the packet framework: each variant is an
//! opcode plus an ordered field table, with typed accessors over the field
//! slots. They double as the reference example for defining new variants.

use crate::core::binary::{Bin, Value};
use crate::core::packet::{Field, Packet};
use crate::error::Result;
use crate::protocol::registry::Registry;
use tracing::{info, warn};

/// Wire opcodes for the built-in variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    CalculateExpression = 5,
    CalculationResult = 6,
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode as u8
    }
}

/// Outcome code carried by [`CalcResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    Ok,
    InvalidInput,
    DivByZero,
}

impl CalcError {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(CalcError::Ok),
            1 => Some(CalcError::InvalidInput),
            2 => Some(CalcError::DivByZero),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            CalcError::Ok => 0,
            CalcError::InvalidInput => 1,
            CalcError::DivByZero => 2,
        }
    }
}

/// Request to evaluate an expression, sent as a list of operation tokens.
pub struct CalcRequest {
    fields: [Field; 1],
}

impl Default for CalcRequest {
    fn default() -> Self {
        Self {
            fields: [Field::list("operations", Bin::String)],
        }
    }
}

impl CalcRequest {
    pub fn new<I, S>(operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut request = Self::default();
        request.set_operations(operations);
        request
    }

    pub fn operations(&self) -> Vec<String> {
        self.fields[0]
            .value()
            .as_list()
            .unwrap_or_default()
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    }

    pub fn set_operations<I, S>(&mut self, operations: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Value::List(items) = self.fields[0].value_mut() {
            *items = operations
                .into_iter()
                .map(|op| Value::Str(op.into()))
                .collect();
        }
    }
}

impl Packet for CalcRequest {
    fn opcode(&self) -> u8 {
        Opcode::CalculateExpression.into()
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }
}

/// Result of an evaluated expression: outcome code plus the numeric value.
pub struct CalcResponse {
    fields: [Field; 2],
}

impl Default for CalcResponse {
    fn default() -> Self {
        Self {
            fields: [
                Field::new("error", Bin::Int32),
                Field::new("result", Bin::Float64),
            ],
        }
    }
}

impl CalcResponse {
    pub fn error(&self) -> Option<CalcError> {
        CalcError::from_code(self.fields[0].value().as_i32().unwrap_or_default())
    }

    pub fn result(&self) -> f64 {
        self.fields[1].value().as_f64().unwrap_or_default()
    }

    pub fn set_error(&mut self, error: CalcError) {
        if let Value::I32(code) = self.fields[0].value_mut() {
            *code = error.code();
        }
    }

    pub fn set_result(&mut self, result: f64) {
        if let Value::F64(value) = self.fields[1].value_mut() {
            *value = result;
        }
    }
}

impl Packet for CalcResponse {
    fn opcode(&self) -> u8 {
        Opcode::CalculationResult.into()
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut [Field] {
        &mut self.fields
    }

    fn parse(&mut self) {
        match self.error() {
            Some(CalcError::Ok) => info!(result = self.result(), "calculation result received"),
            Some(err) => warn!(error = ?err, "calculation failed"),
            None => warn!("calculation result carried an unknown error code"),
        }
    }
}

/// Register the built-in variants on a registry.
pub fn register_builtin(registry: &Registry) -> Result<()> {
    registry.register::<CalcRequest>()?;
    registry.register::<CalcResponse>()?;
    Ok(())
}
