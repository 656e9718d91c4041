use toolbelt_proto::{CalculationRequest, CalculationResponse, NumberLike, Operation};

use crate::ApiError;

pub fn add(req: &CalculationRequest) -> Result<CalculationResponse, ApiError> {
    calculate(Operation::Addition, req)
}

pub fn subtract(req: &CalculationRequest) -> Result<CalculationResponse, ApiError> {
    calculate(Operation::Subtraction, req)
}

/// Both operands must be present and coerce to finite floats.
pub fn calculate(
    operation: Operation,
    req: &CalculationRequest,
) -> Result<CalculationResponse, ApiError> {
    let a = operand(req.num1.as_ref())?;
    let b = operand(req.num2.as_ref())?;
    Ok(CalculationResponse::new(operation.apply(a, b), operation))
}

fn operand(value: Option<&NumberLike>) -> Result<f64, ApiError> {
    value
        .and_then(|v| v.to_f64())
        .ok_or(ApiError::InvalidCalculation)
}
