use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
}

impl Operation {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            Operation::Addition => a + b,
            Operation::Subtraction => a - b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    pub success: bool,
    pub result: f64,
    pub operation: Operation,
}

impl CalculationResponse {
    pub fn new(result: f64, operation: Operation) -> Self {
        Self {
            success: true,
            result,
            operation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResponse {
    pub success: bool,
    pub abbreviation: String,
    pub expansion: String,
}

impl ExpansionResponse {
    pub fn new(abbreviation: impl Into<String>, expansion: impl Into<String>) -> Self {
        Self {
            success: true,
            abbreviation: abbreviation.into(),
            expansion: expansion.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernameResponse {
    pub success: bool,
    pub username: String,
    pub length: usize,
}

impl UsernameResponse {
    /// `length` counts characters, not bytes.
    pub fn new(username: String) -> Self {
        let length = username.chars().count();
        Self {
            success: true,
            username,
            length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResponse {
    pub success: bool,
    pub password: String,
    pub length: usize,
}

impl PasswordResponse {
    pub fn new(password: String) -> Self {
        let length = password.chars().count();
        Self {
            success: true,
            password,
            length,
        }
    }
}

/// Failure envelope. `available` is only present on lookup misses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            available: None,
        }
    }

    pub fn with_available(mut self, available: Vec<String>) -> Self {
        self.available = Some(available);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
            service: "backend".to_string(),
        }
    }
}
