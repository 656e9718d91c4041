use serde::{Deserialize, Serialize};

/// A number that may arrive as a JSON number or as numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    /// Returns the finite value, if there is one.
    ///
    /// Text is trimmed before parsing. `inf` and `nan` spellings parse but
    /// are rejected along with every other non-finite value.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            NumberLike::Number(n) => *n,
            NumberLike::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for NumberLike {
    fn from(value: f64) -> Self {
        NumberLike::Number(value)
    }
}

/// An integer that may arrive as a JSON integer, a JSON float (truncated
/// toward zero) or integer text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerLike {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl IntegerLike {
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            IntegerLike::Integer(n) => Some(*n),
            IntegerLike::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            IntegerLike::Float(_) => None,
            IntegerLike::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

impl From<i64> for IntegerLike {
    fn from(value: i64) -> Self {
        IntegerLike::Integer(value)
    }
}

/// Body of `/api/calculator/add` and `/api/calculator/subtract`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num1: Option<NumberLike>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num2: Option<NumberLike>,
}

impl CalculationRequest {
    pub fn new(num1: f64, num2: f64) -> Self {
        Self {
            num1: Some(num1.into()),
            num2: Some(num2.into()),
        }
    }
}

/// Body of the abbreviation endpoints. A missing field looks up `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRequest {
    #[serde(default)]
    pub abbreviation: String,
}

impl AbbreviationRequest {
    pub fn new(abbreviation: impl Into<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
        }
    }
}

fn yes() -> bool {
    true
}

fn default_username_length() -> IntegerLike {
    IntegerLike::Integer(8)
}

fn default_password_length() -> IntegerLike {
    IntegerLike::Integer(12)
}

// Fields without `Option` reject an explicit `null`; only absence means default.

/// Body of `/api/credentials_generator/generate_username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsernameRequest {
    #[serde(default = "default_username_length")]
    pub length: IntegerLike,
    #[serde(default = "yes")]
    pub include_numbers: bool,
    #[serde(default)]
    pub include_special: bool,
    #[serde(default)]
    pub prefix: String,
}

impl Default for UsernameRequest {
    fn default() -> Self {
        Self {
            length: default_username_length(),
            include_numbers: true,
            include_special: false,
            prefix: String::new(),
        }
    }
}

/// Body of `/api/credentials_generator/generate_password`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordRequest {
    #[serde(default = "default_password_length")]
    pub length: IntegerLike,
    #[serde(default = "yes")]
    pub include_uppercase: bool,
    #[serde(default = "yes")]
    pub include_lowercase: bool,
    #[serde(default = "yes")]
    pub include_numbers: bool,
    #[serde(default = "yes")]
    pub include_special: bool,
}

impl Default for PasswordRequest {
    fn default() -> Self {
        Self {
            length: default_password_length(),
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_special: true,
        }
    }
}
