//! Wire types shared by the toolbelt server and its clients.
//!
//! Requests are typed per endpoint with the defaults the API documents, and
//! every response is an envelope carrying a top-level `success` flag.

pub mod request;
pub mod response;

pub use request::{
    AbbreviationRequest, CalculationRequest, IntegerLike, NumberLike, PasswordRequest,
    UsernameRequest,
};
pub use response::{
    CalculationResponse, ErrorResponse, ExpansionResponse, HealthResponse, Operation,
    PasswordResponse, UsernameResponse,
};
