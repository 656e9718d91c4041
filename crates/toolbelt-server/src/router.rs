use serde::de::DeserializeOwned;
use serde::Serialize;
use tiny_http::Method;
use toolbelt_core::abbreviation::{self, TableKind};
use toolbelt_core::credentials::{self, GenerationLimits};
use toolbelt_core::{calculator, ApiError, ErrorKind};
use toolbelt_proto::{
    AbbreviationRequest, CalculationRequest, HealthResponse, PasswordRequest, UsernameRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Add,
    Subtract,
    TimeZones,
    NewAge,
    Username,
    Password,
    Health,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Add,
        Route::Subtract,
        Route::TimeZones,
        Route::NewAge,
        Route::Username,
        Route::Password,
        Route::Health,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Add => "/api/calculator/add",
            Route::Subtract => "/api/calculator/subtract",
            Route::TimeZones => "/api/abbreviation/time_zones",
            Route::NewAge => "/api/abbreviation/new_age_expansions",
            Route::Username => "/api/credentials_generator/generate_username",
            Route::Password => "/api/credentials_generator/generate_password",
            Route::Health => "/health",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Route::Health => Method::Get,
            _ => Method::Post,
        }
    }

    /// Path lookup; the query string is ignored.
    pub fn from_url(url: &str) -> Option<Route> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        Route::ALL.into_iter().find(|r| r.path() == path)
    }
}

/// A framed response: status code, JSON body and any extra headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: Vec<(&'static str, String)>,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Reply {
        match serde_json::to_vec(value) {
            Ok(body) => Reply {
                status,
                body,
                headers: Vec::new(),
            },
            Err(e) => Reply::error(&ApiError::Internal(e.to_string())),
        }
    }

    pub fn error(err: &ApiError) -> Reply {
        if let ApiError::Internal(detail) = err {
            tracing::error!(%detail, "request failed unexpectedly");
        }
        let status = status_for(err.kind());
        match serde_json::to_vec(&err.to_response()) {
            Ok(body) => Reply {
                status,
                body,
                headers: Vec::new(),
            },
            Err(_) => Reply {
                status: 500,
                body: br#"{"success":false,"error":"Internal server error."}"#.to_vec(),
                headers: Vec::new(),
            },
        }
    }

    fn preflight(request_headers: Option<&str>) -> Reply {
        Reply {
            status: 204,
            body: Vec::new(),
            headers: vec![
                ("Access-Control-Allow-Methods", "GET, POST, OPTIONS".to_string()),
                (
                    "Access-Control-Allow-Headers",
                    request_headers.unwrap_or("Content-Type").to_string(),
                ),
                ("Access-Control-Max-Age", "86400".to_string()),
            ],
        }
    }

    fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Reply {
        self.headers.push((name, value.into()));
        self
    }

    /// Parses the body as JSON, mainly for tests.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::BadRequest => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::MethodNotAllowed => 405,
        ErrorKind::PayloadTooLarge => 413,
        ErrorKind::Internal => 500,
    }
}

/// Incoming request, already read off the wire.
#[derive(Debug, Clone, Copy)]
pub struct Incoming<'a> {
    pub method: &'a Method,
    pub url: &'a str,
    pub body: &'a [u8],
    /// Value of `Access-Control-Request-Headers`, if sent.
    pub cors_request_headers: Option<&'a str>,
}

/// Dispatches requests to the handlers in `toolbelt-core`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    limits: GenerationLimits,
}

impl Router {
    pub fn new(limits: GenerationLimits) -> Self {
        Self { limits }
    }

    pub fn dispatch(&self, req: Incoming<'_>) -> Reply {
        let Some(route) = Route::from_url(req.url) else {
            return Reply::error(&ApiError::RouteNotFound);
        };
        if *req.method == Method::Options {
            return Reply::preflight(req.cors_request_headers);
        }
        if *req.method != route.method() {
            let allow = format!("{}, OPTIONS", route.method());
            return Reply::error(&ApiError::MethodNotAllowed).with_header("Allow", allow);
        }
        match self.handle(route, req.body) {
            Ok(reply) => reply,
            Err(err) => Reply::error(&err),
        }
    }

    fn handle(&self, route: Route, body: &[u8]) -> Result<Reply, ApiError> {
        let limits = self.limits;
        let response = match route {
            Route::Health => return Ok(Reply::json(200, &HealthResponse::default())),
            Route::Add => {
                let req: CalculationRequest = parse(route, body, ApiError::InvalidCalculation)?;
                to_json(calculator::add(&req)?)
            }
            Route::Subtract => {
                let req: CalculationRequest = parse(route, body, ApiError::InvalidCalculation)?;
                to_json(calculator::subtract(&req)?)
            }
            Route::TimeZones | Route::NewAge => {
                let req: AbbreviationRequest =
                    parse(route, body, ApiError::InvalidAbbreviationRequest)?;
                let kind = if route == Route::TimeZones {
                    TableKind::TimeZones
                } else {
                    TableKind::NewAge
                };
                to_json(abbreviation::expand(kind, &req)?)
            }
            Route::Username => {
                let req: UsernameRequest = parse(route, body, ApiError::InvalidGeneratorInput)?;
                to_json(credentials::generate_username(&req, limits)?)
            }
            Route::Password => {
                let req: PasswordRequest = parse(route, body, ApiError::InvalidGeneratorInput)?;
                to_json(credentials::generate_password(&req, limits)?)
            }
        }?;
        Ok(Reply {
            status: 200,
            body: response,
            headers: Vec::new(),
        })
    }
}

/// `invalid` is the route's own message for a body it cannot read.
fn parse<T: DeserializeOwned>(
    route: Route,
    body: &[u8],
    invalid: ApiError,
) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(path = route.path(), error = %e, "rejected request body");
        invalid
    })
}

fn to_json<T: Serialize>(value: T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(&value).map_err(|e| ApiError::Internal(e.to_string()))
}
