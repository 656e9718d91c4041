use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use toolbelt_proto::{
    AbbreviationRequest, CalculationRequest, CalculationResponse, ErrorResponse,
    ExpansionResponse, HealthResponse, PasswordRequest, PasswordResponse, UsernameRequest,
    UsernameResponse,
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{error}")]
    Api {
        status: u16,
        error: String,
        available: Option<Vec<String>>,
    },

    #[error("unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },
}

impl ClientError {
    /// The error envelope as the server sent it, when there was one.
    pub fn to_response(&self) -> Option<ErrorResponse> {
        match self {
            ClientError::Api {
                error, available, ..
            } => {
                let response = ErrorResponse::new(error.clone());
                Some(match available {
                    Some(codes) => response.with_available(codes.clone()),
                    None => response,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Table {
    TimeZones,
    NewAge,
}

impl Table {
    fn path(self) -> &'static str {
        match self {
            Table::TimeZones => "/api/abbreviation/time_zones",
            Table::NewAge => "/api/abbreviation/new_age_expansions",
        }
    }
}

/// Thin client over the toolbelt HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn add(&self, num1: f64, num2: f64) -> Result<CalculationResponse, ClientError> {
        self.post("/api/calculator/add", &CalculationRequest::new(num1, num2))
            .await
    }

    pub async fn subtract(
        &self,
        num1: f64,
        num2: f64,
    ) -> Result<CalculationResponse, ClientError> {
        self.post(
            "/api/calculator/subtract",
            &CalculationRequest::new(num1, num2),
        )
        .await
    }

    pub async fn expand(
        &self,
        table: Table,
        abbreviation: &str,
    ) -> Result<ExpansionResponse, ClientError> {
        self.post(table.path(), &AbbreviationRequest::new(abbreviation))
            .await
    }

    pub async fn username(&self, req: &UsernameRequest) -> Result<UsernameResponse, ClientError> {
        self.post("/api/credentials_generator/generate_username", req)
            .await
    }

    pub async fn password(&self, req: &PasswordRequest) -> Result<PasswordResponse, ClientError> {
        self.post("/api/credentials_generator/generate_password", req)
            .await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).send().await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return serde_json::from_str(&body).map_err(|_| ClientError::Unexpected {
            status: status.as_u16(),
            body,
        });
    }
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => Err(ClientError::Api {
            status: status.as_u16(),
            error: err.error,
            available: err.available,
        }),
        Err(_) => Err(ClientError::Unexpected {
            status: status.as_u16(),
            body,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn add_posts_operands() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/calculator/add")
                    .json_body(json!({"num1": 1.5, "num2": 2.0}));
                then.status(200).json_body(
                    json!({"success": true, "result": 3.5, "operation": "addition"}),
                );
            })
            .await;

        let client = ApiClient::new(server.base_url());
        let res = client.add(1.5, 2.0).await.expect("add");
        mock.assert_async().await;
        assert_eq!(res.result, 3.5);
    }

    #[tokio::test]
    async fn expand_surfaces_available_codes_on_miss() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/abbreviation/time_zones");
                then.status(404).json_body(json!({
                    "success": false,
                    "error": "Timezone abbreviation \"XYZ\" not found.",
                    "available": ["MST", "EST", "PST", "CST", "GMT"]
                }));
            })
            .await;

        let client = ApiClient::new(format!("{}/", server.base_url()));
        let err = client.expand(Table::TimeZones, "xyz").await.unwrap_err();
        match err {
            ClientError::Api {
                status, available, ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(available.map(|a| a.len()), Some(5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn password_sends_flags() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/credentials_generator/generate_password")
                    .json_body(json!({
                        "length": 16,
                        "include_uppercase": true,
                        "include_lowercase": true,
                        "include_numbers": false,
                        "include_special": false
                    }));
                then.status(200).json_body(
                    json!({"success": true, "password": "abcdEFGHijklMNOP", "length": 16}),
                );
            })
            .await;

        let client = ApiClient::new(server.base_url());
        let req = PasswordRequest {
            length: 16.into(),
            include_numbers: false,
            include_special: false,
            ..PasswordRequest::default()
        };
        let res = client.password(&req).await.expect("password");
        mock.assert_async().await;
        assert_eq!(res.length, 16);
    }

    #[tokio::test]
    async fn non_json_error_is_unexpected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(502).body("bad gateway");
            })
            .await;

        let client = ApiClient::new(server.base_url());
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::Unexpected { status: 502, .. }));
    }
}
