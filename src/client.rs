use crate::error::{GcmError, ServerErrorKind};
use crate::message::Message;
use crate::response::Response;
use reqwest::header::RETRY_AFTER;
use reqwest::{redirect, StatusCode};
use url::Url;

/// Well-known GCM send endpoint
pub const SERVER_URI: &str = "https://gcm-http.googleapis.com/gcm/send";

/// Holds the API key and HTTP transport used to reach the GCM service. One
/// instance is meant to be constructed once and reused across sends.
#[derive(Clone, Debug)]
pub struct Client {
    api_key: String,
    endpoint: Url,
    http: reqwest::Client,
}

/// Builder for `Client`. The endpoint and transport knobs exist for
/// dependency injection; most callers only provide the API key.
pub struct ClientBuilder {
    api_key: String,
    endpoint: Url,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    fn new(api_key: String) -> Self {
        ClientBuilder {
            api_key,
            endpoint: Url::parse(SERVER_URI).expect("SERVER_URI is a valid URL"),
            http: None,
        }
    }

    /// Override the target endpoint
    pub fn endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Inject an HTTP transport. Callers providing their own transport are
    /// responsible for its redirect policy; the Authorization header must not
    /// be replayed to untrusted hosts.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<Client, GcmError> {
        if self.api_key.is_empty() {
            return Err(GcmError::InvalidArgument(EMPTY_API_KEY));
        }
        let http = match self.http {
            Some(http) => http,
            None => default_http_client()?,
        };
        Ok(Client {
            api_key: self.api_key,
            endpoint: self.endpoint,
            http,
        })
    }
}

const EMPTY_API_KEY: &str = "the api key must not be empty";

/// The default transport refuses redirects so the `Authorization` header can
/// never be replayed to another host.
fn default_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
}

impl Client {
    /// Create a `Client` for the given API key, with the default endpoint
    /// and transport
    pub fn new(api_key: impl Into<String>) -> Result<Self, GcmError> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key.into())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replace the API key. Rejects an empty key, leaving the stored key
    /// unchanged.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) -> Result<&mut Self, GcmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(GcmError::InvalidArgument(EMPTY_API_KEY));
        }
        self.api_key = api_key;
        Ok(self)
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn set_http_client(&mut self, http: reqwest::Client) -> &mut Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the message and block on the single round trip. Transport
    /// failures pass through untouched; HTTP error statuses map to the
    /// matching `GcmError` variant before the body is ever parsed.
    pub async fn send(&self, message: &Message) -> Result<Response, GcmError> {
        trace!(
            "Sending message to {} recipient(s)",
            message.registration_ids().len()
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("Authorization", format!("key={}", self.api_key))
            .header("Content-Type", "application/json")
            .json(message)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::INTERNAL_SERVER_ERROR => Err(GcmError::Server {
                kind: ServerErrorKind::InternalServerError,
                retry_after: retry_after(&response),
            }),
            StatusCode::SERVICE_UNAVAILABLE => Err(GcmError::Server {
                kind: ServerErrorKind::ServiceUnavailable,
                retry_after: retry_after(&response),
            }),
            StatusCode::UNAUTHORIZED => Err(GcmError::Authentication),
            StatusCode::BAD_REQUEST => Err(GcmError::BadRequest(response.text().await?)),
            _ => {
                let body = response.text().await?;
                let decoded = serde_json::from_str(&body).map_err(GcmError::InvalidBody)?;
                Ok(Response::new(decoded, message.clone()))
            }
        }
    }
}

/// Raw `Retry-After` header value, if the server sent one. Delta-seconds and
/// HTTP-date forms are both passed through unparsed.
fn retry_after(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use crate::client::Client;
    use crate::error::{GcmError, ServerErrorKind};
    use crate::message::Message;
    use reqwest::StatusCode;
    use url::Url;

    const API_KEY: &str = "test-api-key";

    /// Start building a mock for the GCM endpoint
    fn mock_gcm_endpoint_builder() -> mockito::Mock {
        mockito::mock("POST", "/gcm/send")
    }

    /// Make a `Client` which uses the mock server
    fn make_client() -> Client {
        let endpoint = Url::parse(&format!("{}/gcm/send", mockito::server_url())).unwrap();
        Client::builder(API_KEY).endpoint(endpoint).build().unwrap()
    }

    fn make_message() -> Message {
        let mut message = Message::new();
        message.add_registration_id("test-token").unwrap();
        message
    }

    #[test]
    fn api_key_round_trips() {
        let mut client = Client::new(API_KEY).unwrap();
        assert_eq!(client.api_key(), API_KEY);

        client.set_api_key("other-key").unwrap();
        assert_eq!(client.api_key(), "other-key");
    }

    #[test]
    fn default_endpoint_is_the_gcm_server() {
        let client = Client::new(API_KEY).unwrap();
        assert_eq!(client.endpoint().as_str(), crate::client::SERVER_URI);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            Client::new("").as_ref().unwrap_err(),
            GcmError::InvalidArgument(_)
        ));

        let mut client = Client::new(API_KEY).unwrap();
        let result = client.set_api_key("");
        assert!(matches!(
            result.as_ref().unwrap_err(),
            GcmError::InvalidArgument(_)
        ));
        // The stored key is unchanged
        assert_eq!(client.api_key(), API_KEY);
    }

    /// The client uses the API key and message to build the expected request
    #[tokio::test]
    async fn sends_correct_request() {
        let client = make_client();
        let gcm_mock = mock_gcm_endpoint_builder()
            .match_header("Authorization", format!("key={API_KEY}").as_str())
            .match_header("Content-Type", "application/json")
            .match_body(r#"{"registration_ids":["test-token"]}"#)
            .with_body(r#"{"multicast_id":1,"success":1,"failure":0,"canonical_ids":0,"results":[{"message_id":"abc"}]}"#)
            .create();

        let message = make_message();
        let result = client.send(&message).await;
        assert!(result.is_ok(), "result = {result:?}");

        let response = result.unwrap();
        assert_eq!(response.multicast_id(), 1);
        assert_eq!(response.success_count(), 1);
        assert_eq!(response.failure_count(), 0);
        assert_eq!(response.results()[0].message_id.as_deref(), Some("abc"));
        assert_eq!(response.message(), &message);
        gcm_mock.assert();
    }

    /// 500 responses carry the Retry-After hint out of band
    #[tokio::test]
    async fn internal_server_error() {
        let client = make_client();
        let _gcm_mock = mock_gcm_endpoint_builder()
            .with_status(500)
            .with_header("Retry-After", "120")
            .create();

        let result = client.send(&make_message()).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(
            matches!(
                error,
                GcmError::Server {
                    kind: ServerErrorKind::InternalServerError,
                    ..
                }
            ),
            "error = {error:?}"
        );
        assert_eq!(error.retry_after(), Some("120"));
        assert!(error.to_string().contains("Internal Server Error"));
        assert!(error.to_string().contains("120"));
    }

    /// 503 without a Retry-After header omits the retry text entirely
    #[tokio::test]
    async fn service_unavailable_without_retry_hint() {
        let client = make_client();
        let _gcm_mock = mock_gcm_endpoint_builder().with_status(503).create();

        let result = client.send(&make_message()).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(
            matches!(
                error,
                GcmError::Server {
                    kind: ServerErrorKind::ServiceUnavailable,
                    ..
                }
            ),
            "error = {error:?}"
        );
        assert_eq!(error.retry_after(), None);
        assert!(error.to_string().contains("Server Unavailable"));
        assert!(!error.to_string().contains("Retry After"));
        assert_eq!(error.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    /// Authorization errors are handled regardless of body content
    #[tokio::test]
    async fn unauthorized() {
        let client = make_client();
        let _gcm_mock = mock_gcm_endpoint_builder()
            .with_status(401)
            .with_body("key mismatch")
            .create();

        let result = client.send(&make_message()).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, GcmError::Authentication), "error = {error:?}");
        assert_eq!(error.to_string(), "401 Forbidden; Authentication Error");
    }

    /// 400 responses carry the server's detail text through
    #[tokio::test]
    async fn bad_request() {
        let client = make_client();
        let _gcm_mock = mock_gcm_endpoint_builder()
            .with_status(400)
            .with_body("InvalidRegistration")
            .create();

        let result = client.send(&make_message()).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(
            matches!(&error, GcmError::BadRequest(body) if body == "InvalidRegistration"),
            "error = {error:?}"
        );
        assert!(error.to_string().contains("InvalidRegistration"));
    }

    /// A 200 with a body that is not JSON is a parse failure
    #[tokio::test]
    async fn invalid_body() {
        let client = make_client();
        let _gcm_mock = mock_gcm_endpoint_builder()
            .with_status(200)
            .with_body("")
            .create();

        let result = client.send(&make_message()).await;
        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(matches!(error, GcmError::InvalidBody(_)), "error = {error:?}");
        assert_eq!(
            error.to_string(),
            "Response body did not contain a valid JSON response"
        );
    }
}
