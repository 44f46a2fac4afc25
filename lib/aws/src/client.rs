use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use rustls::{ClientConfig, RootCertStore};
use rustls_native_certs::CertificateResult;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::query::Query;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("build http request failed, {0}")]
    BuildRequest(http::Error),
    #[error(transparent)]
    Http(hyper_util::client::legacy::Error),
    #[error("read http response failed, {0}")]
    ReadResponse(hyper::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("api error, status: {status}, code: {}, message: {}", .response.code, .response.message)]
    Api {
        status: StatusCode,
        response: ErrorResponse,
    },
    #[error("deserialize response failed, {0}")]
    Deserialize(quick_xml::DeError),
}

impl Error {
    /// Whether the remote answered, but with a body we could not make sense of.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Deserialize(_))
    }
}

impl From<quick_xml::DeError> for Error {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Deserialize(err)
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Error::ReadResponse(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::BuildRequest(err)
    }
}

/// An error document returned by the API.
///
/// ELBv2 wraps it as `ErrorResponse/Error`, EC2 as `Response/Errors/Error`,
/// both carry the same `Code` and `Message` pair.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorList {
    #[serde(rename = "Error", default)]
    errors: Vec<ErrorResponse>,
}

#[derive(Deserialize)]
struct ErrorDocument {
    #[serde(rename = "Error")]
    error: Option<ErrorResponse>,
    #[serde(rename = "Errors")]
    errors: Option<ErrorList>,
}

impl ErrorResponse {
    fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let parsed = quick_xml::de::from_str::<ErrorDocument>(&text)
            .ok()
            .and_then(|doc| {
                doc.error
                    .or_else(|| doc.errors.and_then(|list| list.errors.into_iter().next()))
            });

        match parsed {
            Some(resp) => resp,
            None => ErrorResponse {
                code: status.as_str().to_string(),
                message: text.trim().to_string(),
            },
        }
    }
}

/// Metadata returned by every ELBv2 call
#[derive(Debug, Default, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub region: String,

    /// Overrides `https://elasticloadbalancing.{region}.amazonaws.com`
    pub elbv2_endpoint: Option<String>,

    /// Overrides `https://ec2.{region}.amazonaws.com`
    pub ec2_endpoint: Option<String>,

    /// Applies to each request, from sending it to reading the whole body.
    pub timeout: Duration,
}

impl Config {
    pub fn new(region: impl Into<String>) -> Self {
        Config {
            region: region.into(),
            elbv2_endpoint: None,
            ec2_endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    fn elbv2_endpoint(&self) -> String {
        match &self.elbv2_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://elasticloadbalancing.{}.amazonaws.com", self.region),
        }
    }

    fn ec2_endpoint(&self) -> String {
        match &self.ec2_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://ec2.{}.amazonaws.com", self.region),
        }
    }
}

#[derive(Clone)]
pub struct Client {
    http_client: HttpClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    pub(crate) elbv2_endpoint: String,
    pub(crate) ec2_endpoint: String,
    timeout: Duration,
}

impl Client {
    pub fn new(config: &Config) -> Self {
        let CertificateResult { certs, errors, .. } = rustls_native_certs::load_native_certs();
        for err in errors {
            debug!(message = "load native certificate failed", %err);
        }

        let mut root_store = RootCertStore::empty();
        for cert in certs {
            if let Err(err) = root_store.add(cert) {
                debug!(message = "certificate parse failed", %err);
            }
        }

        if root_store.is_empty() {
            debug!(message = "no valid native root CA certificates found");
        }

        let tls = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let builder = HttpsConnectorBuilder::new()
            .with_tls_config(tls)
            .https_or_http();
        let mut inner = HttpConnector::new();
        inner.enforce_http(false);
        let connector = builder.enable_http1().wrap_connector(inner);

        let http_client = HttpClient::builder(TokioExecutor::new()).build(connector);

        Client {
            http_client,
            elbv2_endpoint: config.elbv2_endpoint(),
            ec2_endpoint: config.ec2_endpoint(),
            timeout: config.timeout,
        }
    }

    /// Send a query request and decode the XML response into `T`.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Query,
    ) -> Result<T, Error> {
        let body = query.finish();
        trace!(message = "sending query request", endpoint, %body);

        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("{endpoint}/"))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(USER_AGENT, concat!("tgsync/", env!("CARGO_PKG_VERSION")))
            .body(Full::new(Bytes::from(body)))?;

        let fut = async {
            let resp = self.http_client.request(req).await.map_err(Error::Http)?;
            let (parts, incoming) = resp.into_parts();
            let body = incoming.collect().await?.to_bytes();

            Ok::<_, Error>((parts.status, body))
        };

        let (status, body) = tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        if !status.is_success() {
            return Err(Error::Api {
                status,
                response: ErrorResponse::from_body(status, &body),
            });
        }

        let text = String::from_utf8_lossy(&body);
        quick_xml::de::from_str::<T>(&text).map_err(Error::Deserialize)
    }
}
