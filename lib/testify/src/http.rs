use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};
use http_body_util::Full;

/// What a mock handler answers with.
pub type MockResponse = Response<Full<Bytes>>;

/// HTTP status code 404
pub fn not_found() -> MockResponse {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new("Not Found".into()))
        .unwrap()
}

/// A `text/xml` response, the content type AWS query APIs answer with.
pub fn xml(status: StatusCode, body: impl Into<String>) -> MockResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/xml;charset=UTF-8")
        .body(Full::new(Bytes::from(body.into())))
        .unwrap()
}

/// The error document ELBv2 returns for a rejected request.
pub fn elbv2_error(status: StatusCode, code: &str, message: &str) -> MockResponse {
    xml(
        status,
        format!(
            r#"<ErrorResponse xmlns="http://elasticloadbalancing.amazonaws.com/doc/2015-12-01/">
  <Error>
    <Type>Sender</Type>
    <Code>{code}</Code>
    <Message>{message}</Message>
  </Error>
  <RequestId>00000000-0000-0000-0000-000000000000</RequestId>
</ErrorResponse>"#
        ),
    )
}
