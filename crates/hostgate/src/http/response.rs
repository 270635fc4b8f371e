//! Response builders shared by every route.

use std::fmt::Display;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderValue, SERVER};
use hyper::{Method, Response, StatusCode};

/// Body type of every gateway response.
pub(crate) type Body = Full<Bytes>;

const JSON: &str = "application/json";
const PLAIN_TEXT: &str = "text/plain";

pub(crate) fn json(body: String, server: &str) -> Response<Body> {
    build(StatusCode::OK, JSON, body, server)
}

pub(crate) fn text(status: StatusCode, body: String, server: &str) -> Response<Body> {
    build(status, PLAIN_TEXT, body, server)
}

pub(crate) fn not_found(server: &str) -> Response<Body> {
    text(StatusCode::NOT_FOUND, "File not found\r\n".to_owned(), server)
}

pub(crate) fn invalid_method(method: &Method, server: &str) -> Response<Body> {
    text(
        StatusCode::BAD_REQUEST,
        format!("Invalid request-method '{method}'"),
        server,
    )
}

pub(crate) fn internal_error(error: &dyn Display, server: &str) -> Response<Body> {
    text(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("An error occurred: {error}"),
        server,
    )
}

/// Response with no body, used for protocol switches.
pub(crate) fn empty(status: StatusCode, server: &str) -> Response<Body> {
    let mut response = Response::new(Body::default());
    *response.status_mut() = status;
    insert_server(&mut response, server);
    response
}

fn build(
    status: StatusCode,
    content_type: &'static str,
    body: String,
    server: &str,
) -> Response<Body> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    insert_server(&mut response, server);
    response
}

fn insert_server(response: &mut Response<Body>, server: &str) {
    if let Ok(value) = HeaderValue::from_str(server) {
        response.headers_mut().insert(SERVER, value);
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("full body")
            .to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn not_found_is_plain_text() {
        let response = not_found("Beast");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[SERVER], "Beast");
        assert_eq!(body_text(response).await, "File not found\r\n");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn invalid_method_names_the_method() {
        let response = invalid_method(&Method::PUT, "Beast");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid request-method 'PUT'");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn internal_errors_carry_the_message() {
        let response = internal_error(&"boom", "Beast");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "An error occurred: boom");
    }

    #[test]
    fn unusable_server_names_are_skipped() {
        let response = json("{}".to_owned(), "bad\nname");
        assert!(response.headers().get(SERVER).is_none());
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
