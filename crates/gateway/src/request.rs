//! Outbound request description.

use reqwest::Method;
use serde_json::Value;

/// An immutable description of one logical API request.
///
/// The gateway rebuilds every wire request from this value, so a retry
/// reuses the original method, path, body, and headers exactly; only the
/// `Authorization` header differs between attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path joined onto the transport's base URL, e.g. `/catalog/products`.
    pub path: String,
    /// Extra headers beyond `Authorization`, which the gateway owns.
    pub headers: Vec<(String, String)>,
    /// JSON body, when the method carries one.
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::PUT, path);
        request.body = Some(body);
        request
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// One attempt at a logical request.
///
/// Replaces a mutable retried-already flag on a shared request object: the
/// attempt counter travels with the retry logic instead, and the request
/// itself is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub request: &'a ApiRequest,
    pub attempt: u8,
}

impl<'a> Attempt<'a> {
    pub fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            attempt: 0,
        }
    }

    /// The follow-up attempt after a refresh.
    pub fn retry(self) -> Self {
        Self {
            request: self.request,
            attempt: self.attempt + 1,
        }
    }

    /// Whether this attempt already consumed the one-shot auth retry.
    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builders_set_method_and_body() {
        let request = ApiRequest::post("/cart/items", json!({"quantity": 2}))
            .with_header("accept-language", "fr-FR");

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/cart/items");
        assert_eq!(request.body, Some(json!({"quantity": 2})));
        assert_eq!(
            request.headers,
            vec![("accept-language".to_string(), "fr-FR".to_string())]
        );
    }

    #[test]
    fn retry_keeps_the_request_untouched() {
        let request = ApiRequest::get("/profile");
        let first = Attempt::first(&request);
        let retry = first.retry();

        assert!(!first.is_retry());
        assert!(retry.is_retry());
        assert_eq!(retry.request, &request);
    }
}
