//! A minimal cookie-carrying client for driving the app in tests
#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::test::TestRequest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};

static NEXT_ADDRESS: AtomicU8 = AtomicU8::new(1);

/// Keeps the session cookie between requests and gives every browser its own
/// client address, so tests do not share rate limit buckets.
pub struct Browser {
    cookies: HashMap<String, Cookie<'static>>,
    pub address: String,
}

impl Default for Browser {
    fn default() -> Self {
        Self::new()
    }
}

impl Browser {
    pub fn new() -> Self {
        let n = NEXT_ADDRESS.fetch_add(1, Ordering::SeqCst);
        Self {
            cookies: HashMap::new(),
            address: format!("198.51.100.{}", n),
        }
    }

    fn prepare(&self, req: TestRequest) -> TestRequest {
        let mut req = req.insert_header(("x-forwarded-for", self.address.as_str()));
        for cookie in self.cookies.values() {
            req = req.cookie(cookie.clone());
        }
        req
    }

    pub fn get(&self, path: &str) -> TestRequest {
        self.prepare(TestRequest::get().uri(path))
    }

    pub fn post(&self, path: &str) -> TestRequest {
        self.prepare(TestRequest::post().uri(path))
    }

    /// Remembers cookies set by `resp`.
    pub fn store<B>(&mut self, resp: &ServiceResponse<B>) {
        for cookie in resp.response().cookies() {
            self.cookies
                .insert(cookie.name().to_owned(), cookie.into_owned());
        }
    }
}

/// Location header of a redirect.
pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

/// Pulls the CSRF token out of the first form on a rendered page.
pub fn csrf_token(html: &str) -> String {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker).expect("page has a csrf field") + marker.len();
    html[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "----votebox-test-boundary".to_owned(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the finished body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
