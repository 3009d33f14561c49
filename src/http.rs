//! Keyed HTTP requests that write responses through the store.
//!
//! The actual network stack lives behind the [`HttpTransport`] boundary;
//! this module only adds the store write-through (a successful response for
//! a keyed request is stored before the caller's callback runs, so
//! subscribers re-render off the same notification path as any other set)
//! and an optional GET-throttling window.

use crate::error::HttpError;
use crate::store::Store;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// HTTP method for a framework request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

/// A request handed to the transport boundary.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

/// Callback receiving the response. The error-first convention of the
/// original callback shape folds into the `Result`: errors arrive in the
/// `Err` arm, never as a panic or a return value.
pub type HttpCallback = Box<dyn FnOnce(std::result::Result<Value, HttpError>) + Send>;

/// Transport boundary. The embedder supplies the actual network stack
/// (XMLHttpRequest/fetch in a browser embedding); responses are reported
/// through the callback, asynchronously or not.
pub trait HttpTransport: Send + Sync {
    fn dispatch(&self, request: HttpRequest, callback: HttpCallback);
}

/// Keyed request helper bound to a store.
pub struct Http {
    store: Arc<Store>,
    transport: Arc<dyn HttpTransport>,
    /// Keyed GETs inside this window are served from the store instead of
    /// re-issuing the request.
    minimum_keyed_request_threshold: Option<Duration>,
    last_keyed_get: Arc<Mutex<HashMap<String, Instant>>>,
}

impl Http {
    pub fn new(store: Arc<Store>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            store,
            transport,
            minimum_keyed_request_threshold: None,
            last_keyed_get: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// As [`Http::new`], with a GET-throttling window.
    pub fn with_request_threshold(
        store: Arc<Store>,
        transport: Arc<dyn HttpTransport>,
        threshold: Duration,
    ) -> Self {
        Self {
            minimum_keyed_request_threshold: Some(threshold),
            ..Self::new(store, transport)
        }
    }

    /// Issues a GET. With a non-empty `key`, a successful response is
    /// written to the store under that key before `callback` runs.
    pub fn get<F>(&self, key: Option<&str>, url: &str, callback: F)
    where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        self.request(Method::Get, key, url, None, Vec::new(), callback);
    }

    pub fn post<F>(&self, key: Option<&str>, url: &str, data: Option<Value>, callback: F)
    where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        self.request(Method::Post, key, url, data, Vec::new(), callback);
    }

    pub fn put<F>(&self, key: Option<&str>, url: &str, data: Option<Value>, callback: F)
    where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        self.request(Method::Put, key, url, data, Vec::new(), callback);
    }

    pub fn delete<F>(&self, key: Option<&str>, url: &str, callback: F)
    where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        self.request(Method::Delete, key, url, None, Vec::new(), callback);
    }

    pub fn patch<F>(&self, key: Option<&str>, url: &str, data: Option<Value>, callback: F)
    where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        self.request(Method::Patch, key, url, data, Vec::new(), callback);
    }

    /// The general form behind the method helpers; `headers` are sent in
    /// addition to the default JSON content type.
    pub fn request<F>(
        &self,
        method: Method,
        key: Option<&str>,
        url: &str,
        data: Option<Value>,
        headers: Vec<(String, String)>,
        callback: F,
    ) where
        F: FnOnce(std::result::Result<Value, HttpError>) + Send + 'static,
    {
        let key = key.filter(|k| !k.is_empty()).map(str::to_string);

        // Serve a keyed GET from the store while inside the threshold.
        if method == Method::Get {
            if let (Some(threshold), Some(key)) =
                (self.minimum_keyed_request_threshold, key.as_deref())
            {
                let within = self
                    .last_keyed_get
                    .lock()
                    .get(key)
                    .is_some_and(|at| at.elapsed() < threshold);
                if within {
                    if let Some(item) = self.store.get_item(key) {
                        tracing::debug!(key, url, "keyed GET served from store");
                        callback(Ok(item.value.clone()));
                        return;
                    }
                }
            }
        }

        let request = HttpRequest {
            method,
            url: url.to_string(),
            body: data,
            headers: Self::with_default_headers(headers),
        };

        let store = Arc::clone(&self.store);
        let timestamps = Arc::clone(&self.last_keyed_get);
        self.transport.dispatch(
            request,
            Box::new(move |result| match result {
                Ok(value) => {
                    if let Some(key) = key.as_deref() {
                        store.set_item(key, value.clone());
                        if method == Method::Get {
                            timestamps.lock().insert(key.to_string(), Instant::now());
                        }
                    }
                    callback(Ok(value));
                }
                Err(error) => callback(Err(error)),
            }),
        );
    }

    fn with_default_headers(mut headers: Vec<(String, String)>) -> Vec<(String, String)> {
        let has_content_type = headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            headers.insert(
                0,
                (
                    "Content-Type".to_string(),
                    "application/json; charset=UTF-8".to_string(),
                ),
            );
        }
        headers
    }
}
