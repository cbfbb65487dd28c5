use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures::future::FutureExt;
use futures::stream::StreamExt;
use futures::{Stream, TryStreamExt};
use reqwest::header::HeaderMap;
use reqwest::{Request, StatusCode};
use rowsheet_error::{ErrorKind, Result, SheetsError};
use tracing::trace;

/// Http client backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(client: reqwest::Client) -> Self {
        ReqwestClient { client }
    }
}

impl crate::client::HttpClient for ReqwestClient {
    type Response = ReqwestResponse;
    type RequestFuture = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send + 'static>>;

    fn do_request(&self, request: Request) -> Self::RequestFuture {
        trace!(method = %request.method(), url = %request.url(), "http request");
        let fut = self.client.execute(request).map(|result| match result {
            Ok(resp) => Ok(ReqwestResponse(resp)),
            Err(e) => Err(SheetsError::with_source("Failed to make request", Box::new(e))
                .with_kind(ErrorKind::Transport)),
        });
        Box::pin(fut)
    }
}

#[derive(Debug)]
pub struct ReqwestResponse(reqwest::Response);

impl crate::client::HttpResponse for ReqwestResponse {
    type BytesStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>;

    fn status(&self) -> StatusCode {
        self.0.status()
    }

    fn headers(&self) -> &HeaderMap {
        self.0.headers()
    }

    fn into_bytes_stream(self) -> Self::BytesStream {
        let stream = self.0.bytes_stream().map_err(|e| {
            SheetsError::with_source("Failed to stream body", Box::new(e))
                .with_kind(ErrorKind::Transport)
        });
        stream.boxed()
    }
}
