use std::future::Future;

use async_trait::async_trait;

use crate::protocol::{HandlerError, Response};

/// Logic invoked when a request path matches an endpoint.
///
/// Handlers receive the decoded path (without the leading `/`) and either
/// produce the response or fail with a [`HandlerError`], which the connection
/// answers with `500 Internal Server Error`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, path: &str) -> Result<Response, HandlerError>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, path: &str) -> Result<Response, HandlerError> {
        (**self).call(path).await
    }
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    async fn call(&self, path: &str) -> Result<Response, HandlerError> {
        (self.f)(path.to_owned()).await
    }
}

/// Turns an async function of the request path into a [`Handler`].
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Response, HandlerError>>,
{
    HandlerFn { f }
}
