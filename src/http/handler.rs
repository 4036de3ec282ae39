//! The handler seam between the host and application code.

use async_trait::async_trait;

use crate::http::error::HandlerError;
use crate::http::middleware::RequestContext;
use crate::http::request::ApiRequest;
use crate::http::response::ApiResponse;

/// Application request handler.
///
/// A handler writes its response through `res` and reports failures by
/// returning `Err`; it should call exactly one emitting operation.
#[async_trait]
pub trait ApiHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError>;
}

/// Adapter for synchronous closures.
pub struct SyncHandler<F>(F);

/// Wrap a synchronous closure as an [`ApiHandler`].
pub fn sync_handler<F>(f: F) -> SyncHandler<F>
where
    F: Fn(&RequestContext, &ApiRequest, &mut dyn ApiResponse) -> Result<(), HandlerError> + Send + Sync,
{
    SyncHandler(f)
}

#[async_trait]
impl<F> ApiHandler for SyncHandler<F>
where
    F: Fn(&RequestContext, &ApiRequest, &mut dyn ApiResponse) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle(
        &self,
        ctx: &RequestContext,
        req: &ApiRequest,
        res: &mut dyn ApiResponse,
    ) -> Result<(), HandlerError> {
        (self.0)(ctx, req, res)
    }
}
