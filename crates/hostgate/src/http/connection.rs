//! One accepted connection: a single request, its response, then close.

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tracing::{debug, info};

use super::errors::RequestError;
use super::response::{self, Body};
use super::router::{self, Route};
use super::{HTTP_TARGET, upgrade};
use crate::codec::{from_http_path, render_get, render_set};
use crate::gateway::GatewayContext;
use crate::host::Host;
use crate::subscribe::{Subscription, select_events};
use crate::transport::{ConnectionScope, ConnectionStream};

/// Serves `stream` until its single request is answered or upgraded.
///
/// Once `scope.shutdown` fires, a request still being answered completes and
/// the connection closes.
pub(super) async fn serve<H: Host>(
    context: Arc<GatewayContext<H>>,
    stream: ConnectionStream,
    scope: ConnectionScope,
) {
    let shutdown = scope.shutdown.clone();
    let service = service_fn(move |request| {
        let context = Arc::clone(&context);
        let scope = scope.clone();
        async move { Ok::<_, Infallible>(respond(&context, &scope, request).await) }
    });
    let connection = http1::Builder::new()
        .keep_alive(false)
        .serve_connection(TokioIo::new(stream), service)
        .with_upgrades();
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.cancelled() => {
            connection.as_mut().graceful_shutdown();
            connection.await
        }
    };
    if let Err(error) = result {
        debug!(target: HTTP_TARGET, error = %error, "connection ended with error");
    }
}

async fn respond<H: Host>(
    context: &GatewayContext<H>,
    scope: &ConnectionScope,
    mut request: Request<Incoming>,
) -> Response<Body> {
    let method = request.method().clone();
    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_owned(), |target| target.as_str().to_owned());
    let server = context.options.server_name.as_str();
    let route = router::classify(&method, &target, upgrade::is_websocket_upgrade(&request));

    let outcome = match route {
        Route::Subscribe => Ok(subscribe(context, scope, &mut request, &target)),
        Route::InvalidMethod => Ok(response::invalid_method(&method, server)),
        Route::NotFound => Ok(response::not_found(server)),
        Route::Config => config(context, request, &target).await,
        Route::Controller(path) => controller(context, path).await,
    };
    let response = outcome.unwrap_or_else(|error| response::internal_error(&error, server));

    info!(
        target: HTTP_TARGET,
        status = response.status().as_u16(),
        method = %method,
        request_target = %target,
        "request"
    );
    response
}

async fn config<H: Host>(
    context: &GatewayContext<H>,
    request: Request<Incoming>,
    path: &str,
) -> Result<Response<Body>, RequestError> {
    let uri = from_http_path(path);
    let body = if request.method() == Method::GET {
        context
            .dispatcher
            .call(move |side| render_get(&side.get_config(&uri)))
            .await?
    } else {
        let payload = request.into_body().collect().await?.to_bytes();
        let applied = context
            .dispatcher
            .call(move |side| side.set_config(&uri, &payload))
            .await??;
        render_set(applied)
    };
    Ok(response::json(body, &context.options.server_name))
}

async fn controller<H: Host>(
    context: &GatewayContext<H>,
    path: &str,
) -> Result<Response<Body>, RequestError> {
    let path = path.to_owned();
    let body = context
        .dispatcher
        .call(move |side| side.call_controller(&path).to_string())
        .await?;
    Ok(response::json(body, &context.options.server_name))
}

/// Registers the subscriber's watchers, then answers `101` and leaves the
/// upgraded connection to the subscription task.
fn subscribe<H: Host>(
    context: &GatewayContext<H>,
    scope: &ConnectionScope,
    request: &mut Request<Incoming>,
    path: &str,
) -> Response<Body> {
    let server = context.options.server_name.as_str();
    let Some(accept) = upgrade::accept_key(request) else {
        return response::text(
            StatusCode::BAD_REQUEST,
            "Missing Sec-WebSocket-Key header".to_owned(),
            server,
        );
    };
    let subscription = Subscription::open(context.events.as_ref(), select_events(path));
    let on_upgrade = hyper::upgrade::on(request);
    scope
        .tasks
        .spawn(subscription.serve(on_upgrade, scope.shutdown.clone()));
    upgrade::switching_protocols(&accept, server)
}
