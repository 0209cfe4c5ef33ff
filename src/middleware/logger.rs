use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;
use log::{info, warn};
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Id of the request currently being served.
///
/// Outside a request (unit tests, background work) a fresh id is returned.
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// Access log: one line when a request completes, with request id, status
/// and latency. Server errors are logged at `warn`.
///
/// Every request gets an id that handler logs and error envelopes share
/// and that is echoed back in `x-request-id`. Errors from inner services
/// are rendered here so their envelope carries the same id; register this
/// middleware before the other `wrap` calls.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let http_req = req.request().clone();
        let request_id = Uuid::new_v4().to_string();
        let service = self.service.clone();

        Box::pin(REQUEST_ID.scope(request_id.clone(), async move {
            let mut res = match service.call(req).await {
                Ok(res) => res.map_into_left_body(),
                Err(err) => ServiceResponse::from_err(err, http_req).map_into_right_body(),
            };

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            let status = res.status();
            let elapsed = start_time.elapsed().as_millis();

            if status.is_server_error() {
                warn!("[{}] {} {} -> {} ({}ms)", request_id, method, path, status.as_u16(), elapsed);
            } else {
                info!("[{}] {} {} -> {} ({}ms)", request_id, method, path, status.as_u16(), elapsed);
            }

            Ok(res)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_id_is_stable_inside_scope() {
        let seen = REQUEST_ID
            .scope("req-1".to_string(), async {
                (current_request_id(), current_request_id())
            })
            .await;

        assert_eq!(seen, ("req-1".to_string(), "req-1".to_string()));
    }

    #[test]
    fn request_id_outside_scope_is_fresh() {
        assert_ne!(current_request_id(), current_request_id());
    }
}
