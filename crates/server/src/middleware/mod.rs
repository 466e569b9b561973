pub mod auth;
pub mod rate_limit;

use axum::{extract::Request, middleware::Next, response::Response};
use common::metrics::{status_class, HTTP_REQUESTS_TOTAL};

/// Count every request by method and response status class.
pub async fn record_request(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let res = next.run(req).await;
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), status_class(res.status().as_u16())])
        .inc();
    res
}
