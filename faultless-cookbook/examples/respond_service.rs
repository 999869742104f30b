//! A tower service answered through a `Responder`: values become `Ok`,
//! missing records become `NotFound`, and failures become `BadRequest`.

use faultless::prelude::*;
use tower::{service_fn, ServiceBuilder, ServiceExt};

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("id {0} is not a valid customer id")]
    InvalidId(i64),
}

async fn find_customer(id: i64) -> Result<Option<String>, ApiError> {
    match id {
        id if id < 0 => Err(ApiError::InvalidId(id)),
        1 => Ok(Some("Ada".to_string())),
        _ => Ok(None),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    println!("=== faultless: responding from a tower service ===\n");

    let responder: Responder<ApiError> = Responder::new(Executor::new());
    let svc = ServiceBuilder::new()
        .layer(RespondLayer::new(responder))
        .service(service_fn(find_customer));

    for id in [1, 2, -7] {
        let response = match svc.clone().oneshot(id).await {
            Ok(response) => response.not_found_if_none(),
            Err(never) => match never {},
        };
        println!("GET /customers/{:>2} -> {} {:?}", id, response.status_code(), response);
    }
}
