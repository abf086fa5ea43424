use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use log::{debug, error};
use panelcore::reading::validate::validate;
use panelcore::store::ReadingStore;
use panelcore::telemetry::MetricsRecorder;
use serde_json::{json, Value};
use warp::filters::body::BodyDeserializeError;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reject::MethodNotAllowed;
use warp::{Filter, Rejection, Reply};

use super::limit::RateLimiter;

#[derive(Debug)]
struct RateLimited;

impl warp::reject::Reject for RateLimited {}

/// Build the full request-handling filter: the rate limiter ahead of the
/// two API routes and the static fallback, with security headers, CORS,
/// and access logging applied to every request/response pair.
pub fn router(
    store: Arc<dyn ReadingStore>,
    limiter: Arc<RateLimiter>,
    metrics: Arc<MetricsRecorder>,
    static_dir: &Path,
) -> BoxedFilter<(impl Reply,)> {
    let store_filter = warp::any().map(move || store.clone());
    let metrics_filter = warp::any().map(move || metrics.clone());

    let list_route = warp::path("load-items")
        .and(warp::path::end())
        .and(warp::get())
        .and(store_filter.clone())
        .and(metrics_filter.clone())
        .and_then(list_readings);

    let create_route = warp::path("add-item")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(store_filter)
        .and(metrics_filter)
        .and_then(create_reading);

    // Any other GET serves static assets, falling back to index.html.
    let fallback = warp::get()
        .and(warp::fs::dir(static_dir.to_path_buf()))
        .or(warp::get().and(warp::fs::file(static_dir.join("index.html"))));

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST"])
        .allow_header("content-type");

    rate_limit(limiter)
        .and(list_route.or(create_route).or(fallback))
        .recover(recover_rejection)
        .with(warp::reply::with::header(
            "x-content-type-options",
            "nosniff",
        ))
        .with(warp::reply::with::header("x-frame-options", "DENY"))
        .with(cors)
        .with(warp::log("panelserver"))
        .boxed()
}

fn rate_limit(limiter: Arc<RateLimiter>) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::addr::remote()
        .and(warp::any().map(move || limiter.clone()))
        .and_then(
            |addr: Option<SocketAddr>, limiter: Arc<RateLimiter>| async move {
                // Requests without a peer address share the unspecified-IP
                // bucket rather than bypassing the limiter.
                let client = addr.map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |a| a.ip());
                if limiter.allow(client) {
                    Ok(())
                } else {
                    Err(warp::reject::custom(RateLimited))
                }
            },
        )
        .untuple_one()
}

async fn list_readings(
    store: Arc<dyn ReadingStore>,
    metrics: Arc<MetricsRecorder>,
) -> Result<impl Reply, Rejection> {
    match store.list_all() {
        Ok(readings) => {
            metrics.record_read();
            Ok(warp::reply::with_status(
                warp::reply::json(&readings),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            error!("failed to load readings: {}", err);
            metrics.record_store_error();
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({
                    "message": "Failed to load items",
                    "error": err.to_string(),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn create_reading(
    candidate: Value,
    store: Arc<dyn ReadingStore>,
    metrics: Arc<MetricsRecorder>,
) -> Result<impl Reply, Rejection> {
    let reading = match validate(&candidate) {
        Ok(reading) => reading,
        Err(rejection) => {
            debug!("rejected candidate: {}", rejection);
            metrics.record_rejection();
            return Ok(warp::reply::with_status(
                warp::reply::json(&json!({ "message": rejection.to_string() })),
                StatusCode::BAD_REQUEST,
            ));
        }
    };

    match store.insert(&reading) {
        Ok(stored) => {
            metrics.record_write();
            Ok(warp::reply::with_status(
                warp::reply::json(&stored),
                StatusCode::CREATED,
            ))
        }
        Err(err) => {
            error!("failed to add reading: {}", err);
            metrics.record_store_error();
            Ok(warp::reply::with_status(
                warp::reply::json(&json!({
                    "message": "Failed to add item",
                    "error": err.to_string(),
                })),
                StatusCode::INTERNAL_SERVER_ERROR,
            ))
        }
    }
}

async fn recover_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    // An unmatched non-GET surfaces as MethodNotAllowed because the static
    // fallback is GET-only; the route simply does not exist, so both cases
    // are a 404.
    let (status, message) = if err.is_not_found() || err.find::<MethodNotAllowed>().is_some() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err.find::<RateLimited>().is_some() {
        (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later",
        )
    } else if err.find::<BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid request body")
    } else {
        error!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "message": message })),
        status,
    ))
}
