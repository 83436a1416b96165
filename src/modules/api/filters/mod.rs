use crate::{
    config::PaginationConfig,
    shared::{
        errors::{AppError, ErrorType},
        store::SharedStore,
    },
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use warp::{self, http::Method, hyper::body::Bytes, Filter};

/// Raw request body, capped at 16 KiB. Parsing is left to the handler so a
/// malformed body maps to the handler's own error reply. A body sent without
/// a content-length is rejected with `failure`.
pub fn with_json_body(
    failure: &'static str,
) -> impl Filter<Extract = (Bytes,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(1024 * 16)
        .or_else(move |rejection: warp::Rejection| async move {
            if rejection.find::<warp::reject::LengthRequired>().is_some() {
                log::warn!("Rejected request body without content-length");
                let app_err = AppError::new(failure, ErrorType::Internal);
                return Err::<(), _>(warp::reject::custom(app_err));
            }
            Err(rejection)
        })
        .and(warp::body::bytes())
}

/// Query string parsed with `serde_qs`. A missing query string parses as empty.
pub fn with_queries<T>(
    failure: &'static str,
) -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: DeserializeOwned + Send + 'static,
{
    warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
        .and_then(move |raw: String| async move {
            serde_qs::from_str::<T>(&raw).map_err(|e| {
                log::warn!("Rejected query string {:?}: {}", raw, e);
                warp::reject::custom(AppError::new(failure, ErrorType::Internal))
            })
        })
}

pub fn with_cors(origin: Option<&str>) -> warp::filters::cors::Cors {
    let builder = warp::cors();
    let builder = match origin {
        Some(origin) => builder.allow_origin(origin),
        None => builder.allow_any_origin(),
    };

    builder
        .allow_headers(vec!["Content-Type"])
        .allow_methods(&[Method::GET, Method::POST])
        .build()
}

pub fn with_store(
    store: SharedStore,
) -> impl Filter<Extract = (SharedStore,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

pub fn with_pagination(
    pagination: PaginationConfig,
) -> impl Filter<Extract = (PaginationConfig,), Error = Infallible> + Clone {
    warp::any().map(move || pagination)
}
