mod filters;
mod handlers;
mod routes;
mod swagger;

use crate::config::{PaginationConfig, ServerConfig};
use crate::shared::{errors::handle_rejection, store::SharedStore};
use tokio::task::JoinHandle;
use utoipa::OpenApi;
use warp::Filter;

pub fn app(
    store: SharedStore,
    pagination: PaginationConfig,
    cors_origin: Option<&str>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let config = swagger::doc_config();

    let root = warp::path::end()
        .and(warp::get())
        .map(|| "Welcome to the fleet api");

    let api_doc = warp::path("api-doc.json")
        .and(warp::get())
        .map(|| warp::reply::json(&swagger::FleetDoc::openapi()));

    let swagger_ui = warp::path("docs")
        .and(warp::get())
        .and(warp::path::full())
        .and(warp::path::tail())
        .and(warp::any().map(move || config.clone()))
        .and_then(swagger::serve_swagger);

    root.or(api_doc)
        .or(swagger_ui)
        .or(routes::collection_routes(store, pagination))
        .recover(handle_rejection)
        .with(filters::with_cors(cors_origin))
        .with(warp::log("fleet_api::api"))
}

pub async fn start_api(
    server: ServerConfig,
    store: SharedStore,
    pagination: PaginationConfig,
) -> JoinHandle<()> {
    let task = tokio::spawn(async move {
        let routes = app(store, pagination, server.cors_origin.as_deref());

        log::info!("Starting API on {}...", server.addr());
        warp::serve(routes).run(server.addr()).await;
    });

    task
}
