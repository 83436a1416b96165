use crate::{
    config::PaginationConfig,
    models::{Device, NewDevice},
    modules::api::routes::CollectionQueries,
    shared::{
        errors::{AppError, ErrorMessage, ErrorType},
        store::{FleetSummary, Pagination, SharedStore},
    },
};
use serde::Serialize;
use utoipa::ToSchema;
use warp::{http::StatusCode, hyper::body::Bytes};

pub const LIST_FAILURE: &str = "Failed to fetch devices";
pub const CREATE_FAILURE: &str = "Failed to create device";

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceListResponse {
    data: Vec<Device>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeviceResponse {
    data: Device,
    message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    data: FleetSummary,
    message: String,
}

#[utoipa::path(
        get,
        path = "/collection",
        params(CollectionQueries),
        responses(
            (status = 200, description = "Devices fetched successfully", body = DeviceListResponse),
            (status = 500, description = "Internal Server Error", body = ErrorMessage),
        )
    )
]
pub async fn list_devices_handler(
    queries: CollectionQueries,
    store: SharedStore,
    pagination: PaginationConfig,
) -> Result<impl warp::Reply, warp::Rejection> {
    let criteria = queries.criteria();

    let response = match queries.page {
        Some(page) => {
            let per_page = queries
                .per_page
                .unwrap_or(pagination.per_page)
                .clamp(1, pagination.max_per_page.max(1));
            let page = store.paginate(&criteria, page, per_page).await;
            DeviceListResponse {
                data: page.items,
                message: String::from("Devices fetched successfully"),
                pagination: Some(page.pagination),
            }
        }
        None if criteria.is_empty() => DeviceListResponse {
            data: store.all().await,
            message: String::from("Devices fetched successfully"),
            pagination: None,
        },
        None => DeviceListResponse {
            data: store.filter(&criteria).await,
            message: String::from("Devices fetched successfully"),
            pagination: None,
        },
    };

    log::debug!("Listing {} devices for {:?}", response.data.len(), criteria);
    Ok(warp::reply::json(&response))
}

#[utoipa::path(
        get,
        path = "/collection/{id}",
        params(
            ("id" = String, Path, description = "Device id")
        ),
        responses(
            (status = 200, description = "Device fetched successfully", body = DeviceResponse),
            (status = 404, description = "Device not found", body = ErrorMessage),
            (status = 500, description = "Internal Server Error", body = ErrorMessage),
        )
    )
]
pub async fn get_device_handler(
    id: String,
    store: SharedStore,
) -> Result<impl warp::Reply, warp::Rejection> {
    let device = store.find(&id).await.ok_or_else(|| {
        log::debug!("Device {} not found", id);
        warp::reject::custom(AppError::new("Device not found", ErrorType::NotFound))
    })?;

    Ok(warp::reply::json(&DeviceResponse {
        data: device,
        message: String::from("Device fetched successfully"),
    }))
}

#[utoipa::path(
        post,
        path = "/collection",
        request_body = NewDevice,
        responses(
            (status = 201, description = "Device created successfully", body = DeviceResponse),
            (status = 500, description = "Internal Server Error", body = ErrorMessage),
        )
    )
]
pub async fn create_device_handler(
    body: Bytes,
    store: SharedStore,
) -> Result<impl warp::Reply, warp::Rejection> {
    let new_device: NewDevice = serde_json::from_slice(&body).map_err(|e| {
        log::error!("Error creating device: {}", e);
        warp::reject::custom(AppError::new(CREATE_FAILURE, ErrorType::Internal))
    })?;

    let device = store.append(new_device).await;

    Ok(warp::reply::with_status(
        warp::reply::json(&DeviceResponse {
            data: device,
            message: String::from("Device created successfully"),
        }),
        StatusCode::CREATED,
    ))
}

#[utoipa::path(
        get,
        path = "/stats",
        responses(
            (status = 200, description = "Fleet summary", body = SummaryResponse),
        )
    )
]
pub async fn stats_handler(store: SharedStore) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&SummaryResponse {
        data: store.summary().await,
        message: String::from("Fleet summary fetched successfully"),
    }))
}
