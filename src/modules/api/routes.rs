use crate::{
    config::PaginationConfig,
    models::{DeviceStatus, DeviceType},
    modules::api::{
        filters::{with_json_body, with_pagination, with_queries, with_store},
        handlers::{
            create_device_handler, get_device_handler, list_devices_handler, stats_handler,
            CREATE_FAILURE, LIST_FAILURE,
        },
    },
    shared::store::{Criteria, SharedStore},
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::IntoParams;
use warp::Filter;

/// Params for /collection route
/// Ex: /collection?status=online,offline&type=sensor&search=broadway&page=2
#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CollectionQueries {
    /// Comma separated statuses
    pub status: Option<String>,
    /// Comma separated device types
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub search: Option<String>,
    /// 1-based page; when absent the whole filtered list is returned
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

impl CollectionQueries {
    pub fn criteria(&self) -> Criteria {
        Criteria {
            status: parse_list::<DeviceStatus>(self.status.as_deref()),
            types: parse_list::<DeviceType>(self.type_.as_deref()),
            search: self
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Unknown tokens are dropped, so a list with no valid token matches nothing.
fn parse_list<T: FromStr>(raw: Option<&str>) -> Option<Vec<T>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    Some(
        raw.split(',')
            .filter_map(|token| token.trim().parse().ok())
            .collect(),
    )
}

pub fn collection_routes(
    store: SharedStore,
    pagination: PaginationConfig,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    list_route(store.clone(), pagination)
        .or(get_route(store.clone()))
        .or(create_route(store.clone()))
        .or(stats_route(store))
}

fn list_route(
    store: SharedStore,
    pagination: PaginationConfig,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("collection")
        .and(warp::get())
        .and(with_queries::<CollectionQueries>(LIST_FAILURE))
        .and(with_store(store))
        .and(with_pagination(pagination))
        .and_then(list_devices_handler)
}

fn get_route(
    store: SharedStore,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("collection" / String)
        .and(warp::get())
        .and(with_store(store))
        .and_then(get_device_handler)
}

fn create_route(
    store: SharedStore,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("collection")
        .and(warp::post())
        .and(with_json_body(CREATE_FAILURE))
        .and(with_store(store))
        .and_then(create_device_handler)
}

fn stats_route(
    store: SharedStore,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path!("stats")
        .and(warp::get())
        .and(with_store(store))
        .and_then(stats_handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_lists() {
        let queries: CollectionQueries =
            serde_qs::from_str("status=online,%20error&type=gateway").unwrap();
        let criteria = queries.criteria();
        assert_eq!(
            criteria.status,
            Some(vec![DeviceStatus::Online, DeviceStatus::Error])
        );
        assert_eq!(criteria.types, Some(vec![DeviceType::Gateway]));
        assert_eq!(criteria.search, None);
    }

    #[test]
    fn empty_params_impose_nothing() {
        let queries: CollectionQueries = serde_qs::from_str("status=&search=").unwrap();
        let criteria = queries.criteria();
        assert!(criteria.status.is_none());
        assert!(criteria.search.is_none());
    }

    #[test]
    fn unknown_tokens_leave_an_empty_set() {
        let criteria = CollectionQueries {
            status: Some("sleeping".to_string()),
            ..Default::default()
        }
        .criteria();
        assert_eq!(criteria.status, Some(Vec::new()));
    }

    #[test]
    fn reads_pagination_params() {
        let queries: CollectionQueries = serde_qs::from_str("page=3&perPage=10").unwrap();
        assert_eq!(queries.page, Some(3));
        assert_eq!(queries.per_page, Some(10));
    }
}
