//! JSON resource envelopes: `{data}` for single items, `{data, links, meta}`
//! for paginated collections

use axum::http::Uri;
use serde::Serialize;
use utoipa::ToSchema;

use url::form_urlencoded;

use crate::{
    models::{Equipment, EquipmentType},
    pagination::Page,
};

/// Single resource wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    EquipmentResource = Resource<Equipment>,
    EquipmentTypeResource = Resource<EquipmentType>,
    EquipmentTypeList = Resource<Vec<EquipmentType>>
)]
pub struct Resource<T> {
    pub data: T,
}

impl<T> Resource<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Navigation links; every original query parameter is kept, only `page` changes
#[derive(Debug, Serialize, ToSchema)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: i64,
    /// Position of the first item on this page, null when empty
    pub from: Option<i64>,
    pub last_page: i64,
    pub path: String,
    pub per_page: i64,
    /// Position of the last item on this page, null when empty
    pub to: Option<i64>,
    pub total: i64,
}

/// Paginated collection wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(EquipmentCollection = ResourceCollection<Equipment>)]
pub struct ResourceCollection<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

impl<T> ResourceCollection<T> {
    /// Wrap `page`, building links from the request `uri`
    pub fn from_page(page: Page<T>, uri: &Uri) -> Self {
        let path = uri.path().to_string();
        let params: Vec<(String, String)> =
            form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
                .into_owned()
                .filter(|(key, _)| key != "page")
                .collect();

        let last_page = page.last_page();
        let url = |n: i64| page_url(&path, &params, n);
        let links = PageLinks {
            first: url(1),
            last: url(last_page),
            prev: (page.page > 1).then(|| url(page.page - 1)),
            next: (page.page < last_page).then(|| url(page.page + 1)),
        };
        let meta = PageMeta {
            current_page: page.page,
            from: page.from(),
            last_page,
            path,
            per_page: page.per_page,
            to: page.to(),
            total: page.total,
        };

        Self {
            data: page.items,
            links,
            meta,
        }
    }
}

fn page_url(path: &str, params: &[(String, String)], page: i64) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .append_pair("page", &page.to_string())
        .finish();
    format!("{}?{}", path, query)
}
