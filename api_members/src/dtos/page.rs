use common::{error::Res, http::ApiResponse};
use serde::{Deserialize, de::DeserializeOwned};

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.limit)).max(1)
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            page: self.page,
            limit: self.limit,
            total: self.total,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    #[serde(default, alias = "currentPage")]
    page: Option<u32>,
    #[serde(default, alias = "perPage")]
    limit: Option<u32>,
    #[serde(default, alias = "totalItems", alias = "count")]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Enveloped {
        data: Vec<T>,
        #[serde(default, alias = "meta")]
        pagination: Option<PageMeta>,
    },
}

/// Decodes a listing sent either as a bare array or as `{data, pagination}`.
pub fn decode_page<T: DeserializeOwned>(response: &ApiResponse) -> Res<Page<T>> {
    let (items, meta) = match response.json_raw::<Listing<T>>()? {
        Listing::Bare(items) => (items, PageMeta::default()),
        Listing::Enveloped { data, pagination } => (data, pagination.unwrap_or_default()),
    };
    let count = items.len();
    Ok(Page {
        page: meta.page.unwrap_or(1),
        limit: meta.limit.unwrap_or(count as u32),
        total: meta.total.unwrap_or(count as u64),
        items,
    })
}
