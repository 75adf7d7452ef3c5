use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::metadata::ExternalSearch;

pub const SEARCH_DEFAULT_LIMIT: i64 = 8;
pub const SEARCH_MAX_LIMIT: i64 = 30;
pub const TOP_DEFAULT_LIMIT: i64 = 5;
pub const TOP_MAX_LIMIT: i64 = 50;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    /// Trimmed search term, `None` when there is nothing to search for.
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(SEARCH_DEFAULT_LIMIT)
            .clamp(1, SEARCH_MAX_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopQuery {
    pub limit: Option<i64>,
}

impl TopQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(TOP_DEFAULT_LIMIT).clamp(1, TOP_MAX_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExternalQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl From<ExternalQuery> for ExternalSearch {
    fn from(query: ExternalQuery) -> Self {
        ExternalSearch {
            search: query.search,
            page: query.page,
            page_size: query.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_limit_defaults_and_caps() {
        assert_eq!(SearchQuery::default().limit(), 8);
        let big = SearchQuery { q: None, limit: Some(500) };
        assert_eq!(big.limit(), 30);
        let zero = SearchQuery { q: None, limit: Some(0) };
        assert_eq!(zero.limit(), 1);
    }

    #[test]
    fn search_term_is_trimmed() {
        let blank = SearchQuery { q: Some("   ".into()), limit: None };
        assert_eq!(blank.term(), None);
        let q = SearchQuery { q: Some("  halo ".into()), limit: None };
        assert_eq!(q.term(), Some("halo"));
    }

    #[test]
    fn top_limit_is_clamped() {
        assert_eq!(TopQuery::default().limit(), 5);
        assert_eq!(TopQuery { limit: Some(-3) }.limit(), 1);
        assert_eq!(TopQuery { limit: Some(99) }.limit(), 50);
    }
}
