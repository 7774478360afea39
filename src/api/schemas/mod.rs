use crate::domain::pagination::{PageRequest, PaginationMeta, SortOrder, parse_list};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod airlines;
pub mod airports;
pub mod auth;
pub mod health;
pub mod routes;

/// Query parameters shared by every list endpoint. Everything arrives as text and is
/// validated here so malformed values surface as `{"error": ...}` 400s.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub include: Option<String>,
}

impl ListParams {
    pub(crate) fn page_request(&self) -> Result<PageRequest, String> {
        PageRequest::new(parse_number("page", self.page.as_deref())?, parse_number("limit", self.limit.as_deref())?)
    }

    pub(crate) fn sort_by<S: FromStr<Err = String> + Default>(&self) -> Result<S, String> {
        non_empty(self.sort_by.as_deref()).map_or_else(|| Ok(S::default()), str::parse)
    }

    pub(crate) fn sort_order(&self) -> Result<SortOrder, String> {
        non_empty(self.sort_order.as_deref()).map_or_else(|| Ok(SortOrder::default()), str::parse)
    }

    pub(crate) fn search(&self) -> Option<String> {
        non_empty(self.search.as_deref()).map(ToString::to_string)
    }

    pub(crate) fn include<R: FromStr<Err = String>>(&self) -> Result<Vec<R>, String> {
        parse_list(self.include.as_deref())
    }
}

/// `?include=` on single-resource lookups.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeParams {
    pub include: Option<String>,
}

impl IncludeParams {
    pub(crate) fn relations<R: FromStr<Err = String>>(&self) -> Result<Vec<R>, String> {
        parse_list(self.include.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub last_page: i64,
}

impl From<PaginationMeta> for Meta {
    fn from(meta: PaginationMeta) -> Self {
        Self { total: meta.total, page: meta.page, limit: meta.limit, last_page: meta.last_page }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Rejects blank strings for required text fields and returns the trimmed value.
pub(crate) fn required(field: &str, value: String) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(trimmed.to_string())
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<u32>, String> {
    non_empty(raw).map(|v| v.parse::<u32>().map_err(|_| format!("{name} must be a positive integer"))).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::airport::{AirportRelation, AirportSort};

    #[test]
    fn test_list_params_defaults() {
        let params = ListParams::default();
        let page = params.page_request().unwrap();
        assert_eq!((page.page(), page.limit()), (1, 10));
        assert_eq!(params.sort_by::<AirportSort>().unwrap(), AirportSort::Name);
        assert_eq!(params.sort_order().unwrap(), SortOrder::Asc);
        assert!(params.include::<AirportRelation>().unwrap().is_empty());
        assert!(params.search().is_none());
    }

    #[test]
    fn test_list_params_rejects_garbage() {
        let params = ListParams { page: Some("two".to_string()), ..Default::default() };
        assert!(params.page_request().is_err());

        let params = ListParams { limit: Some("-1".to_string()), ..Default::default() };
        assert!(params.page_request().is_err());

        let params = ListParams { include: Some("routesFrom,pilots".to_string()), ..Default::default() };
        assert!(params.include::<AirportRelation>().is_err());
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let params = ListParams { search: Some("   ".to_string()), ..Default::default() };
        assert!(params.search().is_none());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Heathrow ".to_string()).unwrap(), "Heathrow");
        assert_eq!(required("name", " ".to_string()).unwrap_err(), "name is required");
    }
}
