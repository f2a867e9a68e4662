//! PostgREST URL construction.

use reqwest::Url;

use crate::domain::ports::{EqFilter, Order, SelectQuery, StoreError};

const REST_PREFIX: &str = "rest/v1/";

/// Resource names are interpolated into the path, so only plain identifiers
/// are accepted.
fn validate_identifier(kind: &str, name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::invalid_request(format!(
            "{kind} name `{name}` is not a plain identifier"
        )))
    }
}

pub(super) fn table_url(base: &Url, table: &str) -> Result<Url, StoreError> {
    validate_identifier("table", table)?;
    base.join(&format!("{REST_PREFIX}{table}"))
        .map_err(|err| StoreError::invalid_request(err.to_string()))
}

pub(super) fn rpc_url(base: &Url, name: &str) -> Result<Url, StoreError> {
    validate_identifier("function", name)?;
    base.join(&format!("{REST_PREFIX}rpc/{name}"))
        .map_err(|err| StoreError::invalid_request(err.to_string()))
}

fn append_filters(url: &mut Url, filters: &[EqFilter]) {
    let mut pairs = url.query_pairs_mut();
    for filter in filters {
        pairs.append_pair(filter.column(), &format!("eq.{}", filter.value()));
    }
}

fn order_param(order: &[Order]) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    let keys = order
        .iter()
        .map(|key| {
            let direction = if key.is_ascending() { "asc" } else { "desc" };
            format!("{}.{direction}", key.column())
        })
        .collect::<Vec<_>>();
    Some(keys.join(","))
}

pub(super) fn select_url(base: &Url, query: &SelectQuery) -> Result<Url, StoreError> {
    let mut url = table_url(base, query.table())?;
    url.query_pairs_mut()
        .append_pair("select", query.column_list());
    append_filters(&mut url, query.filters());
    if let Some(order) = order_param(query.ordering()) {
        url.query_pairs_mut().append_pair("order", &order);
    }
    if let Some(limit) = query.row_limit() {
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
    }
    Ok(url)
}

pub(super) fn delete_url(
    base: &Url,
    table: &str,
    filters: &[EqFilter],
) -> Result<Url, StoreError> {
    if filters.is_empty() {
        return Err(StoreError::invalid_request(
            "refusing to delete without filters",
        ));
    }
    let mut url = table_url(base, table)?;
    append_filters(&mut url, filters);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn base() -> Url {
        Url::parse("https://project.example.co/").expect("base url")
    }

    #[rstest]
    fn select_url_encodes_postgrest_operators(base: Url) {
        let query = SelectQuery::from("daily_records")
            .columns("id,content")
            .eq("facility_id", "f-1")
            .order_by(Order::desc("record_date"))
            .order_by(Order::asc("id"))
            .limit(10);

        let url = select_url(&base, &query).expect("url");

        assert_eq!(url.path(), "/rest/v1/daily_records");
        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("select".to_owned(), "id,content".to_owned()),
                ("facility_id".to_owned(), "eq.f-1".to_owned()),
                ("order".to_owned(), "record_date.desc,id.asc".to_owned()),
                ("limit".to_owned(), "10".to_owned()),
            ]
        );
    }

    #[rstest]
    #[case("facilities; drop")]
    #[case("../auth/v1/admin")]
    #[case("")]
    fn rejects_non_identifier_tables(base: Url, #[case] table: &str) {
        let err = table_url(&base, table).expect_err("must refuse");
        assert!(matches!(err, StoreError::InvalidRequest { .. }));
    }

    #[rstest]
    fn delete_requires_filters(base: Url) {
        let err = delete_url(&base, "facilities", &[]).expect_err("must refuse");
        assert!(matches!(err, StoreError::InvalidRequest { .. }));
    }

    #[rstest]
    fn rpc_url_targets_function_namespace(base: Url) {
        let url = rpc_url(&base, "get_facility_summary").expect("url");
        assert_eq!(url.path(), "/rest/v1/rpc/get_facility_summary");
    }
}
