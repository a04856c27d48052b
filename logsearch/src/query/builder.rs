//! FilterSpec to search-body translation

use crate::query::types::{BoolClause, QueryClause, RangeClause, SearchBody, SortClause};
use crate::types::{FilterSpec, MAX_PAGE_SIZE};

pub const FIELD_TIMESTAMP: &str = "@timestamp";
pub const FIELD_HOST: &str = "host";
pub const FIELD_FILE: &str = "file";
pub const FIELD_MESSAGE: &str = "message";

/// Builds search bodies out of a [`FilterSpec`].
pub struct QueryBuilder;

impl QueryBuilder {
    /// Body for the indexed-page search: inclusive time range, requested
    /// page size (clamped).
    pub fn paged(filter: &FilterSpec) -> SearchBody {
        SearchBody {
            query: Self::bool_clause(
                filter,
                RangeClause::inclusive(filter.start_millis, filter.end_millis),
            ),
            sort: vec![SortClause::on(FIELD_TIMESTAMP, filter.sort)],
            size: filter.effective_page_size(),
        }
    }

    /// Body for the full-drain window search: `[start, end)` and the batch
    /// ceiling as size. Paging fields of the filter are ignored.
    pub fn window(filter: &FilterSpec) -> SearchBody {
        SearchBody {
            query: Self::bool_clause(
                filter,
                RangeClause::half_open(filter.start_millis, filter.end_millis),
            ),
            sort: vec![SortClause::on(FIELD_TIMESTAMP, filter.sort)],
            size: MAX_PAGE_SIZE,
        }
    }

    fn bool_clause(filter: &FilterSpec, range: RangeClause) -> QueryClause {
        let mut clause = BoolClause {
            filter: vec![QueryClause::range(FIELD_TIMESTAMP, range)],
            ..Default::default()
        };

        // Host terms collapse into one analyzed match string, not per-term
        // exact matching.
        let host_filter = filter.host_terms.join(" ").trim().to_string();
        if !host_filter.is_empty() {
            clause
                .must
                .push(QueryClause::match_field(FIELD_HOST, host_filter));
        }

        for file in &filter.file_terms {
            clause
                .should
                .push(QueryClause::match_phrase(FIELD_FILE, file.clone()));
            clause.minimum_should_match = Some(1);
        }

        if let Some(phrase) = filter.message_phrase.as_deref() {
            if !phrase.is_empty() {
                clause
                    .must
                    .push(QueryClause::match_phrase(FIELD_MESSAGE, phrase));
            }
        }

        QueryClause::Bool(Box::new(clause))
    }
}
