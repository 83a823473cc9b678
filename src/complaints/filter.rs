/// Admin dashboard filtering and ordering
///
/// Filters are lenient: any value outside a dimension's closed set means
/// "no constraint" on that dimension. Ordering is fixed regardless of filters.
use super::{Category, Priority, Status};
use serde::Serialize;

pub const ALL: &str = "All";

/// One filter dimension: either unconstrained or pinned to a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterValue<T> {
    All,
    Only(T),
}

impl<T> Default for FilterValue<T> {
    fn default() -> Self {
        FilterValue::All
    }
}

impl<T: Copy> FilterValue<T> {
    /// Normalize raw input; unknown, blank or missing values become `All`
    pub fn normalize(raw: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Self {
        raw.map(str::trim)
            .and_then(parse)
            .map_or(FilterValue::All, FilterValue::Only)
    }

    pub fn value(&self) -> Option<T> {
        match self {
            FilterValue::All => None,
            FilterValue::Only(v) => Some(*v),
        }
    }
}

/// The three admin dashboard filters, combined with AND
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComplaintFilter {
    pub status: FilterValue<Status>,
    pub category: FilterValue<Category>,
    pub priority: FilterValue<Priority>,
}

impl ComplaintFilter {
    pub fn from_raw(status: Option<&str>, category: Option<&str>, priority: Option<&str>) -> Self {
        Self {
            status: FilterValue::normalize(status, Status::parse),
            category: FilterValue::normalize(category, Category::parse),
            priority: FilterValue::normalize(priority, Priority::parse),
        }
    }

    pub fn status_label(&self) -> &'static str {
        self.status.value().map_or(ALL, |s| s.as_str())
    }

    pub fn category_label(&self) -> &'static str {
        self.category.value().map_or(ALL, |c| c.as_str())
    }

    pub fn priority_label(&self) -> &'static str {
        self.priority.value().map_or(ALL, |p| p.as_str())
    }

    /// WHERE clause and its bind values, in order
    pub(crate) fn where_clause(&self) -> (String, Vec<&'static str>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        if let Some(status) = self.status.value() {
            clauses.push("status = ?");
            params.push(status.as_str());
        }
        if let Some(category) = self.category.value() {
            clauses.push("category = ?");
            params.push(category.as_str());
        }
        if let Some(priority) = self.priority.value() {
            clauses.push("priority = ?");
            params.push(priority.as_str());
        }

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), params)
        }
    }

    /// Query string that reproduces this view, for redirects after an update
    pub fn to_query_string(&self) -> String {
        format!(
            "status_filter={}&category_filter={}&priority_filter={}",
            urlencoding::encode(self.status_label()),
            urlencoding::encode(self.category_label()),
            urlencoding::encode(self.priority_label()),
        )
    }
}

/// Rank value for stored text that matches none of the known values
const UNRANKED: i64 = 4;

fn rank_case(column: &str, ranks: impl Iterator<Item = (&'static str, i64)>) -> String {
    let arms: String = ranks
        .map(|(value, rank)| format!(" WHEN '{}' THEN {}", value, rank))
        .collect();
    format!("CASE {}{} ELSE {} END", column, arms, UNRANKED)
}

/// ORDER BY clause for the admin dashboard: status rank, priority rank, newest first
pub(crate) fn dashboard_order_by() -> String {
    format!(
        "ORDER BY {}, {}, id DESC",
        rank_case("status", Status::ALL.iter().map(|s| (s.as_str(), s.rank()))),
        rank_case("priority", Priority::ALL.iter().map(|p| (p.as_str(), p.rank()))),
    )
}

/// Complaint counts per status over the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusSummary {
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

impl StatusSummary {
    pub fn record(&mut self, status: Status, total: i64) {
        match status {
            Status::Pending => self.pending = total,
            Status::InProgress => self.in_progress = total,
            Status::Resolved => self.resolved = total,
        }
    }

    pub fn get(&self, status: Status) -> i64 {
        match status {
            Status::Pending => self.pending,
            Status::InProgress => self.in_progress,
            Status::Resolved => self.resolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_values_normalize_to_all() {
        let filter = ComplaintFilter::from_raw(Some("Closed"), Some("water"), None);
        assert_eq!(filter, ComplaintFilter::default());
        assert_eq!(filter.status_label(), "All");

        let filter = ComplaintFilter::from_raw(Some(" Pending "), Some("All"), Some("High"));
        assert_eq!(filter.status, FilterValue::Only(Status::Pending));
        assert_eq!(filter.category, FilterValue::All);
        assert_eq!(filter.priority, FilterValue::Only(Priority::High));
    }

    #[test]
    fn test_where_clause_is_conjunctive() {
        let filter = ComplaintFilter::from_raw(Some("Pending"), Some("Water"), Some("bogus"));
        let (clause, params) = filter.where_clause();
        assert_eq!(clause, "WHERE status = ? AND category = ?");
        assert_eq!(params, vec!["Pending", "Water"]);

        let (clause, params) = ComplaintFilter::default().where_clause();
        assert!(clause.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_query_string_encodes_labels() {
        let filter = ComplaintFilter::from_raw(Some("In Progress"), Some("Electrical Fault"), None);
        assert_eq!(
            filter.to_query_string(),
            "status_filter=In%20Progress&category_filter=Electrical%20Fault&priority_filter=All"
        );
    }

    #[test]
    fn test_order_by_ranks() {
        assert_eq!(
            dashboard_order_by(),
            "ORDER BY CASE status WHEN 'Pending' THEN 1 WHEN 'In Progress' THEN 2 WHEN 'Resolved' THEN 3 ELSE 4 END, \
             CASE priority WHEN 'Low' THEN 3 WHEN 'Medium' THEN 2 WHEN 'High' THEN 1 ELSE 4 END, id DESC"
        );
    }
}
