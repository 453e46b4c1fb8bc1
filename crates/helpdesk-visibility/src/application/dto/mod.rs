//! Data Transfer Objects (DTOs)
//!
//! The untrusted listing request, its validation into a
//! [`ValidatedFilter`], and the response shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use helpdesk_common::{EngineConfig, VisibilityError, VisibilityResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::filter::{AssignmentFilter, DateRange, StatusFilter, ValidatedFilter};
use crate::domain::services::SlaTally;
use crate::domain::ticket::TicketRecord;
use crate::domain::value_objects::{
    BranchId, CategoryId, DomainError, SlaBucket, SortDirection, SortKey, SortSpec,
    TicketPriority, TicketStatus, UserId, WorkbenchFilter,
};

// =============================================================================
// Request
// =============================================================================

/// Listing request as received from the caller.
///
/// List parameters accept repeated values, comma-separated values, or both.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterRequest {
    pub status: Vec<String>,
    pub priority: Vec<String>,
    /// `any`, `assigned`, `unassigned` or `me`
    pub assignment: Option<String>,
    /// Technician ids; the token `unassigned` also matches unassigned tickets
    pub technician_ids: Vec<String>,
    /// Legacy single-assignee parameter
    pub assigned_to: Option<String>,
    pub branch_id: Option<String>,
    pub category_id: Option<String>,
    pub security_classification: Option<String>,
    pub confidential: Option<bool>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub updated_after: Option<String>,
    pub updated_before: Option<String>,
    pub search: Option<String>,
    pub sla_status: Option<String>,
    /// Workbench tag
    pub filter: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Return aggregate counts instead of a page
    pub stats: bool,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

fn invalid(err: DomainError) -> VisibilityError {
    VisibilityError::Validation(err.to_string())
}

fn split_list(values: &[String]) -> impl Iterator<Item = &str> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl FilterRequest {
    /// Parse and normalize.
    ///
    /// Values with a safe default are normalized (page 0, page size out of
    /// range, unknown sort). Everything else malformed is a validation error.
    pub fn validate(&self, config: &EngineConfig) -> VisibilityResult<ValidatedFilter> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            VisibilityError::Internal(format!(
                "utc offset of {} minutes is out of range",
                config.utc_offset_minutes
            ))
        })?;

        Ok(ValidatedFilter {
            statuses: self.statuses()?,
            priorities: split_list(&self.priority)
                .map(TicketPriority::parse)
                .collect::<Result<_, _>>()
                .map_err(invalid)?,
            assignment: self.assignment()?,
            branch_id: non_empty(&self.branch_id).map(BranchId::new).transpose().map_err(invalid)?,
            category_id: non_empty(&self.category_id)
                .map(CategoryId::new)
                .transpose()
                .map_err(invalid)?,
            security_classification: non_empty(&self.security_classification).map(str::to_string),
            confidential: self.confidential,
            created: DateRange {
                after: parse_bound("createdAfter", &self.created_after, offset, Bound::Start)?,
                before: parse_bound("createdBefore", &self.created_before, offset, Bound::End)?,
            },
            updated: DateRange {
                after: parse_bound("updatedAfter", &self.updated_after, offset, Bound::Start)?,
                before: parse_bound("updatedBefore", &self.updated_before, offset, Bound::End)?,
            },
            search: non_empty(&self.search).map(str::to_string),
            sla_status: non_empty(&self.sla_status)
                .map(SlaBucket::parse)
                .transpose()
                .map_err(invalid)?,
            workbench: non_empty(&self.filter)
                .map(WorkbenchFilter::parse)
                .transpose()
                .map_err(invalid)?
                .unwrap_or_default(),
            sort: self.sort(),
            page: match self.page {
                None | Some(0) => 1,
                Some(p) => p,
            },
            page_size: match self.limit {
                None | Some(0) => config.default_page_size,
                Some(n) => n.min(config.max_page_size),
            },
            stats: self.stats,
        })
    }

    fn statuses(&self) -> VisibilityResult<StatusFilter> {
        let raw: Vec<&str> = split_list(&self.status).collect();
        if raw.iter().any(|s| s.eq_ignore_ascii_case("ALL")) {
            return Ok(StatusFilter::All);
        }
        if raw.is_empty() {
            return Ok(StatusFilter::Default);
        }
        let statuses = raw
            .into_iter()
            .map(TicketStatus::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;
        Ok(StatusFilter::Only(statuses))
    }

    fn assignment(&self) -> VisibilityResult<AssignmentFilter> {
        let technicians: Vec<&str> = split_list(&self.technician_ids).collect();
        if !technicians.is_empty() {
            let include_unassigned = technicians.iter().any(|t| t.eq_ignore_ascii_case("unassigned"));
            let ids = technicians
                .into_iter()
                .filter(|t| !t.eq_ignore_ascii_case("unassigned"))
                .map(UserId::new)
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            return Ok(AssignmentFilter::Technicians { ids, include_unassigned });
        }

        if let Some(mode) = non_empty(&self.assignment) {
            return match mode.to_ascii_lowercase().as_str() {
                "any" | "all" => Ok(AssignmentFilter::Any),
                "assigned" => Ok(AssignmentFilter::Assigned),
                "unassigned" => Ok(AssignmentFilter::Unassigned),
                "me" | "mine" => Ok(AssignmentFilter::Me),
                _ => Err(VisibilityError::Validation(format!("unknown assignment mode: {}", mode))),
            };
        }

        match non_empty(&self.assigned_to) {
            None => Ok(AssignmentFilter::Any),
            Some(v) if v.eq_ignore_ascii_case("unassigned") => Ok(AssignmentFilter::Unassigned),
            Some(v) if v.eq_ignore_ascii_case("me") => Ok(AssignmentFilter::Me),
            Some(v) => Ok(AssignmentFilter::Assignee(UserId::new(v).map_err(invalid)?)),
        }
    }

    fn sort(&self) -> SortSpec {
        let Some(raw) = non_empty(&self.sort_by) else {
            return SortSpec {
                key: SortKey::default(),
                direction: self.direction(),
            };
        };
        match SortKey::parse(raw) {
            Some(key) => SortSpec {
                key,
                direction: self.direction(),
            },
            None => {
                warn!(sort_by = raw, "unknown sort key, using createdAt desc");
                SortSpec::default()
            }
        }
    }

    fn direction(&self) -> SortDirection {
        non_empty(&self.sort_order)
            .and_then(SortDirection::parse)
            .unwrap_or_default()
    }
}

/// Parse a date bound.
///
/// Accepts RFC 3339 or `YYYY-MM-DD`. Upper bounds cover the whole named
/// calendar day in the bank's local time.
fn parse_bound(
    name: &str,
    raw: &Option<String>,
    offset: FixedOffset,
    bound: Bound,
) -> VisibilityResult<Option<DateTime<Utc>>> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };

    let (date, exact) = if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        (ts.with_timezone(&offset).date_naive(), Some(ts.with_timezone(&Utc)))
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        (date, None)
    } else {
        return Err(VisibilityError::Validation(format!("{}: malformed date {:?}", name, raw)));
    };

    let local: Option<NaiveDateTime> = match (bound, exact) {
        (Bound::Start, Some(ts)) => return Ok(Some(ts)),
        (Bound::Start, None) => date.and_hms_milli_opt(0, 0, 0, 0),
        (Bound::End, _) => date.and_hms_milli_opt(23, 59, 59, 999),
    };

    local
        .and_then(|naive| offset.from_local_datetime(&naive).single())
        .map(|t| Some(t.with_timezone(&Utc)))
        .ok_or_else(|| VisibilityError::Validation(format!("{}: date out of range {:?}", name, raw)))
}

// =============================================================================
// Responses
// =============================================================================

/// A visible ticket with its derived SLA state
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedTicket {
    #[serde(flatten)]
    pub ticket: TicketRecord,
    pub sla_bucket: SlaBucket,
}

/// One page of visible tickets
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub tickets: Vec<ListedTicket>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub page_count: u64,
}

impl TicketPage {
    /// `ceil(total / page_size)`; zero when there is nothing to page
    pub fn page_count(total: u64, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        total.div_ceil(u64::from(page_size))
    }
}

/// Aggregate counts over the visible, filtered set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_priority: BTreeMap<String, u64>,
    pub unassigned: u64,
    pub sla: SlaTally,
}

impl TicketStats {
    /// Count one ticket with its SLA bucket
    pub fn record(&mut self, ticket: &TicketRecord, bucket: SlaBucket) {
        self.total += 1;
        *self.by_status.entry(ticket.status.code().to_string()).or_default() += 1;
        *self.by_priority.entry(ticket.priority.code().to_string()).or_default() += 1;
        if ticket.assigned_to.is_none() {
            self.unassigned += 1;
        }
        self.sla.record(bucket);
    }
}

/// Result of a listing call
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ListOutcome {
    Page(TicketPage),
    Stats(TicketStats),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn validate(req: FilterRequest) -> VisibilityResult<ValidatedFilter> {
        req.validate(&EngineConfig::default())
    }

    #[test]
    fn test_defaults() {
        let filter = validate(FilterRequest::default()).unwrap();
        assert_eq!(filter, ValidatedFilter::default());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let req: FilterRequest = serde_json::from_str(
            r#"{ "status": ["OPEN,IN_PROGRESS"], "technicianIds": ["t1", "unassigned"], "slaStatus": "at-risk", "filter": "available-tickets", "limit": 50 }"#,
        )
        .unwrap();
        let filter = validate(req).unwrap();

        assert_eq!(
            filter.statuses,
            StatusFilter::Only(vec![TicketStatus::Open, TicketStatus::InProgress])
        );
        assert_eq!(
            filter.assignment,
            AssignmentFilter::Technicians { ids: vec![UserId::new("t1").unwrap()], include_unassigned: true }
        );
        assert_eq!(filter.sla_status, Some(SlaBucket::AtRisk));
        assert_eq!(filter.workbench, WorkbenchFilter::AvailableTickets);
        assert_eq!(filter.page_size, 50);
    }

    #[test]
    fn test_all_sentinel_wins() {
        let req = FilterRequest {
            status: vec!["OPEN".into(), "all".into()],
            ..Default::default()
        };
        assert_eq!(validate(req).unwrap().statuses, StatusFilter::All);
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        let cases = [
            FilterRequest { status: vec!["ARCHIVED".into()], ..Default::default() },
            FilterRequest { priority: vec!["URGENT".into()], ..Default::default() },
            FilterRequest { assignment: Some("team".into()), ..Default::default() },
            FilterRequest { sla_status: Some("late".into()), ..Default::default() },
            FilterRequest { filter: Some("everything".into()), ..Default::default() },
            FilterRequest { created_after: Some("yesterday".into()), ..Default::default() },
        ];
        for req in cases {
            assert!(matches!(validate(req), Err(VisibilityError::Validation(_))));
        }
    }

    #[test]
    fn test_assignment_precedence() {
        let req = FilterRequest {
            technician_ids: vec!["t9".into()],
            assignment: Some("unassigned".into()),
            assigned_to: Some("me".into()),
            ..Default::default()
        };
        assert!(matches!(validate(req).unwrap().assignment, AssignmentFilter::Technicians { .. }));

        let req = FilterRequest {
            assignment: Some("assigned".into()),
            assigned_to: Some("unassigned".into()),
            ..Default::default()
        };
        assert_eq!(validate(req).unwrap().assignment, AssignmentFilter::Assigned);

        let req = FilterRequest {
            assigned_to: Some("UNASSIGNED".into()),
            ..Default::default()
        };
        assert_eq!(validate(req).unwrap().assignment, AssignmentFilter::Unassigned);

        let req = FilterRequest {
            assigned_to: Some("tech-42".into()),
            ..Default::default()
        };
        assert_eq!(
            validate(req).unwrap().assignment,
            AssignmentFilter::Assignee(UserId::new("tech-42").unwrap())
        );
    }

    #[test]
    fn test_page_normalization() {
        let req = FilterRequest {
            page: Some(0),
            limit: Some(5000),
            ..Default::default()
        };
        let filter = validate(req).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 200);

        let req = FilterRequest { limit: Some(0), ..Default::default() };
        assert_eq!(validate(req).unwrap().page_size, 10);
    }

    #[test]
    fn test_unknown_sort_falls_back() {
        let req = FilterRequest {
            sort_by: Some("shoeSize".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        assert_eq!(validate(req).unwrap().sort, SortSpec::default());

        let req = FilterRequest {
            sort_by: Some("priority".into()),
            sort_order: Some("sideways".into()),
            ..Default::default()
        };
        assert_eq!(
            validate(req).unwrap().sort,
            SortSpec { key: SortKey::Priority, direction: SortDirection::Desc }
        );
    }

    #[test]
    fn test_before_covers_whole_local_day() {
        let config = EngineConfig {
            utc_offset_minutes: 7 * 60,
            ..Default::default()
        };
        let req = FilterRequest {
            created_after: Some("2024-03-01".into()),
            created_before: Some("2024-03-01".into()),
            updated_before: Some("2024-03-01T09:30:00+07:00".into()),
            ..Default::default()
        };
        let filter = req.validate(&config).unwrap();

        let after = filter.created.after.unwrap();
        let before = filter.created.before.unwrap();
        // Local midnight at UTC+7 is 17:00 UTC the previous day.
        assert_eq!(after.to_rfc3339(), "2024-02-29T17:00:00+00:00");
        assert_eq!(before.hour(), 16);
        assert_eq!(before.minute(), 59);
        assert_eq!(before.nanosecond(), 999_000_000);
        assert_eq!(filter.updated.before, filter.created.before);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let req = FilterRequest {
            search: Some("   ".into()),
            branch_id: Some("".into()),
            filter: Some("".into()),
            ..Default::default()
        };
        let filter = validate(req).unwrap();
        assert_eq!(filter.search, None);
        assert_eq!(filter.branch_id, None);
        assert_eq!(filter.workbench, WorkbenchFilter::None);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(TicketPage::page_count(0, 10), 0);
        assert_eq!(TicketPage::page_count(10, 10), 1);
        assert_eq!(TicketPage::page_count(11, 10), 2);
        assert_eq!(TicketPage::page_count(401, 200), 3);
    }
}
