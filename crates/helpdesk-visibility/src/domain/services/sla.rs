//! SLA Classifier
//!
//! Post-retrieval classification of a ticket's time to deadline. Never
//! part of the store predicate.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ticket::TicketRecord;
use crate::domain::value_objects::SlaBucket;

/// Counts per SLA bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaTally {
    pub within: u64,
    pub at_risk: u64,
    pub breached: u64,
}

impl SlaTally {
    /// Count one ticket
    pub fn record(&mut self, bucket: SlaBucket) {
        match bucket {
            SlaBucket::Within => self.within += 1,
            SlaBucket::AtRisk => self.at_risk += 1,
            SlaBucket::Breached => self.breached += 1,
        }
    }
}

/// Pure SLA classifier
#[derive(Debug, Clone, Copy)]
pub struct SlaClassifier {
    at_risk_ratio: f64,
}

impl Default for SlaClassifier {
    fn default() -> Self {
        Self { at_risk_ratio: 0.25 }
    }
}

impl SlaClassifier {
    /// Create with the remaining fraction at or below which a ticket is at-risk
    pub fn new(at_risk_ratio: f64) -> Self {
        Self { at_risk_ratio }
    }

    /// Classify `ticket` at instant `now`
    pub fn classify(&self, ticket: &TicketRecord, now: DateTime<Utc>) -> SlaBucket {
        let sla_hours = match ticket.service.sla_hours {
            Some(h) if h > 0 => h,
            _ => return SlaBucket::Within,
        };
        if ticket.status.stops_sla_clock() {
            return SlaBucket::Within;
        }

        // A deadline past the representable range is never reached.
        let deadline = match ticket
            .created_at
            .checked_add_signed(Duration::hours(i64::from(sla_hours)))
        {
            Some(deadline) => deadline,
            None => return SlaBucket::Within,
        };
        let remaining = deadline.signed_duration_since(now);
        let hours_remaining = remaining.num_milliseconds() as f64 / 3_600_000.0;
        self.classify_remaining(sla_hours, hours_remaining)
    }

    /// Bucket for `hours_remaining` out of an `sla_hours` allowance
    pub fn classify_remaining(&self, sla_hours: u32, hours_remaining: f64) -> SlaBucket {
        if hours_remaining <= 0.0 {
            return SlaBucket::Breached;
        }
        if hours_remaining / f64::from(sla_hours) <= self.at_risk_ratio {
            SlaBucket::AtRisk
        } else {
            SlaBucket::Within
        }
    }

    /// Tally a batch of tickets
    pub fn tally<'a>(
        &self,
        tickets: impl IntoIterator<Item = &'a TicketRecord>,
        now: DateTime<Utc>,
    ) -> SlaTally {
        let mut tally = SlaTally::default();
        for ticket in tickets {
            tally.record(self.classify(ticket, now));
        }
        tally
    }
}
