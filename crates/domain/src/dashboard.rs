// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::complaint::Complaint;
use crate::types::{ComplaintCategory, ComplaintStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Number of complaints.
    pub total: usize,
    /// Number of complaints in status `OPEN`.
    pub open: usize,
    /// Number of complaints in status `RESOLVED`.
    pub resolved: usize,
    /// Counts per category. Categories with no complaints are omitted.
    pub by_category: BTreeMap<ComplaintCategory, usize>,
    /// Counts per status. Statuses with no complaints are omitted.
    pub by_status: BTreeMap<ComplaintStatus, usize>,
}

impl DashboardStats {
    /// Adds one complaint to the tally.
    pub fn record(&mut self, category: ComplaintCategory, status: ComplaintStatus) {
        self.total += 1;
        match status {
            ComplaintStatus::Open => self.open += 1,
            ComplaintStatus::Resolved => self.resolved += 1,
            _ => {}
        }
        *self.by_category.entry(category).or_insert(0) += 1;
        *self.by_status.entry(status).or_insert(0) += 1;
    }
}

/// Computes dashboard statistics over a set of complaints.
#[must_use]
pub fn summarize<'a, I>(complaints: I) -> DashboardStats
where
    I: IntoIterator<Item = &'a Complaint>,
{
    let mut stats: DashboardStats = DashboardStats::default();
    for complaint in complaints {
        stats.record(complaint.details.category, complaint.status);
    }
    stats
}
