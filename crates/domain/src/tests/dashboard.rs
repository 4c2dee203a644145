// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::create_test_complaint;
use crate::{Complaint, ComplaintCategory, ComplaintStatus, DashboardStats, summarize};

#[test]
fn test_summarize_empty() {
    let complaints: Vec<Complaint> = Vec::new();
    let stats: DashboardStats = summarize(&complaints);
    assert_eq!(stats, DashboardStats::default());
}

#[test]
fn test_summarize_counts_status_and_category() {
    let mut complaints: Vec<Complaint> = (1..=4).map(create_test_complaint).collect();
    complaints[1].status = ComplaintStatus::Resolved;
    complaints[2].status = ComplaintStatus::Escalated;
    complaints[3].details.category = ComplaintCategory::Timing;

    let stats: DashboardStats = summarize(&complaints);
    assert_eq!(stats.total, 4);
    assert_eq!(stats.open, 2);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.by_category.get(&ComplaintCategory::Luggage), Some(&3));
    assert_eq!(stats.by_category.get(&ComplaintCategory::Timing), Some(&1));
    assert_eq!(stats.by_status.get(&ComplaintStatus::Escalated), Some(&1));
    assert!(!stats.by_status.contains_key(&ComplaintStatus::Cancelled));
}

#[test]
fn test_dashboard_serializes_codes_as_keys() {
    let complaints: Vec<Complaint> = vec![create_test_complaint(1)];
    let json: serde_json::Value = serde_json::to_value(summarize(&complaints)).unwrap();
    assert_eq!(json["by_category"]["LUGGAGE"], 1);
    assert_eq!(json["by_status"]["OPEN"], 1);
}
