// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use appdash_table::{BadgeIcon, BadgeTone, CellValue, ColumnDescriptor, StatusBadge, TableRecord};

use crate::{
    ApplicationDetail, CapacityException, ExceptionStatus, OnboardingRecord, OnboardingStatus,
    Resource, ScorecardMetric, ViewKind,
};

pub const CAPACITY_EXCEPTION_COLUMNS: [ColumnDescriptor; 8] = [
    ColumnDescriptor::new("id", "Ticket").width(10).bounds(6, 16),
    ColumnDescriptor::new("appId", "App Id").width(8).bounds(5, 12),
    ColumnDescriptor::new("appName", "App Name").width(22).bounds(10, 40),
    ColumnDescriptor::new("region", "Region").width(8).bounds(4, 12),
    ColumnDescriptor::new("status", "Status").width(12).bounds(8, 16),
    ColumnDescriptor::new("firstReported", "First Reported")
        .width(14)
        .bounds(10, 16),
    ColumnDescriptor::new("owner", "Assigned To").width(16).bounds(8, 30),
    ColumnDescriptor::new("description", "Description")
        .width(30)
        .bounds(10, 80)
        .unsortable(),
];

pub const RESOURCE_COLUMNS: [ColumnDescriptor; 7] = [
    ColumnDescriptor::new("id", "Resource ID").width(12).bounds(6, 16),
    ColumnDescriptor::new("name", "Name").width(20).bounds(8, 40),
    ColumnDescriptor::new("role", "Role").width(18).bounds(6, 30),
    ColumnDescriptor::new("appId", "App Id").width(8).bounds(5, 12),
    ColumnDescriptor::new("allocation", "Allocation %").width(12).bounds(6, 14),
    ColumnDescriptor::new("manager", "Manager").width(18).bounds(8, 30),
    ColumnDescriptor::new("startDate", "Start Date").width(12).bounds(10, 14),
];

pub const ONBOARDING_COLUMNS: [ColumnDescriptor; 7] = [
    ColumnDescriptor::new("id", "Request").width(10).bounds(6, 16),
    ColumnDescriptor::new("appId", "App Id").width(8).bounds(5, 12),
    ColumnDescriptor::new("appName", "App Name").width(22).bounds(10, 40),
    ColumnDescriptor::new("requester", "Requester").width(18).bounds(8, 30),
    ColumnDescriptor::new("status", "Status").width(18).bounds(8, 22),
    ColumnDescriptor::new("submittedOn", "Submitted").width(12).bounds(10, 14),
    ColumnDescriptor::new("approver", "Approver").width(18).bounds(8, 30),
];

pub const APPLICATION_COLUMNS: [ColumnDescriptor; 7] = [
    ColumnDescriptor::new("id", "App Id").width(8).bounds(5, 12),
    ColumnDescriptor::new("name", "Name").width(22).bounds(10, 40),
    ColumnDescriptor::new("owner", "Owner").width(18).bounds(8, 30),
    ColumnDescriptor::new("criticality", "Criticality").width(11).bounds(6, 14),
    ColumnDescriptor::new("lifecycle", "Lifecycle").width(10).bounds(6, 14),
    ColumnDescriptor::new("organization", "Organization")
        .width(18)
        .bounds(8, 30),
    ColumnDescriptor::new("supportGroup", "Support Group")
        .width(18)
        .bounds(8, 30),
];

pub const METRIC_COLUMNS: [ColumnDescriptor; 6] = [
    ColumnDescriptor::new("id", "Metric").width(8).bounds(5, 12),
    ColumnDescriptor::new("name", "Name").width(26).bounds(10, 40),
    ColumnDescriptor::new("category", "Category").width(14).bounds(8, 24),
    ColumnDescriptor::new("target", "Target").width(8).bounds(6, 12),
    ColumnDescriptor::new("unit", "Unit").width(8).bounds(4, 12),
    ColumnDescriptor::new("active", "Active").width(7).bounds(6, 8),
];

pub fn columns_for(kind: ViewKind) -> &'static [ColumnDescriptor] {
    match kind {
        ViewKind::CapacityExceptions => &CAPACITY_EXCEPTION_COLUMNS,
        ViewKind::Resources => &RESOURCE_COLUMNS,
        ViewKind::Onboarding => &ONBOARDING_COLUMNS,
        ViewKind::Applications => &APPLICATION_COLUMNS,
        ViewKind::Metrics => &METRIC_COLUMNS,
    }
}

impl ExceptionStatus {
    pub fn badge(self) -> StatusBadge {
        let (tone, icon) = match self {
            Self::Open => (BadgeTone::Danger, BadgeIcon::Alert),
            Self::Assigned => (BadgeTone::Warning, BadgeIcon::Person),
            Self::Closed => (BadgeTone::Success, BadgeIcon::Check),
        };
        StatusBadge::new(self.label(), tone, icon)
    }
}

impl OnboardingStatus {
    pub fn badge(self) -> StatusBadge {
        let (tone, icon) = match self {
            Self::Draft => (BadgeTone::Neutral, BadgeIcon::Circle),
            Self::Pending => (BadgeTone::Info, BadgeIcon::Clock),
            Self::Approved => (BadgeTone::Success, BadgeIcon::Check),
            Self::Rejected => (BadgeTone::Danger, BadgeIcon::Cross),
        };
        StatusBadge::new(self.label(), tone, icon)
    }
}

impl TableRecord for CapacityException {
    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.as_str()),
            "appId" => CellValue::text(self.app_id.clone()),
            "appName" => CellValue::text(self.app_name.clone()),
            "region" => CellValue::text(self.region.clone()),
            "status" => CellValue::Status(self.status.badge()),
            "firstReported" => CellValue::from(self.first_reported),
            "owner" => CellValue::text(self.owner.clone()),
            "description" => CellValue::text(self.description.clone()),
            _ => CellValue::Empty,
        }
    }
}

impl TableRecord for Resource {
    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.as_str()),
            "name" => CellValue::text(self.name.clone()),
            "role" => CellValue::text(self.role.clone()),
            "appId" => CellValue::text(self.app_id.clone()),
            "allocation" => CellValue::Integer(i64::from(self.allocation_percent)),
            "manager" => CellValue::text(self.manager.clone()),
            "startDate" => CellValue::Date(self.start_date),
            _ => CellValue::Empty,
        }
    }
}

impl TableRecord for OnboardingRecord {
    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.as_str()),
            "appId" => CellValue::text(self.app_id.clone()),
            "appName" => CellValue::text(self.app_name.clone()),
            "requester" => CellValue::text(self.requester.clone()),
            "status" => CellValue::Status(self.status.badge()),
            "submittedOn" => CellValue::from(self.submitted_on),
            "approver" => self
                .approver
                .as_ref()
                .map_or(CellValue::Empty, |approver| CellValue::text(approver.clone())),
            _ => CellValue::Empty,
        }
    }
}

impl TableRecord for ApplicationDetail {
    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.as_str()),
            "name" => CellValue::text(self.name.clone()),
            "owner" => CellValue::text(self.owner.clone()),
            "criticality" => CellValue::text(self.criticality.label()),
            "lifecycle" => CellValue::text(self.lifecycle.label()),
            "organization" => CellValue::text(self.alignment.organization.clone()),
            "supportGroup" => CellValue::text(self.alignment.support_group.clone()),
            _ => CellValue::Empty,
        }
    }
}

impl TableRecord for ScorecardMetric {
    fn row_id(&self) -> &str {
        self.id.as_str()
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.as_str()),
            "name" => CellValue::text(self.name.clone()),
            "category" => CellValue::text(self.category.clone()),
            "target" => CellValue::Decimal(self.target),
            "unit" => CellValue::text(self.unit.clone()),
            "active" => CellValue::Bool(self.active),
            _ => CellValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CAPACITY_EXCEPTION_COLUMNS, columns_for};
    use crate::ViewKind;
    use std::collections::BTreeSet;

    #[test]
    fn column_keys_are_unique_per_view() {
        for kind in ViewKind::ALL {
            let columns = columns_for(kind);
            let keys: BTreeSet<&str> = columns.iter().map(|column| column.key).collect();
            assert_eq!(keys.len(), columns.len(), "duplicate key in {kind:?}");
            assert_eq!(columns[0].key, "id");
        }
    }

    #[test]
    fn default_widths_sit_inside_bounds() {
        for kind in ViewKind::ALL {
            for column in columns_for(kind) {
                assert!(column.min_width <= column.default_width, "{}", column.key);
                assert!(column.default_width <= column.max_width, "{}", column.key);
            }
        }
    }

    #[test]
    fn exception_description_is_not_sortable() {
        let description = CAPACITY_EXCEPTION_COLUMNS
            .iter()
            .find(|column| column.key == "description")
            .expect("description column");
        assert!(!description.sortable);
        assert!(description.filterable);
    }
}
