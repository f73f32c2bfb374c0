// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use appdash_app::{
    ApplicationDetail, ApplicationId, CapacityException, CapacityExceptionId, Criticality,
    Dataset, ExceptionStatus, Lifecycle, MetricId, OnboardingId, OnboardingRecord,
    OnboardingStatus, Proficiency, Relationship, RelationshipKind, Resource, ResourceId,
    ScorecardMetric, Skill, SupportAlignment,
};
use std::path::PathBuf;
use time::macros::date;
use time::{Date, Duration};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const ROLES: [&str; 8] = [
    "Backend Engineer",
    "Frontend Engineer",
    "Data Engineer",
    "SRE",
    "QA Analyst",
    "Product Manager",
    "Business Analyst",
    "Architect",
];

const APPS: [(&str, &str); 10] = [
    ("538", "Ledger Core"),
    ("104", "Claims Portal"),
    ("217", "Payments Gateway"),
    ("326", "Identity Hub"),
    ("419", "Reporting Studio"),
    ("612", "Customer 360"),
    ("745", "Pricing Engine"),
    ("861", "Document Vault"),
    ("903", "Fraud Radar"),
    ("1270", "Field Service"),
];

const REFERENCE_DATE: Date = date!(2024 - 01 - 02);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for staffing and onboarding rows. The same seed always
/// produces the same records.
#[derive(Debug, Clone)]
pub struct DashFaker {
    rng: DeterministicRng,
}

impl DashFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    pub fn person(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    pub fn date_after(&mut self, start: Date, max_days: usize) -> Date {
        start + Duration::days(self.rng.int_n(max_days) as i64)
    }

    pub fn resource(&mut self, index: usize) -> Resource {
        let (app_id, _) = APPS[self.rng.int_n(APPS.len())];
        let has_start = self.rng.int_n(5) != 0;
        Resource {
            id: ResourceId::new(format!("R{:03}", 100 + index)),
            name: format!("{} {}", self.person(), index + 1),
            role: self.pick(&ROLES).to_owned(),
            app_id: app_id.to_owned(),
            allocation_percent: (self.rng.int_n(20) as u8 + 1) * 5,
            manager: self.person(),
            start_date: has_start.then(|| self.date_after(REFERENCE_DATE, 365)),
        }
    }

    pub fn onboarding(&mut self, index: usize) -> OnboardingRecord {
        let (app_id, app_name) = APPS[index % APPS.len()];
        let status = OnboardingStatus::ALL[self.rng.int_n(OnboardingStatus::ALL.len())];
        let approver = matches!(
            status,
            OnboardingStatus::Approved | OnboardingStatus::Rejected
        )
        .then(|| self.person());
        OnboardingRecord {
            id: OnboardingId::new(format!("ONB-{:03}", index + 1)),
            app_id: app_id.to_owned(),
            app_name: app_name.to_owned(),
            requester: self.person(),
            status,
            submitted_on: self.date_after(REFERENCE_DATE, 200),
            approver,
        }
    }
}

fn exception(
    id: &str,
    app: (&str, &str),
    region: &str,
    status: ExceptionStatus,
    first_reported: Date,
    owner: &str,
    description: &str,
) -> CapacityException {
    CapacityException {
        id: CapacityExceptionId::new(id),
        app_id: app.0.to_owned(),
        app_name: app.1.to_owned(),
        region: region.to_owned(),
        status,
        first_reported,
        owner: owner.to_owned(),
        description: description.to_owned(),
    }
}

/// Sixteen tickets across three regions. App `538` appears exactly twice
/// and no other app id contains it.
#[rustfmt::skip]
pub fn capacity_exceptions() -> Vec<CapacityException> {
    use ExceptionStatus::{Assigned, Closed, Open};
    vec![
        exception("EMEA001", APPS[0], "EMEA", Open, date!(2024 - 02 - 11), "", "CPU saturation during month-end close"),
        exception("EMEA002", APPS[1], "EMEA", Assigned, date!(2024 - 01 - 29), "Riley Evans", "Disk growth above forecast"),
        exception("EMEA003", APPS[2], "EMEA", Closed, date!(2023 - 12 - 04), "Quinn Ward", "Connection pool exhaustion"),
        exception("EMEA004", APPS[3], "EMEA", Open, date!(2024 - 03 - 01), "", "Memory pressure on auth nodes"),
        exception("EMEA005", APPS[4], "EMEA", Assigned, date!(2024 - 02 - 20), "Kai Turner", "Report queue backlog"),
        exception("EMEA006", APPS[5], "EMEA", Closed, date!(2023 - 11 - 17), "Drew Lopez", "Cache eviction storm"),
        exception("NA001", APPS[6], "NA", Open, date!(2024 - 02 - 05), "", "Batch window overrun"),
        exception("NA002", APPS[0], "NA", Assigned, date!(2024 - 01 - 15), "Morgan Hill", "Ledger replica lag"),
        exception("NA003", APPS[7], "NA", Closed, date!(2023 - 10 - 30), "Casey Gray", "Object storage quota reached"),
        exception("NA004", APPS[8], "NA", Open, date!(2024 - 03 - 12), "", "Scoring latency above SLO"),
        exception("NA005", APPS[9], "NA", Assigned, date!(2024 - 02 - 27), "Parker Young", "Mobile sync spikes"),
        exception("APAC001", APPS[1], "APAC", Closed, date!(2023 - 09 - 18), "Alex Diaz", "Thread starvation in claims intake"),
        exception("APAC002", APPS[2], "APAC", Open, date!(2024 - 01 - 08), "", "Settlement job contention"),
        exception("APAC003", APPS[3], "APAC", Assigned, date!(2024 - 02 - 14), "Robin Price", "Token service saturation"),
        exception("APAC004", APPS[5], "APAC", Open, date!(2024 - 03 - 05), "", "Profile merge backlog"),
        exception("APAC005", APPS[6], "APAC", Closed, date!(2023 - 12 - 21), "Hayden Reed", "Rate table rebuild overran"),
    ]
}

pub fn applications() -> Vec<ApplicationDetail> {
    vec![
        ApplicationDetail {
            id: ApplicationId::new("538"),
            name: "Ledger Core".to_owned(),
            owner: "Morgan Hill".to_owned(),
            criticality: Criticality::Critical,
            lifecycle: Lifecycle::Active,
            alignment: SupportAlignment {
                organization: "Finance Technology".to_owned(),
                business_unit: "Corporate Finance".to_owned(),
                support_group: "FIN-L2".to_owned(),
                escalation_contact: "Avery Walker".to_owned(),
            },
            relationships: vec![
                Relationship {
                    name: "Payments Gateway".to_owned(),
                    kind: RelationshipKind::Upstream,
                },
                Relationship {
                    name: "Reporting Studio".to_owned(),
                    kind: RelationshipKind::Downstream,
                },
            ],
            team_skills: vec![
                Skill {
                    name: "Rust".to_owned(),
                    proficiency: Proficiency::Advanced,
                },
                Skill {
                    name: "PostgreSQL".to_owned(),
                    proficiency: Proficiency::Expert,
                },
            ],
        },
        ApplicationDetail {
            id: ApplicationId::new("104"),
            name: "Claims Portal".to_owned(),
            owner: "Riley Evans".to_owned(),
            criticality: Criticality::High,
            lifecycle: Lifecycle::Active,
            alignment: SupportAlignment {
                organization: "Insurance Platforms".to_owned(),
                business_unit: "Claims".to_owned(),
                support_group: "CLM-L2".to_owned(),
                escalation_contact: String::new(),
            },
            relationships: vec![Relationship {
                name: "Document Vault".to_owned(),
                kind: RelationshipKind::Shared,
            }],
            team_skills: vec![Skill {
                name: "React".to_owned(),
                proficiency: Proficiency::Intermediate,
            }],
        },
        ApplicationDetail {
            id: ApplicationId::new("1270"),
            name: "Field Service".to_owned(),
            owner: "Parker Young".to_owned(),
            criticality: Criticality::Medium,
            lifecycle: Lifecycle::Sunset,
            alignment: SupportAlignment {
                organization: "Operations".to_owned(),
                business_unit: "Field Operations".to_owned(),
                support_group: "OPS-L1".to_owned(),
                escalation_contact: "Rowan Brooks".to_owned(),
            },
            relationships: Vec::new(),
            team_skills: Vec::new(),
        },
    ]
}

pub fn metrics() -> Vec<ScorecardMetric> {
    let metric = |id: &str, name: &str, category: &str, target: Option<f64>, unit: &str| {
        ScorecardMetric {
            id: MetricId::new(id),
            name: name.to_owned(),
            category: category.to_owned(),
            target,
            unit: unit.to_owned(),
            description: String::new(),
            active: target.is_some(),
        }
    };
    vec![
        metric("M01", "Availability", "Reliability", Some(99.9), "%"),
        metric("M02", "Mean time to restore", "Reliability", Some(4.0), "hours"),
        metric("M03", "Open capacity exceptions", "Capacity", Some(0.0), "count"),
        metric("M04", "Deployment frequency", "Delivery", Some(20.0), "per month"),
        metric("M05", "Change failure rate", "Delivery", Some(5.0), "%"),
        metric("M06", "Tech debt ratio", "Quality", None, "%"),
    ]
}

pub fn resources(seed: u64, count: usize) -> Vec<Resource> {
    let mut faker = DashFaker::new(seed);
    (0..count).map(|index| faker.resource(index)).collect()
}

pub fn onboarding_records(seed: u64, count: usize) -> Vec<OnboardingRecord> {
    let mut faker = DashFaker::new(seed);
    (0..count).map(|index| faker.onboarding(index)).collect()
}

/// Everything the `--demo` mode shows.
pub fn demo_dataset() -> Dataset {
    Dataset {
        capacity_exceptions: capacity_exceptions(),
        resources: resources(7, 24),
        onboarding: onboarding_records(11, 13),
        applications: applications(),
        metrics: metrics(),
    }
}

pub fn temp_data_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("appdash.json");
    Ok((dir, path))
}

pub fn fixture_date() -> Date {
    date!(2024 - 06 - 03)
}

#[cfg(test)]
mod tests {
    use super::{DashFaker, capacity_exceptions, demo_dataset, resources};
    use std::collections::BTreeSet;

    #[test]
    fn sixteen_exceptions_with_538_twice() {
        let rows = capacity_exceptions();
        assert_eq!(rows.len(), 16);
        let hits = rows.iter().filter(|row| row.app_id.contains("538")).count();
        assert_eq!(hits, 2);
        assert!(rows.iter().any(|row| row.id.as_str() == "EMEA001"));
    }

    #[test]
    fn same_seed_same_records() {
        let mut left = DashFaker::new(42);
        let mut right = DashFaker::new(42);
        assert_eq!(left.resource(0), right.resource(0));
        assert_eq!(left.onboarding(3), right.onboarding(3));
    }

    #[test]
    fn generated_resources_are_valid() {
        let rows = resources(3, 40);
        let ids: BTreeSet<&str> = rows.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids.len(), rows.len());
        assert!(rows.iter().all(|row| (5..=100).contains(&row.allocation_percent)));
    }

    #[test]
    fn demo_dataset_passes_validation() -> anyhow::Result<()> {
        demo_dataset().validate()
    }
}
