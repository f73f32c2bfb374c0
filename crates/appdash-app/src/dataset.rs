// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use appdash_table::FetchResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use time::Date;
use tracing::info;

use crate::{
    ApplicationDetail, CapacityException, CapacityExceptionId, FormPayload, OnboardingId,
    OnboardingRecord, Resource, SaveError, ScorecardMetric, ViewKind,
};

const OPEN_REQUEST_EXISTS: &str = "open_request_exists";

/// Every record list the dashboard shows, as stored on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub capacity_exceptions: Vec<CapacityException>,
    pub resources: Vec<Resource>,
    pub onboarding: Vec<OnboardingRecord>,
    pub applications: Vec<ApplicationDetail>,
    pub metrics: Vec<ScorecardMetric>,
}

/// One past the highest numeric suffix under `prefix`.
fn next_in_sequence<'a>(
    prefix: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<u64, SaveError> {
    let highest = ids
        .filter_map(|id| id.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    highest
        .checked_add(1)
        .ok_or_else(|| SaveError::Failed(format!("id sequence {prefix} is exhausted")))
}

/// One fetch result per view.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    pub capacity_exceptions: FetchResult<CapacityException>,
    pub resources: FetchResult<Resource>,
    pub onboarding: FetchResult<OnboardingRecord>,
    pub applications: FetchResult<ApplicationDetail>,
    pub metrics: FetchResult<ScorecardMetric>,
}

impl DatasetSource {
    pub fn loading() -> Self {
        Self {
            capacity_exceptions: FetchResult::loading(),
            resources: FetchResult::loading(),
            onboarding: FetchResult::loading(),
            applications: FetchResult::loading(),
            metrics: FetchResult::loading(),
        }
    }

    pub fn failed(error: &str) -> Self {
        Self {
            capacity_exceptions: FetchResult::failed(error),
            resources: FetchResult::failed(error),
            onboarding: FetchResult::failed(error),
            applications: FetchResult::failed(error),
            metrics: FetchResult::failed(error),
        }
    }
}

fn ensure_unique<'a>(view: ViewKind, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            bail!("{} contains a record with a blank id", view.label());
        }
        if !seen.insert(id) {
            bail!("{} contains duplicate id {id:?}", view.label());
        }
    }
    Ok(())
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json).context("parse dataset JSON")?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize dataset")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("read dataset {}", path.display()))?;
        let dataset =
            Self::from_json(&json).with_context(|| format!("load dataset {}", path.display()))?;
        info!(
            path = %path.display(),
            exceptions = dataset.capacity_exceptions.len(),
            resources = dataset.resources.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("write dataset {}", path.display()))
    }

    /// Rejects blank or repeated ids and out-of-range allocations.
    pub fn validate(&self) -> Result<()> {
        ensure_unique(
            ViewKind::CapacityExceptions,
            self.capacity_exceptions.iter().map(|row| row.id.as_str()),
        )?;
        ensure_unique(
            ViewKind::Resources,
            self.resources.iter().map(|row| row.id.as_str()),
        )?;
        ensure_unique(
            ViewKind::Onboarding,
            self.onboarding.iter().map(|row| row.id.as_str()),
        )?;
        ensure_unique(
            ViewKind::Applications,
            self.applications.iter().map(|row| row.id.as_str()),
        )?;
        ensure_unique(
            ViewKind::Metrics,
            self.metrics.iter().map(|row| row.id.as_str()),
        )?;
        if let Some(resource) = self
            .resources
            .iter()
            .find(|resource| resource.allocation_percent > 100)
        {
            bail!(
                "resource {} has allocation {}%, expected 0-100",
                resource.id,
                resource.allocation_percent
            );
        }
        Ok(())
    }

    /// Next ticket id for a region, e.g. `EMEA017`.
    pub fn next_exception_id(&self, region: &str) -> Result<CapacityExceptionId, SaveError> {
        let prefix = region.trim().to_uppercase();
        let next = next_in_sequence(
            &prefix,
            self.capacity_exceptions.iter().map(|row| row.id.as_str()),
        )?;
        Ok(CapacityExceptionId::new(format!("{prefix}{next:03}")))
    }

    pub fn next_onboarding_id(&self) -> Result<OnboardingId, SaveError> {
        let next = next_in_sequence("ONB-", self.onboarding.iter().map(|row| row.id.as_str()))?;
        Ok(OnboardingId::new(format!("ONB-{next:03}")))
    }

    /// Swaps in an edited application, matched by id.
    pub fn replace_application(&mut self, app: ApplicationDetail) -> Result<(), SaveError> {
        match self.applications.iter_mut().find(|row| row.id == app.id) {
            Some(existing) => {
                *existing = app;
                Ok(())
            }
            None => Err(SaveError::Failed(format!(
                "application {} no longer exists",
                app.id
            ))),
        }
    }

    pub fn into_source(self) -> DatasetSource {
        DatasetSource {
            capacity_exceptions: FetchResult::ready(self.capacity_exceptions),
            resources: FetchResult::ready(self.resources),
            onboarding: FetchResult::ready(self.onboarding),
            applications: FetchResult::ready(self.applications),
            metrics: FetchResult::ready(self.metrics),
        }
    }

    /// Applies a submitted form. Resources are upserted by id; a different
    /// resource already using the same name is a conflict.
    pub fn apply_form(&mut self, payload: &FormPayload, today: Date) -> Result<(), SaveError> {
        match payload {
            FormPayload::Resource(form) => {
                let record = form
                    .to_record()
                    .map_err(|errors| SaveError::Failed(errors.to_string()))?;
                let name = record.name.to_lowercase();
                if self
                    .resources
                    .iter()
                    .any(|row| row.id != record.id && row.name.to_lowercase() == name)
                {
                    return Err(SaveError::name_exists(&record.name));
                }
                match self.resources.iter_mut().find(|row| row.id == record.id) {
                    Some(existing) => *existing = record,
                    None => self.resources.push(record),
                }
            }
            FormPayload::Onboarding(form) => {
                let record = form
                    .to_record(self.next_onboarding_id()?, today)
                    .map_err(|errors| SaveError::Failed(errors.to_string()))?;
                if self.onboarding.iter().any(|row| {
                    row.app_id == record.app_id && row.status.is_open_request()
                }) {
                    return Err(SaveError::Conflict {
                        code: OPEN_REQUEST_EXISTS.to_owned(),
                        message: format!("app {} already has an open request", record.app_id),
                    });
                }
                self.onboarding.push(record);
            }
            FormPayload::CapacityException(form) => {
                let id = self.next_exception_id(&form.region)?;
                let record = form
                    .to_record(id, today)
                    .map_err(|errors| SaveError::Failed(errors.to_string()))?;
                self.capacity_exceptions.push(record);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Dataset;
    use crate::{
        CapacityExceptionForm, ExceptionStatus, FormPayload, ResourceAllocationForm, SaveError,
    };
    use time::macros::date;

    fn resource_form(id: &str, name: &str) -> FormPayload {
        FormPayload::Resource(ResourceAllocationForm {
            resource_id: id.to_owned(),
            name: name.to_owned(),
            role: "SRE".to_owned(),
            app_id: "538".to_owned(),
            allocation_percent: "50".to_owned(),
            manager: String::new(),
            start_date: String::new(),
        })
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let json = r#"{"resources":[
            {"id":"R1","name":"A","role":"SRE","app_id":"1","allocation_percent":10},
            {"id":"R1","name":"B","role":"SRE","app_id":"1","allocation_percent":10}
        ]}"#;
        let error = Dataset::from_json(json).expect_err("duplicate ids");
        assert!(format!("{error:#}").contains("duplicate id \"R1\""));
    }

    #[test]
    fn over_allocation_fails_validation() {
        let json = r#"{"resources":[
            {"id":"R1","name":"A","role":"SRE","app_id":"1","allocation_percent":120}
        ]}"#;
        assert!(Dataset::from_json(json).is_err());
    }

    #[test]
    fn resource_name_conflict_is_reported() {
        let mut dataset = Dataset::default();
        let today = date!(2024 - 06 - 03);
        dataset
            .apply_form(&resource_form("R1", "Ana Silva"), today)
            .expect("first save");
        let error = dataset
            .apply_form(&resource_form("R2", "ana silva"), today)
            .expect_err("name taken");
        assert!(matches!(error, SaveError::Conflict { .. }));
        assert_eq!(dataset.resources.len(), 1);

        dataset
            .apply_form(&resource_form("R1", "Ana Silva"), today)
            .expect("same id updates in place");
        assert_eq!(dataset.resources.len(), 1);
    }

    #[test]
    fn new_exceptions_get_region_sequence_ids() {
        let mut dataset = Dataset::default();
        let form = CapacityExceptionForm {
            app_id: "538".to_owned(),
            app_name: "Ledger".to_owned(),
            region: "emea".to_owned(),
            owner: String::new(),
            description: String::new(),
        };
        let payload = FormPayload::CapacityException(form);
        dataset
            .apply_form(&payload, date!(2024 - 06 - 03))
            .expect("save");
        dataset
            .apply_form(&payload, date!(2024 - 06 - 04))
            .expect("save");
        let ids: Vec<&str> = dataset
            .capacity_exceptions
            .iter()
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(ids, vec!["EMEA001", "EMEA002"]);
        assert_eq!(dataset.capacity_exceptions[0].status, ExceptionStatus::Open);
    }

    #[test]
    fn sequence_ids_continue_past_u32_and_refuse_to_wrap() {
        let json = r#"{"onboarding":[
            {"id":"ONB-4294967295","app_id":"538","app_name":"Ledger","requester":"Ana","status":"approved","submitted_on":"2024-06-03"}
        ]}"#;
        let dataset = Dataset::from_json(json).expect("valid dataset");
        assert_eq!(
            dataset.next_onboarding_id().expect("room left").as_str(),
            "ONB-4294967296"
        );

        let json = format!(
            r#"{{"capacity_exceptions":[
                {{"id":"EMEA{}","app_id":"538","app_name":"Ledger","region":"EMEA","status":"open","first_reported":"2024-06-03"}}
            ]}}"#,
            u64::MAX
        );
        let full = Dataset::from_json(&json).expect("valid dataset");
        let error = full.next_exception_id("emea").expect_err("sequence exhausted");
        assert!(matches!(error, SaveError::Failed(message) if message.contains("EMEA")));
    }

    #[test]
    fn replacing_an_unknown_application_fails() {
        let json = r#"{"applications":[
            {"id":"538","name":"Ledger","owner":"Ana Silva","criticality":"high","lifecycle":"active",
             "alignment":{"organization":"Finance","business_unit":"Treasury","support_group":"FIN-OPS"}}
        ]}"#;
        let mut dataset = Dataset::from_json(json).expect("valid dataset");
        let mut app = dataset.applications[0].clone();
        app.owner = "Sam Hill".to_owned();
        dataset.replace_application(app.clone()).expect("known id");
        assert_eq!(dataset.applications[0].owner, "Sam Hill");

        app.id = crate::ApplicationId::new("999");
        assert!(matches!(
            dataset.replace_application(app),
            Err(SaveError::Failed(_))
        ));
    }

    #[test]
    fn save_and_load_through_a_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("data.json");
        let mut dataset = Dataset::default();
        dataset
            .apply_form(&resource_form("R1", "Ana Silva"), date!(2024 - 06 - 03))
            .map_err(anyhow::Error::new)?;
        dataset.save(&path)?;
        assert_eq!(Dataset::load(&path)?, dataset);
        Ok(())
    }
}
