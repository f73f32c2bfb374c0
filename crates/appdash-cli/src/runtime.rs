// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use appdash_app::{ApplicationDetail, Dataset, FormPayload, SaveError, SubmitTicket};
use appdash_tui::{AppRuntime, InternalEvent};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Dataset held in memory and written back to a JSON file after every
/// accepted save. Without a path (demo mode) nothing touches disk.
#[derive(Debug, Clone)]
pub struct JsonRuntime {
    dataset: Arc<Mutex<Dataset>>,
    path: Option<PathBuf>,
}

impl JsonRuntime {
    pub fn new(dataset: Dataset, path: Option<PathBuf>) -> Self {
        Self {
            dataset: Arc::new(Mutex::new(dataset)),
            path,
        }
    }

    /// A missing file starts an empty dataset; it is created on first save.
    pub fn open(path: PathBuf) -> Result<Self> {
        let dataset = if path.exists() {
            Dataset::load(&path)?
        } else {
            info!(path = %path.display(), "no dataset yet, starting empty");
            Dataset::default()
        };
        Ok(Self::new(dataset, Some(path)))
    }

    /// Changes a copy, writes it, then swaps it in. A rejected change
    /// leaves memory and disk as they were.
    fn commit(
        dataset: &Mutex<Dataset>,
        path: Option<&PathBuf>,
        change: impl FnOnce(&mut Dataset) -> Result<(), SaveError>,
    ) -> Result<(), SaveError> {
        let mut guard = lock(dataset)?;
        let mut next = guard.clone();
        change(&mut next)?;
        if let Some(path) = path {
            next.save(path)?;
        }
        *guard = next;
        Ok(())
    }

    fn submit(
        dataset: &Mutex<Dataset>,
        path: Option<&PathBuf>,
        payload: &FormPayload,
    ) -> Result<(), SaveError> {
        Self::commit(dataset, path, |next| {
            next.apply_form(payload, OffsetDateTime::now_utc().date())
        })?;
        info!(form = payload.kind().title(), "record saved");
        Ok(())
    }
}

fn lock(dataset: &Mutex<Dataset>) -> Result<MutexGuard<'_, Dataset>> {
    dataset
        .lock()
        .map_err(|_| anyhow!("dataset lock poisoned by an earlier save"))
}

impl AppRuntime for JsonRuntime {
    fn load_dataset(&mut self) -> Result<Dataset> {
        Ok(lock(&self.dataset)?.clone())
    }

    fn submit_form(&mut self, payload: &FormPayload) -> Result<(), SaveError> {
        Self::submit(&self.dataset, self.path.as_ref(), payload)
    }

    fn save_application(&mut self, app: &ApplicationDetail) -> Result<(), SaveError> {
        Self::commit(&self.dataset, self.path.as_ref(), |next| {
            next.replace_application(app.clone())
        })?;
        info!(app = %app.id, "application updated");
        Ok(())
    }

    fn spawn_submit(
        &mut self,
        ticket: SubmitTicket,
        payload: FormPayload,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let dataset = Arc::clone(&self.dataset);
        let path = self.path.clone();
        thread::Builder::new()
            .name("appdash-save".to_owned())
            .spawn(move || {
                let outcome = Self::submit(&dataset, path.as_ref(), &payload);
                if let Err(error) = &outcome {
                    warn!(%error, "save rejected");
                }
                let _ = tx.send(InternalEvent::SaveFinished { ticket, outcome });
            })
            .map(|_| ())
            .map_err(|error| anyhow!("spawn save thread: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::JsonRuntime;
    use anyhow::Result;
    use appdash_app::{
        ApplicationId, Dataset, FormPayload, ResourceAllocationForm, SaveError, SubmitTicket,
    };
    use appdash_tui::{AppRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::time::Duration;

    fn resource(id: &str, name: &str) -> FormPayload {
        FormPayload::Resource(ResourceAllocationForm {
            resource_id: id.to_owned(),
            name: name.to_owned(),
            role: "Engineer".to_owned(),
            app_id: "538".to_owned(),
            allocation_percent: "25".to_owned(),
            manager: String::new(),
            start_date: "2024-07-01".to_owned(),
        })
    }

    #[test]
    fn missing_file_starts_empty_and_is_created_on_save() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("data").join("appdash.json");
        let mut runtime = JsonRuntime::open(path.clone())?;
        assert_eq!(runtime.load_dataset()?, Dataset::default());

        runtime
            .submit_form(&resource("R1", "Ana Silva"))
            .map_err(anyhow::Error::new)?;
        let on_disk = Dataset::load(&path)?;
        assert_eq!(on_disk.resources.len(), 1);
        assert_eq!(on_disk, runtime.load_dataset()?);
        Ok(())
    }

    #[test]
    fn rejected_save_leaves_memory_and_disk_untouched() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("appdash.json");
        let mut runtime = JsonRuntime::open(path.clone())?;
        runtime
            .submit_form(&resource("R1", "Ana Silva"))
            .map_err(anyhow::Error::new)?;

        let error = runtime
            .submit_form(&resource("R2", "Ana Silva"))
            .expect_err("duplicate name");
        assert!(matches!(error, SaveError::Conflict { .. }));
        assert_eq!(runtime.load_dataset()?.resources.len(), 1);
        assert_eq!(Dataset::load(&path)?.resources.len(), 1);
        Ok(())
    }

    #[test]
    fn application_edits_are_written_back() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("appdash.json");
        let mut runtime = JsonRuntime::new(appdash_testkit::demo_dataset(), Some(path.clone()));
        let mut app = runtime.load_dataset()?.applications[0].clone();
        app.team_skills.clear();
        runtime.save_application(&app).map_err(anyhow::Error::new)?;
        assert_eq!(Dataset::load(&path)?.applications[0], app);

        app.id = ApplicationId::new("missing");
        assert!(runtime.save_application(&app).is_err());
        app.id = runtime.load_dataset()?.applications[0].id.clone();
        assert_eq!(Dataset::load(&path)?.applications[0], app);
        Ok(())
    }

    #[test]
    fn spawned_save_reports_back_with_its_ticket() -> Result<()> {
        let mut runtime = JsonRuntime::new(Dataset::default(), None);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_submit(SubmitTicket::new(3), resource("R1", "Ana Silva"), tx)?;

        let event = rx.recv_timeout(Duration::from_secs(5))?;
        assert_eq!(
            event,
            InternalEvent::SaveFinished {
                ticket: SubmitTicket::new(3),
                outcome: Ok(()),
            }
        );
        assert_eq!(runtime.load_dataset()?.resources.len(), 1);
        Ok(())
    }
}
