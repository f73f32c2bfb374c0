// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FormKind, ViewKind};

impl ViewKind {
    pub const fn form_kind(self) -> Option<FormKind> {
        match self {
            Self::CapacityExceptions => Some(FormKind::CapacityException),
            Self::Resources => Some(FormKind::ResourceAllocation),
            Self::Onboarding => Some(FormKind::OnboardingRequest),
            Self::Applications | Self::Metrics => None,
        }
    }

    pub const fn supports_edit(self) -> bool {
        matches!(self, Self::Resources)
    }
}

/// At most one dialog is open at a time; ids are row ids in the active view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Creating(FormKind),
    Editing(String),
    Viewing(String),
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelVisibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub active_view: ViewKind,
    pub dialog: DialogState,
    pub flags_panel: PanelVisibility,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_view: ViewKind::CapacityExceptions,
            dialog: DialogState::Closed,
            flags_panel: PanelVisibility::Hidden,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    SelectView(ViewKind),
    OpenCreate,
    OpenEdit(String),
    OpenView(String),
    CloseDialog,
    ToggleFlagsPanel,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(ViewKind),
    DialogChanged(DialogState),
    FlagsPanelChanged(PanelVisibility),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::SelectView(kind) => {
                if self.dialog.is_open() {
                    return vec![self.set_status("close the dialog first")];
                }
                if self.active_view == kind {
                    return Vec::new();
                }
                self.active_view = kind;
                vec![AppEvent::ViewChanged(kind)]
            }
            AppCommand::OpenCreate => match self.active_view.form_kind() {
                Some(kind) => self.open_dialog(DialogState::Creating(kind)),
                None => vec![self.set_status("this view is read-only")],
            },
            AppCommand::OpenEdit(id) => {
                if !self.active_view.supports_edit() {
                    return vec![self.set_status("editing is not available here")];
                }
                self.open_dialog(DialogState::Editing(id))
            }
            AppCommand::OpenView(id) => self.open_dialog(DialogState::Viewing(id)),
            AppCommand::CloseDialog => {
                if !self.dialog.is_open() {
                    return Vec::new();
                }
                self.dialog = DialogState::Closed;
                vec![AppEvent::DialogChanged(DialogState::Closed)]
            }
            AppCommand::ToggleFlagsPanel => {
                let (visibility, label) = match self.flags_panel {
                    PanelVisibility::Hidden => (PanelVisibility::Visible, "flags shown"),
                    PanelVisibility::Visible => (PanelVisibility::Hidden, "flags hidden"),
                };
                self.flags_panel = visibility;
                vec![
                    AppEvent::FlagsPanelChanged(visibility),
                    self.set_status(label),
                ]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn open_dialog(&mut self, next: DialogState) -> Vec<AppEvent> {
        if self.dialog.is_open() {
            return vec![self.set_status("another dialog is already open")];
        }
        self.dialog = next.clone();
        vec![AppEvent::DialogChanged(next)]
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        if self.dialog.is_open() {
            return vec![self.set_status("close the dialog first")];
        }
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
