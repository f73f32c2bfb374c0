// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use appdash_app::{
    AppCommand, AppEvent, AppState, ApplicationDetail, CapacityException, Dataset, DatasetSource,
    DialogState, FlagStore, FormPayload, FormStep, FormStepError, InventoryEdit, MultiStepForm,
    Notification, NotificationVariant, OnboardingRecord, PanelVisibility, Proficiency,
    Relationship, RelationshipKind, Resource, ResourceAllocationForm, SaveError, ScorecardMetric,
    Skill, SubmitTicket, ViewKind, columns_for,
};
use appdash_table::{
    BadgeTone, CellValue, ColumnController, FilterState, PageState, SortDirection, SortSpec,
    SourceError, TableCommand, TableRecord, TableStatus, TableView, ViewOptions, find_column,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const FLAG_SELECTION_COLUMN: &str = "selection_column";
pub const FLAG_ROW_NUMBERS: &str = "row_numbers";

const PAGE_SIZE_STEP: usize = 5;
const KEYBOARD_RESIZE_STEP: i32 = 2;
const SORT_MARK_ASC: &str = "▲";
const SORT_MARK_DESC: &str = "▼";
const FILTER_MARK: &str = "*";

/// Data access for the dashboard. Saves may complete on another thread and
/// report back through [`InternalEvent::SaveFinished`].
pub trait AppRuntime {
    fn load_dataset(&mut self) -> Result<Dataset>;
    fn submit_form(&mut self, payload: &FormPayload) -> Result<(), SaveError>;
    fn save_application(&mut self, app: &ApplicationDetail) -> Result<(), SaveError>;

    fn fetch_dataset(&mut self) -> DatasetSource {
        match self.load_dataset() {
            Ok(dataset) => dataset.into_source(),
            Err(error) => DatasetSource::failed(&format!("{error:#}")),
        }
    }

    fn spawn_submit(
        &mut self,
        ticket: SubmitTicket,
        payload: FormPayload,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = self.submit_form(&payload);
        tx.send(InternalEvent::SaveFinished { ticket, outcome })
            .map_err(|_| anyhow!("internal event channel closed"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus {
        token: u64,
    },
    SaveFinished {
        ticket: SubmitTicket,
        outcome: Result<(), SaveError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiSettings {
    pub view_options: ViewOptions,
    pub flags: Vec<(String, bool)>,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            view_options: ViewOptions::default(),
            flags: default_flags(),
        }
    }
}

pub fn default_flags() -> Vec<(String, bool)> {
    vec![
        (FLAG_SELECTION_COLUMN.to_owned(), true),
        (FLAG_ROW_NUMBERS.to_owned(), false),
    ]
}

#[derive(Debug, Clone, PartialEq)]
struct PageRow {
    id: String,
    cells: Vec<CellValue>,
    selected: bool,
}

/// Object-safe view over a typed [`TableView`] so the front end can drive
/// every record type through one code path.
trait TableSurface {
    fn apply(&mut self, command: TableCommand) -> TableStatus;
    fn layout(&self) -> &ColumnController;
    fn layout_mut(&mut self) -> &mut ColumnController;
    fn filter(&self) -> &FilterState;
    fn sort(&self) -> Option<SortSpec>;
    fn page(&self) -> PageState;
    fn page_count(&self) -> usize;
    fn filtered_count(&self) -> usize;
    fn total_count(&self) -> usize;
    fn selected_count(&self) -> usize;
    fn page_rows(&self) -> Vec<PageRow>;
    fn detail(&self, id: &str) -> Option<Vec<(&'static str, String)>>;
}

impl<R: TableRecord> TableSurface for TableView<R> {
    fn apply(&mut self, command: TableCommand) -> TableStatus {
        TableView::apply(self, command)
    }

    fn layout(&self) -> &ColumnController {
        TableView::layout(self)
    }

    fn layout_mut(&mut self) -> &mut ColumnController {
        TableView::layout_mut(self)
    }

    fn filter(&self) -> &FilterState {
        TableView::filter(self)
    }

    fn sort(&self) -> Option<SortSpec> {
        TableView::sort(self)
    }

    fn page(&self) -> PageState {
        TableView::page(self)
    }

    fn page_count(&self) -> usize {
        TableView::page_count(self)
    }

    fn filtered_count(&self) -> usize {
        TableView::filtered_count(self)
    }

    fn total_count(&self) -> usize {
        TableView::total_count(self)
    }

    fn selected_count(&self) -> usize {
        self.selection().len()
    }

    fn page_rows(&self) -> Vec<PageRow> {
        let columns = TableView::layout(self).visible_columns();
        TableView::page_rows(self)
            .into_iter()
            .map(|row| PageRow {
                id: row.row_id().to_owned(),
                cells: columns.iter().map(|column| row.cell(column.key)).collect(),
                selected: self.is_selected(row.row_id()),
            })
            .collect()
    }

    fn detail(&self, id: &str) -> Option<Vec<(&'static str, String)>> {
        let row = self.store().get(id)?;
        Some(
            self.columns()
                .iter()
                .map(|column| (column.label, row.cell(column.key).display()))
                .collect(),
        )
    }
}

#[derive(Debug)]
struct Tables {
    exceptions: TableView<CapacityException>,
    resources: TableView<Resource>,
    onboarding: TableView<OnboardingRecord>,
    applications: TableView<ApplicationDetail>,
    metrics: TableView<ScorecardMetric>,
}

impl Tables {
    fn new(dataset: Dataset, options: ViewOptions) -> Self {
        Self {
            exceptions: TableView::new(
                columns_for(ViewKind::CapacityExceptions),
                dataset.capacity_exceptions,
                options,
            ),
            resources: TableView::new(
                columns_for(ViewKind::Resources),
                dataset.resources,
                options,
            ),
            onboarding: TableView::new(
                columns_for(ViewKind::Onboarding),
                dataset.onboarding,
                options,
            ),
            applications: TableView::new(
                columns_for(ViewKind::Applications),
                dataset.applications,
                options,
            ),
            metrics: TableView::new(columns_for(ViewKind::Metrics), dataset.metrics, options),
        }
    }

    /// Every view takes what it can; the first failure is reported.
    fn load(&mut self, source: DatasetSource) -> Result<(), SourceError> {
        [
            self.exceptions.load_source(source.capacity_exceptions),
            self.resources.load_source(source.resources),
            self.onboarding.load_source(source.onboarding),
            self.applications.load_source(source.applications),
            self.metrics.load_source(source.metrics),
        ]
        .into_iter()
        .map(|loaded| loaded.map(|_| ()))
        .collect()
    }

    fn get(&self, kind: ViewKind) -> &dyn TableSurface {
        match kind {
            ViewKind::CapacityExceptions => &self.exceptions,
            ViewKind::Resources => &self.resources,
            ViewKind::Onboarding => &self.onboarding,
            ViewKind::Applications => &self.applications,
            ViewKind::Metrics => &self.metrics,
        }
    }

    fn get_mut(&mut self, kind: ViewKind) -> &mut dyn TableSurface {
        match kind {
            ViewKind::CapacityExceptions => &mut self.exceptions,
            ViewKind::Resources => &mut self.resources,
            ViewKind::Onboarding => &mut self.onboarding,
            ViewKind::Applications => &mut self.applications,
            ViewKind::Metrics => &mut self.metrics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableCursor {
    row: usize,
    column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterTarget {
    Global,
    Column(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterInput {
    target: FilterTarget,
    buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InventoryAction {
    AddSkill,
    RemoveSkill,
    AddRelationship,
    RemoveRelationship,
}

impl InventoryAction {
    fn for_key(ch: char) -> Option<Self> {
        match ch {
            's' => Some(Self::AddSkill),
            'S' => Some(Self::RemoveSkill),
            'r' => Some(Self::AddRelationship),
            'R' => Some(Self::RemoveRelationship),
            _ => None,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::AddSkill => "add skill (name[:level])",
            Self::RemoveSkill => "remove skill",
            Self::AddRelationship => "add relationship (name[:upstream|downstream|shared])",
            Self::RemoveRelationship => "remove relationship",
        }
    }

    /// Adds accept `name:qualifier`; the qualifier defaults to intermediate
    /// for skills and shared for relationships.
    fn edit(self, text: &str) -> Result<InventoryEdit, String> {
        let text = text.trim();
        if text.is_empty() {
            return Err("name is required".to_owned());
        }
        let (name, qualifier) = match text.rsplit_once(':') {
            Some((name, qualifier)) => (name.trim().to_owned(), Some(qualifier.trim())),
            None => (text.to_owned(), None),
        };
        match self {
            Self::AddSkill => {
                let proficiency = match qualifier {
                    Some(level) => Proficiency::parse(level)
                        .ok_or_else(|| format!("unknown proficiency {level:?}"))?,
                    None => Proficiency::Intermediate,
                };
                Ok(InventoryEdit::AddSkill(Skill { name, proficiency }))
            }
            Self::AddRelationship => {
                let kind = match qualifier {
                    Some(kind) => RelationshipKind::parse(kind)
                        .ok_or_else(|| format!("unknown relationship kind {kind:?}"))?,
                    None => RelationshipKind::Shared,
                };
                Ok(InventoryEdit::AddRelationship(Relationship { name, kind }))
            }
            Self::RemoveSkill => Ok(InventoryEdit::RemoveSkill(text.to_owned())),
            Self::RemoveRelationship => Ok(InventoryEdit::RemoveRelationship(text.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InventoryPrompt {
    action: InventoryAction,
    app_id: String,
    buffer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResizeDrag {
    key: &'static str,
    original: u16,
    width: u16,
}

#[derive(Debug, Clone)]
struct FormUiState {
    form: MultiStepForm<FormPayload>,
    field_index: usize,
    editing: bool,
}

impl FormUiState {
    fn new(payload: FormPayload, editing: bool, last_ticket: SubmitTicket) -> Self {
        Self {
            form: MultiStepForm::new(payload).with_tickets_after(last_ticket),
            field_index: 0,
            editing,
        }
    }

    fn current_field(&self) -> Option<&'static str> {
        self.form
            .input()
            .fields()
            .get(self.field_index)
            .map(|field| field.key)
    }

    fn move_field(&mut self, delta: isize) {
        let len = self.form.input().fields().len() as isize;
        if len == 0 {
            return;
        }
        self.field_index = (self.field_index as isize + delta).rem_euclid(len) as usize;
    }
}

#[derive(Debug)]
struct ViewData {
    tables: Tables,
    flags: FlagStore,
    cursor: TableCursor,
    input: Option<FilterInput>,
    inventory_prompt: Option<InventoryPrompt>,
    resize: Option<ResizeDrag>,
    form: Option<FormUiState>,
    last_ticket: SubmitTicket,
    detached_saves: Vec<SubmitTicket>,
    flag_cursor: usize,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(dataset: Dataset, settings: &UiSettings) -> Self {
        Self {
            tables: Tables::new(dataset, settings.view_options),
            flags: FlagStore::new(settings.flags.iter().cloned()),
            cursor: TableCursor::default(),
            input: None,
            inventory_prompt: None,
            resize: None,
            form: None,
            last_ticket: SubmitTicket::new(0),
            detached_saves: Vec::new(),
            flag_cursor: 0,
            help_visible: false,
            status_token: 0,
        }
    }

    /// A save still running in the outgoing form is remembered so its
    /// outcome is reported once it arrives.
    fn replace_form(&mut self, form: Option<FormUiState>) {
        if let Some(ticket) = self.form.as_ref().and_then(|ui| ui.form.pending_ticket()) {
            self.detached_saves.push(ticket);
        }
        self.form = form;
    }
}

/// Outcome of a key press inside the form dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormKeyOutcome {
    Nothing,
    Status(String),
    Close,
    Submit,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    settings: &UiSettings,
) -> Result<()> {
    let mut view_data = ViewData::new(Dataset::default(), settings);
    let (internal_tx, internal_rx) = mpsc::channel();
    reload_tables(state, runtime, &mut view_data, &internal_tx);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::SaveFinished { ticket, outcome } => {
                handle_save_finished(state, runtime, view_data, tx, ticket, outcome);
            }
        }
    }
}

fn handle_save_finished<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    ticket: SubmitTicket,
    outcome: Result<(), SaveError>,
) {
    let saved = outcome.is_ok();
    let mut notes: Vec<Notification> = Vec::new();
    match view_data.form.as_mut() {
        Some(ui) if ui.form.pending_ticket() == Some(ticket) => {
            ui.form.finish_save(ticket, outcome, &mut notes);
        }
        _ => {
            let Some(index) = view_data
                .detached_saves
                .iter()
                .position(|detached| *detached == ticket)
            else {
                debug!(ticket = ticket.get(), "ignoring stale save outcome");
                return;
            };
            view_data.detached_saves.swap_remove(index);
            debug!(ticket = ticket.get(), "save finished after its form closed");
            match outcome {
                Ok(()) => notes.push(Notification::success("Saved", "")),
                Err(error) => notes.push(error.notification()),
            }
        }
    }
    if saved {
        reload_tables(state, runtime, view_data, tx);
    }
    emit_notifications(state, view_data, tx, &notes);
}

fn reload_tables<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let loaded = view_data.tables.load(runtime.fetch_dataset());
    clamp_table_cursor(state, view_data);
    if let Err(error) = loaded {
        warn!(%error, "table reload incomplete");
        emit_status(state, view_data, tx, error.to_string());
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_notifications(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notes: &[Notification],
) {
    for note in notes {
        if note.variant == NotificationVariant::Error {
            warn!(title = %note.title, description = %note.description, "error notification");
        }
        emit_status(state, view_data, internal_tx, note.summary());
    }
}

fn dispatch_and_sync(
    state: &mut AppState,
    view_data: &mut ViewData,
    command: AppCommand,
    internal_tx: &Sender<InternalEvent>,
) {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            AppEvent::ViewChanged(kind) => {
                debug!(view = kind.label(), "view changed");
                view_data.cursor = TableCursor::default();
                view_data.input = None;
                cancel_resize(state, view_data);
            }
            AppEvent::DialogChanged(dialog) => open_dialog_ui(state, view_data, internal_tx, dialog),
            AppEvent::FlagsPanelChanged(_) => view_data.flag_cursor = 0,
            AppEvent::StatusUpdated(_) | AppEvent::StatusCleared => {}
        }
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn open_dialog_ui(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    dialog: &DialogState,
) {
    match dialog {
        DialogState::Closed | DialogState::Viewing(_) => view_data.replace_form(None),
        DialogState::Creating(kind) => {
            let ui = FormUiState::new(FormPayload::blank_for(*kind), false, view_data.last_ticket);
            view_data.replace_form(Some(ui));
        }
        DialogState::Editing(id) => match view_data.tables.resources.store().get(id) {
            Some(record) => {
                let payload = FormPayload::Resource(ResourceAllocationForm::from_record(record));
                let ui = FormUiState::new(payload, true, view_data.last_ticket);
                view_data.replace_form(Some(ui));
            }
            None => {
                state.dispatch(AppCommand::CloseDialog);
                view_data.replace_form(None);
                emit_status(state, view_data, internal_tx, "row no longer present");
            }
        },
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.input.is_some() {
        handle_filter_input_key(state, view_data, internal_tx, key);
        return false;
    }

    if view_data.inventory_prompt.is_some() {
        handle_inventory_prompt_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if view_data.resize.is_some() {
        handle_resize_key(state, view_data, internal_tx, key);
        return false;
    }

    match state.dialog.clone() {
        DialogState::Creating(_) | DialogState::Editing(_) => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            return false;
        }
        DialogState::Viewing(id) => {
            handle_detail_key(state, view_data, internal_tx, key, id);
            return false;
        }
        DialogState::Closed => {}
    }

    if state.flags_panel == PanelVisibility::Visible {
        handle_flags_key(state, view_data, internal_tx, key);
        return false;
    }

    if handle_table_key(state, view_data, internal_tx, key) {
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Tab, _) | (KeyCode::Char('f'), KeyModifiers::NONE) => {
            dispatch_and_sync(state, view_data, AppCommand::NextView, internal_tx);
        }
        (KeyCode::BackTab, _) | (KeyCode::Char('b'), KeyModifiers::NONE) => {
            dispatch_and_sync(state, view_data, AppCommand::PrevView, internal_tx);
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row(state, view_data, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row(state, view_data, -1),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_column(state, view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_column(state, view_data, 1),
        (KeyCode::Char('/'), _) => {
            let buffer = view_data
                .tables
                .get(state.active_view)
                .filter()
                .global()
                .unwrap_or_default()
                .to_owned();
            view_data.input = Some(FilterInput {
                target: FilterTarget::Global,
                buffer,
            });
        }
        (KeyCode::Char('='), _) => match cursor_column(state, view_data) {
            Some(key) => {
                let buffer = view_data
                    .tables
                    .get(state.active_view)
                    .filter()
                    .column(key)
                    .unwrap_or_default()
                    .to_owned();
                view_data.input = Some(FilterInput {
                    target: FilterTarget::Column(key),
                    buffer,
                });
            }
            None => emit_status(state, view_data, internal_tx, "no column under cursor"),
        },
        (KeyCode::Char('r'), KeyModifiers::NONE) => begin_resize(state, view_data, internal_tx),
        (KeyCode::Char('i'), KeyModifiers::NONE) => {
            dispatch_and_sync(state, view_data, AppCommand::OpenCreate, internal_tx);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => match cursor_row_id(state, view_data) {
            Some(id) => dispatch_and_sync(state, view_data, AppCommand::OpenEdit(id), internal_tx),
            None => emit_status(state, view_data, internal_tx, "no row selected"),
        },
        (KeyCode::Enter, _) => match cursor_row_id(state, view_data) {
            Some(id) => dispatch_and_sync(state, view_data, AppCommand::OpenView(id), internal_tx),
            None => emit_status(state, view_data, internal_tx, "no row selected"),
        },
        (KeyCode::Char('F'), _) => {
            dispatch_and_sync(state, view_data, AppCommand::ToggleFlagsPanel, internal_tx);
        }
        (KeyCode::Char('?'), _) => view_data.help_visible = true,
        _ => {}
    }
    false
}

fn handle_table_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let column = cursor_column(state, view_data);
    let row = cursor_row_id(state, view_data);
    let page_size = view_data.tables.get(state.active_view).page().size();
    let Some(command) = table_command_for_key(key, column, row, page_size) else {
        return false;
    };
    apply_table_command(state, view_data, internal_tx, command);
    true
}

fn table_command_for_key(
    key: KeyEvent,
    column: Option<&'static str>,
    row: Option<String>,
    page_size: usize,
) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('n'), KeyModifiers::NONE) | (KeyCode::PageDown, _) => {
            Some(TableCommand::NextPage)
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) | (KeyCode::PageUp, _) => {
            Some(TableCommand::PreviousPage)
        }
        (KeyCode::Char('g'), _) => Some(TableCommand::FirstPage),
        (KeyCode::Char('G'), _) => Some(TableCommand::LastPage),
        (KeyCode::Char('s'), KeyModifiers::NONE) => column.map(TableCommand::ToggleSort),
        (KeyCode::Char('S'), _) => Some(TableCommand::ClearSort),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(TableCommand::ClearFilters),
        (KeyCode::Char(' '), _) => row.map(TableCommand::ToggleSelection),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(TableCommand::SelectAll),
        (KeyCode::Char('A'), _) => Some(TableCommand::ClearSelection),
        (KeyCode::Char('c'), KeyModifiers::NONE) => column.map(TableCommand::HideColumn),
        (KeyCode::Char('C'), _) => Some(TableCommand::ShowAllColumns),
        (KeyCode::Char('+'), _) => Some(TableCommand::SetPageSize(page_size + PAGE_SIZE_STEP)),
        (KeyCode::Char('-'), _) => Some(TableCommand::SetPageSize(
            page_size.saturating_sub(PAGE_SIZE_STEP),
        )),
        (KeyCode::Char('<'), _) => column.map(|key| TableCommand::ResizeColumn {
            key,
            delta: -KEYBOARD_RESIZE_STEP,
        }),
        (KeyCode::Char('>'), _) => column.map(|key| TableCommand::ResizeColumn {
            key,
            delta: KEYBOARD_RESIZE_STEP,
        }),
        _ => None,
    }
}

fn apply_table_command(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: TableCommand,
) {
    let kind = state.active_view;
    debug!(view = kind.label(), ?command, "table command");
    let status = view_data.tables.get_mut(kind).apply(command);
    if matches!(
        status,
        TableStatus::PageChanged { .. } | TableStatus::FilterUpdated { .. }
    ) {
        view_data.cursor.row = 0;
    }
    clamp_table_cursor(state, view_data);
    emit_status(state, view_data, internal_tx, status.message());
}

fn handle_filter_input_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(input) = view_data.input.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.input = None,
        KeyCode::Backspace => {
            input.buffer.pop();
        }
        KeyCode::Enter => {
            let command = match input.target {
                FilterTarget::Global => TableCommand::SetGlobalFilter(input.buffer.clone()),
                FilterTarget::Column(key) => TableCommand::SetColumnFilter {
                    key,
                    value: input.buffer.clone(),
                },
            };
            view_data.input = None;
            apply_table_command(state, view_data, internal_tx, command);
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.push(ch);
        }
        _ => {}
    }
}

fn begin_resize(state: &mut AppState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    let Some(key) = cursor_column(state, view_data) else {
        emit_status(state, view_data, tx, "no column under cursor");
        return;
    };
    let table = view_data.tables.get_mut(state.active_view);
    let Some(width) = table.layout().width(key) else {
        return;
    };
    if !table.layout_mut().begin_resize(key) {
        return;
    }
    view_data.resize = Some(ResizeDrag {
        key,
        original: width,
        width,
    });
    emit_status(
        state,
        view_data,
        tx,
        format!("resize {key}: h/l to drag, enter to finish"),
    );
}

fn handle_resize_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(drag) = view_data.resize else {
        return;
    };
    let kind = state.active_view;
    match key.code {
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('<') => {
            drag_resize(view_data, kind, drag, -1);
        }
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('>') => {
            drag_resize(view_data, kind, drag, 1);
        }
        KeyCode::Enter => {
            view_data.resize = None;
            view_data.tables.get_mut(kind).layout_mut().end_resize();
            let width = view_data
                .tables
                .get(kind)
                .layout()
                .width(drag.key)
                .unwrap_or(drag.width);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{} width {width}", drag.key),
            );
        }
        KeyCode::Esc => {
            cancel_resize(state, view_data);
            emit_status(state, view_data, internal_tx, "resize canceled");
        }
        _ => {}
    }
}

/// Intermediate widths apply live in `OnChange` mode and only on release in
/// `OnEnd` mode; the controller decides.
fn drag_resize(view_data: &mut ViewData, kind: ViewKind, drag: ResizeDrag, delta: i32) {
    let next = (i32::from(drag.width) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    let width = find_column(columns_for(kind), drag.key)
        .map(|column| column.clamp_width(next))
        .unwrap_or(next);
    view_data.tables.get_mut(kind).layout_mut().drag_to(width);
    view_data.resize = Some(ResizeDrag { width, ..drag });
}

fn cancel_resize(state: &AppState, view_data: &mut ViewData) {
    let Some(drag) = view_data.resize.take() else {
        return;
    };
    let layout = view_data.tables.get_mut(state.active_view).layout_mut();
    layout.drag_to(drag.original);
    layout.end_resize();
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let outcome = match view_data.form.as_mut() {
        Some(ui) => form_key_outcome(ui, key),
        None => FormKeyOutcome::Close,
    };
    match outcome {
        FormKeyOutcome::Nothing => {}
        FormKeyOutcome::Status(message) => emit_status(state, view_data, internal_tx, message),
        FormKeyOutcome::Close => {
            dispatch_and_sync(state, view_data, AppCommand::CloseDialog, internal_tx);
        }
        FormKeyOutcome::Submit => submit_form(state, runtime, view_data, internal_tx),
    }
}

fn form_key_outcome(ui: &mut FormUiState, key: KeyEvent) -> FormKeyOutcome {
    match ui.form.step() {
        FormStep::Entry => match key.code {
            KeyCode::Esc => FormKeyOutcome::Close,
            KeyCode::Tab | KeyCode::Down => {
                ui.move_field(1);
                FormKeyOutcome::Nothing
            }
            KeyCode::BackTab | KeyCode::Up => {
                ui.move_field(-1);
                FormKeyOutcome::Nothing
            }
            KeyCode::Backspace => {
                edit_current_field(ui, |value| {
                    value.pop();
                });
                FormKeyOutcome::Nothing
            }
            KeyCode::Enter => match ui.form.review() {
                Ok(()) => FormKeyOutcome::Status("review: enter to save, e to edit".to_owned()),
                Err(FormStepError::Invalid(errors)) => {
                    if let Some(first) = errors.errors().first()
                        && let Some(index) = ui
                            .form
                            .input()
                            .fields()
                            .iter()
                            .position(|field| field.key == first.field)
                    {
                        ui.field_index = index;
                    }
                    FormKeyOutcome::Status(format!("form invalid: {errors}"))
                }
                Err(error) => FormKeyOutcome::Status(error.to_string()),
            },
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                edit_current_field(ui, |value| value.push(ch));
                FormKeyOutcome::Nothing
            }
            _ => FormKeyOutcome::Nothing,
        },
        FormStep::Review => match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => FormKeyOutcome::Submit,
            (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
                FormKeyOutcome::Submit
            }
            (KeyCode::Char('e'), _) | (KeyCode::Backspace, _) => match ui.form.back_to_edit() {
                Ok(()) => FormKeyOutcome::Nothing,
                Err(error) => FormKeyOutcome::Status(error.to_string()),
            },
            (KeyCode::Esc, _) => FormKeyOutcome::Close,
            _ => FormKeyOutcome::Nothing,
        },
        FormStep::Complete => match key.code {
            KeyCode::Char('a') if !ui.editing => match ui.form.add_more() {
                Ok(()) => {
                    ui.field_index = 0;
                    FormKeyOutcome::Status("form reset".to_owned())
                }
                Err(error) => FormKeyOutcome::Status(error.to_string()),
            },
            KeyCode::Esc | KeyCode::Enter => FormKeyOutcome::Close,
            _ => FormKeyOutcome::Nothing,
        },
    }
}

fn edit_current_field(ui: &mut FormUiState, edit: impl FnOnce(&mut String)) {
    let Some(key) = ui.current_field() else {
        return;
    };
    if let Some(input) = ui.form.input_mut()
        && let Some(value) = input.value_mut(key)
    {
        edit(value);
    }
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(ui) = view_data.form.as_mut() else {
        return;
    };
    let payload = ui.form.input().clone();
    let ticket = match ui.form.begin_save() {
        Ok(ticket) => ticket,
        Err(error) => {
            emit_status(state, view_data, internal_tx, error.to_string());
            return;
        }
    };
    view_data.last_ticket = ticket;
    info!(form = payload.kind().title(), ticket = ticket.get(), "submitting form");
    if let Err(error) = runtime.spawn_submit(ticket, payload, internal_tx.clone()) {
        let mut notes: Vec<Notification> = Vec::new();
        if let Some(ui) = view_data.form.as_mut() {
            ui.form
                .finish_save(ticket, Err(SaveError::from(error)), &mut notes);
        }
        emit_notifications(state, view_data, internal_tx, &notes);
        return;
    }
    emit_status(state, view_data, internal_tx, "saving...");
}

fn handle_detail_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    id: String,
) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            dispatch_and_sync(state, view_data, AppCommand::CloseDialog, internal_tx);
        }
        KeyCode::Char('e') if state.active_view.supports_edit() => {
            dispatch_and_sync(state, view_data, AppCommand::CloseDialog, internal_tx);
            dispatch_and_sync(state, view_data, AppCommand::OpenEdit(id), internal_tx);
        }
        KeyCode::Char(ch) if state.active_view == ViewKind::Applications => {
            if let Some(action) = InventoryAction::for_key(ch) {
                view_data.inventory_prompt = Some(InventoryPrompt {
                    action,
                    app_id: id,
                    buffer: String::new(),
                });
            }
        }
        _ => {}
    }
}

fn handle_inventory_prompt_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(prompt) = view_data.inventory_prompt.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => view_data.inventory_prompt = None,
        KeyCode::Backspace => {
            prompt.buffer.pop();
        }
        KeyCode::Enter => {
            if let Some(prompt) = view_data.inventory_prompt.take() {
                apply_inventory_prompt(state, runtime, view_data, internal_tx, prompt);
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.buffer.push(ch);
        }
        _ => {}
    }
}

/// Duplicates are refused locally; accepted edits are persisted and the
/// tables reloaded.
fn apply_inventory_prompt<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    prompt: InventoryPrompt,
) {
    let edit = match prompt.action.edit(&prompt.buffer) {
        Ok(edit) => edit,
        Err(message) => {
            emit_status(state, view_data, internal_tx, message);
            return;
        }
    };
    let Some(mut app) = view_data
        .tables
        .applications
        .store()
        .get(&prompt.app_id)
        .cloned()
    else {
        emit_status(state, view_data, internal_tx, "row no longer present");
        return;
    };

    let mut notes: Vec<Notification> = Vec::new();
    match edit.apply(&mut app, &mut notes) {
        Ok(true) => match runtime.save_application(&app) {
            Ok(()) => {
                info!(app = %app.id, "inventory updated");
                reload_tables(state, runtime, view_data, internal_tx);
            }
            Err(error) => {
                warn!(app = %app.id, %error, "inventory update rejected");
                notes = vec![error.notification()];
            }
        },
        Ok(false) => notes.push(Notification::info(
            "Nothing removed",
            format!("{} is not listed.", prompt.buffer.trim()),
        )),
        Err(error) => debug!(%error, "inventory edit refused"),
    }
    emit_notifications(state, view_data, internal_tx, &notes);
}

fn handle_flags_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let count = view_data.flags.len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('F') => {
            dispatch_and_sync(state, view_data, AppCommand::ToggleFlagsPanel, internal_tx);
        }
        KeyCode::Char('j') | KeyCode::Down if count > 0 => {
            view_data.flag_cursor = (view_data.flag_cursor + 1) % count;
        }
        KeyCode::Char('k') | KeyCode::Up if count > 0 => {
            view_data.flag_cursor = (view_data.flag_cursor + count - 1) % count;
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let Some(name) = view_data
                .flags
                .entries()
                .nth(view_data.flag_cursor)
                .map(|(name, _)| name.to_owned())
            else {
                return;
            };
            let value = view_data.flags.toggle(&name);
            let label = if value { "on" } else { "off" };
            emit_status(state, view_data, internal_tx, format!("{name} {label}"));
        }
        _ => {}
    }
}

fn cursor_column(state: &AppState, view_data: &ViewData) -> Option<&'static str> {
    view_data
        .tables
        .get(state.active_view)
        .layout()
        .visible_columns()
        .get(view_data.cursor.column)
        .map(|column| column.key)
}

fn cursor_row_id(state: &AppState, view_data: &ViewData) -> Option<String> {
    view_data
        .tables
        .get(state.active_view)
        .page_rows()
        .into_iter()
        .nth(view_data.cursor.row)
        .map(|row| row.id)
}

fn move_row(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let rows = view_data.tables.get(state.active_view).page_rows().len();
    if rows == 0 {
        view_data.cursor.row = 0;
        return;
    }
    let next = (view_data.cursor.row as isize + delta).clamp(0, rows as isize - 1);
    view_data.cursor.row = next as usize;
}

fn move_column(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let columns = view_data
        .tables
        .get(state.active_view)
        .layout()
        .visible_columns()
        .len();
    if columns == 0 {
        view_data.cursor.column = 0;
        return;
    }
    let next = (view_data.cursor.column as isize + delta).clamp(0, columns as isize - 1);
    view_data.cursor.column = next as usize;
}

fn clamp_table_cursor(state: &AppState, view_data: &mut ViewData) {
    let table = view_data.tables.get(state.active_view);
    let rows = table.page_rows().len();
    let columns = table.layout().visible_columns().len();
    view_data.cursor.row = view_data.cursor.row.min(rows.saturating_sub(1));
    view_data.cursor.column = view_data.cursor.column.min(columns.saturating_sub(1));
}

fn tone_color(tone: BadgeTone) -> Color {
    match tone {
        BadgeTone::Neutral => Color::Gray,
        BadgeTone::Info => Color::Cyan,
        BadgeTone::Success => Color::Green,
        BadgeTone::Warning => Color::Yellow,
        BadgeTone::Danger => Color::Red,
    }
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Status(badge) => format!("{} {}", badge.icon.glyph(), badge.label),
        other => other.display(),
    }
}

fn header_label(table: &dyn TableSurface, key: &str, label: &str) -> String {
    let mut header = label.to_owned();
    if let Some(spec) = table.sort()
        && spec.column == key
    {
        header.push(' ');
        header.push_str(match spec.direction {
            SortDirection::Asc => SORT_MARK_ASC,
            SortDirection::Desc => SORT_MARK_DESC,
        });
    }
    if table.filter().column(key).is_some() {
        header.push_str(FILTER_MARK);
    }
    header
}

fn table_title(kind: ViewKind, table: &dyn TableSurface) -> String {
    let mut parts = vec![
        kind.label().to_owned(),
        format!(
            "page {}/{}",
            table.page().index() + 1,
            table.page_count()
        ),
        format!("{} of {} rows", table.filtered_count(), table.total_count()),
    ];
    if table.selected_count() > 0 {
        parts.push(format!("{} selected", table.selected_count()));
    }
    if let Some(global) = table.filter().global() {
        parts.push(format!("search: {global}"));
    }
    let columns: Vec<String> = table
        .filter()
        .active_columns()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !columns.is_empty() {
        parts.push(format!("filters: {}", columns.join(", ")));
    }
    parts.join(" | ")
}

fn tab_title(kind: ViewKind, view_data: &ViewData) -> String {
    format!(
        "{} {}",
        kind.label(),
        view_data.tables.get(kind).filtered_count()
    )
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|kind| *kind == state.active_view)
        .unwrap_or(0);
    let titles = ViewKind::ALL
        .iter()
        .map(|kind| tab_title(*kind, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("appdash").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    match &state.dialog {
        DialogState::Creating(_) | DialogState::Editing(_) => {
            if let Some(ui) = &view_data.form {
                let area = centered_rect(60, 60, frame.area());
                frame.render_widget(Clear, area);
                let title = ui.form.input().kind().title();
                let form = Paragraph::new(render_form_text(ui)).block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
                frame.render_widget(form, area);
            }
        }
        DialogState::Viewing(id) => {
            let area = centered_rect(64, 60, frame.area());
            frame.render_widget(Clear, area);
            let detail = Paragraph::new(render_detail_text(state.active_view, view_data, id))
                .block(Block::default().title(id.as_str()).borders(Borders::ALL));
            frame.render_widget(detail, area);
        }
        DialogState::Closed => {}
    }

    if state.flags_panel == PanelVisibility::Visible {
        let area = centered_rect(40, 40, frame.area());
        frame.render_widget(Clear, area);
        let flags = Paragraph::new(render_flags_text(view_data))
            .block(Block::default().title("feature flags").borders(Borders::ALL));
        frame.render_widget(flags, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let kind = state.active_view;
    let table = view_data.tables.get(kind);
    let columns = table.layout().visible_columns();
    let show_selection = view_data.flags.get(FLAG_SELECTION_COLUMN);
    let show_numbers = view_data.flags.get(FLAG_ROW_NUMBERS);
    let first_row_number = table.page().index() * table.page().size();

    let mut widths = Vec::with_capacity(columns.len() + 2);
    let mut header_cells = Vec::with_capacity(columns.len() + 2);
    if show_selection {
        widths.push(Constraint::Length(3));
        header_cells.push(Cell::from(""));
    }
    if show_numbers {
        widths.push(Constraint::Length(4));
        header_cells.push(Cell::from("#"));
    }
    for (index, column) in columns.iter().enumerate() {
        let width = table.layout().width(column.key).unwrap_or(column.default_width);
        widths.push(Constraint::Length(width));
        let mut style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        if index == view_data.cursor.column {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        header_cells.push(Cell::from(header_label(table, column.key, column.label)).style(style));
    }

    let rows = table
        .page_rows()
        .into_iter()
        .enumerate()
        .map(|(row_index, row)| {
            let cursor_row = row_index == view_data.cursor.row;
            let mut cells = Vec::with_capacity(row.cells.len() + 2);
            if show_selection {
                cells.push(Cell::from(if row.selected { "[x]" } else { "[ ]" }));
            }
            if show_numbers {
                cells.push(Cell::from((first_row_number + row_index + 1).to_string()));
            }
            for (column_index, value) in row.cells.iter().enumerate() {
                let mut style = match value {
                    CellValue::Status(badge) => Style::default().fg(tone_color(badge.tone)),
                    _ => Style::default(),
                };
                if row.selected {
                    style = style.add_modifier(Modifier::BOLD);
                }
                if cursor_row {
                    style = style.bg(Color::DarkGray);
                }
                if cursor_row && column_index == view_data.cursor.column {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                cells.push(Cell::from(cell_text(value)).style(style));
            }
            Row::new(cells)
        });

    let widget = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(kind, table))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn render_form_text(ui: &FormUiState) -> String {
    let step = ui.form.step();
    let mut lines = vec![format!("step: {}", step.label()), String::new()];
    let payload = ui.form.input();
    for (index, field) in payload.fields().iter().enumerate() {
        let marker = if step == FormStep::Entry && index == ui.field_index {
            ">"
        } else {
            " "
        };
        let required = if field.required { "*" } else { "" };
        let value = payload.value(field.key).unwrap_or_default();
        lines.push(format!("{marker} {}{required}: {value}", field.label));
        if let Some(error) = ui.form.field_error(field.key) {
            lines.push(format!("    {error}"));
        }
    }
    lines.push(String::new());
    lines.push(
        match step {
            FormStep::Entry => "tab/shift+tab field | enter review | esc cancel",
            FormStep::Review if ui.form.is_submitting() => "saving...",
            FormStep::Review => "enter save | e edit | esc cancel",
            FormStep::Complete if ui.editing => "saved | enter close",
            FormStep::Complete => "saved | a add another | enter close",
        }
        .to_owned(),
    );
    lines.join("\n")
}

fn render_detail_text(kind: ViewKind, view_data: &ViewData, id: &str) -> String {
    let Some(fields) = view_data.tables.get(kind).detail(id) else {
        return "row no longer present".to_owned();
    };
    let mut lines: Vec<String> = fields
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect();
    if kind == ViewKind::Applications
        && let Some(app) = view_data.tables.applications.store().get(id)
    {
        lines.extend(application_detail_lines(app));
    }
    if kind.supports_edit() {
        lines.push(String::new());
        lines.push("e edit | esc close".to_owned());
    } else if kind == ViewKind::Applications {
        lines.push(String::new());
        lines.push("s/S add/remove skill | r/R add/remove relationship | esc close".to_owned());
    }
    lines.join("\n")
}

fn application_detail_lines(app: &ApplicationDetail) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "support alignment".to_owned(),
        format!("  business unit: {}", app.alignment.business_unit),
        format!("  escalation: {}", app.alignment.escalation_contact),
    ];
    if !app.relationships.is_empty() {
        lines.push("relationships".to_owned());
        lines.extend(
            app.relationships
                .iter()
                .map(|relationship| {
                    format!("  {} ({})", relationship.name, relationship.kind.label())
                }),
        );
    }
    if !app.team_skills.is_empty() {
        lines.push("team skills".to_owned());
        lines.extend(
            app.team_skills
                .iter()
                .map(|skill| format!("  {} ({})", skill.name, skill.proficiency.label())),
        );
    }
    lines
}

fn render_flags_text(view_data: &ViewData) -> String {
    let mut lines: Vec<String> = view_data
        .flags
        .entries()
        .enumerate()
        .map(|(index, (name, value))| {
            let marker = if index == view_data.flag_cursor { ">" } else { " " };
            let check = if value { "[x]" } else { "[ ]" };
            format!("{marker} {check} {name}")
        })
        .collect();
    if lines.is_empty() {
        lines.push("no flags configured".to_owned());
    }
    lines.push(String::new());
    lines.push("j/k move | space toggle | esc close".to_owned());
    lines.join("\n")
}

fn help_overlay_text() -> &'static str {
    "tab/f b          next/previous view\n\
     j/k h/l          move row/column\n\
     n/p g/G          next/previous/first/last page\n\
     +/-              page size\n\
     s S              cycle sort / clear sort\n\
     / = x            search / column filter / clear filters\n\
     space a A        toggle / select all / clear selection\n\
     c C              hide column / show all\n\
     < > r            resize column / drag resize\n\
     enter i e        view / new / edit\n\
     s S r R          in app detail: add/remove skill, relationship\n\
     F                feature flags\n\
     q ctrl+q         quit"
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(input) = &view_data.input {
        let prompt = match input.target {
            FilterTarget::Global => "search".to_owned(),
            FilterTarget::Column(key) => format!("filter {key}"),
        };
        return format!("{prompt}: {}_", input.buffer);
    }
    if let Some(prompt) = &view_data.inventory_prompt {
        return format!("{}: {}_", prompt.action.prompt(), prompt.buffer);
    }
    if let Some(drag) = view_data.resize {
        return format!("resize {}: {} (enter done, esc cancel)", drag.key, drag.width);
    }
    let default = "tab views | s sort | / search | = filter | space select | i new | ? help";
    match &state.status_line {
        Some(status) => format!("{status} | {default}"),
        None => default.to_owned(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, FLAG_ROW_NUMBERS, InternalEvent, UiSettings, ViewData, handle_key_event,
        process_internal_events, reload_tables, render_detail_text, render_flags_text,
        render_form_text, status_text, table_command_for_key,
    };
    use appdash_app::{
        AppState, ApplicationDetail, Dataset, DialogState, FormPayload, FormStep, PanelVisibility,
        Proficiency, SaveError, ViewKind,
    };
    use appdash_table::{SortDirection, TableCommand};
    use appdash_testkit::{demo_dataset, fixture_date};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::mpsc;

    #[derive(Debug, Default)]
    struct TestRuntime {
        dataset: Dataset,
        submitted: Vec<FormPayload>,
        application_saves: usize,
        fail_with: Option<SaveError>,
        fail_load: bool,
    }

    impl AppRuntime for TestRuntime {
        fn load_dataset(&mut self) -> anyhow::Result<Dataset> {
            if self.fail_load {
                anyhow::bail!("dataset file vanished");
            }
            Ok(self.dataset.clone())
        }

        fn save_application(&mut self, app: &ApplicationDetail) -> Result<(), SaveError> {
            self.dataset.replace_application(app.clone())?;
            self.application_saves += 1;
            Ok(())
        }

        fn submit_form(&mut self, payload: &FormPayload) -> Result<(), SaveError> {
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            self.dataset.apply_form(payload, fixture_date())?;
            self.submitted.push(payload.clone());
            Ok(())
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new() -> Self {
            let runtime = TestRuntime {
                dataset: demo_dataset(),
                ..TestRuntime::default()
            };
            let view_data = ViewData::new(runtime.dataset.clone(), &UiSettings::default());
            let (tx, rx) = mpsc::channel();
            Self {
                state: AppState::default(),
                runtime,
                view_data,
                tx,
                rx,
            }
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            )
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn pump(&mut self) {
            process_internal_events(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                &self.rx,
            );
        }

        fn status(&self) -> String {
            self.state.status_line.clone().unwrap_or_default()
        }
    }

    #[test]
    fn tab_cycles_views_and_q_quits() {
        let mut harness = Harness::new();
        assert!(!harness.press(KeyCode::Tab));
        assert_eq!(harness.state.active_view, ViewKind::Resources);
        harness.press(KeyCode::BackTab);
        assert_eq!(harness.state.active_view, ViewKind::CapacityExceptions);
        assert!(harness.press(KeyCode::Char('q')));
        assert!(harness.press_with(KeyCode::Char('q'), KeyModifiers::CONTROL));
    }

    #[test]
    fn column_filter_prompt_narrows_rows() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('l'));
        harness.press(KeyCode::Char('='));
        harness.type_text("538");
        assert_eq!(
            status_text(&harness.state, &harness.view_data),
            "filter appId: 538_"
        );
        harness.press(KeyCode::Enter);

        assert_eq!(harness.view_data.tables.exceptions.filtered_count(), 2);
        assert_eq!(harness.status().split(" | ").next(), Some("filter: 2 matching"));
    }

    #[test]
    fn global_search_escape_discards_input() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('/'));
        harness.type_text("ledger");
        harness.press(KeyCode::Esc);
        assert!(harness.view_data.input.is_none());
        assert!(!harness.view_data.tables.exceptions.filter().is_active());
    }

    #[test]
    fn selection_key_survives_sort_key() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char(' '));
        assert!(harness.view_data.tables.exceptions.is_selected("EMEA001"));
        for _ in 0..5 {
            harness.press(KeyCode::Char('l'));
        }
        harness.press(KeyCode::Char('s'));
        harness.press(KeyCode::Char('s'));
        assert_eq!(
            harness
                .view_data
                .tables
                .exceptions
                .sort()
                .map(|spec| (spec.column, spec.direction)),
            Some(("firstReported", SortDirection::Desc))
        );
        assert!(harness.view_data.tables.exceptions.is_selected("EMEA001"));
    }

    #[test]
    fn paging_keys_move_between_pages() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.view_data.tables.exceptions.page().index(), 1);
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.status().split(" | ").next(), Some("no more pages"));
        harness.press(KeyCode::Char('g'));
        assert_eq!(harness.view_data.tables.exceptions.page().index(), 0);
    }

    #[test]
    fn key_mapping_needs_a_cursor_column_for_sort() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(table_command_for_key(key, None, None, 10), None);
        assert_eq!(
            table_command_for_key(key, Some("status"), None, 10),
            Some(TableCommand::ToggleSort("status"))
        );
        let shrink = KeyEvent::new(KeyCode::Char('-'), KeyModifiers::NONE);
        assert_eq!(
            table_command_for_key(shrink, None, None, 5),
            Some(TableCommand::SetPageSize(0))
        );
    }

    #[test]
    fn resize_drag_commits_on_enter() {
        let mut harness = Harness::new();
        let before = harness
            .view_data
            .tables
            .exceptions
            .layout()
            .width("id")
            .unwrap_or_default();
        harness.press(KeyCode::Char('r'));
        harness.press(KeyCode::Char('l'));
        harness.press(KeyCode::Char('l'));
        harness.press(KeyCode::Enter);
        assert!(harness.view_data.resize.is_none());
        assert_eq!(
            harness.view_data.tables.exceptions.layout().width("id"),
            Some(before + 2)
        );
    }

    #[test]
    fn resource_form_blocks_review_until_id_given() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Char('i'));
        assert!(matches!(harness.state.dialog, DialogState::Creating(_)));

        harness.press(KeyCode::Tab);
        harness.type_text("Lena Ortiz");
        harness.press(KeyCode::Tab);
        harness.type_text("SRE");
        harness.press(KeyCode::Tab);
        harness.type_text("538");
        harness.press(KeyCode::Tab);
        harness.type_text("40");
        harness.press(KeyCode::Enter);

        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(ui.form.step(), FormStep::Entry);
        assert_eq!(ui.field_index, 0);
        assert!(render_form_text(ui).contains("Resource ID is required."));
        assert!(harness.status().starts_with("form invalid"));
    }

    #[test]
    fn resource_form_saves_through_runtime() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Tab);
        let before = harness.view_data.tables.resources.total_count();
        harness.press(KeyCode::Char('i'));
        for value in ["R900", "Lena Ortiz", "SRE", "538", "40"] {
            harness.type_text(value);
            harness.press(KeyCode::Tab);
        }
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        assert!(harness.status().starts_with("a save is already in progress"));

        harness.pump();
        assert_eq!(harness.runtime.submitted.len(), 1);
        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(ui.form.step(), FormStep::Complete);
        assert_eq!(harness.view_data.tables.resources.total_count(), before + 1);
        assert!(harness.status().starts_with("Saved"));

        harness.press(KeyCode::Char('a'));
        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(ui.form.step(), FormStep::Entry);
        assert_eq!(ui.form.input().value("resource_id"), Some(""));
    }

    #[test]
    fn failed_save_keeps_review_and_reports_conflict() {
        let mut harness = Harness::new();
        harness.runtime.fail_with = Some(SaveError::name_exists("Lena Ortiz"));
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Char('i'));
        for value in ["R900", "Lena Ortiz", "SRE", "538", "40"] {
            harness.type_text(value);
            harness.press(KeyCode::Tab);
        }
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.pump();

        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(ui.form.step(), FormStep::Review);
        assert!(!ui.form.is_submitting());
        assert!(harness.status().contains("already exists"));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.dialog, DialogState::Closed);
    }

    #[test]
    fn closing_during_save_still_refreshes_table() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Tab);
        let before = harness.view_data.tables.resources.total_count();
        harness.press(KeyCode::Char('i'));
        for value in ["R901", "Noor Haddad", "DBA", "538", "20"] {
            harness.type_text(value);
            harness.press(KeyCode::Tab);
        }
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Enter);
        harness.press(KeyCode::Char('e'));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.dialog, DialogState::Closed);

        harness.pump();
        assert_eq!(harness.view_data.tables.resources.total_count(), before + 1);
        assert!(harness.status().starts_with("Saved"));
    }

    #[test]
    fn reopened_form_keeps_its_own_save_outcome() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Tab);
        let before = harness.view_data.tables.resources.total_count();
        for id in ["R901", "R902"] {
            harness.press(KeyCode::Char('i'));
            for value in [id, "Noor Haddad", "DBA", "538", "20"] {
                harness.type_text(value);
                harness.press(KeyCode::Tab);
            }
            harness.press(KeyCode::Enter);
            harness.press(KeyCode::Enter);
            if id == "R901" {
                harness.press(KeyCode::Esc);
                assert_eq!(harness.state.dialog, DialogState::Closed);
            }
        }

        harness.pump();
        assert_eq!(harness.runtime.submitted.len(), 1);
        assert_eq!(harness.view_data.tables.resources.total_count(), before + 1);
        let ui = harness.view_data.form.as_ref().expect("second form open");
        assert_eq!(ui.form.step(), FormStep::Review);
        assert!(!ui.form.is_submitting());
        assert!(harness.status().contains("already exists"));
        assert!(harness.view_data.detached_saves.is_empty());
    }

    #[test]
    fn application_detail_edits_inventory_through_the_runtime() {
        let mut harness = Harness::new();
        for _ in 0..3 {
            harness.press(KeyCode::Tab);
        }
        assert_eq!(harness.state.active_view, ViewKind::Applications);
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.dialog, DialogState::Viewing("538".to_owned()));

        harness.press(KeyCode::Char('s'));
        harness.type_text("rust");
        assert_eq!(
            status_text(&harness.state, &harness.view_data),
            "add skill (name[:level]): rust_"
        );
        harness.press(KeyCode::Enter);
        assert!(harness.status().starts_with("Duplicate skill"));
        assert_eq!(harness.runtime.application_saves, 0);

        harness.press(KeyCode::Char('s'));
        harness.type_text("Kafka:expert");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.runtime.application_saves, 1);
        let app = harness
            .view_data
            .tables
            .applications
            .store()
            .get("538")
            .expect("application row");
        assert!(
            app.team_skills
                .iter()
                .any(|skill| skill.name == "Kafka" && skill.proficiency == Proficiency::Expert)
        );

        harness.press(KeyCode::Char('R'));
        harness.type_text("payments gateway");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.runtime.application_saves, 2);
        assert_eq!(harness.runtime.dataset.applications[0].relationships.len(), 1);

        harness.press(KeyCode::Char('R'));
        harness.type_text("Billing");
        harness.press(KeyCode::Enter);
        assert_eq!(harness.runtime.application_saves, 2);
        assert!(harness.status().starts_with("Nothing removed"));
        assert_eq!(harness.state.dialog, DialogState::Viewing("538".to_owned()));
    }

    #[test]
    fn failed_reload_keeps_current_rows() {
        let mut harness = Harness::new();
        let before = harness.view_data.tables.exceptions.total_count();
        harness.runtime.fail_load = true;
        reload_tables(
            &mut harness.state,
            &mut harness.runtime,
            &mut harness.view_data,
            &harness.tx,
        );
        assert_eq!(harness.view_data.tables.exceptions.total_count(), before);
        assert!(harness.status().contains("dataset file vanished"));
    }

    #[test]
    fn edit_prefills_resource_form() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Tab);
        let first = harness.view_data.tables.resources.page_rows()[0].id.clone();
        harness.press(KeyCode::Char('e'));
        assert_eq!(harness.state.dialog, DialogState::Editing(first.to_string()));
        let ui = harness.view_data.form.as_ref().expect("form open");
        assert_eq!(ui.form.input().value("resource_id"), Some(first.as_str()));
    }

    #[test]
    fn enter_opens_detail_and_escape_closes() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Enter);
        assert_eq!(
            harness.state.dialog,
            DialogState::Viewing("EMEA001".to_owned())
        );
        let text = render_detail_text(ViewKind::CapacityExceptions, &harness.view_data, "EMEA001");
        assert!(text.contains("App Id: 538"));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.dialog, DialogState::Closed);
    }

    #[test]
    fn application_detail_lists_skills() {
        let harness = Harness::new();
        let text = render_detail_text(ViewKind::Applications, &harness.view_data, "538");
        assert!(text.contains("team skills"));
        assert!(text.contains("PostgreSQL"));
    }

    #[test]
    fn flags_panel_toggles_flags() {
        let mut harness = Harness::new();
        harness.press(KeyCode::Char('F'));
        assert_eq!(harness.state.flags_panel, PanelVisibility::Visible);
        assert!(!harness.view_data.flags.get(FLAG_ROW_NUMBERS));
        harness.press(KeyCode::Char(' '));
        assert!(harness.view_data.flags.get(FLAG_ROW_NUMBERS));
        assert!(render_flags_text(&harness.view_data).contains("> [x] row_numbers"));
        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.flags_panel, PanelVisibility::Hidden);
    }
}
