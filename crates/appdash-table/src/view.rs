// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::column::{ColumnChange, ColumnController, ColumnDescriptor, ResizeMode, find_column};
use crate::filter::FilterState;
use crate::page::{DEFAULT_PAGE_SIZE, PageState};
use crate::selection::SelectionTracker;
use crate::sort::{SortDirection, SortSpec, SortToggle, sort_indices, toggle_sort};
use crate::source::{FetchResult, SourceError};
use crate::store::{RowStore, TableRecord};
use serde::Deserialize;
use tracing::debug;

/// What happens to filter/sort/page/selection when the rows are replaced
/// wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    #[default]
    Reset,
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub page_size: usize,
    pub resize_mode: ResizeMode,
    pub refresh_policy: RefreshPolicy,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            resize_mode: ResizeMode::OnChange,
            refresh_policy: RefreshPolicy::Reset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    ToggleSort(&'static str),
    SortBy(&'static str, SortDirection),
    ClearSort,
    SetColumnFilter { key: &'static str, value: String },
    SetGlobalFilter(String),
    ClearFilters,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    GoToPage(usize),
    SetPageSize(usize),
    ToggleSelection(String),
    SelectAll,
    ClearSelection,
    HideColumn(&'static str),
    ToggleColumn(&'static str),
    ShowAllColumns,
    ResizeColumn { key: &'static str, delta: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortCleared,
    SortUnchanged,
    SortUnavailable,
    FilterUpdated { matches: usize },
    FilterUnchanged,
    FilterUnavailable,
    FiltersCleared,
    PageChanged { page: usize, pages: usize },
    PageUnavailable,
    PageSizeChanged(usize),
    PageSizeInvalid,
    Selected(String),
    Deselected(String),
    SelectionMissing,
    SelectedAll(usize),
    SelectionCleared,
    ColumnHidden(&'static str),
    ColumnShown(&'static str),
    KeepOneColumnVisible,
    ColumnsShown,
    ColumnResized { label: &'static str, width: u16 },
    ColumnUnchanged,
    ColumnUnavailable,
}

impl TableStatus {
    pub fn message(&self) -> String {
        match self {
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::SortCleared => "sort cleared".to_owned(),
            Self::SortUnchanged => "sort unchanged".to_owned(),
            Self::SortUnavailable => "sort unavailable".to_owned(),
            Self::FilterUpdated { matches } => format!("filter: {matches} matching"),
            Self::FilterUnchanged => "filter unchanged".to_owned(),
            Self::FilterUnavailable => "filter unavailable".to_owned(),
            Self::FiltersCleared => "filters cleared".to_owned(),
            Self::PageChanged { page, pages } => format!("page {page} of {pages}"),
            Self::PageUnavailable => "no more pages".to_owned(),
            Self::PageSizeChanged(size) => format!("{size} rows per page"),
            Self::PageSizeInvalid => "page size must be positive".to_owned(),
            Self::Selected(id) => format!("selected {id}"),
            Self::Deselected(id) => format!("deselected {id}"),
            Self::SelectionMissing => "row no longer present".to_owned(),
            Self::SelectedAll(count) => format!("{count} selected"),
            Self::SelectionCleared => "selection cleared".to_owned(),
            Self::ColumnHidden(label) => format!("column hidden: {label}"),
            Self::ColumnShown(label) => format!("column shown: {label}"),
            Self::KeepOneColumnVisible => "keep one column visible".to_owned(),
            Self::ColumnsShown => "all columns shown".to_owned(),
            Self::ColumnResized { label, width } => format!("{label} width {width}"),
            Self::ColumnUnchanged => "column unchanged".to_owned(),
            Self::ColumnUnavailable => "column unavailable".to_owned(),
        }
    }
}

/// Row Store → Filter → Sort → Paginate, plus selection and column layout.
/// The projection of ordered row indices is recomputed synchronously on every
/// state change.
#[derive(Debug)]
pub struct TableView<R> {
    columns: Vec<ColumnDescriptor>,
    store: RowStore<R>,
    filter: FilterState,
    sort: Option<SortSpec>,
    page: PageState,
    selection: SelectionTracker,
    layout: ColumnController,
    options: ViewOptions,
    projection: Vec<usize>,
}

impl<R: TableRecord> TableView<R> {
    pub fn new(columns: &[ColumnDescriptor], rows: Vec<R>, options: ViewOptions) -> Self {
        let mut view = Self {
            columns: columns.to_vec(),
            store: RowStore::new(rows),
            filter: FilterState::default(),
            sort: None,
            page: PageState::new(options.page_size),
            selection: SelectionTracker::default(),
            layout: ColumnController::new(columns, options.resize_mode),
            options,
            projection: Vec::new(),
        };
        view.recompute();
        view
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        find_column(&self.columns, key)
    }

    pub fn store(&self) -> &RowStore<R> {
        &self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn page(&self) -> PageState {
        self.page
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Exposed so a parent can subscribe to selection changes.
    pub fn selection_mut(&mut self) -> &mut SelectionTracker {
        &mut self.selection
    }

    pub fn layout(&self) -> &ColumnController {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnController {
        &mut self.layout
    }

    pub fn total_count(&self) -> usize {
        self.store.len()
    }

    pub fn filtered_count(&self) -> usize {
        self.projection.len()
    }

    pub fn page_count(&self) -> usize {
        self.page.page_count(self.filtered_count())
    }

    /// Every filtered row in sort order.
    pub fn rows(&self) -> Vec<&R> {
        self.projection
            .iter()
            .filter_map(|index| self.store.rows().get(*index))
            .collect()
    }

    /// Rows on the current page.
    pub fn page_rows(&self) -> Vec<&R> {
        self.page
            .slice(&self.projection)
            .iter()
            .filter_map(|index| self.store.rows().get(*index))
            .collect()
    }

    pub fn selected_records(&self) -> Vec<&R> {
        self.store
            .rows()
            .iter()
            .filter(|row| self.selection.is_selected(row.row_id()))
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.is_selected(id)
    }

    pub fn set_column_filter(&mut self, key: &str, value: &str) -> TableStatus {
        if !self.column(key).is_some_and(|column| column.filterable) {
            return TableStatus::FilterUnavailable;
        }
        if !self.filter.set_column(key, value) {
            return TableStatus::FilterUnchanged;
        }
        self.after_filter_change()
    }

    pub fn set_global_filter(&mut self, value: &str) -> TableStatus {
        if !self.filter.set_global(value) {
            return TableStatus::FilterUnchanged;
        }
        self.after_filter_change()
    }

    pub fn clear_filters(&mut self) -> TableStatus {
        if !self.filter.clear() {
            return TableStatus::FilterUnchanged;
        }
        self.page.reset();
        self.recompute();
        TableStatus::FiltersCleared
    }

    fn after_filter_change(&mut self) -> TableStatus {
        self.page.reset();
        self.recompute();
        TableStatus::FilterUpdated {
            matches: self.filtered_count(),
        }
    }

    pub fn toggle_sort(&mut self, key: &str) -> TableStatus {
        let (next, toggle) = toggle_sort(self.sort, &self.columns, key);
        self.sort = next;
        match toggle {
            SortToggle::Unavailable => TableStatus::SortUnavailable,
            SortToggle::Cleared => {
                self.recompute();
                TableStatus::SortCleared
            }
            SortToggle::Sorted(spec) => {
                self.recompute();
                self.sort_status(spec)
            }
        }
    }

    pub fn sort_by(&mut self, key: &str, direction: SortDirection) -> TableStatus {
        let Some(column) = self.column(key).filter(|column| column.sortable) else {
            return TableStatus::SortUnavailable;
        };
        let spec = SortSpec {
            column: column.key,
            direction,
        };
        self.sort = Some(spec);
        self.recompute();
        self.sort_status(spec)
    }

    pub fn clear_sort(&mut self) -> TableStatus {
        if self.sort.take().is_none() {
            return TableStatus::SortUnchanged;
        }
        self.recompute();
        TableStatus::SortCleared
    }

    fn sort_status(&self, spec: SortSpec) -> TableStatus {
        let label = self.column(spec.column).map_or(spec.column, |column| column.label);
        match spec.direction {
            SortDirection::Asc => TableStatus::SortAsc(label),
            SortDirection::Desc => TableStatus::SortDesc(label),
        }
    }

    pub fn next_page(&mut self) -> TableStatus {
        let moved = self.page.next(self.filtered_count());
        self.page_status(moved)
    }

    pub fn previous_page(&mut self) -> TableStatus {
        let moved = self.page.previous();
        self.page_status(moved)
    }

    pub fn go_to_page(&mut self, index: usize) -> TableStatus {
        let moved = self.page.go_to(index, self.filtered_count());
        self.page_status(moved)
    }

    pub fn first_page(&mut self) -> TableStatus {
        self.page.first();
        self.page_status(true)
    }

    pub fn last_page(&mut self) -> TableStatus {
        self.page.last(self.filtered_count());
        self.page_status(true)
    }

    pub fn set_page_size(&mut self, size: usize) -> TableStatus {
        if self.page.set_size(size, self.filtered_count()) {
            TableStatus::PageSizeChanged(size)
        } else {
            TableStatus::PageSizeInvalid
        }
    }

    fn page_status(&self, moved: bool) -> TableStatus {
        if !moved {
            return TableStatus::PageUnavailable;
        }
        TableStatus::PageChanged {
            page: self.page.index() + 1,
            pages: self.page_count(),
        }
    }

    /// Ids that are not in the store are ignored.
    pub fn toggle_selection(&mut self, id: &str) -> TableStatus {
        if !self.store.contains(id) {
            return TableStatus::SelectionMissing;
        }
        if self.selection.toggle(id) {
            TableStatus::Selected(id.to_owned())
        } else {
            TableStatus::Deselected(id.to_owned())
        }
    }

    /// Selects every row that passes the current filter, not only the page.
    pub fn select_all(&mut self) -> TableStatus {
        let ids: Vec<&str> = self
            .projection
            .iter()
            .filter_map(|index| self.store.rows().get(*index))
            .map(|row| row.row_id())
            .collect();
        self.selection.select_all(ids);
        TableStatus::SelectedAll(self.selection.len())
    }

    pub fn clear_selection(&mut self) -> TableStatus {
        self.selection.clear();
        TableStatus::SelectionCleared
    }

    pub fn hide_column(&mut self, key: &str) -> TableStatus {
        let change = self.layout.hide(key);
        self.column_status(key, change)
    }

    pub fn toggle_column(&mut self, key: &str) -> TableStatus {
        let change = self.layout.toggle_visibility(key);
        self.column_status(key, change)
    }

    pub fn resize_column(&mut self, key: &str, delta: i32) -> TableStatus {
        let change = self.layout.resize_by(key, delta);
        self.column_status(key, change)
    }

    fn column_status(&self, key: &str, change: ColumnChange) -> TableStatus {
        let Some(label) = self.column(key).map(|column| column.label) else {
            return TableStatus::ColumnUnavailable;
        };
        match change {
            ColumnChange::Hidden => TableStatus::ColumnHidden(label),
            ColumnChange::Shown => TableStatus::ColumnShown(label),
            ColumnChange::Resized(width) => TableStatus::ColumnResized { label, width },
            ColumnChange::KeepOneVisible => TableStatus::KeepOneColumnVisible,
            ColumnChange::Unchanged => TableStatus::ColumnUnchanged,
            ColumnChange::UnknownColumn => TableStatus::ColumnUnavailable,
        }
    }

    /// Refreshes from a fetch result. While the source is loading or has
    /// failed the current rows stay in place.
    pub fn load_source(&mut self, source: FetchResult<R>) -> Result<usize, SourceError> {
        let rows = source.into_rows()?;
        let count = rows.len();
        self.replace_rows(rows);
        Ok(count)
    }

    /// Wholesale refresh from the data source.
    pub fn replace_rows(&mut self, rows: Vec<R>) {
        self.store.replace_all(rows);
        match self.options.refresh_policy {
            RefreshPolicy::Reset => {
                self.filter.clear();
                self.sort = None;
                self.page = PageState::new(self.options.page_size);
                self.selection.clear();
            }
            RefreshPolicy::Preserve => {
                let store = &self.store;
                self.selection.retain(|id| store.contains(id));
            }
        }
        self.recompute();
    }

    pub fn update_row(&mut self, record: R) -> bool {
        let replaced = self.store.replace(record);
        if replaced {
            self.recompute();
        }
        replaced
    }

    pub fn insert_row(&mut self, record: R) -> bool {
        let inserted = self.store.insert(record);
        if inserted {
            self.recompute();
        }
        inserted
    }

    pub fn remove_row(&mut self, id: &str) -> Option<R> {
        let removed = self.store.remove(id)?;
        if self.selection.is_selected(id) {
            self.selection.toggle(id);
        }
        self.recompute();
        Some(removed)
    }

    pub fn apply(&mut self, command: TableCommand) -> TableStatus {
        match command {
            TableCommand::ToggleSort(key) => self.toggle_sort(key),
            TableCommand::SortBy(key, direction) => self.sort_by(key, direction),
            TableCommand::ClearSort => self.clear_sort(),
            TableCommand::SetColumnFilter { key, value } => self.set_column_filter(key, &value),
            TableCommand::SetGlobalFilter(value) => self.set_global_filter(&value),
            TableCommand::ClearFilters => self.clear_filters(),
            TableCommand::NextPage => self.next_page(),
            TableCommand::PreviousPage => self.previous_page(),
            TableCommand::FirstPage => self.first_page(),
            TableCommand::LastPage => self.last_page(),
            TableCommand::GoToPage(index) => self.go_to_page(index),
            TableCommand::SetPageSize(size) => self.set_page_size(size),
            TableCommand::ToggleSelection(id) => self.toggle_selection(&id),
            TableCommand::SelectAll => self.select_all(),
            TableCommand::ClearSelection => self.clear_selection(),
            TableCommand::HideColumn(key) => self.hide_column(key),
            TableCommand::ToggleColumn(key) => self.toggle_column(key),
            TableCommand::ShowAllColumns => {
                self.layout.show_all();
                TableStatus::ColumnsShown
            }
            TableCommand::ResizeColumn { key, delta } => self.resize_column(key, delta),
        }
    }

    fn recompute(&mut self) {
        let rows = self.store.rows();
        let mut projection = self.filter.apply(rows, &self.columns);
        sort_indices(rows, &mut projection, self.sort);
        self.projection = projection;
        self.page.clamp(self.projection.len());
        debug!(
            total = rows.len(),
            filtered = self.projection.len(),
            page = self.page.index(),
            "table projection recomputed"
        );
    }
}
