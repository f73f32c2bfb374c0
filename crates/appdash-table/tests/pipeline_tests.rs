// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use appdash_table::{
    CellValue, ColumnDescriptor, FetchResult, RefreshPolicy, SortDirection, SourceError,
    TableCommand, TableRecord, TableStatus, TableView, ViewOptions,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
struct Ticket {
    id: String,
    team: String,
    score: i64,
    note: String,
}

impl TableRecord for Ticket {
    fn row_id(&self) -> &str {
        &self.id
    }

    fn cell(&self, key: &str) -> CellValue {
        match key {
            "id" => CellValue::text(self.id.clone()),
            "team" => CellValue::text(self.team.clone()),
            "score" => CellValue::Integer(self.score),
            "note" => CellValue::text(self.note.clone()),
            _ => CellValue::Empty,
        }
    }
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "ID"),
        ColumnDescriptor::new("team", "Team"),
        ColumnDescriptor::new("score", "Score"),
        ColumnDescriptor::new("note", "Note").unsortable().unfilterable(),
    ]
}

fn tickets(count: usize) -> Vec<Ticket> {
    let teams = ["Platform", "Payments", "Identity"];
    (0..count)
        .map(|index| Ticket {
            id: format!("T{index:03}"),
            team: teams[index % teams.len()].to_owned(),
            score: (count - index) as i64 * 7 % 23,
            note: format!("note {index}"),
        })
        .collect()
}

fn ids(rows: &[&Ticket]) -> Vec<String> {
    rows.iter().map(|row| row.id.clone()).collect()
}

fn view(count: usize) -> TableView<Ticket> {
    TableView::new(&columns(), tickets(count), ViewOptions::default())
}

#[test]
fn adding_filters_never_grows_the_result() {
    let mut view = view(30);
    let unfiltered = view.filtered_count();

    view.set_global_filter("p");
    let global_only = view.filtered_count();
    assert!(global_only <= unfiltered);

    view.set_column_filter("team", "pay");
    let with_team = view.filtered_count();
    assert!(with_team <= global_only);

    view.set_column_filter("id", "T01");
    assert!(view.filtered_count() <= with_team);
}

#[test]
fn column_filter_is_case_insensitive_and_empty_clears() {
    let mut view = view(9);
    let status = view.set_column_filter("team", "PLATFORM");
    assert_eq!(status, TableStatus::FilterUpdated { matches: 3 });
    assert!(view.rows().iter().all(|row| row.team == "Platform"));

    view.set_column_filter("team", "   ");
    assert_eq!(view.filtered_count(), 9);
    assert!(!view.filter().is_active());
}

#[test]
fn global_filter_skips_unfilterable_columns() {
    let mut view = view(9);
    view.set_global_filter("note");
    assert_eq!(view.filtered_count(), 0);
    assert_eq!(
        view.set_column_filter("note", "note 1"),
        TableStatus::FilterUnavailable
    );
}

#[test]
fn descending_reverses_ascending_for_distinct_keys() {
    let mut view = view(12);
    view.sort_by("id", SortDirection::Asc);
    let ascending = ids(&view.rows());
    view.sort_by("id", SortDirection::Desc);
    let mut descending = ids(&view.rows());
    descending.reverse();
    assert_eq!(ascending, descending);
}

#[test]
fn ties_keep_original_order() {
    let mut view = view(9);
    view.sort_by("team", SortDirection::Asc);
    let identity: Vec<String> = view
        .rows()
        .iter()
        .filter(|row| row.team == "Identity")
        .map(|row| row.id.clone())
        .collect();
    assert_eq!(identity, vec!["T002", "T005", "T008"]);
}

#[test]
fn toggle_cycles_to_unsorted_insertion_order() {
    let mut view = view(6);
    let original = ids(&view.rows());
    assert_eq!(view.toggle_sort("score"), TableStatus::SortAsc("Score"));
    assert_eq!(view.toggle_sort("score"), TableStatus::SortDesc("Score"));
    assert_eq!(view.toggle_sort("score"), TableStatus::SortCleared);
    assert_eq!(ids(&view.rows()), original);
    assert_eq!(view.toggle_sort("note"), TableStatus::SortUnavailable);
}

#[test]
fn thirteen_rows_paginate_ten_then_three() {
    let mut view = view(13);
    assert_eq!(view.page_rows().len(), 10);
    assert_eq!(
        view.next_page(),
        TableStatus::PageChanged { page: 2, pages: 2 }
    );
    assert_eq!(view.page_rows().len(), 3);
    assert_eq!(view.go_to_page(2), TableStatus::PageUnavailable);
    assert_eq!(view.page().index(), 1);
    assert_eq!(view.next_page(), TableStatus::PageUnavailable);
}

#[test]
fn filter_change_resets_to_first_page() {
    let mut view = view(25);
    view.go_to_page(2);
    view.set_column_filter("team", "id");
    assert_eq!(view.page().index(), 0);
}

#[test]
fn page_is_clamped_when_rows_shrink() {
    let mut view = view(25);
    view.last_page();
    assert_eq!(view.page().index(), 2);
    for index in 10..25 {
        view.remove_row(&format!("T{index:03}"));
    }
    assert_eq!(view.page().index(), 0);
    assert_eq!(view.page_rows().len(), 10);
}

#[test]
fn page_size_change_keeps_first_visible_row() {
    let mut view = view(40);
    view.set_page_size(5);
    view.go_to_page(3);
    let first = view.page_rows()[0].id.clone();
    view.set_page_size(10);
    assert!(view.page_rows().iter().any(|row| row.id == first));
    assert_eq!(view.set_page_size(0), TableStatus::PageSizeInvalid);
}

#[test]
fn selection_survives_sort_and_paging() {
    let mut view = view(20);
    view.toggle_selection("T015");
    view.sort_by("score", SortDirection::Desc);
    view.next_page();
    assert!(view.is_selected("T015"));
    assert_eq!(view.selected_records().len(), 1);
}

#[test]
fn select_all_covers_filtered_rows_beyond_current_page() {
    let mut view = view(30);
    view.set_column_filter("team", "platform");
    assert_eq!(view.page_rows().len(), 10);
    assert_eq!(view.select_all(), TableStatus::SelectedAll(10));

    view.set_page_size(4);
    assert_eq!(view.selection().len(), 10);
    assert!(!view.is_selected("T001"));
}

#[test]
fn selecting_missing_id_is_a_no_op() {
    let mut view = view(3);
    assert_eq!(
        view.toggle_selection("T999"),
        TableStatus::SelectionMissing
    );
    assert!(view.selection().is_empty());
}

#[test]
fn parent_is_notified_only_on_real_changes() {
    let mut view = view(5);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    view.selection_mut()
        .subscribe(Box::new(move |ids| sink.borrow_mut().push(ids.len())));

    view.select_all();
    view.select_all();
    view.sort_by("score", SortDirection::Asc);
    view.clear_selection();
    view.clear_selection();

    assert_eq!(*seen.borrow(), vec![5, 0]);
}

#[test]
fn refresh_resets_state_by_default() {
    let mut view = view(15);
    view.set_column_filter("team", "pay");
    view.sort_by("score", SortDirection::Desc);
    view.toggle_selection("T001");

    view.replace_rows(tickets(15));

    assert!(!view.filter().is_active());
    assert_eq!(view.sort(), None);
    assert!(view.selection().is_empty());
    assert_eq!(view.filtered_count(), 15);
}

#[test]
fn refresh_can_preserve_state_and_prune_selection() {
    let options = ViewOptions {
        refresh_policy: RefreshPolicy::Preserve,
        ..ViewOptions::default()
    };
    let mut view = TableView::new(&columns(), tickets(15), options);
    view.set_column_filter("team", "pay");
    view.toggle_selection("T001");
    view.toggle_selection("T014");

    view.replace_rows(tickets(10));

    assert_eq!(view.filter().column("team"), Some("pay"));
    assert!(view.is_selected("T001"));
    assert!(!view.is_selected("T014"));
}

#[test]
fn row_edits_replace_whole_record() {
    let mut view = view(4);
    let mut edited = view.store().get("T002").cloned().expect("row present");
    edited.team = "Observability".to_owned();
    assert!(view.update_row(edited));
    view.set_column_filter("team", "observ");
    assert_eq!(ids(&view.rows()), vec!["T002"]);

    let ghost = Ticket {
        id: "T404".to_owned(),
        team: String::new(),
        score: 0,
        note: String::new(),
    };
    assert!(!view.update_row(ghost));
}

#[test]
fn column_commands_go_through_the_controller() {
    let mut view = view(2);
    assert_eq!(
        view.apply(TableCommand::HideColumn("note")),
        TableStatus::ColumnHidden("Note")
    );
    assert_eq!(view.layout().visible_columns().len(), 3);
    assert_eq!(
        view.apply(TableCommand::ResizeColumn {
            key: "team",
            delta: 100
        }),
        TableStatus::ColumnResized {
            label: "Team",
            width: 60
        }
    );
    assert_eq!(view.apply(TableCommand::ShowAllColumns), TableStatus::ColumnsShown);
    assert!(view.layout().is_visible("note"));
}

#[test]
fn clearing_nothing_reports_unchanged() {
    let mut view = view(13);
    assert_eq!(view.clear_filters(), TableStatus::FilterUnchanged);
    assert_eq!(view.clear_sort(), TableStatus::SortUnchanged);

    view.set_global_filter("pay");
    view.toggle_sort("score");
    assert_eq!(view.clear_filters(), TableStatus::FiltersCleared);
    assert_eq!(view.clear_sort(), TableStatus::SortCleared);
    assert_eq!(view.filtered_count(), 13);
}

#[test]
fn fetch_results_feed_the_row_store() {
    let mut view = view(4);
    assert_eq!(view.load_source(FetchResult::ready(tickets(9))), Ok(9));
    assert_eq!(view.total_count(), 9);

    assert_eq!(
        view.load_source(FetchResult::loading()),
        Err(SourceError::Loading)
    );
    assert_eq!(
        view.load_source(FetchResult::failed("timeout")),
        Err(SourceError::Failed("timeout".to_owned()))
    );
    assert_eq!(view.total_count(), 9);
}
