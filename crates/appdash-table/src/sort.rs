// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::column::{ColumnDescriptor, find_column};
use crate::store::TableRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortToggle {
    Unavailable,
    Sorted(SortSpec),
    Cleared,
}

/// Advances the sort for `key`: a new column starts ascending, the active
/// column goes asc → desc → unsorted. Unknown or unsortable columns leave the
/// sort untouched.
pub fn toggle_sort(
    current: Option<SortSpec>,
    columns: &[ColumnDescriptor],
    key: &str,
) -> (Option<SortSpec>, SortToggle) {
    let Some(column) = find_column(columns, key).filter(|column| column.sortable) else {
        return (current, SortToggle::Unavailable);
    };

    let next = match current {
        Some(spec) if spec.column == column.key => match spec.direction {
            SortDirection::Asc => Some(SortSpec {
                direction: SortDirection::Desc,
                ..spec
            }),
            SortDirection::Desc => None,
        },
        _ => Some(SortSpec {
            column: column.key,
            direction: SortDirection::Asc,
        }),
    };

    let toggle = match next {
        Some(spec) => SortToggle::Sorted(spec),
        None => SortToggle::Cleared,
    };
    (next, toggle)
}

/// Stable sort of row indices by the chosen column. Ties keep their
/// incoming relative order.
pub fn sort_indices<R: TableRecord>(rows: &[R], indices: &mut [usize], spec: Option<SortSpec>) {
    let Some(spec) = spec else {
        return;
    };
    indices.sort_by(|left, right| {
        let (Some(left), Some(right)) = (rows.get(*left), rows.get(*right)) else {
            return std::cmp::Ordering::Equal;
        };
        let order = left.cell(spec.column).cmp_value(&right.cell(spec.column));
        match spec.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{SortDirection, SortSpec, SortToggle, toggle_sort};
    use crate::column::ColumnDescriptor;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("name", "Name"),
            ColumnDescriptor::new("notes", "Notes").unsortable(),
            ColumnDescriptor::new("status", "Status"),
        ]
    }

    #[test]
    fn same_column_cycles_back_to_unsorted() {
        let columns = columns();
        let (first, _) = toggle_sort(None, &columns, "name");
        assert_eq!(
            first,
            Some(SortSpec {
                column: "name",
                direction: SortDirection::Asc
            })
        );
        let (second, _) = toggle_sort(first, &columns, "name");
        assert_eq!(second.map(|spec| spec.direction), Some(SortDirection::Desc));
        let (third, toggle) = toggle_sort(second, &columns, "name");
        assert_eq!(third, None);
        assert_eq!(toggle, SortToggle::Cleared);
    }

    #[test]
    fn different_column_starts_ascending() {
        let columns = columns();
        let current = Some(SortSpec {
            column: "name",
            direction: SortDirection::Desc,
        });
        let (next, _) = toggle_sort(current, &columns, "status");
        assert_eq!(
            next,
            Some(SortSpec {
                column: "status",
                direction: SortDirection::Asc
            })
        );
    }

    #[test]
    fn unsortable_column_is_a_no_op() {
        let columns = columns();
        let current = Some(SortSpec {
            column: "name",
            direction: SortDirection::Asc,
        });
        let (next, toggle) = toggle_sort(current, &columns, "notes");
        assert_eq!(next, current);
        assert_eq!(toggle, SortToggle::Unavailable);

        let (next, toggle) = toggle_sort(current, &columns, "missing");
        assert_eq!(next, current);
        assert_eq!(toggle, SortToggle::Unavailable);
    }
}
