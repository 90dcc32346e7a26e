//! In-memory labeled table with typed columns.

use std::collections::HashMap;

use tracing::debug;

use crate::error::TreeError;
use crate::node::{AttributeIndex, Cell};

/// Whether a column is split by threshold or by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every cell parsed as a finite number.
    Numeric,
    /// At least one cell is not a number, or the column is the label.
    Categorical,
}

/// One attribute column, tagged once when the dataset is built.
#[derive(Debug, Clone)]
pub enum Column {
    /// Numeric values, one per row.
    Numeric(Vec<f64>),
    /// Per-row codes into `levels`, levels in order of first appearance.
    Categorical {
        /// Level code of each row.
        codes: Vec<usize>,
        /// Distinct levels; `levels[code]` is the cell text.
        levels: Vec<String>,
    },
}

impl Column {
    /// Return the column kind.
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical { .. } => ColumnKind::Categorical,
        }
    }

    fn categorical(cells: Vec<String>) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut levels = Vec::new();
        let codes = cells
            .into_iter()
            .map(|cell| {
                *index.entry(cell).or_insert_with_key(|key| {
                    levels.push(key.clone());
                    levels.len() - 1
                })
            })
            .collect();
        Column::Categorical { codes, levels }
    }

    fn select(&self, rows: &[usize]) -> Self {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&r| values[r]).collect()),
            Column::Categorical { codes, levels } => Column::Categorical {
                codes: rows.iter().map(|&r| codes[r]).collect(),
                levels: levels.clone(),
            },
        }
    }
}

/// A labeled table: named columns over a shared row count.
///
/// The label column is always categorical; its levels are the classes.
/// Row subsets used during induction are index slices into one dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    label: AttributeIndex,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from a header and string records.
    ///
    /// A non-label column is numeric when every cell parses as a finite
    /// `f64`, categorical otherwise.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::EmptyDataset`] | `records` is empty |
    /// | [`TreeError::DuplicateAttribute`] | Two header columns share a name |
    /// | [`TreeError::UnknownLabel`] | `label` is not in the header |
    /// | [`TreeError::NoAttributes`] | The label is the only column |
    /// | [`TreeError::RowLengthMismatch`] | A record length differs from the header |
    pub fn from_records(
        header: Vec<String>,
        records: Vec<Vec<String>>,
        label: &str,
    ) -> Result<Self, TreeError> {
        if records.is_empty() {
            return Err(TreeError::EmptyDataset);
        }

        for (i, name) in header.iter().enumerate() {
            if header[..i].contains(name) {
                return Err(TreeError::DuplicateAttribute { name: name.clone() });
            }
        }

        let label_index = header
            .iter()
            .position(|name| name == label)
            .ok_or_else(|| TreeError::UnknownLabel {
                label: label.to_string(),
            })?;

        if header.len() < 2 {
            return Err(TreeError::NoAttributes {
                label: label.to_string(),
            });
        }

        let n_cols = header.len();
        let n_rows = records.len();
        let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(n_rows); n_cols];
        for (row_index, record) in records.into_iter().enumerate() {
            if record.len() != n_cols {
                return Err(TreeError::RowLengthMismatch {
                    row_index,
                    expected: n_cols,
                    got: record.len(),
                });
            }
            for (col, cell) in record.into_iter().enumerate() {
                cells[col].push(cell);
            }
        }

        let columns: Vec<Column> = cells
            .into_iter()
            .enumerate()
            .map(|(col, column)| {
                if col == label_index {
                    return Column::categorical(column);
                }
                let parsed: Option<Vec<f64>> = column
                    .iter()
                    .map(|c| c.parse::<f64>().ok().filter(|v| v.is_finite()))
                    .collect();
                match parsed {
                    Some(values) => Column::Numeric(values),
                    None => Column::categorical(column),
                }
            })
            .collect();

        debug!(
            n_rows,
            n_columns = n_cols,
            n_numeric = columns.iter().filter(|c| c.kind() == ColumnKind::Numeric).count(),
            label,
            "dataset built"
        );

        Ok(Self {
            names: header,
            columns,
            label: AttributeIndex::new(label_index),
            n_rows,
        })
    }

    /// Return a new dataset holding the given rows, in order.
    ///
    /// Duplicated indices produce duplicated rows. The schema and all level
    /// vocabularies are kept, so class indices stay comparable.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyDataset`] for an empty selection and
    /// [`TreeError::RowOutOfRange`] for an index past the last row.
    pub fn select(&self, rows: &[usize]) -> Result<Self, TreeError> {
        if rows.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        self.check_rows(rows)?;
        Ok(Self {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(rows)).collect(),
            label: self.label,
            n_rows: rows.len(),
        })
    }

    pub(crate) fn check_rows(&self, rows: &[usize]) -> Result<(), TreeError> {
        match rows.iter().find(|&&r| r >= self.n_rows) {
            Some(&row_index) => Err(TreeError::RowOutOfRange {
                row_index,
                n_rows: self.n_rows,
            }),
            None => Ok(()),
        }
    }

    // --- Schema ---

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns, label included.
    #[must_use]
    pub fn n_attributes(&self) -> usize {
        self.columns.len()
    }

    /// Return all column names in header order.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.names
    }

    /// Return the name of one column.
    #[must_use]
    pub fn attribute_name(&self, attribute: AttributeIndex) -> &str {
        &self.names[attribute.index()]
    }

    /// Look up a column by name.
    #[must_use]
    pub fn attribute_index(&self, name: &str) -> Option<AttributeIndex> {
        self.names.iter().position(|n| n == name).map(AttributeIndex::new)
    }

    /// Return the label column index.
    #[must_use]
    pub fn label_index(&self) -> AttributeIndex {
        self.label
    }

    /// Return every attribute except the label, in header order.
    #[must_use]
    pub fn candidate_attributes(&self) -> Vec<AttributeIndex> {
        (0..self.columns.len())
            .filter(|&i| i != self.label.index())
            .map(AttributeIndex::new)
            .collect()
    }

    /// Return one column.
    #[must_use]
    pub fn column(&self, attribute: AttributeIndex) -> &Column {
        &self.columns[attribute.index()]
    }

    /// Return the kind of one column.
    #[must_use]
    pub fn kind(&self, attribute: AttributeIndex) -> ColumnKind {
        self.column(attribute).kind()
    }

    /// Return the class vocabulary (label levels in order of first appearance).
    #[must_use]
    pub fn classes(&self) -> &[String] {
        match self.column(self.label) {
            Column::Categorical { levels, .. } => levels,
            Column::Numeric(_) => &[],
        }
    }

    /// Return the number of distinct classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes().len()
    }

    /// Return the class index of one row.
    #[must_use]
    pub fn class_of(&self, row: usize) -> usize {
        match self.column(self.label) {
            Column::Categorical { codes, .. } => codes[row],
            Column::Numeric(_) => 0,
        }
    }

    /// Borrow one row.
    #[must_use]
    pub fn row(&self, index: usize) -> RowView<'_> {
        RowView {
            dataset: self,
            index,
        }
    }

    // --- Column statistics over a row subset ---

    /// Count rows per class; the result has one entry per class.
    #[must_use]
    pub fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes()];
        for &r in rows {
            counts[self.class_of(r)] += 1;
        }
        counts
    }

    /// Return the most frequent class in `rows`, ties going to the lowest index.
    ///
    /// Returns `None` for an empty row set.
    #[must_use]
    pub fn majority_class(&self, rows: &[usize]) -> Option<usize> {
        if rows.is_empty() {
            return None;
        }
        let counts = self.class_counts(rows);
        let mut best = 0;
        for (class, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = class;
            }
        }
        Some(best)
    }

    /// Arithmetic mean of a numeric column over `rows`.
    ///
    /// Returns `None` for a categorical column or an empty row set.
    #[must_use]
    pub fn mean(&self, attribute: AttributeIndex, rows: &[usize]) -> Option<f64> {
        match self.column(attribute) {
            Column::Numeric(values) if !rows.is_empty() => {
                Some(rows.iter().map(|&r| values[r]).sum::<f64>() / rows.len() as f64)
            }
            _ => None,
        }
    }

    /// Distinct level codes of a categorical column over `rows`, in order of
    /// first appearance. Empty for a numeric column.
    #[must_use]
    pub fn distinct_levels(&self, attribute: AttributeIndex, rows: &[usize]) -> Vec<usize> {
        let Column::Categorical { codes, levels } = self.column(attribute) else {
            return Vec::new();
        };
        let mut seen = vec![false; levels.len()];
        let mut order = Vec::new();
        for &r in rows {
            let code = codes[r];
            if !seen[code] {
                seen[code] = true;
                order.push(code);
            }
        }
        order
    }

    /// Return the text of a categorical level.
    #[must_use]
    pub fn level(&self, attribute: AttributeIndex, code: usize) -> &str {
        match self.column(attribute) {
            Column::Categorical { levels, .. } => &levels[code],
            Column::Numeric(_) => "",
        }
    }

    /// Return the vocabulary size of a categorical column; 0 for a numeric one.
    #[must_use]
    pub fn level_count(&self, attribute: AttributeIndex) -> usize {
        match self.column(attribute) {
            Column::Categorical { levels, .. } => levels.len(),
            Column::Numeric(_) => 0,
        }
    }

    /// Return `true` when `attribute` takes at least two distinct values in `rows`.
    #[must_use]
    pub fn is_splittable(&self, attribute: AttributeIndex, rows: &[usize]) -> bool {
        let Some((&first, rest)) = rows.split_first() else {
            return false;
        };
        match self.column(attribute) {
            Column::Numeric(values) => rest.iter().any(|&r| values[r] != values[first]),
            Column::Categorical { codes, .. } => rest.iter().any(|&r| codes[r] != codes[first]),
        }
    }
}

/// A borrowed row of a [`Dataset`].
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    dataset: &'a Dataset,
    index: usize,
}

impl<'a> RowView<'a> {
    /// Return the row position in its dataset.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return one cell, or `None` when the attribute is outside the schema.
    #[must_use]
    pub fn get(&self, attribute: AttributeIndex) -> Option<Cell<'a>> {
        let dataset: &'a Dataset = self.dataset;
        match dataset.columns.get(attribute.index())? {
            Column::Numeric(values) => values.get(self.index).map(|&v| Cell::Number(v)),
            Column::Categorical { codes, levels } => codes
                .get(self.index)
                .map(|&code| Cell::Level(levels[code].as_str())),
        }
    }

    /// Return the class index of this row.
    #[must_use]
    pub fn class(&self) -> usize {
        self.dataset.class_of(self.index)
    }
}
