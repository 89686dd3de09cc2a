use crate::error::{AppError, Result};
use crate::models::{CellValue, RowEntity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit,
}

/// Draft of a row being created or edited. Works on its own copy of the
/// row so the table is untouched until the caller has saved it.
#[derive(Debug, Clone)]
pub struct RowEditor {
    mode: EditMode,
    columns: Vec<String>,
    draft: RowEntity,
}

impl RowEditor {
    pub fn create(columns: Vec<String>) -> Self {
        let data = columns
            .iter()
            .map(|c| (c.clone(), CellValue::Null))
            .collect();
        Self {
            mode: EditMode::Create,
            columns,
            draft: RowEntity {
                data,
                ..Default::default()
            },
        }
    }

    pub fn edit(columns: Vec<String>, row: &RowEntity) -> Self {
        Self {
            mode: EditMode::Edit,
            columns,
            draft: row.clone(),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.draft.data.get(column)
    }

    pub fn set(&mut self, column: &str, value: CellValue) -> Result<()> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(AppError::InvalidInput(format!("unknown column: {}", column)));
        }
        self.draft.data.insert(column.to_string(), value);
        Ok(())
    }

    /// Applies `column=value` assignments as typed by the operator.
    pub fn apply_assignments<'s>(&mut self, assignments: impl IntoIterator<Item = &'s str>) -> Result<()> {
        for assignment in assignments {
            let (column, raw) = assignment.split_once('=').ok_or_else(|| {
                AppError::InvalidInput(format!("expected column=value, got {}", assignment))
            })?;
            self.set(column.trim(), CellValue::parse_input(raw))?;
        }
        Ok(())
    }

    /// The row to hand to create or update.
    pub fn finish(self) -> RowEntity {
        self.draft
    }
}
