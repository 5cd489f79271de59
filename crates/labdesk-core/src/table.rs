use serde::{Deserialize, Serialize};

use crate::latex::escape_latex;
use crate::LabdeskError;

/// One cell of measurement data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    fn to_latex(&self) -> String {
        match self {
            // Debug keeps a trailing ".0" on integral values and round-trips.
            Cell::Number(v) => format!("{v:?}"),
            Cell::Text(s) => escape_latex(s),
            Cell::Empty => String::new(),
        }
    }
}

/// Measurement data entered by a student: a header plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl MeasurementTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn validate(&self) -> Result<(), LabdeskError> {
        if self.columns.is_empty() && !self.rows.is_empty() {
            return Err(LabdeskError::InvalidInput(
                "measurement table has rows but no columns".into(),
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.columns.len() {
                return Err(LabdeskError::InvalidInput(format!(
                    "measurement row {i} has {} cells, expected {}",
                    row.len(),
                    self.columns.len()
                )));
            }
        }
        Ok(())
    }

    /// Render as a booktabs `tabular`, numeric columns right-aligned.
    pub fn to_latex(&self) -> String {
        let align: String = (0..self.columns.len())
            .map(|col| if self.is_numeric(col) { 'r' } else { 'l' })
            .collect();

        let mut out = format!("\\begin{{tabular}}{{{align}}}\n\\toprule\n");
        let header: Vec<String> = self.columns.iter().map(|c| escape_latex(c)).collect();
        out.push_str(&header.join(" & "));
        out.push_str(" \\\\\n\\midrule\n");
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(Cell::to_latex).collect();
            out.push_str(&cells.join(" & "));
            out.push_str(" \\\\\n");
        }
        out.push_str("\\bottomrule\n\\end{tabular}\n");
        out
    }

    fn is_numeric(&self, col: usize) -> bool {
        self.rows
            .iter()
            .filter_map(|row| row.get(col))
            .all(|cell| !matches!(cell, Cell::Text(_)))
    }
}
