use derive_more::Deref;
use std::fmt;

/// Placeholder written for every value a failed measurement could not produce.
pub const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Value(String),
    /// Rendered as [`NOT_AVAILABLE`].
    NotAvailable,
    /// Rendered as an empty field.
    Empty,
}

impl Cell {
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Value(value) => value,
            Cell::NotAvailable => NOT_AVAILABLE,
            Cell::Empty => "",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the log, positionally aligned with the configured fields.
#[derive(Debug, Clone, PartialEq, Eq, Deref)]
pub struct Row(Vec<Cell>);

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }

    /// The row as one CSV record, including the trailing newline.
    pub fn to_csv(&self) -> String {
        csv_record(self.iter().map(Cell::as_str))
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<T: IntoIterator<Item = Cell>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Joins fields with commas. Fields containing a comma, quote or line break are quoted and inner
/// quotes doubled.
pub fn csv_record<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        if field.contains([',', '"', '\r', '\n']) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push('\n');
    line
}
