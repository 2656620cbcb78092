use anyhow::{bail, Context, Result};

/// A fully materialised table of named text columns. Cells are `None` where
/// the source field was empty or the row came from the unmatched side of a join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Option<String>>) -> Result<()> {
        if row.len() != self.columns.len() {
            bail!(
                "Row has {} fields but table has {} columns",
                row.len(),
                self.columns.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|x| x == name)
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.column(name)
            .with_context(|| format!("Missing column {name:?} (have {:?})", self.columns))
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let i = self.column(name)?;
        self.rows.get(row)?.get(i)?.as_deref()
    }

    /// Appends the rows of `other`. Columns only one side has are filled with
    /// nulls on the other, so shards with drifting schemas still line up.
    pub fn concat(&mut self, other: Table) {
        let mut mapping = Vec::with_capacity(other.columns.len());
        for name in other.columns {
            let i = match self.column(&name) {
                Some(i) => i,
                None => {
                    self.columns.push(name);
                    for row in &mut self.rows {
                        row.push(None);
                    }
                    self.columns.len() - 1
                }
            };
            mapping.push(i);
        }

        let width = self.columns.len();
        self.rows.reserve(other.rows.len());
        for row in other.rows {
            let mut out = vec![None; width];
            for (cell, &i) in row.into_iter().zip(&mapping) {
                out[i] = cell;
            }
            self.rows.push(out);
        }
    }

    /// Keeps rows whose mask entry is true, in their original order.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.rows.len() {
            bail!(
                "Filter mask has {} entries for {} rows",
                mask.len(),
                self.rows.len()
            );
        }
        Ok(Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(row, _)| row.clone())
                .collect(),
        })
    }

    /// Moves `name` to the front so it is written as the index column.
    pub fn set_index(&mut self, name: &str) -> Result<()> {
        let i = self.require(name)?;
        let column = self.columns.remove(i);
        self.columns.insert(0, column);
        for row in &mut self.rows {
            let cell = row.remove(i);
            row.insert(0, cell);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: &str) -> Option<String> {
        Some(x.to_string())
    }

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> Table {
        let mut t = Table::new(columns.iter().map(|x| x.to_string()).collect());
        for row in rows {
            t.push(row.iter().map(|x| x.map(str::to_string)).collect())
                .unwrap();
        }
        t
    }

    #[test]
    fn push_rejects_wrong_width() {
        let mut t = table(&["a", "b"], &[]);
        assert!(t.push(vec![cell("1")]).is_err());
        assert!(t.push(vec![cell("1"), None]).is_ok());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn require_names_missing_column() {
        let t = table(&["a"], &[]);
        let err = t.require("street_address").unwrap_err();
        assert!(err.to_string().contains("street_address"));
    }

    #[test]
    fn concat_unions_columns() {
        let mut a = table(&["id", "x"], &[&[Some("1"), Some("a")]]);
        let b = table(&["y", "id"], &[&[Some("b"), Some("2")]]);
        a.concat(b);

        assert_eq!(a.columns, vec!["id", "x", "y"]);
        assert_eq!(a.rows[0], vec![cell("1"), cell("a"), None]);
        assert_eq!(a.rows[1], vec![cell("2"), None, cell("b")]);
    }

    #[test]
    fn concat_into_empty() {
        let mut a = Table::default();
        a.concat(table(&["id"], &[&[Some("1")], &[Some("2")]]));
        assert_eq!(a.columns, vec!["id"]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn filter_rows_is_stable() {
        let t = table(&["id"], &[&[Some("1")], &[Some("2")], &[Some("3")]]);
        let out = t.filter_rows(&[true, false, true]).unwrap();
        assert_eq!(out.rows, vec![vec![cell("1")], vec![cell("3")]]);
        assert!(t.filter_rows(&[true]).is_err());
    }

    #[test]
    fn set_index_moves_column_first() {
        let mut t = table(&["a", "id", "b"], &[&[Some("x"), Some("1"), None]]);
        t.set_index("id").unwrap();
        assert_eq!(t.columns, vec!["id", "a", "b"]);
        assert_eq!(t.rows[0], vec![cell("1"), cell("x"), None]);
        assert_eq!(t.get(0, "a"), Some("x"));
        assert_eq!(t.get(0, "b"), None);
    }
}
