use std::fmt::{Display, Write};

/// Plain ASCII table used for CLI output.
///
/// ```text
/// +--------+-------------------------+
/// | offset |           hex           |
/// +--------+-------------------------+
/// |   0    | 00 00 00 0f 48 65 6c 6c |
/// +--------+-------------------------+
/// ```
#[derive(Debug, Default)]
pub struct DebugTable {
    column_names: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DebugTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_column(&mut self, name: impl Display) {
        self.column_names.push(name.to_string());
    }

    pub fn insert_row(&mut self, row: Vec<String>) {
        assert!(
            row.len() == self.column_names.len(),
            "row length doesn't match number of columns"
        );

        self.rows.push(row);
    }

    fn columns_width(&self) -> Vec<usize> {
        (0..self.column_names.len())
            .map(|i| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(self.column_names[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn separator(&self, widths: &[usize]) -> String {
        let mut separator = String::from("+");

        for len in widths {
            separator.push_str(&"-".repeat(len + 2));
            separator.push('+');
        }

        separator
    }

    fn printable_row(&self, row: &[String], widths: &[usize]) -> String {
        let mut print_row = String::from("|");

        for (cell, &l) in row.iter().zip(widths) {
            print_row.push_str(&format!(" {:^l$} ", cell));
            print_row.push('|');
        }

        print_row
    }
}

impl Display for DebugTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let widths = self.columns_width();
        let separator = self.separator(&widths);

        f.write_str(&separator)?;
        f.write_char('\n')?;
        f.write_str(&self.printable_row(&self.column_names, &widths))?;
        f.write_char('\n')?;
        f.write_str(&separator)?;
        f.write_char('\n')?;

        for row in &self.rows {
            f.write_str(&self.printable_row(row, &widths))?;
            f.write_char('\n')?;
            f.write_str(&separator)?;
            f.write_char('\n')?;
        }

        Ok(())
    }
}
