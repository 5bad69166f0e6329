//! Tabular output in table, TSV or CSV form

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::escape_csv;
use crate::cli::OutputFormat;

/// Rows of string cells under a fixed header
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Render for a tabular format; JSON/YAML callers serialize their own data
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.delimited(",", escape_csv),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(self.headers.iter().map(|h| h.to_uppercase()));
                for row in &self.rows {
                    builder.push_record(row.iter().cloned());
                }
                let mut table = builder.build();
                table.with(Style::rounded());
                format!("{}\n", table)
            }
            _ => self.delimited("\t", |s| s.replace(['\t', '\n'], " ")),
        }
    }

    pub fn print(&self, format: OutputFormat) {
        print!("{}", self.render(format));
    }

    fn delimited(&self, sep: &str, escape: impl Fn(&str) -> String) -> String {
        let mut out = String::new();
        for line in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let cells: Vec<String> = line.iter().map(|c| escape(c)).collect();
            out.push_str(&cells.join(sep));
            out.push('\n');
        }
        out
    }
}
