use super::assembler::Table;

pub struct TableFormatter {
    padding: usize,
    alignment: ColumnAlignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlignment {
    Left,
    Center,
    Right,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            padding: 1,
            alignment: ColumnAlignment::Left,
        }
    }

    pub fn with_alignment(mut self, alignment: ColumnAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// GitHub-flavoured markdown; the header row is followed by a separator.
    pub fn format_markdown(&self, table: &Table) -> String {
        let rows: Vec<Vec<String>> = table
            .rows()
            .map(|row| row.iter().map(|cell| escape_markdown_cell(cell)).collect())
            .collect();
        let column_widths = self.calculate_column_widths(&rows, table.column_count());

        let mut formatted = Vec::with_capacity(rows.len() + 1);
        for (i, row) in rows.iter().enumerate() {
            formatted.push(self.format_row(row, &column_widths));
            if i == 0 {
                formatted.push(self.create_separator(&column_widths));
            }
        }

        formatted.join("\n")
    }

    pub fn format_html(&self, table: &Table) -> String {
        let mut result = String::new();

        result.push_str(&format!("<table id=\"{}\">\n", html_escape(&table.id)));
        result.push_str("  <thead>\n    <tr>\n");
        for header in &table.header_row {
            result.push_str(&format!("      <th>{}</th>\n", html_escape(header)));
        }
        result.push_str("    </tr>\n  </thead>\n");

        if !table.data_rows.is_empty() {
            result.push_str("  <tbody>\n");
            for row in &table.data_rows {
                result.push_str("    <tr>\n");
                for cell in row {
                    result.push_str(&format!("      <td>{}</td>\n", html_escape(cell)));
                }
                result.push_str("    </tr>\n");
            }
            result.push_str("  </tbody>\n");
        }

        result.push_str("</table>\n");
        result
    }

    pub fn format_csv(&self, table: &Table) -> String {
        let mut csv_content = String::new();
        for row in table.rows() {
            let row_csv = row.iter()
                .map(|cell| escape_csv_field(cell))
                .collect::<Vec<_>>()
                .join(",");
            csv_content.push_str(&row_csv);
            csv_content.push('\n');
        }
        csv_content
    }

    fn calculate_column_widths(&self, rows: &[Vec<String>], column_count: usize) -> Vec<usize> {
        let mut widths = vec![3; column_count];

        for row in rows {
            for (i, cell) in row.iter().enumerate().take(column_count) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        widths
    }

    fn format_row(&self, row: &[String], widths: &[usize]) -> String {
        let pad = " ".repeat(self.padding);
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let content = row.get(i).map(String::as_str).unwrap_or("");
                format!("{}{}{}", pad, self.pad_content(content, width), pad)
            })
            .collect();

        format!("|{}|", cells.join("|"))
    }

    fn pad_content(&self, content: &str, width: usize) -> String {
        match self.alignment {
            ColumnAlignment::Left => format!("{:<width$}", content, width = width),
            ColumnAlignment::Right => format!("{:>width$}", content, width = width),
            ColumnAlignment::Center => format!("{:^width$}", content, width = width),
        }
    }

    fn create_separator(&self, widths: &[usize]) -> String {
        let separators: Vec<String> = widths.iter()
            .map(|&w| {
                let dashes = w + self.padding * 2;
                match self.alignment {
                    ColumnAlignment::Left => "-".repeat(dashes),
                    ColumnAlignment::Right => format!("{}:", "-".repeat(dashes.saturating_sub(1))),
                    ColumnAlignment::Center => format!(":{}:", "-".repeat(dashes.saturating_sub(2))),
                }
            })
            .collect();

        format!("|{}|", separators.join("|"))
    }
}

/// Render every table as markdown, each under its own heading.
pub fn tables_to_markdown(tables: &[Table]) -> String {
    let formatter = TableFormatter::new();
    let mut md_content = String::new();

    for table in tables {
        md_content.push_str(&format!("## Table {} (page {})\n\n", table.id, table.page_number));
        md_content.push_str(&formatter.format_markdown(table));
        md_content.push_str("\n\n");
    }

    md_content
}

pub fn tables_to_html(tables: &[Table]) -> String {
    let formatter = TableFormatter::new();
    tables.iter().map(|table| formatter.format_html(table)).collect::<Vec<_>>().join("<br>\n")
}

pub fn tables_to_csv(tables: &[Table]) -> String {
    let formatter = TableFormatter::new();
    let mut csv_content = String::new();

    for table in tables {
        // Table id as a comment line
        csv_content.push_str(&format!("# {} (page {})\n", table.id, table.page_number));
        csv_content.push_str(&formatter.format_csv(table));
        csv_content.push('\n');
    }

    csv_content
}

fn escape_markdown_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', " ")
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
     .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn sample() -> Table {
        Table {
            id: "table_1_0".to_string(),
            page_number: 1,
            bounding_box: BoundingBox::new(0.0, 0.0, 100.0, 60.0),
            header_row: vec!["Item".to_string(), "Cost".to_string()],
            data_rows: vec![
                vec!["Tea, green".to_string(), "4".to_string()],
                vec!["A|B".to_string(), String::new()],
            ],
        }
    }

    #[test]
    fn test_markdown_has_header_separator() {
        let md = TableFormatter::new().format_markdown(&sample());
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "| Item       | Cost |");
        assert_eq!(lines[1], "|------------|------|");
        assert_eq!(lines[3], "| A\\|B       |      |");
    }

    #[test]
    fn test_right_aligned_separator() {
        let md = TableFormatter::new()
            .with_alignment(ColumnAlignment::Right)
            .format_markdown(&sample());
        assert!(md.lines().nth(1).unwrap().ends_with("-----:|"));
    }

    #[test]
    fn test_csv_escapes_commas() {
        let csv = TableFormatter::new().format_csv(&sample());
        assert_eq!(csv, "Item,Cost\n\"Tea, green\",4\nA|B,\n");
    }

    #[test]
    fn test_html_escapes_content() {
        let mut table = sample();
        table.header_row[0] = "<b>".to_string();
        let html = TableFormatter::new().format_html(&table);
        assert!(html.contains("<th>&lt;b&gt;</th>"));
        assert!(html.contains("<td>Tea, green</td>"));
        assert!(html.starts_with("<table id=\"table_1_0\">"));
    }

    #[test]
    fn test_document_csv_separates_tables() {
        let csv = tables_to_csv(&[sample(), sample()]);
        assert_eq!(csv.matches("# table_1_0 (page 1)").count(), 2);
    }
}
