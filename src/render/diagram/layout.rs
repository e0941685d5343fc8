//! Box geometry for the tables of one diagram component.

use super::canvas::{
    Canvas, BOTTOM_LEFT, BOTTOM_RIGHT, HORIZONTAL, TEE_LEFT, TEE_RIGHT, TOP_LEFT, TOP_RIGHT,
    VERTICAL,
};
use crate::render::annotate::column_flags;
use crate::schema::Table;

/// Minimum inner width of a table box
pub const MIN_BOX_WIDTH: usize = 26;
/// Blank rows between stacked boxes
pub const BOX_GAP: usize = 1;
/// Rows above the first column: top border, title, separator
const HEADER_ROWS: usize = 3;

/// Placement of one table box on the canvas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub name: String,
    /// Row of the top border
    pub offset: usize,
    /// Total rows including both borders
    pub height: usize,
    /// Column labels in declaration order
    pub labels: Vec<String>,
    /// Column names, index-aligned with `labels`
    pub columns: Vec<String>,
}

impl TableLayout {
    pub fn new(table: &Table, offset: usize) -> Self {
        let columns: Vec<String> = table.columns.iter().map(|c| c.name.clone()).collect();
        let labels = columns
            .iter()
            .map(|name| column_flags(table, name).label(name))
            .collect();
        Self {
            name: table.name.clone(),
            offset,
            height: HEADER_ROWS + columns.len() + 1,
            labels,
            columns,
        }
    }

    /// Longest label or title, in chars
    pub fn content_width(&self) -> usize {
        self.labels
            .iter()
            .map(|l| l.chars().count())
            .chain(std::iter::once(self.name.chars().count()))
            .max()
            .unwrap_or(0)
    }

    /// Absolute row of a column, if the table has it
    pub fn column_row(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.offset + HEADER_ROWS + i)
    }

    /// Absolute row where incoming arrows land
    pub fn anchor_row(&self) -> usize {
        self.offset + self.height / 2
    }

    pub fn bottom(&self) -> usize {
        self.offset + self.height - 1
    }

    /// Draw the box with its left border at column 0
    pub fn draw(&self, canvas: &mut Canvas, inner_width: usize) {
        let right = inner_width + 1;
        let top = self.offset;

        let rule = HORIZONTAL.to_string().repeat(inner_width);
        canvas.set(0, top, TOP_LEFT);
        canvas.text(1, top, &rule);
        canvas.set(right, top, TOP_RIGHT);

        let title_len = self.name.chars().count();
        let pad = inner_width.saturating_sub(title_len) / 2;
        canvas.set(0, top + 1, VERTICAL);
        canvas.text(1 + pad, top + 1, &self.name);
        canvas.set(right, top + 1, VERTICAL);

        canvas.set(0, top + 2, TEE_RIGHT);
        canvas.text(1, top + 2, &rule);
        canvas.set(right, top + 2, TEE_LEFT);

        for (i, label) in self.labels.iter().enumerate() {
            let row = top + HEADER_ROWS + i;
            canvas.set(0, row, VERTICAL);
            canvas.text(2, row, label);
            canvas.set(right, row, VERTICAL);
        }

        let bottom = self.bottom();
        canvas.set(0, bottom, BOTTOM_LEFT);
        canvas.text(1, bottom, &rule);
        canvas.set(right, bottom, BOTTOM_RIGHT);
    }
}

/// Stack boxes vertically in the given order.
///
/// Returns the layouts, the shared inner box width and the total height.
pub fn stack<'a>(tables: impl IntoIterator<Item = &'a Table>) -> (Vec<TableLayout>, usize, usize) {
    let mut layouts = Vec::new();
    let mut offset = 0;
    for table in tables {
        let layout = TableLayout::new(table, offset);
        offset += layout.height + BOX_GAP;
        layouts.push(layout);
    }

    let inner_width = layouts
        .iter()
        .map(|l| l.content_width() + 2)
        .max()
        .unwrap_or(0)
        .max(MIN_BOX_WIDTH);
    let height = offset.saturating_sub(BOX_GAP);

    (layouts, inner_width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Constraint};

    fn users() -> Table {
        Table::new("users")
            .column(Column::new("id", "int"))
            .column(Column::new("email", "text"))
            .constraint(Constraint::primary_key(["id"]))
            .constraint(Constraint::unique(["email"]))
    }

    #[test]
    fn test_geometry() {
        let layout = TableLayout::new(&users(), 10);
        assert_eq!(layout.height, 6);
        assert_eq!(layout.labels, vec!["PK id", "email (unique)"]);
        assert_eq!(layout.column_row("email"), Some(14));
        assert_eq!(layout.column_row("missing"), None);
        assert_eq!(layout.anchor_row(), 13);
        assert_eq!(layout.bottom(), 15);
    }

    #[test]
    fn test_stack_offsets_and_width() {
        let long = Table::new("a_table_with_a_rather_long_name");
        let tables = [users(), long];
        let (layouts, width, height) = stack(tables.iter());

        assert_eq!(layouts[0].offset, 0);
        assert_eq!(layouts[1].offset, 7);
        assert_eq!(width, 33);
        assert_eq!(height, 11);
    }

    #[test]
    fn test_draw_box() {
        let table = Table::new("t").column(Column::new("c", "int"));
        let layout = TableLayout::new(&table, 0);
        let mut canvas = Canvas::new(MIN_BOX_WIDTH + 2, layout.height);
        layout.draw(&mut canvas, MIN_BOX_WIDTH);

        let out = canvas.to_string();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('┌') && lines[0].ends_with('┐'));
        assert_eq!(lines[1].trim_matches(|c| c == '│' || c == ' '), "t");
        assert!(lines[2].starts_with('├'));
        assert!(lines[3].starts_with("│ c"));
        assert!(lines[4].starts_with('└'));
    }
}
