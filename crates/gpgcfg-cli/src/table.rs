use std::io::IsTerminal;

use comfy_table::{presets::NOTHING, Attribute, Cell, ContentArrangement, Table};

/// How tables are rendered on stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CliTableTheme {
    /// Bold header and key cells.
    pub use_color: bool,
    /// Wrap long descriptions at the terminal width.
    pub wrap: bool,
}

impl CliTableTheme {
    pub(crate) fn detect() -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let no_color = std::env::var_os("NO_COLOR").is_some();
        resolve_table_theme(is_tty, no_color)
    }

    pub(crate) fn new_data_table(self, headers: &[&str]) -> Table {
        let mut table = self.base_table();
        table.set_header(headers.iter().map(|h| self.emphasis(h)).collect::<Vec<_>>());
        table
    }

    pub(crate) fn new_kv_table(self) -> Table {
        self.base_table()
    }

    fn base_table(self) -> Table {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        if self.wrap {
            table.set_content_arrangement(ContentArrangement::Dynamic);
        }
        table
    }

    fn emphasis(self, text: &str) -> Cell {
        let cell = Cell::new(text);
        if self.use_color {
            cell.add_attribute(Attribute::Bold)
        } else {
            cell
        }
    }
}

fn resolve_table_theme(is_tty: bool, no_color: bool) -> CliTableTheme {
    CliTableTheme {
        use_color: is_tty && !no_color,
        wrap: is_tty,
    }
}

pub(crate) fn add_kv_row(table: &mut Table, theme: CliTableTheme, key: &str, value: impl ToString) {
    table.add_row(vec![theme.emphasis(key), Cell::new(value.to_string())]);
}
