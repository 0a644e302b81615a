use crate::models::RunRow;
use crate::renderer::{TableBody, TextContent};
use crate::tui::UserAction;

pub const HEADING_PLACEHOLDER: &str = "No run loaded";

/// 终端中的运行表格
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TerminalTable {
    pub rows: Vec<RunRow>,
}

impl TableBody for TerminalTable {
    fn append_row(&mut self, row: &RunRow) {
        self.rows.push(row.clone());
    }
}

/// 终端中的运行名称标题
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalHeading {
    pub content: String,
}

impl Default for TerminalHeading {
    fn default() -> Self {
        Self {
            content: HEADING_PLACEHOLDER.to_string(),
        }
    }
}

impl TextContent for TerminalHeading {
    fn set_content(&mut self, text: &str) {
        self.content = text.to_string();
    }
}

/// TUI应用主结构
#[derive(Debug, Default)]
pub struct App {
    pub heading: TerminalHeading,
    pub table: TerminalTable,
    pub selected_row: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理退出操作
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// 获取当前选中的行
    pub fn selected(&self) -> Option<&RunRow> {
        self.table.rows.get(self.selected_row)
    }

    pub fn apply(&mut self, action: UserAction) {
        match action {
            UserAction::Quit => self.quit(),
            UserAction::MoveUp => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            UserAction::MoveDown => {
                let last = self.table.rows.len().saturating_sub(1);
                self.selected_row = self.selected_row.saturating_add(1).min(last);
            }
            UserAction::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(source: &str) -> RunRow {
        RunRow {
            source_name: source.to_string(),
            eval_loss: "0.1".to_string(),
            eval_accuracy: "0.9".to_string(),
        }
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();

        assert!(!app.should_quit);
        app.apply(UserAction::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_placeholder_until_rendered() {
        let mut app = App::new();
        assert_eq!(app.heading.content, HEADING_PLACEHOLDER);
        assert!(app.selected().is_none());

        app.heading.set_content("run-42");
        app.table.append_row(&row("train.py"));

        assert_eq!(app.heading.content, "run-42");
        assert_eq!(app.selected().map(|r| r.source_name.as_str()), Some("train.py"));
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = App::new();
        app.apply(UserAction::MoveDown);
        assert_eq!(app.selected_row, 0);

        app.table.append_row(&row("a.py"));
        app.table.append_row(&row("b.py"));

        app.apply(UserAction::MoveDown);
        app.apply(UserAction::MoveDown);
        assert_eq!(app.selected_row, 1);

        app.apply(UserAction::MoveUp);
        app.apply(UserAction::MoveUp);
        assert_eq!(app.selected_row, 0);
    }
}
