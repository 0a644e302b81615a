use crate::models::ColorConfig;
use crate::tui::App;
use crate::tui::utils::parse_color;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

const COLUMNS: [&str; 3] = ["Source", "Eval loss", "Eval accuracy"];

/// TUI渲染器，负责处理所有UI渲染逻辑
pub struct Renderer {
    heading_style: Style,
    header_style: Style,
    selected_style: Style,
    text_style: Style,
    border_style: Style,
}

impl Renderer {
    pub fn new(colors: &ColorConfig) -> Self {
        Self {
            heading_style: Style::default()
                .fg(parse_color(&colors.heading))
                .add_modifier(Modifier::BOLD),
            header_style: Style::default()
                .fg(parse_color(&colors.header))
                .add_modifier(Modifier::BOLD),
            selected_style: Style::default()
                .fg(parse_color(&colors.selected))
                .add_modifier(Modifier::BOLD),
            text_style: Style::default().fg(parse_color(&colors.text)),
            border_style: Style::default().fg(parse_color(&colors.border)),
        }
    }

    /// 从app结构体中读取数据并渲染
    pub fn draw(&self, f: &mut Frame, app: &App) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(f.area());

        self.draw_heading(f, app, chunks[0]);
        self.draw_table(f, app, chunks[1]);
    }

    /// 绘制运行名称
    fn draw_heading(&self, f: &mut Frame, app: &App, area: Rect) {
        let heading = Paragraph::new(app.heading.content.as_str())
            .style(self.heading_style)
            .block(
                Block::default()
                    .title("Run")
                    .borders(Borders::ALL)
                    .border_style(self.border_style),
            )
            .alignment(Alignment::Left);
        f.render_widget(heading, area);
    }

    /// 绘制实验表格
    fn draw_table(&self, f: &mut Frame, app: &App, area: Rect) {
        let header = Row::new(COLUMNS.iter().map(|c| Cell::from(*c))).style(self.header_style);
        let rows = app
            .table
            .rows
            .iter()
            .map(|row| Row::new(row.cells().map(|c| Cell::from(c.to_string()))).style(self.text_style));

        let title = format!("Experiments ({})", app.table.rows.len());
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(50),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(self.border_style),
        )
        .row_highlight_style(self.selected_style)
        .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(app.selected().map(|_| app.selected_row));
        f.render_stateful_widget(table, area, &mut state);
    }
}
