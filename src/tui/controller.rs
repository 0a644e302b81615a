use crate::models::Config;
use crate::tui::{App, Event, EventHandler, InputHandler, Renderer};
use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io;
use std::time::Duration;

/// TUI应用控制器，负责协调各个组件
pub struct TuiApp {
    app: App,
    input_handler: InputHandler,
    renderer: Renderer,
    tick_rate: Duration,
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TuiApp {
    pub fn new(app: App, config: Config) -> Result<Self> {
        // 设置终端
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            app,
            input_handler: InputHandler::new(config.keybindings),
            renderer: Renderer::new(&config.tui.colors),
            tick_rate: Duration::from_millis(config.tui.refresh_rate_ms),
            terminal,
        })
    }

    /// 运行TUI应用主循环
    pub fn run(&mut self) -> Result<()> {
        let result = self.event_loop();
        // 无论主循环是否出错都恢复终端状态
        self.cleanup()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let events = EventHandler::new(self.tick_rate);

        while !self.app.should_quit {
            self.terminal.draw(|f| {
                self.renderer.draw(f, &self.app);
            })?;

            match events.next()? {
                Event::Input(key) => {
                    let action = self.input_handler.handle_key_event(key);
                    self.app.apply(action);
                }
                Event::Tick => {}
            }
        }
        Ok(())
    }

    // 清理终端设置
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}
