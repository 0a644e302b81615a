use crate::models::KeybindingsConfig;
use crossterm::event::{KeyCode, KeyEvent};

/// 输入处理器，负责将按键事件映射到应用操作
pub struct InputHandler {
    keybindings: KeybindingsConfig,
}

/// 用户操作类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserAction {
    Quit,
    MoveUp,
    MoveDown,
    None,
}

impl InputHandler {
    pub fn new(keybindings: KeybindingsConfig) -> Self {
        Self { keybindings }
    }

    /// 处理按键事件，返回对应的用户操作
    pub fn handle_key_event(&self, key_event: KeyEvent) -> UserAction {
        match key_event.code {
            KeyCode::Esc => UserAction::Quit,
            KeyCode::Up => self.find_matching_action("up"),
            KeyCode::Down => self.find_matching_action("down"),
            KeyCode::Char(c) => self.find_matching_action(&c.to_string()),
            _ => UserAction::None,
        }
    }

    /// 查找匹配的操作
    fn find_matching_action(&self, key_str: &str) -> UserAction {
        let action_map = [
            (self.keybindings.quit.as_str(), UserAction::Quit),
            (self.keybindings.up.as_str(), UserAction::MoveUp),
            (self.keybindings.down.as_str(), UserAction::MoveDown),
        ];
        for (key, action) in action_map {
            if key_str == key {
                return action;
            }
        }
        UserAction::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_handler() {
        let input_handler = InputHandler::new(KeybindingsConfig::default());

        // 测试退出键
        let quit_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(input_handler.handle_key_event(quit_event), UserAction::Quit);

        // 测试方向键
        let up_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(input_handler.handle_key_event(up_event), UserAction::MoveUp);

        let down_event = KeyEvent::from(KeyCode::Down);
        assert_eq!(input_handler.handle_key_event(down_event), UserAction::MoveDown);

        // 测试ESC键
        let esc_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(input_handler.handle_key_event(esc_event), UserAction::Quit);

        let other_event = KeyEvent::from(KeyCode::Char('z'));
        assert_eq!(input_handler.handle_key_event(other_event), UserAction::None);
    }

    #[test]
    fn test_custom_keybindings() {
        let keybindings = KeybindingsConfig {
            up: "k".to_string(),
            down: "j".to_string(),
            quit: "x".to_string(),
        };

        let input_handler = InputHandler::new(keybindings);

        // 测试自定义退出键
        let quit_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(input_handler.handle_key_event(quit_event), UserAction::Quit);

        // 测试vim风格移动键
        let up_event = KeyEvent::from(KeyCode::Char('k'));
        assert_eq!(input_handler.handle_key_event(up_event), UserAction::MoveUp);

        let down_event = KeyEvent::from(KeyCode::Char('j'));
        assert_eq!(input_handler.handle_key_event(down_event), UserAction::MoveDown);

        // 方向键绑定被替换后不再生效
        let arrow_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(input_handler.handle_key_event(arrow_event), UserAction::None);
    }
}
