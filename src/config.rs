use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "run_explorer.toml";

pub fn load_config(config_path: &str) -> Result<Config> {
    // 检查配置文件是否存在，如果不存在则创建默认配置
    if !Path::new(config_path).exists() {
        create_default_config(config_path)?;
        info!("Created default config file at {}", config_path);
    }

    // 读取配置文件内容
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path))?;

    // 解析TOML配置
    let config: Config = toml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file: {}", config_path))?;

    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"[general]
# 宿主页面，需包含 id 为 experiments-tbody 与 run-name 的元素
page_path = "index.html"
# 留空时输出到标准输出
output_path = ""
data_path = "./mlruns/experiments.json"

[elements]
table_body_id = "experiments-tbody"
run_name_id = "run-name"

[fetch]
# 留空时从页面所在目录读取文件；否则为页面的 URL
base_url = ""
timeout_secs = 10

[snapshot]
mlruns_dir = "mlruns"
output_path = "mlruns/experiments.json"
run_id = ""

[tui]
refresh_rate_ms = 250
colors = { heading = "magenta", header = "cyan", selected = "yellow", text = "white", border = "cyan" }

[keybindings]
up = "up"
down = "down"
quit = "q"
"#;

fn create_default_config(config_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(config_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to create default config file: {}", config_path))?;

    Ok(())
}
