use serde::Deserialize;

/// 应用程序配置结构
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub elements: ElementsConfig,
    pub fetch: FetchConfig,
    pub snapshot: SnapshotConfig,
    pub tui: TuiConfig,
    pub keybindings: KeybindingsConfig,
}

/// 通用配置
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub page_path: String,
    #[serde(deserialize_with = "crate::models::utils::trimmed_option")]
    pub output_path: Option<String>,
    // 相对于宿主页面的数据路径
    pub data_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            page_path: "index.html".to_string(),
            output_path: None,
            data_path: crate::renderer::EXPERIMENTS_PATH.to_string(),
        }
    }
}

/// 宿主页面中的目标元素
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElementsConfig {
    pub table_body_id: String,
    pub run_name_id: String,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            table_body_id: "experiments-tbody".to_string(),
            run_name_id: "run-name".to_string(),
        }
    }
}

/// 数据获取配置
///
/// `base_url` 为空时从本地文件系统读取（相对于页面所在目录），
/// 否则视为页面地址，数据路径按浏览器规则相对它解析。
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    #[serde(deserialize_with = "crate::models::utils::trimmed_option")]
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

/// MLflow 文件存储快照配置
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotConfig {
    pub mlruns_dir: String,
    pub output_path: String,
    #[serde(deserialize_with = "crate::models::utils::trimmed_option")]
    pub run_id: Option<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            mlruns_dir: "mlruns".to_string(),
            output_path: "mlruns/experiments.json".to_string(),
            run_id: None,
        }
    }
}

/// TUI界面配置
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TuiConfig {
    pub refresh_rate_ms: u64,
    pub colors: ColorConfig,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 250,
            colors: ColorConfig::default(),
        }
    }
}

/// 颜色配置
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorConfig {
    pub heading: String,
    pub header: String,
    pub selected: String,
    pub text: String,
    pub border: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            heading: "magenta".to_string(),
            header: "cyan".to_string(),
            selected: "yellow".to_string(),
            text: "white".to_string(),
            border: "cyan".to_string(),
        }
    }
}

/// 键盘绑定配置
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub up: String,
    pub down: String,
    pub quit: String,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            up: "up".to_string(),
            down: "down".to_string(),
            quit: "q".to_string(),
        }
    }
}
