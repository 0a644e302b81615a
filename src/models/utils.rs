use serde::{Deserialize, Deserializer};

/// 可选配置项：去掉首尾空白，空值视为未设置
pub fn trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Section {
        #[serde(default, deserialize_with = "trimmed_option")]
        base_url: Option<String>,
    }

    fn parse(source: &str) -> Option<String> {
        toml::from_str::<Section>(source).unwrap().base_url
    }

    #[test]
    fn test_trimmed_option() {
        assert_eq!(
            parse("base_url = \" http://localhost:8000/index.html \""),
            Some("http://localhost:8000/index.html".to_string())
        );
        assert_eq!(parse("base_url = ''"), None);
        assert_eq!(parse("base_url = '   '"), None);
        // 缺省字段
        assert_eq!(parse(""), None);
    }
}
