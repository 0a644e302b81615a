use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;

/// 指标值：数值或字符串
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(Number),
    Text(String),
}

impl MetricValue {
    /// 按页面上显示的方式转换为字符串（整数值不带小数点）
    pub fn to_display_string(&self) -> String {
        match self {
            MetricValue::Text(s) => s.clone(),
            MetricValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    i.to_string()
                } else if let Some(u) = n.as_u64() {
                    u.to_string()
                } else {
                    n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
                }
            }
        }
    }
}

/// 按 JavaScript `Number.prototype.toString` 的规则格式化浮点数
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // -0 也显示为 0
        return "0".to_string();
    }

    // 最短往返表示：digits × 10^(n - k)
    let sci = format!("{:e}", value.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return value.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return value.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exp + 1;

    let body = if k <= n && n <= 21 {
        format!("{}{}", digits, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac_part) = digits.split_at(n as usize);
        format!("{}.{}", int_part, frac_part)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), digits)
    } else {
        let (lead, rest) = digits.split_at(1);
        let mantissa = if rest.is_empty() {
            lead.to_string()
        } else {
            format!("{}.{}", lead, rest)
        };
        let sign = if n - 1 >= 0 { '+' } else { '-' };
        format!("{}e{}{}", mantissa, sign, (n - 1).abs())
    };

    if value < 0.0 { format!("-{}", body) } else { body }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        // JSON 无法表示 NaN/Infinity，退化为字符串
        Number::from_f64(value)
            .map(MetricValue::Number)
            .unwrap_or_else(|| MetricValue::Text(format_float(value)))
    }
}

/// 为MetricValue实现Display trait，支持format!("{}", value)语法
impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}
