use crate::error::LoadError;
use crate::models::metric_value::MetricValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SOURCE_NAME_TAG: &str = "mlflow.source.name";
pub const RUN_NAME_TAG: &str = "mlflow.runName";
pub const EVAL_LOSS_METRIC: &str = "eval_loss";
pub const EVAL_ACCURACY_METRIC: &str = "eval_accuracy";

/// 一次实验运行的记录，对应 experiments.json
///
/// `metrics` 和 `tags` 两个字段都必须存在（可以为空对象），
/// 缺失时解码失败而不是在渲染阶段出错。
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExperimentRecord {
    pub metrics: BTreeMap<String, MetricValue>,
    pub tags: BTreeMap<String, String>,
}

/// 表格中的一行：来源文件、评估损失、评估准确率
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRow {
    pub source_name: String,
    pub eval_loss: String,
    pub eval_accuracy: String,
}

impl RunRow {
    pub fn cells(&self) -> [&str; 3] {
        [&self.source_name, &self.eval_loss, &self.eval_accuracy]
    }
}

impl ExperimentRecord {
    /// 将响应体解码为实验记录
    ///
    /// 先解析为通用 JSON（失败即 `MalformedData`），
    /// 再转换为强类型记录（失败即 `ShapeMismatch`）。
    pub fn decode(location: &str, body: &[u8]) -> Result<Self, LoadError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|source| LoadError::MalformedData {
                location: location.to_string(),
                source,
            })?;

        serde_json::from_value(value).map_err(|e| LoadError::shape(location, e))
    }

    fn metric(&self, key: &str) -> String {
        self.metrics
            .get(key)
            .map(MetricValue::to_display_string)
            .unwrap_or_default()
    }

    fn tag(&self, key: &str) -> String {
        self.tags.get(key).cloned().unwrap_or_default()
    }

    /// 缺失的键显示为空单元格
    pub fn summary_row(&self) -> RunRow {
        RunRow {
            source_name: self.tag(SOURCE_NAME_TAG),
            eval_loss: self.metric(EVAL_LOSS_METRIC),
            eval_accuracy: self.metric(EVAL_ACCURACY_METRIC),
        }
    }

    pub fn run_name(&self) -> String {
        self.tag(RUN_NAME_TAG)
    }
}
