// src/snapshot.rs
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::models::record::RUN_NAME_TAG;
use crate::models::{ExperimentRecord, MetricValue};

const META_FILE: &str = "meta.yaml";
const DELETED_STAGE: &str = "deleted";

/// MLflow 运行目录中的 meta.yaml（只取用到的字段）
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RunMeta {
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub run_uuid: Option<String>,
    #[serde(default)]
    pub run_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub lifecycle_stage: Option<String>,
}

impl RunMeta {
    /// MLflow RunStatus 编号对应的名称
    pub fn status_name(&self) -> &'static str {
        match self.status {
            Some(1) => "RUNNING",
            Some(2) => "SCHEDULED",
            Some(3) => "FINISHED",
            Some(4) => "FAILED",
            Some(5) => "KILLED",
            _ => "UNKNOWN",
        }
    }
}

/// 一个运行目录及其元数据
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub dir: PathBuf,
    pub meta: RunMeta,
}

impl RunSummary {
    /// 运行 id：优先 run_id，其次 run_uuid，最后目录名
    pub fn id(&self) -> String {
        self.meta
            .run_id
            .clone()
            .or_else(|| self.meta.run_uuid.clone())
            .unwrap_or_else(|| {
                self.dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }

    pub fn is_deleted(&self) -> bool {
        self.meta.lifecycle_stage.as_deref() == Some(DELETED_STAGE)
    }
}

/// 遍历文件存储，收集所有 `<experiment>/<run>/meta.yaml` 所在的运行目录
pub fn find_run_dirs(mlruns_dir: &Path) -> Result<Vec<PathBuf>> {
    // 检查目录是否存在
    if !mlruns_dir.exists() {
        anyhow::bail!("MLflow store '{}' does not exist", mlruns_dir.display());
    }

    if !mlruns_dir.is_dir() {
        anyhow::bail!("'{}' is not a directory", mlruns_dir.display());
    }

    let mut run_dirs: Vec<PathBuf> = WalkDir::new(mlruns_dir)
        .min_depth(3)
        .max_depth(3)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == META_FILE)
        .filter(|entry| !in_hidden_dir(entry.path(), mlruns_dir))
        .filter_map(|entry| entry.path().parent().map(Path::to_path_buf))
        .collect();

    run_dirs.sort();
    Ok(run_dirs)
}

// .trash 等隐藏目录中是已删除的实验
fn in_hidden_dir(path: &Path, root: &Path) -> bool {
    path.strip_prefix(root)
        .map(|relative| {
            relative
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        })
        .unwrap_or(false)
}

pub fn read_run_meta(run_dir: &Path) -> Result<RunMeta> {
    let path = run_dir.join(META_FILE);
    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read run metadata: {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse YAML from file: {}", path.display()))
}

/// 批量读取运行元数据，解析失败的目录跳过
pub fn read_run_summaries(run_dirs: &[PathBuf]) -> Vec<RunSummary> {
    let mut summaries = Vec::new();
    for dir in run_dirs {
        match read_run_meta(dir) {
            Ok(meta) => summaries.push(RunSummary { dir: dir.clone(), meta }),
            Err(e) => warn!("Skipping run {}: {:#}", dir.display(), e),
        }
    }
    summaries
}

/// 选择要导出的运行：指定 id，或未删除运行中开始时间最晚的一个
pub fn select_run<'a>(runs: &'a [RunSummary], run_id: Option<&str>) -> Result<&'a RunSummary> {
    match run_id {
        Some(id) => runs
            .iter()
            .find(|run| run.id() == id)
            .ok_or_else(|| anyhow::anyhow!("Run '{}' not found", id)),
        None => runs
            .iter()
            .filter(|run| !run.is_deleted())
            .max_by_key(|run| run.meta.start_time.unwrap_or(i64::MIN))
            .ok_or_else(|| anyhow::anyhow!("No active runs found")),
    }
}

/// 解析指标文件，返回 step 最大（相同则时间戳最大）的一行的值
///
/// 每行格式为 `<timestamp> <value> <step>`，旧版本没有 step 列。
pub fn parse_metric_history(contents: &str) -> Option<f64> {
    let mut latest: Option<((i64, i64), f64)> = None;
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }
        let (Ok(timestamp), Ok(value)) = (fields[0].parse::<i64>(), fields[1].parse::<f64>()) else {
            continue;
        };
        let step = fields.get(2).and_then(|s| s.parse::<i64>().ok()).unwrap_or(0);
        let key = (step, timestamp);
        if latest.is_none_or(|(best, _)| key >= best) {
            latest = Some((key, value));
        }
    }
    latest.map(|(_, value)| value)
}

/// 读取目录下的所有文件，键为相对路径（用 `/` 连接）
fn read_keyed_files(dir: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in WalkDir::new(dir).min_depth(1).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let contents = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        files.insert(key, contents);
    }
    Ok(files)
}

/// 从运行目录构建实验记录
pub fn read_run(run: &RunSummary) -> Result<ExperimentRecord> {
    let mut record = ExperimentRecord::default();

    for (key, contents) in read_keyed_files(&run.dir.join("metrics"))? {
        match parse_metric_history(&contents) {
            Some(value) => {
                record.metrics.insert(key, MetricValue::from(value));
            }
            None => warn!("Metric '{}' of run {} has no readable values", key, run.id()),
        }
    }

    record.tags = read_keyed_files(&run.dir.join("tags"))?;

    if let Some(run_name) = &run.meta.run_name {
        record
            .tags
            .entry(RUN_NAME_TAG.to_string())
            .or_insert_with(|| run_name.clone());
    }

    Ok(record)
}

/// 从文件存储中选出一个运行并导出为实验记录
pub fn snapshot_run(mlruns_dir: &Path, run_id: Option<&str>) -> Result<ExperimentRecord> {
    let run_dirs = find_run_dirs(mlruns_dir)?;
    info!("Found {} runs in {}", run_dirs.len(), mlruns_dir.display());

    let runs = read_run_summaries(&run_dirs);
    let run = select_run(&runs, run_id)?;
    info!(
        status = run.meta.status_name(),
        "Exporting run {} from {}",
        run.id(),
        run.dir.display()
    );

    read_run(run)
}

pub fn write_snapshot(record: &ExperimentRecord, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(record).context("Failed to serialize experiment record")?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot: {}", path.display()))?;
    info!("Wrote experiment record to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_run(
        root: &Path,
        experiment: &str,
        run_id: &str,
        meta: &str,
        metrics: &[(&str, &str)],
        tags: &[(&str, &str)],
    ) -> PathBuf {
        let run_dir = root.join(experiment).join(run_id);
        fs::create_dir_all(run_dir.join("metrics")).unwrap();
        fs::create_dir_all(run_dir.join("tags")).unwrap();
        fs::write(run_dir.join(META_FILE), meta).unwrap();
        for (name, contents) in metrics {
            let path = run_dir.join("metrics").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        for (name, contents) in tags {
            let path = run_dir.join("tags").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        run_dir
    }

    fn meta(run_id: &str, run_name: &str, start_time: i64, stage: &str) -> String {
        format!(
            "artifact_uri: file:///tmp/mlruns/0/{run_id}/artifacts\n\
             end_time: null\n\
             entry_point_name: ''\n\
             experiment_id: '0'\n\
             lifecycle_stage: {stage}\n\
             run_id: {run_id}\n\
             run_name: {run_name}\n\
             run_uuid: {run_id}\n\
             source_name: ''\n\
             source_type: 4\n\
             source_version: ''\n\
             start_time: {start_time}\n\
             status: 3\n\
             tags: []\n\
             user_id: ana\n"
        )
    }

    #[test]
    fn test_parse_metric_history_takes_latest_step() {
        let contents = "1700000000000 0.9 0\n1700000001000 0.4 2\n1700000002000 0.6 1\n";
        assert_eq!(parse_metric_history(contents), Some(0.4));

        // 相同 step 取时间戳较大的
        let contents = "1700000000000 0.9 3\n1700000005000 0.2 3\n";
        assert_eq!(parse_metric_history(contents), Some(0.2));

        // 旧格式没有 step 列
        assert_eq!(parse_metric_history("1 0.5\n2 0.25\n"), Some(0.25));
        assert_eq!(parse_metric_history("garbage\n"), None);
        assert_eq!(parse_metric_history(""), None);
    }

    #[test]
    fn test_find_run_dirs() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("0")).unwrap();
        fs::write(root.join("0").join(META_FILE), "experiment_id: '0'\nname: Default\n").unwrap();
        write_run(root, "0", "aaa", &meta("aaa", "first", 1, "active"), &[], &[]);
        write_run(root, "1", "bbb", &meta("bbb", "second", 2, "active"), &[], &[]);
        write_run(root, ".trash", "ccc", &meta("ccc", "gone", 3, "deleted"), &[], &[]);

        let dirs = find_run_dirs(root).unwrap();

        assert_eq!(dirs, vec![root.join("0").join("aaa"), root.join("1").join("bbb")]);
    }

    #[test]
    fn test_find_run_dirs_nonexistent_dir() {
        assert!(find_run_dirs(Path::new("/nonexistent/mlruns")).is_err());
    }

    #[test]
    fn test_read_run_meta() {
        let temp_dir = tempdir().unwrap();
        let dir = write_run(temp_dir.path(), "0", "abc", &meta("abc", "run-42", 1700000000000, "active"), &[], &[]);

        let meta = read_run_meta(&dir).unwrap();

        assert_eq!(meta.run_id.as_deref(), Some("abc"));
        assert_eq!(meta.run_name.as_deref(), Some("run-42"));
        assert_eq!(meta.start_time, Some(1700000000000));
        assert_eq!(meta.lifecycle_stage.as_deref(), Some("active"));
        assert_eq!(meta.status, Some(3));
        assert_eq!(meta.status_name(), "FINISHED");
        assert_eq!(RunMeta::default().status_name(), "UNKNOWN");
    }

    #[test]
    fn test_select_run() {
        let runs = vec![
            RunSummary {
                dir: PathBuf::from("mlruns/0/old"),
                meta: RunMeta { run_id: Some("old".into()), start_time: Some(10), ..Default::default() },
            },
            RunSummary {
                dir: PathBuf::from("mlruns/0/new"),
                meta: RunMeta { run_id: Some("new".into()), start_time: Some(20), ..Default::default() },
            },
            RunSummary {
                dir: PathBuf::from("mlruns/0/deleted"),
                meta: RunMeta {
                    run_id: Some("deleted".into()),
                    start_time: Some(30),
                    lifecycle_stage: Some("deleted".into()),
                    ..Default::default()
                },
            },
            RunSummary {
                dir: PathBuf::from("mlruns/0/legacy"),
                meta: RunMeta { run_uuid: Some("legacy".into()), ..Default::default() },
            },
        ];

        assert_eq!(select_run(&runs, None).unwrap().id(), "new");
        assert_eq!(select_run(&runs, Some("old")).unwrap().id(), "old");
        assert_eq!(select_run(&runs, Some("legacy")).unwrap().id(), "legacy");
        assert!(select_run(&runs, Some("missing")).is_err());
        assert!(select_run(&[], None).is_err());
    }

    #[test]
    fn test_snapshot_run_builds_record() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        write_run(
            root,
            "0",
            "older",
            &meta("older", "run-1", 100, "active"),
            &[("eval_loss", "100 0.9 0\n")],
            &[(RUN_NAME_TAG, "run-1")],
        );
        write_run(
            root,
            "0",
            "newer",
            &meta("newer", "run-42", 200, "active"),
            &[
                ("eval_loss", "200 0.5 0\n201 0.12 1\n"),
                ("eval_accuracy", "200 0.95 1\n"),
                ("val/f1", "200 0.7 1\n"),
            ],
            &[("mlflow.source.name", "train.py"), ("mlflow.user", "ana")],
        );

        let record = snapshot_run(root, None).unwrap();

        assert_eq!(record.summary_row().cells(), ["train.py", "0.12", "0.95"]);
        // tags 中没有 runName 时取 meta.yaml 中的 run_name
        assert_eq!(record.run_name(), "run-42");
        assert!(record.metrics.contains_key("val/f1"));
        assert_eq!(record.tags.get("mlflow.user").map(String::as_str), Some("ana"));

        let record = snapshot_run(root, Some("older")).unwrap();
        assert_eq!(record.run_name(), "run-1");
    }

    #[test]
    fn test_write_snapshot_round_trips_through_decode() {
        let temp_dir = tempdir().unwrap();
        let mut record = ExperimentRecord::default();
        record.metrics.insert("eval_loss".into(), MetricValue::from(0.12));
        record.tags.insert(RUN_NAME_TAG.into(), "run-42".into());

        let path = temp_dir.path().join("site").join("mlruns").join("experiments.json");
        write_snapshot(&record, &path).unwrap();

        let body = fs::read(&path).unwrap();
        let decoded = ExperimentRecord::decode("experiments.json", &body).unwrap();
        assert_eq!(decoded, record);
    }
}
