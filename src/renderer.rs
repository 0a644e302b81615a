// src/renderer.rs
use tracing::{error, info};

use crate::document::HostDocument;
use crate::error::LoadError;
use crate::fetch::Fetch;
use crate::models::{ElementsConfig, ExperimentRecord, RunRow};

/// 实验记录相对宿主页面的固定路径
pub const EXPERIMENTS_PATH: &str = "./mlruns/experiments.json";

pub const LOAD_FAILURE_MESSAGE: &str = "Error loading experiments";

/// 可追加行的表体
pub trait TableBody {
    fn append_row(&mut self, row: &RunRow);
}

/// 可设置文本内容的元素
pub trait TextContent {
    fn set_content(&mut self, text: &str);
}

/// 诊断输出通道
pub trait DiagnosticSink {
    fn report(&self, message: &str, error: &LoadError);
}

/// 通过 tracing 输出诊断信息
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, message: &str, error: &LoadError) {
        error!(kind = error.kind().as_str(), "{}: {}", message, error);
    }
}

/// 一次渲染对文档做了哪些修改
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderOutcome {
    pub row_appended: bool,
    pub run_name_set: bool,
}

/// 获取并解码实验记录
pub async fn load_record<F>(fetcher: &F, location: &str) -> Result<ExperimentRecord, LoadError>
where
    F: Fetch + ?Sized,
{
    let body = fetcher.fetch(location).await?;
    ExperimentRecord::decode(location, &body)
}

/// 用已解码的记录填充表体和运行名称
///
/// - `metrics` 非空时追加恰好一行（重复调用会重复追加）
/// - `tags` 非空时覆盖运行名称，否则保持原内容
pub fn apply_record<T, P>(record: &ExperimentRecord, tbody: &mut T, run_name: &mut P) -> RenderOutcome
where
    T: TableBody + ?Sized,
    P: TextContent + ?Sized,
{
    let mut outcome = RenderOutcome::default();
    if !record.metrics.is_empty() {
        tbody.append_row(&record.summary_row());
        outcome.row_appended = true;
    }
    if !record.tags.is_empty() {
        run_name.set_content(&record.run_name());
        outcome.run_name_set = true;
    }
    outcome
}

/// 获取并解码实验记录，然后填充表体和运行名称
///
/// 任何获取或解码错误都在修改目标之前返回。
pub async fn load_and_render<F, T, P>(
    fetcher: &F,
    location: &str,
    tbody: &mut T,
    run_name: &mut P,
) -> Result<RenderOutcome, LoadError>
where
    F: Fetch + ?Sized,
    T: TableBody + ?Sized,
    P: TextContent + ?Sized,
{
    let record = load_record(fetcher, location).await?;
    Ok(apply_record(&record, tbody, run_name))
}

fn log_outcome(outcome: RenderOutcome, location: &str) {
    info!(
        row_appended = outcome.row_appended,
        run_name_set = outcome.run_name_set,
        "Rendered experiment record from {}",
        location
    );
}

/// 外层边界：失败时输出一条诊断信息，不重试也不向上抛出
pub async fn run_once<F, T, P, S>(
    fetcher: &F,
    location: &str,
    tbody: &mut T,
    run_name: &mut P,
    sink: &S,
) -> Option<RenderOutcome>
where
    F: Fetch + ?Sized,
    T: TableBody + ?Sized,
    P: TextContent + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    match load_and_render(fetcher, location, tbody, run_name).await {
        Ok(outcome) => {
            log_outcome(outcome, location);
            Some(outcome)
        }
        Err(e) => {
            sink.report(LOAD_FAILURE_MESSAGE, &e);
            None
        }
    }
}

/// 在宿主页面上执行一次加载与渲染
///
/// 目标元素只在对应分支执行时定位。表体缺失时不再设置运行名称；
/// 运行名称元素缺失时已追加的行保留。两种情况都只输出一条诊断信息。
pub async fn render_document<F, S>(
    document: &mut HostDocument,
    elements: &ElementsConfig,
    fetcher: &F,
    location: &str,
    sink: &S,
) -> Option<RenderOutcome>
where
    F: Fetch + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    let result = match load_record(fetcher, location).await {
        Ok(record) => apply_to_document(document, elements, &record),
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => {
            log_outcome(outcome, location);
            Some(outcome)
        }
        Err(e) => {
            sink.report(LOAD_FAILURE_MESSAGE, &e);
            None
        }
    }
}

fn apply_to_document(
    document: &mut HostDocument,
    elements: &ElementsConfig,
    record: &ExperimentRecord,
) -> Result<RenderOutcome, LoadError> {
    let mut outcome = RenderOutcome::default();
    if !record.metrics.is_empty() {
        let mut tbody = document.table_body(&elements.table_body_id)?;
        tbody.append_row(&record.summary_row());
        document.commit(&tbody)?;
        outcome.row_appended = true;
    }
    if !record.tags.is_empty() {
        let mut run_name = document.text_element(&elements.run_name_id)?;
        run_name.set_content(&record.run_name());
        document.commit(&run_name)?;
        outcome.run_name_set = true;
    }
    Ok(outcome)
}
