// src/fetch.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::LoadError;
use crate::models::FetchConfig;

/// 按相对路径获取资源的能力（文件或 HTTP）
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// 从宿主页面所在目录读取文件
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 以页面所在目录作为相对路径的根
    pub fn for_page(page_path: &Path) -> Self {
        let root = page_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }

    pub fn resolve(&self, location: &str) -> PathBuf {
        let relative = location.strip_prefix("./").unwrap_or(location);
        let path = Path::new(relative);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl Fetch for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(location);
        debug!("Reading {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| LoadError::unavailable(location, format!("{}: {}", path.display(), e)))
    }
}

/// 通过 HTTP GET 获取资源，路径相对页面 URL 解析
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid base URL: {}", base_url))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    pub fn resolve(&self, location: &str) -> Result<Url, LoadError> {
        self.base
            .join(location)
            .map_err(|e| LoadError::unavailable(location, e))
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let url = self.resolve(location)?;
        debug!("GET {}", url);

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LoadError::unavailable(location, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::unavailable(
                location,
                format!("HTTP status {} from {}", status, url),
            ));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| LoadError::unavailable(location, e))?;
        Ok(body.to_vec())
    }
}

/// 根据配置选择的获取方式
#[derive(Debug, Clone)]
pub enum Fetcher {
    File(FileFetcher),
    Http(HttpFetcher),
}

impl Fetcher {
    pub fn from_config(config: &FetchConfig, page_path: &Path) -> Result<Self> {
        match &config.base_url {
            Some(base_url) => Ok(Fetcher::Http(HttpFetcher::new(
                base_url,
                Duration::from_secs(config.timeout_secs),
            )?)),
            None => Ok(Fetcher::File(FileFetcher::for_page(page_path))),
        }
    }
}

#[async_trait]
impl Fetch for Fetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        match self {
            Fetcher::File(f) => f.fetch(location).await,
            Fetcher::Http(f) => f.fetch(location).await,
        }
    }
}
