// src/document.rs
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::LoadError;
use crate::models::RunRow;
use crate::renderer::{TableBody, TextContent};

/// 宿主 HTML 页面
///
/// 只做按 id 定位元素并替换其内部 HTML 这一件事，不是完整的 HTML 解析器。
#[derive(Debug, Clone, PartialEq)]
pub struct HostDocument {
    source: String,
}

/// 元素内部内容在源文本中的字节范围
#[derive(Debug, Clone, PartialEq)]
struct ElementSpan {
    inner_start: usize,
    inner_end: usize,
}

/// 从文档中取出的元素句柄，修改后通过 `HostDocument::commit` 写回
pub trait ElementHandle {
    fn id(&self) -> &str;
    fn inner_html(&self) -> &str;
}

/// 表体元素句柄
#[derive(Debug, Clone, PartialEq)]
pub struct TableBodyElement {
    id: String,
    inner_html: String,
}

impl TableBody for TableBodyElement {
    fn append_row(&mut self, row: &RunRow) {
        self.inner_html.push_str(&row_markup(row));
    }
}

impl ElementHandle for TableBodyElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

/// 文本元素句柄
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    id: String,
    inner_html: String,
}

impl TextContent for TextElement {
    fn set_content(&mut self, text: &str) {
        self.inner_html = escape_text(text);
    }
}

impl ElementHandle for TextElement {
    fn id(&self) -> &str {
        &self.id
    }

    fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

impl HostDocument {
    pub fn parse(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read host page: {}", path.display()))?;
        Ok(Self::parse(source))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.source)
            .with_context(|| format!("Failed to write rendered page: {}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn inner_html(&self, id: &str) -> Option<&str> {
        self.locate(id)
            .map(|span| &self.source[span.inner_start..span.inner_end])
    }

    pub fn table_body(&self, id: &str) -> Result<TableBodyElement, LoadError> {
        let inner_html = self.inner_html(id).ok_or_else(|| LoadError::missing_element(id))?;
        Ok(TableBodyElement {
            id: id.to_string(),
            inner_html: inner_html.to_string(),
        })
    }

    pub fn text_element(&self, id: &str) -> Result<TextElement, LoadError> {
        let inner_html = self.inner_html(id).ok_or_else(|| LoadError::missing_element(id))?;
        Ok(TextElement {
            id: id.to_string(),
            inner_html: inner_html.to_string(),
        })
    }

    /// 将句柄的内部 HTML 写回文档
    pub fn commit<H: ElementHandle + ?Sized>(&mut self, handle: &H) -> Result<(), LoadError> {
        let span = self
            .locate(handle.id())
            .ok_or_else(|| LoadError::missing_element(handle.id()))?;
        self.source
            .replace_range(span.inner_start..span.inner_end, handle.inner_html());
        Ok(())
    }

    /// 查找 id 属性匹配的开始标签及其对应的结束标签
    fn locate(&self, id: &str) -> Option<ElementSpan> {
        let src = self.source.as_str();
        let mut pos = 0;
        while let Some(rel) = src[pos..].find('<') {
            let start = pos + rel;
            let rest = &src[start + 1..];
            let gt = rest.find('>')?;
            let tag_text = &rest[..gt];
            let after = start + 1 + gt + 1;

            let tag = tag_name(tag_text);
            if !tag.is_empty() && attribute_value(tag_text, "id") == Some(id) {
                // 自闭合元素没有可写入的内容
                if tag_text.trim_end().ends_with('/') {
                    return None;
                }
                let inner_end = find_closing_tag(src, &tag, after)?;
                return Some(ElementSpan {
                    inner_start: after,
                    inner_end,
                });
            }
            pos = after;
        }
        None
    }
}

fn tag_name(tag_text: &str) -> String {
    tag_text
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect::<String>()
        .to_ascii_lowercase()
}

/// 按名称查找属性值，名称不区分大小写，`=` 两侧允许空白
fn attribute_value<'a>(tag_text: &'a str, name: &str) -> Option<&'a str> {
    let is_space = |c: char| c.is_ascii_whitespace();
    // 跳过标签名
    let mut rest = tag_text.trim_start_matches(|c: char| !is_space(c) && c != '/');
    loop {
        rest = rest.trim_start_matches(|c: char| is_space(c) || c == '/');
        if rest.is_empty() {
            return None;
        }
        let name_end = rest
            .find(|c: char| is_space(c) || c == '=' || c == '/')
            .unwrap_or(rest.len());
        let attr = &rest[..name_end];
        rest = rest[name_end..].trim_start_matches(is_space);

        let value = match rest.strip_prefix('=') {
            Some(after_eq) => {
                let after_eq = after_eq.trim_start_matches(is_space);
                match after_eq.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let body = &after_eq[1..];
                        let end = body.find(quote)?;
                        rest = &body[end + 1..];
                        &body[..end]
                    }
                    _ => {
                        let end = after_eq.find(is_space).unwrap_or(after_eq.len());
                        rest = &after_eq[end..];
                        after_eq[..end].trim_end_matches('/')
                    }
                }
            }
            // 无值属性
            None => "",
        };

        if attr.eq_ignore_ascii_case(name) {
            return Some(value);
        }
    }
}

/// 返回与开始标签匹配的结束标签位置，计入同名标签的嵌套
fn find_closing_tag(src: &str, tag: &str, from: usize) -> Option<usize> {
    let lower = src.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}", tag);
    let mut depth = 0usize;
    let mut pos = from;
    loop {
        let next_close = find_tag(&lower, &close, pos)?;
        match find_tag(&lower, &open, pos) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                pos = next_open + open.len();
            }
            _ => {
                if depth == 0 {
                    return Some(next_close);
                }
                depth -= 1;
                pos = next_close + close.len();
            }
        }
    }
}

fn find_tag(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let mut pos = from;
    while let Some(rel) = haystack[pos..].find(needle) {
        let at = pos + rel;
        match haystack.as_bytes().get(at + needle.len()) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(at),
            _ => pos = at + needle.len(),
        }
    }
    None
}

fn row_markup(row: &RunRow) -> String {
    let cells: String = row
        .cells()
        .iter()
        .map(|cell| format!("<td>{}</td>", escape_text(cell)))
        .collect();
    format!("<tr>{}</tr>", cells)
}

fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
