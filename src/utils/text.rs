// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 文本清洗工具
//!
//! 抓取到的标题、地点与描述在进入 `JobRecord` 之前统一经过这里处理

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 解码 HTML 实体并折叠空白
pub fn clean_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// 将 HTML 片段转换为纯文本
pub fn html_to_text(html: &str) -> String {
    // Greenhouse 等接口返回的是被转义过一次的 HTML
    let decoded = html_escape::decode_html_entities(html);
    let fragment = Html::parse_fragment(&decoded);
    let text = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    clean_text(&text)
}

/// 截断为不超过 `max_chars` 个字符的摘要，尽量在单词边界处截断
pub fn snippet(raw: &str, max_chars: usize) -> String {
    let text = clean_text(raw);
    if text.chars().count() <= max_chars {
        return text;
    }

    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > max_chars / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}…", trimmed.trim_end())
}

/// 生成 URL 友好的 slug
pub fn slugify(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut last_dash = true;
    for ch in ascii.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// 将 slug 形式的标识还原为标题格式，例如 `acme-corp` -> `Acme Corp`
pub fn titleize(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
