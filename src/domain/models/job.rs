// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 职位记录构造错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobRecordError {
    #[error("job record field `{0}` must not be empty")]
    EmptyField(&'static str),
}

/// 标准化后的职位记录
///
/// 不可变值对象：`title`、`company`、`url`、`source` 始终非空，
/// 所有 `with_*` 方法都会消费旧值并返回新记录。
/// 同一次搜索中以 `url` 作为去重键。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJobRecord")]
pub struct JobRecord {
    title: String,
    company: String,
    location: String,
    url: String,
    source: String,
    posted_date: Option<String>,
    salary: Option<String>,
    employment_type: Option<String>,
    remote: Option<bool>,
    description: String,
}

/// 反序列化时的原始形态，经过校验后才会成为 `JobRecord`
#[derive(Deserialize)]
struct RawJobRecord {
    title: String,
    company: String,
    #[serde(default)]
    location: String,
    url: String,
    source: String,
    #[serde(default)]
    posted_date: Option<String>,
    #[serde(default)]
    salary: Option<String>,
    #[serde(default)]
    employment_type: Option<String>,
    #[serde(default)]
    remote: Option<bool>,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawJobRecord> for JobRecord {
    type Error = JobRecordError;

    fn try_from(raw: RawJobRecord) -> Result<Self, Self::Error> {
        let record = JobRecord::new(raw.title, raw.company, raw.url, raw.source)?;
        Ok(JobRecord {
            location: raw.location,
            posted_date: raw.posted_date,
            salary: raw.salary,
            employment_type: raw.employment_type,
            remote: raw.remote,
            description: raw.description,
            ..record
        })
    }
}

fn required(value: impl Into<String>, field: &'static str) -> Result<String, JobRecordError> {
    let value = value.into().trim().to_string();
    if value.is_empty() {
        Err(JobRecordError::EmptyField(field))
    } else {
        Ok(value)
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl JobRecord {
    /// 创建职位记录
    ///
    /// # 参数
    ///
    /// * `title` - 职位名称
    /// * `company` - 雇主名称
    /// * `url` - 申请链接（去重键）
    /// * `source` - 来源标识（策略或聚合源名称）
    ///
    /// # 返回值
    ///
    /// 任一必填字段去除空白后为空时返回 `JobRecordError::EmptyField`
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, JobRecordError> {
        Ok(Self {
            title: required(title, "title")?,
            company: required(company, "company")?,
            location: String::new(),
            url: required(url, "url")?,
            source: required(source, "source")?,
            posted_date: None,
            salary: None,
            employment_type: None,
            remote: None,
            description: String::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn posted_date(&self) -> Option<&str> {
        self.posted_date.as_deref()
    }

    pub fn salary(&self) -> Option<&str> {
        self.salary.as_deref()
    }

    pub fn employment_type(&self) -> Option<&str> {
        self.employment_type.as_deref()
    }

    pub fn remote(&self) -> Option<bool> {
        self.remote
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into().trim().to_string(),
            ..self
        }
    }

    /// 替换雇主名称；空字符串被忽略以保持不变量
    pub fn with_company(self, company: impl Into<String>) -> Self {
        match required(company, "company") {
            Ok(company) => Self { company, ..self },
            Err(_) => self,
        }
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        match required(source, "source") {
            Ok(source) => Self { source, ..self },
            Err(_) => self,
        }
    }

    pub fn with_posted_date(self, posted_date: Option<String>) -> Self {
        Self {
            posted_date: optional(posted_date),
            ..self
        }
    }

    pub fn with_salary(self, salary: Option<String>) -> Self {
        Self {
            salary: optional(salary),
            ..self
        }
    }

    pub fn with_employment_type(self, employment_type: Option<String>) -> Self {
        Self {
            employment_type: optional(employment_type),
            ..self
        }
    }

    pub fn with_remote(self, remote: Option<bool>) -> Self {
        Self { remote, ..self }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    /// 用于匹配的合并文本（标题 + 雇主 + 地点 + 描述）
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title, self.company, self.location, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JobRecord {
        JobRecord::new(
            "Staff Engineer",
            "Acme",
            "https://jobs.acme.io/1",
            "greenhouse",
        )
        .unwrap()
        .with_location("Remote - US")
        .with_salary(Some("$150k - $190k".to_string()))
        .with_employment_type(Some("Full-time".to_string()))
        .with_remote(Some(true))
        .with_posted_date(Some("2024-05-01".to_string()))
        .with_description("Build the platform.")
    }

    #[test]
    fn test_required_fields_are_enforced() {
        assert_eq!(
            JobRecord::new("  ", "Acme", "https://x", "src").unwrap_err(),
            JobRecordError::EmptyField("title")
        );
        assert_eq!(
            JobRecord::new("Eng", "", "https://x", "src").unwrap_err(),
            JobRecordError::EmptyField("company")
        );
        assert_eq!(
            JobRecord::new("Eng", "Acme", "", "src").unwrap_err(),
            JobRecordError::EmptyField("url")
        );
        assert_eq!(
            JobRecord::new("Eng", "Acme", "https://x", " ").unwrap_err(),
            JobRecordError::EmptyField("source")
        );
    }

    #[test]
    fn test_with_methods_produce_new_values() {
        let original = sample();
        let renamed = original.clone().with_company("Acme Corp");
        assert_eq!(original.company(), "Acme");
        assert_eq!(renamed.company(), "Acme Corp");
        assert_eq!(renamed.url(), original.url());

        let unchanged = original.clone().with_company("   ");
        assert_eq!(unchanged.company(), "Acme");
    }

    #[test]
    fn test_optional_fields_drop_blank_values() {
        let job = sample().with_salary(Some("  ".to_string()));
        assert_eq!(job.salary(), None);
    }

    #[test]
    fn test_serde_preserves_every_field() {
        let job = sample();
        let json = serde_json::to_string(&job).unwrap();
        let back: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(job, back);
    }

    #[test]
    fn test_deserialize_rejects_invalid_records() {
        let json = r#"{"title":"","company":"Acme","url":"https://x","source":"s"}"#;
        assert!(serde_json::from_str::<JobRecord>(json).is_err());
    }
}
