// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use jobhound::domain::models::{JobRecord, SearchRequest};
use jobhound::domain::services::JobMatcher;

fn posting(title: &str, location: &str) -> JobRecord {
    JobRecord::new(title, "Acme", "https://acme.example/jobs/1", "test")
        .unwrap()
        .with_location(location)
}

#[test]
fn test_qa_engineer_matches_sdet_but_not_marketing() {
    // Given: 搜索 QA Engineer
    let matcher = JobMatcher::default();
    let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Any".into()]);

    // Then: SDET 命中同义词，市场岗位不命中
    assert!(matcher.matches(&posting("Senior SDET (Test Automation)", "Austin, TX"), &request));
    assert!(!matcher.matches(&posting("Marketing Manager", "Austin, TX"), &request));
}

#[test]
fn test_remote_only_requires_remote_marker() {
    // Given: 只要远程职位
    let matcher = JobMatcher::default();
    let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["San Francisco".into()])
        .with_remote_only(true);

    // Then: 现场职位被排除，远程职位保留
    assert!(!matcher.matches(&posting("QA Engineer", "San Francisco, CA"), &request));
    assert!(matcher.matches(&posting("QA Engineer", "Remote - US"), &request));
}

#[test]
fn test_remote_location_accepts_distributed_and_anywhere() {
    let matcher = JobMatcher::default();
    let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()]);

    assert!(matcher.matches(&posting("QA Engineer", "Distributed"), &request));
    assert!(matcher.matches(&posting("QA Engineer", "Anywhere in EMEA"), &request));
    assert!(!matcher.matches(&posting("QA Engineer", "Berlin"), &request));
}

#[test]
fn test_word_overlap_threshold_is_configurable() {
    // 查询的 4 个词中只有 3 个出现在职位文本里
    let job = posting("Payments Risk Analyst", "Remote");
    let request = SearchRequest::new(
        vec!["Senior Payments Risk Analyst".into()],
        vec!["Remote".into()],
    );

    assert!(JobMatcher::new(0.7).matches(&job, &request));
    assert!(!JobMatcher::new(0.9).matches(&job, &request));
}
