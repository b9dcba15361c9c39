// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::build_stack;
use jobhound::domain::models::SearchRequest;
use jobhound::domain::repositories::JobCache;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn greenhouse_body() -> serde_json::Value {
    serde_json::json!({
        "jobs": [
            {
                "id": 11,
                "title": "Senior QA Engineer",
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/11",
                "location": { "name": "Remote - US" },
                "updated_at": "2024-06-01T09:00:00Z",
                "content": "&lt;p&gt;Own release quality.&lt;/p&gt;"
            },
            {
                "id": 12,
                "title": "Account Executive",
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/12",
                "location": { "name": "Remote - US" }
            }
        ]
    })
}

fn remotive_body() -> serde_json::Value {
    serde_json::json!({
        "jobs": [
            {
                "url": "https://remotive.com/remote-jobs/qa/globex-1",
                "title": "QA Automation Engineer",
                "company_name": "Globex Corporation",
                "job_type": "full_time",
                "candidate_required_location": "Worldwide",
                "description": "<p>Selenium and Playwright</p>"
            },
            {
                "url": "https://remotive.com/remote-jobs/sales/initech-2",
                "title": "Sales Lead",
                "company_name": "Initech",
                "candidate_required_location": "Worldwide"
            }
        ]
    })
}

fn request() -> SearchRequest {
    SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()])
        .with_companies(vec!["acme".into(), "globex".into()])
}

#[tokio::test]
async fn test_company_search_with_failing_source_and_cache_reuse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/acme/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(greenhouse_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/postings/globex"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/remotive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remotive_body()))
        .expect(1)
        .mount(&server)
        .await;

    let stack = build_stack(&server.uri());

    // When: Lever 返回 500，Globex 退回聚合源
    let jobs = stack.service.search(&request()).await.unwrap();

    // Then: Acme 来自专用策略，Globex 来自归属匹配的聚合职位
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].company(), "Acme");
    assert_eq!(jobs[0].source(), "greenhouse");
    assert_eq!(jobs[0].posted_date(), Some("2024-06-01"));
    assert_eq!(jobs[1].company(), "Globex Corporation");
    assert_eq!(jobs[1].source(), "remotive");
    assert_eq!(jobs[1].remote(), Some(true));

    // When: 相同请求再次搜索
    let again = stack.service.search(&request()).await.unwrap();

    // Then: 直接命中缓存，mock 的 expect(1) 在 drop 时校验
    assert_eq!(again, jobs);
    let stats = stack.cache.stats().await.unwrap();
    assert_eq!(stats.entry_count, 3);
    assert_eq!(stats.expired_count, 0);
    assert_eq!(stats.ttl_hours, 6);
}

#[tokio::test]
async fn test_everything_down_returns_empty_instead_of_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let stack = build_stack(&server.uri());
    let jobs = stack.service.search(&request()).await.unwrap();

    assert!(jobs.is_empty());
    assert_eq!(stack.service.cache_stats().await.unwrap().entry_count, 0);
}

#[tokio::test]
async fn test_unscoped_search_uses_default_employers_and_truncates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/boards/acme/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(greenhouse_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/postings/globex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/remotive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(remotive_body()))
        .mount(&server)
        .await;

    let stack = build_stack(&server.uri());
    let request = SearchRequest::new(vec!["QA Engineer".into()], vec!["Remote".into()])
        .with_max_results(1);

    let jobs = stack.service.search(&request).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].company(), "Acme");
    assert_eq!(stack.service.sweep_cache().await.unwrap(), 0);
    assert!(stack.service.clear_cache().await.unwrap() >= 1);
}
