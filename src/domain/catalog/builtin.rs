// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{CatalogEntry, StrategyKind};

/// 内置雇主条目
pub(super) fn entries() -> Vec<CatalogEntry> {
    use StrategyKind::*;

    vec![
        // Greenhouse
        CatalogEntry::new("stripe", "Stripe", "https://boards.greenhouse.io/stripe", Greenhouse)
            .with_categories(&["fintech", "payments"]),
        CatalogEntry::new("airbnb", "Airbnb", "https://boards.greenhouse.io/airbnb", Greenhouse)
            .with_categories(&["consumer", "travel"]),
        CatalogEntry::new("figma", "Figma", "https://boards.greenhouse.io/figma", Greenhouse)
            .with_categories(&["design", "developer-tools"]),
        CatalogEntry::new("cloudflare", "Cloudflare", "https://boards.greenhouse.io/cloudflare", Greenhouse)
            .with_categories(&["infrastructure", "security"]),
        CatalogEntry::new("discord", "Discord", "https://boards.greenhouse.io/discord", Greenhouse)
            .with_categories(&["consumer", "social"]),
        CatalogEntry::new("dropbox", "Dropbox", "https://boards.greenhouse.io/dropbox", Greenhouse)
            .with_categories(&["productivity", "remote-first"]),
        CatalogEntry::new("datadog", "Datadog", "https://boards.greenhouse.io/datadog", Greenhouse)
            .with_categories(&["infrastructure", "developer-tools"]),
        CatalogEntry::new("gitlab", "GitLab", "https://boards.greenhouse.io/gitlab", Greenhouse)
            .with_categories(&["developer-tools", "remote-first"]),
        CatalogEntry::new("coinbase", "Coinbase", "https://boards.greenhouse.io/coinbase", Greenhouse)
            .with_categories(&["fintech", "crypto", "remote-first"]),
        CatalogEntry::new("reddit", "Reddit", "https://boards.greenhouse.io/reddit", Greenhouse)
            .with_categories(&["consumer", "social"]),
        // Lever
        CatalogEntry::new("palantir", "Palantir", "https://jobs.lever.co/palantir", Lever)
            .with_aliases(&["Palantir Technologies"])
            .with_categories(&["enterprise", "data"]),
        CatalogEntry::new("spotify", "Spotify", "https://jobs.lever.co/spotify", Lever)
            .with_categories(&["consumer", "media"]),
        CatalogEntry::new("plaid", "Plaid", "https://jobs.lever.co/plaid", Lever)
            .with_categories(&["fintech"]),
        // Ashby
        CatalogEntry::new("openai", "OpenAI", "https://jobs.ashbyhq.com/openai", Ashby)
            .with_categories(&["ai", "research"]),
        CatalogEntry::new("notion", "Notion", "https://jobs.ashbyhq.com/notion", Ashby)
            .with_aliases(&["Notion Labs"])
            .with_categories(&["productivity"]),
        CatalogEntry::new("ramp", "Ramp", "https://jobs.ashbyhq.com/ramp", Ashby)
            .with_categories(&["fintech"]),
        CatalogEntry::new("linear", "Linear", "https://jobs.ashbyhq.com/linear", Ashby)
            .with_categories(&["developer-tools", "remote-first"]),
        // SmartRecruiters
        CatalogEntry::new("visa", "Visa", "https://careers.smartrecruiters.com/Visa", SmartRecruiters)
            .with_aliases(&["Visa Inc"])
            .with_categories(&["fintech", "payments", "enterprise"]),
        CatalogEntry::new("bosch", "Bosch", "https://careers.smartrecruiters.com/BoschGroup", SmartRecruiters)
            .with_aliases(&["Bosch Group", "Robert Bosch"])
            .with_categories(&["hardware", "enterprise"]),
        CatalogEntry::new("servicenow", "ServiceNow", "https://careers.smartrecruiters.com/ServiceNow", SmartRecruiters)
            .with_categories(&["enterprise"]),
        // Amazon
        CatalogEntry::new("amazon", "Amazon", "https://www.amazon.jobs/en/search", AmazonJobs)
            .with_aliases(&["Amazon.com", "Amazon Web Services", "AWS"])
            .with_categories(&["big-tech", "ecommerce", "cloud"]),
        // Workday
        CatalogEntry::new("nvidia", "NVIDIA", "https://nvidia.wd5.myworkdayjobs.com/NVIDIAExternalCareerSite", Workday)
            .with_aliases(&["Nvidia Corporation"])
            .with_categories(&["hardware", "ai"]),
        CatalogEntry::new("salesforce", "Salesforce", "https://salesforce.wd12.myworkdayjobs.com/External_Career_Site", Workday)
            .with_categories(&["enterprise", "saas"]),
        CatalogEntry::new("adobe", "Adobe", "https://adobe.wd5.myworkdayjobs.com/external_experienced", Workday)
            .with_categories(&["design", "enterprise"]),
        CatalogEntry::new("intel", "Intel", "https://intel.wd1.myworkdayjobs.com/External", Workday)
            .with_aliases(&["Intel Corporation"])
            .with_categories(&["hardware"]),
        // Client-rendered career sites
        CatalogEntry::new("google", "Google", "https://www.google.com/about/careers/applications/jobs/results", BrowserCareers)
            .with_aliases(&["Alphabet", "Google LLC"])
            .with_categories(&["big-tech", "ai"]),
        CatalogEntry::new("apple", "Apple", "https://jobs.apple.com/en-us/search", BrowserCareers)
            .with_categories(&["big-tech", "hardware"]),
        CatalogEntry::new("microsoft", "Microsoft", "https://jobs.careers.microsoft.com/global/en/search", BrowserCareers)
            .with_categories(&["big-tech", "cloud"]),
        CatalogEntry::new("meta", "Meta", "https://www.metacareers.com/jobs", BrowserCareers)
            .with_aliases(&["Facebook", "Meta Platforms"])
            .with_categories(&["big-tech", "social"]),
        CatalogEntry::new("netflix", "Netflix", "https://jobs.netflix.com/search", BrowserCareers)
            .with_categories(&["consumer", "media"]),
        // Server-rendered career pages
        CatalogEntry::new("basecamp", "Basecamp", "https://basecamp.com/about/jobs", HtmlListing)
            .with_aliases(&["37signals"])
            .with_categories(&["productivity", "remote-first"]),
        CatalogEntry::new("automattic", "Automattic", "https://automattic.com/work-with-us/", HtmlListing)
            .with_categories(&["remote-first", "publishing"]),
        CatalogEntry::new("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/hiring", HtmlListing)
            .with_categories(&["consumer", "privacy", "remote-first"]),
    ]
}
