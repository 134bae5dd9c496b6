//! Web search and fetch tools.

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::{FetchConfig, SerpApiConfig, WebToolsConfig};

use super::{Tool, ToolError, ToolResult, arg_f64, arg_string};

const MAX_RESULTS: usize = 10;
const MAX_LOCAL_RESULTS: usize = 3;

// ── SerpAPI response ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SerpApiResponse {
    knowledge_graph: Option<KnowledgeGraph>,
    answer_box: Option<AnswerBox>,
    organic_results: Vec<OrganicResult>,
    local_results: Vec<LocalResult>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KnowledgeGraph {
    title: Option<String>,
    description: Option<String>,
    source: Option<KnowledgeSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct KnowledgeSource {
    link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnswerBox {
    answer: Option<String>,
    snippet: Option<String>,
    title: Option<String>,
    link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocalResult {
    title: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    rating: Option<f64>,
}

/// Non-empty string contents, treating `""` like a missing field.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

// ── Formatting ──────────────────────────────────────────────────────────

/// `num_results` as requested by the model, clamped to `1..=10`.
pub(crate) fn clamp_results(requested: f64) -> usize {
    requested.trunc().clamp(1.0, MAX_RESULTS as f64) as usize
}

/// Plain Google search link for the raw query.
pub(crate) fn fallback_search_url(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query)
    )
}

pub(crate) fn format_search_results(data: &SerpApiResponse, query: &str, count: usize) -> String {
    let mut sections: Vec<String> = Vec::new();

    if let Some(kg) = &data.knowledge_graph
        && let (Some(title), Some(description)) = (present(&kg.title), present(&kg.description))
    {
        sections.push(format!("**{title}**\n{description}"));
        if let Some(link) = kg.source.as_ref().and_then(|s| present(&s.link)) {
            sections.push(format!("Source: {link}"));
        }
    }

    if let Some(ab) = &data.answer_box {
        if let Some(answer) = present(&ab.answer) {
            sections.push(format!("**Answer**: {answer}"));
        } else if let Some(snippet) = present(&ab.snippet) {
            let title = present(&ab.title).unwrap_or("Answer");
            sections.push(format!("**{title}**: {snippet}"));
        }
        if let Some(link) = present(&ab.link) {
            sections.push(format!("Source: {link}"));
        }
    }

    let organic: Vec<String> = data
        .organic_results
        .iter()
        .take(count)
        .enumerate()
        .filter_map(|(i, r)| {
            let (title, link) = (present(&r.title)?, present(&r.link)?);
            let mut lines = vec![format!("{}. **{}**", i + 1, title)];
            if let Some(snippet) = present(&r.snippet) {
                lines.push(format!("   {snippet}"));
            }
            lines.push(format!("   Link: {link}"));
            Some(lines.join("\n"))
        })
        .collect();
    if !organic.is_empty() {
        sections.push("\n**Search Results:**".to_string());
        sections.extend(organic);
    }

    let local: Vec<String> = data
        .local_results
        .iter()
        .take(MAX_LOCAL_RESULTS)
        .enumerate()
        .filter_map(|(i, r)| {
            let title = present(&r.title)?;
            let mut lines = vec![format!("{}. **{}**", i + 1, title)];
            if let Some(address) = present(&r.address) {
                lines.push(format!("   Address: {address}"));
            }
            if let Some(phone) = present(&r.phone) {
                lines.push(format!("   Phone: {phone}"));
            }
            if let Some(rating) = r.rating.filter(|r| *r != 0.0) {
                lines.push(format!("   Rating: {rating} stars"));
            }
            Some(lines.join("\n"))
        })
        .collect();
    if !local.is_empty() {
        sections.push("\n**Local Results:**".to_string());
        sections.extend(local);
    }

    if sections.is_empty() {
        format!(
            "No results found for \"{}\". Try: {}",
            query,
            fallback_search_url(query)
        )
    } else {
        format!(
            "🔍 Search results for \"{}\":\n\n{}",
            query,
            sections.join("\n\n")
        )
    }
}

/// Strip script/style/noscript blocks, then all tags, then collapse
/// whitespace.
pub fn html_to_text(input: &str) -> String {
    static RE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex")
    });
    static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex")
    });
    static RE_NOSCRIPT: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>").expect("valid regex")
    });
    static RE_TAGS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
    static RE_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let s = RE_SCRIPT.replace_all(input, "");
    let s = RE_STYLE.replace_all(&s, "");
    let s = RE_NOSCRIPT.replace_all(&s, "");
    let s = RE_TAGS.replace_all(&s, " ");
    RE_WS.replace_all(&s, " ").trim().to_string()
}

// ── WebSearchTool ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum SearchFailure {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Api(String),
}

impl From<reqwest::Error> for SearchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Api(err.to_string())
        }
    }
}

/// `web_search`: SerpAPI-backed Google search, or a plain page fetch when a
/// `url` argument is given.
pub struct WebSearchTool {
    api_key: Option<String>,
    base_url: String,
    search_timeout: Duration,
    default_results: usize,
    fetch: FetchConfig,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn from_config(web: &WebToolsConfig, client: reqwest::Client) -> Self {
        let SerpApiConfig {
            base_url,
            timeout_secs,
            default_results,
            ..
        } = &web.serpapi;
        Self {
            api_key: web.serpapi.credential().map(str::to_string),
            base_url: base_url.trim_end_matches('/').to_string(),
            search_timeout: Duration::from_secs(*timeout_secs),
            default_results: (*default_results).clamp(1, MAX_RESULTS),
            fetch: web.fetch.clone(),
            client,
        }
    }

    /// Search and format. Never fails: every problem becomes a message that
    /// still carries a fallback link.
    pub async fn perform_web_search(&self, query: &str, count: usize) -> String {
        let Some(api_key) = self.api_key.as_deref() else {
            return format!(
                "🔍 Web search requires a SERPAPI_KEY secret to be set.\nFallback: {}",
                fallback_search_url(query)
            );
        };

        match self.query_serpapi(query, api_key, count).await {
            Ok(data) => format_search_results(&data, query, count),
            Err(err) => {
                tracing::warn!(query, "web search failed: {}", err);
                let reason = match err {
                    SearchFailure::Timeout => "timeout",
                    SearchFailure::Api(_) => "API error",
                };
                format!(
                    "Search failed: {}. Try: {}",
                    reason,
                    fallback_search_url(query)
                )
            }
        }
    }

    async fn query_serpapi(
        &self,
        query: &str,
        api_key: &str,
        count: usize,
    ) -> Result<SerpApiResponse, SearchFailure> {
        let num = count.to_string();
        let resp = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("api_key", api_key),
                ("num", num.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, &self.fetch.user_agent)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.search_timeout)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SearchFailure::Api(format!(
                "SerpAPI returned {}",
                resp.status().as_u16()
            )));
        }

        let data: SerpApiResponse = resp.json().await?;
        if let Some(error) = data.error.as_deref() {
            return Err(SearchFailure::Api(format!("SerpAPI error: {error}")));
        }
        Ok(data)
    }

    /// Fetch a page and reduce it to readable text. Unlike search, failures
    /// here are hard errors.
    pub async fn fetch_web_content(&self, raw_url: &str) -> Result<String, ToolError> {
        let parsed =
            Url::parse(raw_url).map_err(|e| ToolError::Fetch(format!("invalid URL: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ToolError::Fetch(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let resp = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, &self.fetch.user_agent)
            .timeout(Duration::from_secs(self.fetch.timeout_secs))
            .send()
            .await
            .map_err(transport_error)?;

        if !resp.status().is_success() {
            return Err(ToolError::Fetch(format!("HTTP {}", resp.status().as_u16())));
        }

        let is_text = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<mime::Mime>().ok())
            .is_some_and(|m| m.type_() == mime::TEXT);
        if !is_text {
            return Err(ToolError::Fetch("Unsupported content type".to_string()));
        }

        let html = resp.text().await.map_err(transport_error)?;
        let text = html_to_text(&html);
        if text.is_empty() {
            return Ok(format!("No readable content found at {raw_url}"));
        }

        let limit = self.fetch.max_chars;
        let body = if text.chars().count() > limit {
            let kept: String = text.chars().take(limit).collect();
            format!("{kept}...")
        } else {
            text
        };
        Ok(format!("Content from {raw_url}:\n\n{body}"))
    }
}

fn transport_error(err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        ToolError::Fetch("request timed out".to_string())
    } else {
        ToolError::Fetch(err.to_string())
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }
    fn description(&self) -> &str {
        "Search the web using Google or fetch content from a specific URL"
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query for Google search" },
                "url": { "type": "string", "description": "Specific URL to fetch content from (alternative to search)" },
                "num_results": {
                    "type": "number",
                    "description": "Number of search results to return (default: 5, max: 10)",
                    "default": 5
                }
            },
            "required": []
        })
    }

    async fn execute(&self, args: &HashMap<String, Value>) -> Result<ToolResult, ToolError> {
        if let Some(url) = arg_string(args, "url") {
            let content = self.fetch_web_content(&url).await?;
            return Ok(ToolResult::content(content));
        }
        if let Some(query) = arg_string(args, "query") {
            let count = arg_f64(args, "num_results")
                .map(clamp_results)
                .unwrap_or(self.default_results);
            let content = self.perform_web_search(&query, count).await;
            return Ok(ToolResult::content(content));
        }
        Ok(ToolResult::error("Either query or url parameter is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::Router;
    use axum::extract::Query;
    use axum::http::{StatusCode, header};
    use axum::response::{Html, IntoResponse};
    use axum::routing::get;
    use serde_json::json;

    async fn start_mock_server(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = rx.await;
            });
            let _ = server.await;
        });
        (format!("http://{}", addr), tx)
    }

    fn tool_for(base_url: &str, api_key: Option<&str>) -> WebSearchTool {
        let mut web = WebToolsConfig::default();
        web.serpapi.base_url = base_url.to_string();
        web.serpapi.api_key = api_key.map(str::to_string);
        web.serpapi.timeout_secs = 1;
        web.fetch.timeout_secs = 1;
        WebSearchTool::from_config(&web, reqwest::Client::new())
    }

    fn args(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).expect("object args")
    }

    async fn serpapi(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        if params.get("api_key").map(String::as_str) != Some("good-key") {
            return Json(json!({ "error": "Invalid API key." }));
        }
        let num: usize = params
            .get("num")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let q = params.get("q").cloned().unwrap_or_default();
        let organic: Vec<Value> = (1..=15)
            .map(|i| {
                json!({
                    "title": format!("{q} result {i}"),
                    "link": format!("https://example.com/{i}"),
                    "snippet": format!("num={num}")
                })
            })
            .collect();
        Json(json!({ "organic_results": organic }))
    }

    fn fixture() -> SerpApiResponse {
        serde_json::from_value(json!({
            "knowledge_graph": {
                "title": "Rust",
                "description": "A systems programming language.",
                "source": { "link": "https://en.wikipedia.org/wiki/Rust" }
            },
            "answer_box": { "snippet": "Rust 1.0 shipped in 2015.", "title": "Release" },
            "organic_results": [
                { "title": "Rust Lang", "link": "https://rust-lang.org", "snippet": "Reliable software." },
                { "title": "No link here" },
                { "title": "The Book", "link": "https://doc.rust-lang.org/book/" }
            ],
            "local_results": [
                { "title": "Rust Cafe", "address": "1 Main St", "phone": "555-0100", "rating": 4.5 },
                { "address": "untitled" },
                { "title": "Ferris Bar", "rating": 0 },
                { "title": "Dropped by limit" }
            ]
        }))
        .expect("fixture")
    }

    #[test]
    fn html_to_text_drops_scripts_and_collapses_whitespace() {
        assert_eq!(
            html_to_text("<script>evil()</script><p>Hello   world</p>"),
            "Hello world"
        );
        let page = "<HTML><head><STYLE type=\"text/css\">p { color: red; }</STYLE>\
                    <script src=\"a.js\">\nvar x = '<p>';\n</script></head>\
                    <body><noscript>enable js</noscript><h1>Title</h1>\n\n<p>Body\ttext</p></body></HTML>";
        assert_eq!(html_to_text(page), "Title Body text");
        assert_eq!(html_to_text("   "), "");
    }

    #[test]
    fn clamps_result_counts() {
        assert_eq!(clamp_results(0.0), 1);
        assert_eq!(clamp_results(-4.0), 1);
        assert_eq!(clamp_results(3.0), 3);
        assert_eq!(clamp_results(7.9), 7);
        assert_eq!(clamp_results(10.0), 10);
        assert_eq!(clamp_results(250.0), 10);
    }

    #[test]
    fn fallback_url_percent_encodes_query() {
        assert_eq!(
            fallback_search_url("rust & c++ tips"),
            "https://www.google.com/search?q=rust%20%26%20c%2B%2B%20tips"
        );
    }

    #[test]
    fn formats_sections_in_priority_order() {
        let text = format_search_results(&fixture(), "rust", 5);
        let expected = "🔍 Search results for \"rust\":\n\n\
            **Rust**\nA systems programming language.\n\n\
            Source: https://en.wikipedia.org/wiki/Rust\n\n\
            **Release**: Rust 1.0 shipped in 2015.\n\n\
            \n**Search Results:**\n\n\
            1. **Rust Lang**\n   Reliable software.\n   Link: https://rust-lang.org\n\n\
            3. **The Book**\n   Link: https://doc.rust-lang.org/book/\n\n\
            \n**Local Results:**\n\n\
            1. **Rust Cafe**\n   Address: 1 Main St\n   Phone: 555-0100\n   Rating: 4.5 stars\n\n\
            3. **Ferris Bar**";
        assert_eq!(text, expected);
    }

    #[test]
    fn answer_takes_precedence_over_snippet() {
        let data: SerpApiResponse = serde_json::from_value(json!({
            "answer_box": { "answer": "42", "snippet": "ignored", "link": "https://a.example" }
        }))
        .expect("parse");
        assert_eq!(
            format_search_results(&data, "q", 5),
            "🔍 Search results for \"q\":\n\n**Answer**: 42\n\nSource: https://a.example"
        );
    }

    #[test]
    fn organic_results_respect_count() {
        let text = format_search_results(&fixture(), "rust", 1);
        assert!(text.contains("1. **Rust Lang**"));
        assert!(!text.contains("The Book"));
    }

    #[test]
    fn empty_response_yields_no_results_message() {
        let data: SerpApiResponse =
            serde_json::from_value(json!({ "organic_results": [{ "title": "no link" }] }))
                .expect("parse");
        assert_eq!(
            format_search_results(&data, "zzz qqq", 5),
            "No results found for \"zzz qqq\". Try: https://www.google.com/search?q=zzz%20qqq"
        );
    }

    #[tokio::test]
    async fn search_without_credential_degrades_to_fallback_link() {
        let tool = tool_for("http://127.0.0.1:1", None);
        let result = tool
            .execute(&args(json!({ "query": "best running shoes" })))
            .await
            .expect("ok");
        let ToolResult::Content { content } = result else {
            panic!("expected content");
        };
        assert!(content.contains("SERPAPI_KEY"));
        assert!(content.contains("https://www.google.com/search?q=best%20running%20shoes"));
    }

    #[tokio::test]
    async fn search_formats_provider_results_and_clamps_count() {
        let app = Router::new().route("/search", get(serpapi));
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, Some("good-key"));

        let result = tool
            .execute(&args(json!({ "query": "ferris", "num_results": 50 })))
            .await
            .expect("ok");
        let ToolResult::Content { content } = result else {
            panic!("expected content");
        };
        assert!(content.starts_with("🔍 Search results for \"ferris\""));
        assert!(content.contains("10. **ferris result 10**"));
        assert!(!content.contains("ferris result 11"));
        assert!(content.contains("num=10"));

        let content = tool.perform_web_search("ferris", clamp_results(0.0)).await;
        assert!(content.contains("1. **ferris result 1**"));
        assert!(!content.contains("ferris result 2"));
        assert!(content.contains("num=1"));
    }

    #[tokio::test]
    async fn search_uses_default_count_when_unspecified() {
        let app = Router::new().route("/search", get(serpapi));
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, Some("good-key"));
        let content = tool.perform_web_search("crab", tool.default_results).await;
        assert!(content.contains("5. **crab result 5**"));
        assert!(!content.contains("crab result 6"));
    }

    #[tokio::test]
    async fn provider_error_field_is_reported_with_fallback() {
        let app = Router::new().route("/search", get(serpapi));
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, Some("bad-key"));
        let content = tool.perform_web_search("rust", 5).await;
        assert_eq!(
            content,
            "Search failed: API error. Try: https://www.google.com/search?q=rust"
        );
    }

    #[tokio::test]
    async fn http_failure_is_reported_with_fallback() {
        let app = Router::new().route(
            "/search",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, Some("good-key"));
        let content = tool.perform_web_search("rust", 5).await;
        assert!(content.starts_with("Search failed: API error."));
    }

    #[tokio::test]
    async fn slow_provider_is_reported_as_timeout() {
        let app = Router::new().route(
            "/search",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({}))
            }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, Some("good-key"));
        let content = tool.perform_web_search("rust", 5).await;
        assert_eq!(
            content,
            "Search failed: timeout. Try: https://www.google.com/search?q=rust"
        );
    }

    #[tokio::test]
    async fn fetch_extracts_text_from_html() {
        let app = Router::new().route(
            "/page",
            get(|| async {
                Html(
                    "<html><head><style>h1{}</style><script>track()</script></head>\
                     <body><h1>Spring   Sale</h1><p>Up to 30% off</p></body></html>",
                )
            }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);
        let url = format!("{base}/page");
        let content = tool.fetch_web_content(&url).await.expect("fetch");
        assert_eq!(content, format!("Content from {url}:\n\nSpring Sale Up to 30% off"));
    }

    #[tokio::test]
    async fn fetch_truncates_long_pages() {
        let app = Router::new().route(
            "/long",
            get(|| async {
                ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "é".repeat(5000))
            }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);
        let url = format!("{base}/long");
        let content = tool.fetch_web_content(&url).await.expect("fetch");
        let body = content
            .strip_prefix(&format!("Content from {url}:\n\n"))
            .expect("prefix");
        assert!(body.ends_with("..."));
        assert_eq!(body.chars().count(), 4003);
    }

    #[tokio::test]
    async fn fetch_reports_empty_pages_as_success() {
        let app = Router::new().route(
            "/empty",
            get(|| async { Html("<script>only()</script>") }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);
        let url = format!("{base}/empty");
        let content = tool.fetch_web_content(&url).await.expect("fetch");
        assert_eq!(content, format!("No readable content found at {url}"));
    }

    #[tokio::test]
    async fn fetch_rejects_non_text_and_error_statuses() {
        let app = Router::new()
            .route("/data", get(|| async { Json(json!({ "a": 1 })) }))
            .route(
                "/gone",
                get(|| async { (StatusCode::NOT_FOUND, Html("<p>missing</p>")) }),
            );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);

        let err = tool
            .fetch_web_content(&format!("{base}/data"))
            .await
            .expect_err("json is not text");
        assert_eq!(err.to_string(), "Failed to fetch: Unsupported content type");

        let err = tool
            .fetch_web_content(&format!("{base}/gone"))
            .await
            .expect_err("404");
        assert_eq!(err.to_string(), "Failed to fetch: HTTP 404");
    }

    #[tokio::test]
    async fn fetch_times_out_slow_pages() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Html("<p>late</p>")
            }),
        );
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);
        let err = tool
            .fetch_web_content(&format!("{base}/slow"))
            .await
            .expect_err("timeout");
        assert_eq!(err.to_string(), "Failed to fetch: request timed out");
    }

    #[tokio::test]
    async fn fetch_rejects_malformed_and_non_http_urls() {
        let tool = tool_for("http://127.0.0.1:1", None);
        let err = tool.fetch_web_content("::nope::").await.expect_err("invalid");
        assert!(err.to_string().starts_with("Failed to fetch: invalid URL"));

        let err = tool
            .fetch_web_content("file:///etc/passwd")
            .await
            .expect_err("scheme");
        assert_eq!(err.to_string(), "Failed to fetch: unsupported URL scheme: file");
    }

    #[tokio::test]
    async fn url_argument_takes_precedence_over_query() {
        let app = Router::new().route("/page", get(|| async { Html("<p>direct</p>") }));
        let (base, _shutdown) = start_mock_server(app).await;
        let tool = tool_for(&base, None);
        let result = tool
            .execute(&args(json!({ "url": format!("{base}/page"), "query": "ignored" })))
            .await
            .expect("ok");
        let ToolResult::Content { content } = result else {
            panic!("expected content");
        };
        assert!(content.ends_with("direct"));
    }
}
