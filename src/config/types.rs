use serde::Deserialize;

/// Main configuration structure for Pagesweep
///
/// Every section and key is optional; missing values fall back to the
/// documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub target: TargetConfig,
    pub selectors: SelectorConfig,
    pub headers: HeaderConfig,
    pub output: OutputConfig,
}

/// Fetch admission and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Maximum number of requests in flight across the whole run
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Attempts per request, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout of a single attempt (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Fixed delay between two attempts of the same request (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 10,
            max_attempts: 3,
            request_timeout_ms: 10_000,
            retry_delay_ms: 2_000,
        }
    }
}

/// Where categories and their pages live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Browse endpoint, without query string
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Query parameter carrying the category key
    #[serde(rename = "category-param")]
    pub category_param: String,

    /// Query parameter carrying the 1-based page number
    #[serde(rename = "page-param")]
    pub page_param: String,

    /// Upper-case category keys in URLs and file names
    #[serde(rename = "uppercase-categories")]
    pub uppercase_categories: bool,

    /// Categories to process, in order
    pub categories: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        let mut categories: Vec<String> = ('a'..='z').map(|c| c.to_string()).collect();
        categories.push("*".to_string());

        Self {
            base_url: "https://www.urbandictionary.com/browse.php".to_string(),
            category_param: "character".to_string(),
            page_param: "page".to_string(),
            uppercase_categories: true,
            categories,
        }
    }
}

/// CSS selectors used by the page extractor and the pagination discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Element holding a page's records; only the first match is used
    #[serde(rename = "records-container")]
    pub records_container: String,

    /// Record links inside the container
    #[serde(rename = "record-link")]
    pub record_link: String,

    /// Pagination links; the last match points at the last page
    #[serde(rename = "pagination-link")]
    pub pagination_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            records_container: r"section.flex-1 div.bg-white.dark\:bg-yankees.p-5.mb-5.rounded-md"
                .to_string(),
            record_link: "a[href]".to_string(),
            pagination_link: r#"div[aria-label="Pagination"] a"#.to_string(),
        }
    }
}

/// Request header configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// User agents rotated across requests
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            user_agents: vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15".to_string(),
                "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string(),
            ],
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding one store file per category plus the run artifacts
    pub directory: String,

    /// Error log file name, relative to `directory`
    #[serde(rename = "error-log")]
    pub error_log: String,

    /// Run summary file name, relative to `directory`
    pub summary: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            error_log: "error_log.txt".to_string(),
            summary: "summary.json".to_string(),
        }
    }
}
