/// User agent string for HTTP requests
pub const USER_AGENT: &str = "uk-weather-mcp/0.1.0";

/// Met Office DataHub site-specific point forecast base URL
pub const MET_OFFICE_API_BASE: &str = "https://data.hub.api.metoffice.gov.uk/sitespecific/v0/point";

/// Environment variable holding the DataHub API key
pub const API_KEY_ENV: &str = "MET_OFFICE_API_KEY";

/// Environment variable overriding the DataHub base URL
pub const API_BASE_ENV: &str = "MET_OFFICE_API_BASE";

/// Environment variable overriding the request timeout
pub const TIMEOUT_ENV: &str = "MET_OFFICE_TIMEOUT_SECS";

/// Upstream request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum response size in characters
pub const CHARACTER_LIMIT: usize = 25_000;

/// Number of forecast periods rendered in markdown
pub const MARKDOWN_ENTRY_LIMIT: usize = 20;

/// Retained-entry counts tried, in order, when JSON output is over budget
pub const TRUNCATION_LADDER: [usize; 4] = [20, 10, 5, 1];
