use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the remote API lives and where credentials are kept.
///
/// Built from defaults, then environment variables, then command-line
/// flags; each layer only overrides what it sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Scheme + host (+ port) of the REST API, without a trailing slash.
    pub api_url: String,

    /// Path prefix prepended to every endpoint.
    pub api_prefix: String,

    /// Per-request HTTP timeout.
    pub timeout: Duration,

    /// Path to the redb file holding credentials. `None` keeps them in
    /// memory only.
    pub store_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout: DEFAULT_TIMEOUT,
            store_path: None,
        }
    }
}

impl SessionConfig {
    /// Read `BOUTIQUE_API_URL`, `BOUTIQUE_API_PREFIX`,
    /// `BOUTIQUE_TIMEOUT_SECS` and `BOUTIQUE_STORE` from the environment.
    pub fn from_env() -> Self {
        Self::default().merge_lookup(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup (same keys as `from_env`).
    /// Unparseable timeouts are ignored.
    #[must_use]
    pub fn merge_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BOUTIQUE_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = normalize_url(&url);
        }
        if let Some(prefix) = lookup("BOUTIQUE_API_PREFIX") {
            self.api_prefix = normalize_prefix(&prefix);
        }
        if let Some(secs) = lookup("BOUTIQUE_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("BOUTIQUE_STORE").filter(|v| !v.is_empty()) {
            self.store_path = Some(PathBuf::from(path));
        }
        self
    }

    /// Override fields from command-line arguments.
    ///
    /// Supported flags:
    /// - `--api-url=URL`
    /// - `--api-prefix=PATH`
    /// - `--timeout=SECS`
    /// - `--store=PATH`
    #[must_use]
    pub fn merge_args(mut self, args: &[String]) -> Self {
        for arg in args {
            if let Some(val) = arg.strip_prefix("--api-url=") {
                self.api_url = normalize_url(val);
            } else if let Some(val) = arg.strip_prefix("--api-prefix=") {
                self.api_prefix = normalize_prefix(val);
            } else if let Some(val) = arg.strip_prefix("--timeout=") {
                if let Ok(secs) = val.parse::<u64>() {
                    self.timeout = Duration::from_secs(secs);
                }
            } else if let Some(val) = arg.strip_prefix("--store=") {
                self.store_path = Some(PathBuf::from(val));
            }
        }
        self
    }

    /// Parse configuration from command-line arguments over defaults.
    pub fn from_args(args: &[String]) -> Self {
        Self::default().merge_args(args)
    }

    /// Full URL for an endpoint path such as `/auth/me/`.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}{}", self.api_url, self.api_prefix, endpoint)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(
            config.endpoint_url("/auth/me/"),
            "http://localhost:8000/api/auth/me/"
        );
    }

    #[test]
    fn test_from_args() {
        let args = vec![
            "--api-url=https://shop.example.com/".to_string(),
            "--api-prefix=v2/".to_string(),
            "--timeout=5".to_string(),
            "--store=/tmp/session.redb".to_string(),
            "--unrelated".to_string(),
        ];
        let config = SessionConfig::from_args(&args);
        assert_eq!(config.api_url, "https://shop.example.com");
        assert_eq!(config.api_prefix, "/v2");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.store_path, Some(PathBuf::from("/tmp/session.redb")));
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("BOUTIQUE_API_URL", "http://api:9000"),
            ("BOUTIQUE_API_PREFIX", ""),
            ("BOUTIQUE_TIMEOUT_SECS", "soon"),
        ]
        .into_iter()
        .collect();
        let config =
            SessionConfig::default().merge_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_url, "http://api:9000");
        assert_eq!(config.api_prefix, "");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.endpoint_url("/auth/login/"), "http://api:9000/auth/login/");
    }

    #[test]
    fn args_win_over_lookup() {
        let config = SessionConfig::default()
            .merge_lookup(|k| (k == "BOUTIQUE_API_URL").then(|| "http://env".to_string()))
            .merge_args(&["--api-url=http://flag".to_string()]);
        assert_eq!(config.api_url, "http://flag");
    }
}
