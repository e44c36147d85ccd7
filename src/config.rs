use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub route: String,
    pub max_body_size: usize,
    pub upstream_timeout_secs: u64,
    pub log_level: String,
    pub repo: RepoConfig,
}

/// Where the ledger lives and how to authenticate against the contents API.
#[derive(Clone)]
pub struct RepoConfig {
    /// `owner/name`
    pub repo: String,
    pub file_path: String,
    pub token: String,
    pub api_url: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoConfig")
            .field("repo", &self.repo)
            .field("file_path", &self.file_path)
            .field("token", &"[redacted]")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl RepoConfig {
    /// Full URL of the ledger file on the contents API.
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            self.repo,
            self.file_path.trim_start_matches('/'),
        )
    }

    /// Names of the identity settings that are empty. Not fatal: the remote API reports it.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("GH_REPO", &self.repo),
            ("GH_FILE_PATH", &self.file_path),
            ("GH_TOKEN", &self.token),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let host: IpAddr = env_or("LEDGER_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid LEDGER_HOST: {e}"))?;

        let port: u16 = env_or("LEDGER_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid LEDGER_PORT: {e}"))?;

        let route = parse_route(&env_or("LEDGER_ROUTE", "/"))?;

        let max_body_size: usize = env_or("LEDGER_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid LEDGER_MAX_BODY_SIZE: {e}"))?;

        let upstream_timeout_secs: u64 = env_or("LEDGER_UPSTREAM_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid LEDGER_UPSTREAM_TIMEOUT_SECS: {e}"))?;

        let log_level = env_or("LEDGER_LOG_LEVEL", "info");

        let repo = RepoConfig {
            repo: env_or("GH_REPO", ""),
            file_path: env_or("GH_FILE_PATH", ""),
            token: env_or("GH_TOKEN", ""),
            api_url: env_or("GH_API_URL", "https://api.github.com"),
            user_agent: env_or("LEDGER_USER_AGENT", "vercel-submission-handler"),
        };

        Ok(Config {
            host,
            port,
            route,
            max_body_size,
            upstream_timeout_secs,
            log_level,
            repo,
        })
    }
}

/// Path reserved by the health check.
pub const HEALTH_ROUTE: &str = "/health";

fn parse_route(route: &str) -> Result<String, String> {
    if !route.starts_with('/') {
        return Err(format!("Invalid LEDGER_ROUTE '{route}': must start with '/'"));
    }
    if route == HEALTH_ROUTE {
        return Err(format!("Invalid LEDGER_ROUTE '{route}': reserved for the health check"));
    }
    Ok(route.to_string())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
