/// Runtime configuration, loaded from the environment with sane defaults.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the task platform API.
    pub api_base_url: String,
    /// Origin the official web client runs on; sent as Origin/Referer.
    pub client_origin: String,
    /// User-Agent for all requests.
    pub user_agent: String,
    /// Worker bound for batch processing.
    pub max_concurrent_tasks: usize,
    /// Humanized completion-time range, in minutes.
    pub time_min: u64,
    pub time_max: u64,
    /// Ceiling for the real pacing sleep, in seconds.
    pub pacing_cap_secs: u64,
    /// How many processed outcomes the metrics history retains.
    pub history_limit: usize,
    /// Serve deterministic canned data instead of calling the platform.
    pub mock_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://edusp-api.ip.tv".to_string(),
            client_origin: "https://saladofuturo.educacao.sp.gov.br".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/139.0.0.0 Safari/537.36"
                .to_string(),
            max_concurrent_tasks: 6,
            time_min: 1,
            time_max: 3,
            pacing_cap_secs: 5,
            history_limit: 200,
            mock_mode: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            client_origin: std::env::var("CLIENT_ORIGIN").unwrap_or(default.client_origin),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            max_concurrent_tasks: std::env::var("MAX_CONCURRENT_TASKS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_tasks),
            time_min: std::env::var("TIME_MIN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.time_min),
            time_max: std::env::var("TIME_MAX").ok().and_then(|v| v.parse().ok()).unwrap_or(default.time_max),
            pacing_cap_secs: std::env::var("PACING_CAP_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_cap_secs),
            history_limit: std::env::var("HISTORY_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.history_limit),
            mock_mode: std::env::var("MOCK_MODE").map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(default.mock_mode),
        }
    }
}
