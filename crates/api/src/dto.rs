use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default = "default_logs_limit")]
    pub limit: u32,
}

fn default_logs_limit() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
pub struct TrafficQuery {
    #[serde(default = "default_traffic_minutes")]
    pub minutes: u64,
}

fn default_traffic_minutes() -> u64 {
    60
}

#[derive(Debug, Deserialize)]
pub struct RulesQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
    #[serde(default)]
    pub search: String,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleRequest {
    pub rule_type: String,
    pub pattern: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRuleRequest {
    pub rule_type: String,
    pub pattern: String,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddAdblockFilterRequest {
    pub name: String,
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSystemProxyRequest {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct SetStartupRequest {
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}
