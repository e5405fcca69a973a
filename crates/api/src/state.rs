use custos_application::use_cases::{
    AddAdblockFilterUseCase, CreateRuleUseCase, DeleteAdblockFilterUseCase, DeleteRuleUseCase,
    GetAdblockFiltersUseCase, GetRecentLogsUseCase, GetRulesUseCase, GetSettingsUseCase,
    GetStatsUseCase, GetTrafficHistoryUseCase, ResetDataUseCase, UpdateRuleUseCase,
    UpdateSettingUseCase,
};
use custos_application::DecisionEngine;
use custos_infrastructure::{FilterRefresher, LinuxSystemIntegration, Socks5Server};
use std::sync::Arc;

/// Everything the control API's handlers need, wired once at startup. Mirrors
/// the teacher's `AppState`: one `Arc` field per use case, plus the handles a
/// setting/filter mutation needs to propagate its effect live.
#[derive(Clone)]
pub struct AppState {
    pub get_recent_logs: Arc<GetRecentLogsUseCase>,
    pub get_stats: Arc<GetStatsUseCase>,
    pub get_traffic_history: Arc<GetTrafficHistoryUseCase>,
    pub reset_data: Arc<ResetDataUseCase>,

    pub get_rules: Arc<GetRulesUseCase>,
    pub create_rule: Arc<CreateRuleUseCase>,
    pub update_rule: Arc<UpdateRuleUseCase>,
    pub delete_rule: Arc<DeleteRuleUseCase>,

    pub get_adblock_filters: Arc<GetAdblockFiltersUseCase>,
    pub add_adblock_filter: Arc<AddAdblockFilterUseCase>,
    pub delete_adblock_filter: Arc<DeleteAdblockFilterUseCase>,

    pub get_settings: Arc<GetSettingsUseCase>,
    pub update_setting: Arc<UpdateSettingUseCase>,

    pub decision: Arc<DecisionEngine>,
    pub socks5: Arc<Socks5Server>,
    pub refresher: Arc<FilterRefresher>,
    pub system_integration: Arc<LinuxSystemIntegration>,
}
