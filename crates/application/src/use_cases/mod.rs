pub mod adblock_filters;
pub mod logs;
pub mod rules;
pub mod settings;

pub use adblock_filters::{AddAdblockFilterUseCase, DeleteAdblockFilterUseCase, GetAdblockFiltersUseCase};
pub use logs::{GetRecentLogsUseCase, GetStatsUseCase, GetTrafficHistoryUseCase, ResetDataUseCase};
pub use rules::{CreateRuleUseCase, DeleteRuleUseCase, GetRulesUseCase, UpdateRuleUseCase};
pub use settings::{GetSettingsUseCase, UpdateSettingUseCase};
