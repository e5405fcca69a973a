pub mod adblock_engine;
pub mod blocklist;
pub mod process_attributor;
pub mod store;
pub mod system_integration;

pub use adblock_engine::{AdblockEnginePort, FilterDecision};
pub use blocklist::BlocklistPort;
pub use process_attributor::{ProcessAttribution, ProcessAttributorPort};
pub use store::{LogSubscriber, StorePort};
pub use system_integration::SystemIntegrationPort;
