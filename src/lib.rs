pub mod catalog;
pub mod config;
pub mod criteria_store;
pub mod engine;
pub mod matching;
pub mod model;
pub mod orchestrator;
pub mod utils;

pub use catalog::{Catalog, HttpCatalog, StaticCatalog};
pub use criteria_store::FilterCriteriaStore;
pub use engine::{EngineOptions, FilterEngine};
pub use model::{
    CommittedCriteria, DisplayState, FilterCriteria, MerchantFilter, PerkRecord, QueryResult,
};
pub use orchestrator::{QueryDispatch, QueryOrchestrator, ResultDisposition};
