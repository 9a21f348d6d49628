//! Configuration loading for the rate engine.
//!
//! A rate card is a directory of YAML files: metadata, pricing profiles keyed
//! by client type, discount policies and one file per tier table. Everything is
//! validated once at load time and shared read-only afterwards.
//!
//! # Example
//!
//! ```no_run
//! use rate_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/catering").unwrap();
//! println!("Loaded rate card: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AllowanceRule, DiscountPolicy, DiscountSchedule, DiscountStep, DiscountsFile, MileagePolicy,
    PricingProfile, ProfileConfig, ProfilesFile, RateCard, RateCardMetadata, TierTableFile,
};
