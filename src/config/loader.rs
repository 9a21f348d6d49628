//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading a rate card from
//! a directory of YAML files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{ClientType, TierTable};

use super::types::{
    DiscountSchedule, DiscountsFile, PricingProfile, ProfilesFile, RateCard, RateCardMetadata,
    TierTableFile,
};

/// Loads and provides access to a rate card.
///
/// # Directory Structure
///
/// ```text
/// config/catering/
/// ├── rate_card.yaml   # Rate card metadata
/// ├── profiles.yaml    # Pricing profiles keyed by client type
/// ├── discounts.yaml   # Multi-order discount policies
/// └── tables/
///     └── catering_cost.yaml  # One tier table per file
/// ```
///
/// # Example
///
/// ```no_run
/// use rate_engine::config::ConfigLoader;
/// use rate_engine::models::ClientType;
///
/// let loader = ConfigLoader::load("./config/catering").unwrap();
/// let profile = loader.profile_for(&ClientType::new("flower"));
/// println!("Client table: {}", profile.client_table.id());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    card: RateCard,
}

impl ConfigLoader {
    /// Loads the rate card from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - Any required file or the `tables` directory is missing
    /// - Any file contains invalid YAML or a malformed rate
    /// - A table, profile or discount policy fails validation
    ///
    /// A missing `discounts.yaml` means no client type receives a discount.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<RateCardMetadata>(&path.join("rate_card.yaml"))?;
        let profiles = Self::load_yaml::<ProfilesFile>(&path.join("profiles.yaml"))?;

        let discounts_path = path.join("discounts.yaml");
        let discounts = if discounts_path.exists() {
            Self::load_yaml::<DiscountsFile>(&discounts_path)?
        } else {
            DiscountsFile::default()
        };

        let tables = Self::load_tables(&path.join("tables"))?;

        let card = RateCard::new(
            metadata,
            tables,
            profiles.profiles,
            profiles.default_profile,
            DiscountSchedule::new(discounts.policies)?,
        )?;

        debug!(
            path = %path.display(),
            code = %card.metadata().code,
            tables = card.tables().count(),
            profiles = card.profiles().count(),
            "rate card loaded"
        );

        Ok(Self { card })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every table file from the tables directory, in file name order.
    fn load_tables(tables_dir: &Path) -> EngineResult<Vec<TierTable>> {
        let tables_dir_str = tables_dir.display().to_string();

        let entries = fs::read_dir(tables_dir).map_err(|_| EngineError::ConfigNotFound {
            path: tables_dir_str.clone(),
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml"))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no table files found)", tables_dir_str),
            });
        }

        paths
            .iter()
            .map(|path| {
                let file = Self::load_yaml::<TierTableFile>(path)?;
                TierTable::new(file.id, file.description, file.tiers)
            })
            .collect()
    }

    /// Returns the loaded rate card.
    pub fn card(&self) -> &RateCard {
        &self.card
    }

    /// Returns the rate card metadata.
    pub fn metadata(&self) -> &RateCardMetadata {
        self.card.metadata()
    }

    /// Returns the profile for a client type, falling back to the default
    /// profile.
    pub fn profile_for(&self, client_type: &ClientType) -> &PricingProfile {
        self.card.profile_for(client_type)
    }
}
