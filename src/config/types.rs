//! Configuration types for the rate engine.
//!
//! This module contains the strongly-typed configuration structures that are
//! deserialized from YAML rate card files, and the validated [`RateCard`]
//! assembled from them.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{ClientType, RateTier, TieBreakStrategy, TierTable};

/// Metadata about the rate card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCardMetadata {
    /// Short identifier of the rate card (e.g., "catering-delivery").
    pub code: String,
    /// The human-readable name of the rate card.
    pub name: String,
    /// The version or effective date of the rates.
    pub version: String,
}

/// A tier table file as written in `tables/*.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TierTableFile {
    /// Unique table id referenced by profiles.
    pub id: String,
    /// What the table prices.
    #[serde(default)]
    pub description: String,
    /// Tiers in ascending order.
    pub tiers: Vec<RateTier>,
}

/// How many miles are included before overage applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AllowanceRule {
    /// Allowance grows with the number of stops. The client additionally
    /// receives `base_allowance` miles; the driver does not.
    PerStop {
        /// Miles included per stop.
        miles_per_stop: Decimal,
        /// Extra miles included for the client only.
        base_allowance: Decimal,
    },
    /// Flat allowances independent of stops.
    Fixed {
        /// Miles included for the client.
        client_miles: Decimal,
        /// Miles included for the driver.
        driver_miles: Decimal,
    },
}

impl AllowanceRule {
    /// Returns the client's included miles for `stops` stops.
    pub fn client_allowance(&self, stops: u32) -> Decimal {
        match self {
            AllowanceRule::PerStop {
                miles_per_stop,
                base_allowance,
            } => Decimal::from(stops)
                .saturating_mul(*miles_per_stop)
                .saturating_add(*base_allowance),
            AllowanceRule::Fixed { client_miles, .. } => *client_miles,
        }
    }

    /// Returns the driver's included miles for `stops` stops.
    pub fn driver_allowance(&self, stops: u32) -> Decimal {
        match self {
            AllowanceRule::PerStop { miles_per_stop, .. } => {
                Decimal::from(stops).saturating_mul(*miles_per_stop)
            }
            AllowanceRule::Fixed { driver_miles, .. } => *driver_miles,
        }
    }

    fn amounts(&self) -> [Decimal; 2] {
        match self {
            AllowanceRule::PerStop {
                miles_per_stop,
                base_allowance,
            } => [*miles_per_stop, *base_allowance],
            AllowanceRule::Fixed {
                client_miles,
                driver_miles,
            } => [*client_miles, *driver_miles],
        }
    }
}

/// Mileage allowances and overage rates for one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MileagePolicy {
    /// How included miles are computed.
    pub allowance: AllowanceRule,
    /// Charge per extra mile billed to the client.
    pub client_overage_rate: Decimal,
    /// Pay per extra mile paid to the driver.
    pub driver_overage_rate: Decimal,
}

/// One step of a stepped discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountStep {
    /// Smallest order count the step applies to.
    pub min_orders: u32,
    /// Flat discount for the step.
    pub amount: Decimal,
}

/// How a client type's order count maps to a discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// No discount.
    None,
    /// The highest step whose `min_orders` is at most the order count.
    Stepped {
        /// Steps in ascending `min_orders` order.
        steps: Vec<DiscountStep>,
    },
    /// `amount` for every order beyond the first.
    PerAdditionalOrder {
        /// Discount per additional order.
        amount: Decimal,
    },
}

/// Discount policies keyed by client type.
///
/// Client types without a policy receive no discount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountSchedule {
    policies: HashMap<ClientType, DiscountPolicy>,
}

impl DiscountSchedule {
    /// Builds a schedule, validating every policy.
    pub fn new(policies: HashMap<ClientType, DiscountPolicy>) -> EngineResult<Self> {
        for (client_type, policy) in &policies {
            let invalid = |message: &str| EngineError::InvalidDiscountPolicy {
                client_type: client_type.to_string(),
                message: message.to_string(),
            };

            match policy {
                DiscountPolicy::None => {}
                DiscountPolicy::Stepped { steps } => {
                    if steps.iter().any(|step| step.amount < Decimal::ZERO) {
                        return Err(invalid("step amounts cannot be negative"));
                    }
                    if steps.windows(2).any(|pair| pair[0].min_orders >= pair[1].min_orders) {
                        return Err(invalid("steps must be in ascending min_orders order"));
                    }
                }
                DiscountPolicy::PerAdditionalOrder { amount } => {
                    if *amount < Decimal::ZERO {
                        return Err(invalid("amount cannot be negative"));
                    }
                }
            }
        }

        Ok(Self { policies })
    }

    /// Returns the policy for `client_type`, if one is configured.
    pub fn policy_for(&self, client_type: &ClientType) -> Option<&DiscountPolicy> {
        self.policies.get(client_type)
    }
}

/// Discount configuration file structure (`discounts.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscountsFile {
    /// Map of client type to discount policy.
    #[serde(default)]
    pub policies: HashMap<ClientType, DiscountPolicy>,
}

/// A pricing profile as written in `profiles.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// What the profile prices.
    #[serde(default)]
    pub description: String,
    /// Id of the client pricing table.
    pub client_table: String,
    /// Id of the driver compensation table.
    pub driver_table: String,
    /// Tie-break strategy for the client table.
    #[serde(default)]
    pub tie_break: TieBreakStrategy,
    /// Mileage allowances and overage rates.
    pub mileage: MileagePolicy,
}

/// Profiles configuration file structure (`profiles.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesFile {
    /// The profile used for client types without one of their own.
    pub default_profile: ClientType,
    /// Map of client type to profile.
    pub profiles: HashMap<ClientType, ProfileConfig>,
}

/// A validated pricing profile with its tables attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingProfile {
    /// The client type the profile is registered under.
    pub name: ClientType,
    /// What the profile prices.
    pub description: String,
    /// The client pricing table.
    pub client_table: Arc<TierTable>,
    /// The driver compensation table.
    pub driver_table: Arc<TierTable>,
    /// Tie-break strategy for the client table.
    pub tie_break: TieBreakStrategy,
    /// Mileage allowances and overage rates.
    pub mileage: MileagePolicy,
}

/// The complete, validated rate card.
///
/// Tables are shared read-only between profiles; nothing here is mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct RateCard {
    metadata: RateCardMetadata,
    tables: BTreeMap<String, Arc<TierTable>>,
    profiles: BTreeMap<ClientType, PricingProfile>,
    default_profile: PricingProfile,
    discounts: DiscountSchedule,
}

impl RateCard {
    /// Assembles a rate card, checking that every profile reference resolves.
    pub fn new(
        metadata: RateCardMetadata,
        tables: Vec<TierTable>,
        profiles: HashMap<ClientType, ProfileConfig>,
        default_profile: ClientType,
        discounts: DiscountSchedule,
    ) -> EngineResult<Self> {
        let mut table_map = BTreeMap::new();
        for table in tables {
            let id = table.id().to_string();
            if table_map.insert(id.clone(), Arc::new(table)).is_some() {
                return Err(EngineError::InvalidTierTable {
                    table: id,
                    message: "duplicate table id".to_string(),
                });
            }
        }

        let mut resolved = BTreeMap::new();
        for (name, config) in profiles {
            let profile = Self::resolve_profile(&table_map, name.clone(), config)?;
            resolved.insert(name, profile);
        }

        let default = resolved
            .get(&default_profile)
            .cloned()
            .ok_or_else(|| EngineError::InvalidProfile {
                profile: default_profile.to_string(),
                message: "default profile is not defined".to_string(),
            })?;

        Ok(Self {
            metadata,
            tables: table_map,
            profiles: resolved,
            default_profile: default,
            discounts,
        })
    }

    fn resolve_profile(
        tables: &BTreeMap<String, Arc<TierTable>>,
        name: ClientType,
        config: ProfileConfig,
    ) -> EngineResult<PricingProfile> {
        let lookup = |id: &str, role: &str| {
            tables
                .get(id)
                .cloned()
                .ok_or_else(|| EngineError::InvalidProfile {
                    profile: name.to_string(),
                    message: format!("unknown {} table '{}'", role, id),
                })
        };

        let client_table = lookup(&config.client_table, "client")?;
        let driver_table = lookup(&config.driver_table, "driver")?;

        let mileage = &config.mileage;
        let negative = mileage
            .allowance
            .amounts()
            .iter()
            .chain([&mileage.client_overage_rate, &mileage.driver_overage_rate])
            .any(|amount| *amount < Decimal::ZERO);
        if negative {
            return Err(EngineError::InvalidProfile {
                profile: name.to_string(),
                message: "mileage allowances and overage rates cannot be negative".to_string(),
            });
        }

        Ok(PricingProfile {
            name,
            description: config.description,
            client_table,
            driver_table,
            tie_break: config.tie_break,
            mileage: config.mileage,
        })
    }

    /// Returns the rate card metadata.
    pub fn metadata(&self) -> &RateCardMetadata {
        &self.metadata
    }

    /// Returns a table by id.
    pub fn table(&self, id: &str) -> Option<&TierTable> {
        self.tables.get(id).map(Arc::as_ref)
    }

    /// Returns all tables ordered by id.
    pub fn tables(&self) -> impl Iterator<Item = &TierTable> {
        self.tables.values().map(Arc::as_ref)
    }

    /// Returns all profiles ordered by client type.
    pub fn profiles(&self) -> impl Iterator<Item = &PricingProfile> {
        self.profiles.values()
    }

    /// Returns the profile for `client_type`, or the default profile when the
    /// client type has none.
    pub fn profile_for(&self, client_type: &ClientType) -> &PricingProfile {
        self.profiles
            .get(client_type)
            .unwrap_or(&self.default_profile)
    }

    /// Returns the default profile.
    pub fn default_profile(&self) -> &PricingProfile {
        &self.default_profile
    }

    /// Returns the discount schedule.
    pub fn discounts(&self) -> &DiscountSchedule {
        &self.discounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RateValue, TierRange};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn metadata() -> RateCardMetadata {
        RateCardMetadata {
            code: "test".to_string(),
            name: "Test Card".to_string(),
            version: "2026-07-01".to_string(),
        }
    }

    fn table(id: &str) -> TierTable {
        TierTable::new(
            id,
            "",
            vec![RateTier::single_rate(
                "Flat",
                TierRange::unbounded(),
                TierRange::unbounded(),
                RateValue::Fixed(dec("40")),
            )],
        )
        .unwrap()
    }

    fn per_stop_policy() -> MileagePolicy {
        MileagePolicy {
            allowance: AllowanceRule::PerStop {
                miles_per_stop: dec("10"),
                base_allowance: dec("10"),
            },
            client_overage_rate: dec("2.00"),
            driver_overage_rate: dec("1.00"),
        }
    }

    fn profile(client_table: &str, driver_table: &str) -> ProfileConfig {
        ProfileConfig {
            description: String::new(),
            client_table: client_table.to_string(),
            driver_table: driver_table.to_string(),
            tie_break: TieBreakStrategy::LowerRate,
            mileage: per_stop_policy(),
        }
    }

    #[test]
    fn test_per_stop_allowances() {
        let rule = per_stop_policy().allowance;
        assert_eq!(rule.client_allowance(3), dec("40"));
        assert_eq!(rule.driver_allowance(3), dec("30"));
    }

    #[test]
    fn test_fixed_allowances_ignore_stops() {
        let rule = AllowanceRule::Fixed {
            client_miles: dec("15"),
            driver_miles: dec("12"),
        };
        assert_eq!(rule.client_allowance(5), dec("15"));
        assert_eq!(rule.driver_allowance(5), dec("12"));
    }

    #[test]
    fn test_mileage_policy_deserializes() {
        let yaml = r#"
allowance:
  type: per_stop
  miles_per_stop: 10
  base_allowance: 10
client_overage_rate: 2.00
driver_overage_rate: 1.00
"#;
        let policy: MileagePolicy = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policy, per_stop_policy());
    }

    #[test]
    fn test_discount_policy_deserializes() {
        let yaml = r#"
corporate:
  type: stepped
  steps:
    - { min_orders: 2, amount: 5 }
    - { min_orders: 3, amount: 10 }
marketplace:
  type: per_additional_order
  amount: 5
retail:
  type: none
"#;
        let policies: HashMap<ClientType, DiscountPolicy> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(policies.len(), 3);
        assert_eq!(
            policies[&ClientType::new("marketplace")],
            DiscountPolicy::PerAdditionalOrder { amount: dec("5") }
        );
    }

    #[test]
    fn test_discount_schedule_rejects_unordered_steps() {
        let mut policies = HashMap::new();
        policies.insert(
            ClientType::new("corporate"),
            DiscountPolicy::Stepped {
                steps: vec![
                    DiscountStep {
                        min_orders: 3,
                        amount: dec("10"),
                    },
                    DiscountStep {
                        min_orders: 2,
                        amount: dec("5"),
                    },
                ],
            },
        );
        match DiscountSchedule::new(policies) {
            Err(EngineError::InvalidDiscountPolicy { client_type, .. }) => {
                assert_eq!(client_type, "corporate");
            }
            other => panic!("Expected InvalidDiscountPolicy, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_card_resolves_profiles_and_default() {
        let mut profiles = HashMap::new();
        profiles.insert(ClientType::new("standard"), profile("client", "driver"));
        profiles.insert(ClientType::new("flower"), profile("client", "driver"));

        let card = RateCard::new(
            metadata(),
            vec![table("client"), table("driver")],
            profiles,
            ClientType::new("standard"),
            DiscountSchedule::default(),
        )
        .unwrap();

        assert_eq!(card.profile_for(&ClientType::new("flower")).name.as_str(), "flower");
        assert_eq!(
            card.profile_for(&ClientType::new("unknown")).name.as_str(),
            "standard"
        );
        assert_eq!(card.profiles().count(), 2);
        assert!(card.table("client").is_some());
        assert!(card.table("missing").is_none());
    }

    #[test]
    fn test_rate_card_rejects_unknown_table_reference() {
        let mut profiles = HashMap::new();
        profiles.insert(ClientType::new("standard"), profile("client", "missing"));

        let result = RateCard::new(
            metadata(),
            vec![table("client")],
            profiles,
            ClientType::new("standard"),
            DiscountSchedule::default(),
        );

        match result {
            Err(EngineError::InvalidProfile { profile, message }) => {
                assert_eq!(profile, "standard");
                assert!(message.contains("missing"));
            }
            other => panic!("Expected InvalidProfile, got {:?}", other),
        }
    }

    #[test]
    fn test_rate_card_rejects_missing_default_profile() {
        let mut profiles = HashMap::new();
        profiles.insert(ClientType::new("standard"), profile("client", "client"));

        let result = RateCard::new(
            metadata(),
            vec![table("client")],
            profiles,
            ClientType::new("corporate"),
            DiscountSchedule::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidProfile { .. })));
    }

    #[test]
    fn test_rate_card_rejects_duplicate_tables() {
        let result = RateCard::new(
            metadata(),
            vec![table("client"), table("client")],
            HashMap::new(),
            ClientType::new("standard"),
            DiscountSchedule::default(),
        );
        assert!(matches!(result, Err(EngineError::InvalidTierTable { .. })));
    }
}
