//! Dashboard variants and the profiles a store is built from.
//!
//! A [`Profile`] bundles everything that differs between dashboards: the
//! default tree, the storage key, the export file prefix and the import
//! validator. The two shipped variants are the brokerage dashboard (three
//! pages) and the financial dashboard (one flat tree).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::schema::{AnyRecord, RequiredSections, SchemaValidator};
use crate::tree::TreeValue;


/// The shipped dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    #[default]
    Brokerage,
    Financial,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Brokerage => "brokerage",
            Variant::Financial => "financial",
        }
    }

    pub fn storage_key(&self) -> &'static str {
        match self {
            Variant::Brokerage => "dashboardData",
            Variant::Financial => "financial-dashboard-data",
        }
    }

    pub fn export_prefix(&self) -> &'static str {
        match self {
            Variant::Brokerage => "dashboard-data",
            Variant::Financial => "financial-dashboard",
        }
    }

    pub fn default_tree(&self) -> TreeValue {
        match self {
            Variant::Brokerage => brokerage_defaults(),
            Variant::Financial => financial_defaults(),
        }
    }

    pub fn validator(&self) -> Arc<dyn SchemaValidator> {
        match self {
            Variant::Brokerage => Arc::new(RequiredSections::new(["page1", "page2", "page3"])),
            Variant::Financial => Arc::new(AnyRecord),
        }
    }

    pub fn profile(&self) -> Profile {
        Profile::new(
            self.as_str(),
            self.storage_key(),
            self.export_prefix(),
            self.default_tree(),
            self.validator(),
        )
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brokerage" => Ok(Variant::Brokerage),
            "financial" => Ok(Variant::Financial),
            other => Err(format!("unknown variant '{}' (expected brokerage or financial)", other)),
        }
    }
}


// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Everything a [`crate::store::DataStore`] needs to know about its dashboard.
#[derive(Clone)]
pub struct Profile {
    name: String,
    storage_key: String,
    export_prefix: String,
    defaults: TreeValue,
    validator: Arc<dyn SchemaValidator>,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        storage_key: impl Into<String>,
        export_prefix: impl Into<String>,
        defaults: TreeValue,
        validator: Arc<dyn SchemaValidator>,
    ) -> Self {
        Profile {
            name: name.into(),
            storage_key: storage_key.into(),
            export_prefix: export_prefix.into(),
            defaults,
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn export_prefix(&self) -> &str {
        &self.export_prefix
    }

    /// The default tree. Cheap to clone; containers are shared.
    pub fn defaults(&self) -> &TreeValue {
        &self.defaults
    }

    pub fn validator(&self) -> &dyn SchemaValidator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("storage_key", &self.storage_key)
            .field("export_prefix", &self.export_prefix)
            .finish_non_exhaustive()
    }
}


// ---------------------------------------------------------------------------
// Default trees
// ---------------------------------------------------------------------------

fn brokerage_defaults() -> TreeValue {
    TreeValue::from(json!({
        "page1": {
            "closedDeal": {
                "value": "69M",
                "allocation": "100% allocated to Primary Agent"
            },
            "metrics": {
                "sellSide": 67,
                "dualSide": 38,
                "buySide": 37,
                "closedDeals": 142
            },
            "pending": {
                "value": "103M",
                "sellSide": 78,
                "dual": 28,
                "buySide": 19
            },
            "active": {
                "value": "46M",
                "total": 71
            },
            "priceRange": {
                "range": "$1.7M - $100K",
                "avgSoldPrice": "$517K"
            },
            "totalClosedDeals": 142,
            "chartData": {
                "volumeByDealType": [
                    { "name": "Buy Side", "value": 37, "percentage": 26 },
                    { "name": "Sell Side", "value": 67, "percentage": 47 },
                    { "name": "Dual Side", "value": 38, "percentage": 27 },
                    { "name": "Other", "value": 0, "percentage": 0 }
                ],
                "topAgents": [
                    { "name": "Jenny Wilson", "value": 35, "dollarValue": "$12.5M" },
                    { "name": "Devon Lane", "value": 28, "dollarValue": "$9.8M" },
                    { "name": "Courtney Henry", "value": 21, "dollarValue": "$7.3M" },
                    { "name": "Other Agents", "value": 58, "dollarValue": "$20.2M" }
                ]
            }
        },
        "page2": {
            "agentsOffices": {
                "totalAgents": 32,
                "activeAgents": 32,
                "inactiveAgents": 0,
                "offices": 1
            },
            "priceRatios": {
                "allSides": 5.6,
                "buyPrevCurrent": 4.9,
                "buyTargetActual": 6.0
            },
            "daysOnMarket": {
                "allSides": 175,
                "buyPrevCurrent": 134,
                "buyTargetActual": 200
            },
            "revenue": {
                "total": "213K",
                "overhead": "5%",
                "brokerage": "2.5%",
                "monthlySales": 18,
                "weeklySales": 4,
                "dailySales": "~1",
                "dealsPerAgent": 5
            },
            "marketRank": 18
        },
        "page3": {
            "averageListingPrice": 379,
            "activeAgents": 2504,
            "marketStatus": {
                "closed": 6573,
                "pending": 3215,
                "active": 3606,
                "median": "138K",
                "grossCommission": "245M"
            },
            "dealTypes": {
                "multiAgentSeller": 14,
                "multiAgentBuyer": 6,
                "dual": 14,
                "singleAgentSeller": 86,
                "singleAgentBuyer": 94
            },
            "listingStatus": [
                { "name": "Closed", "value": 43, "percentage": 43 },
                { "name": "Active", "value": 24, "percentage": 24 },
                { "name": "Pending", "value": 17, "percentage": 17 },
                { "name": "Expire", "value": 10, "percentage": 10 },
                { "name": "Cancelled", "value": 5, "percentage": 5 },
                { "name": "Other", "value": 1, "percentage": 1 }
            ]
        }
    }))
}

fn financial_defaults() -> TreeValue {
    TreeValue::from(json!({
        "grossRevenue": 46000000,
        "avgCommission": 8500,
        "netProfit": 12500000,
        "netProfitMargin": 27.17,
        "currentQuarter": {
            "revenue": 46000000,
            "cogs": 21000000,
            "operatingExpenses": 12500000,
            "netIncome": 12500000
        },
        "previousQuarter": {
            "revenue": 42000000,
            "cogs": 19500000,
            "operatingExpenses": 11800000,
            "netIncome": 10700000
        },
        "topOffices": [
            { "name": "Northside Office", "revenue": 8000000, "margin": 28 },
            { "name": "Downtown Office", "revenue": 7500000, "margin": 26 },
            { "name": "Westside Office", "revenue": 6200000, "margin": 24 },
            { "name": "Southside Office", "revenue": 5800000, "margin": 23 }
        ],
        "marketAnalysis": {
            "averagePrice": 850000,
            "totalListings": 1247,
            "pricePerSqFt": 420,
            "medianDaysOnMarket": 35,
            "inventoryMonths": 3.2,
            "soldProperties": 892,
            "totalVolume": 758000000,
            "avgDaysOnMarket": 42
        },
        "propertyDistribution": {
            "active": 45,
            "pending": 25,
            "sold": 20,
            "expired": 10
        },
        "kpi": {
            "agentRetention": 94,
            "clientSatisfaction": 4.8,
            "marketShare": 18,
            "referralRate": 35
        },
        "awards": {
            "count": 18,
            "description": "Industry Awards Won This Year"
        }
    }))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{get, DataPath};

    fn at(tree: &TreeValue, path: &str) -> Option<TreeValue> {
        get(tree, &DataPath::parse(path).unwrap()).cloned()
    }

    #[test]
    fn brokerage_defaults_hold_known_values() {
        let t = Variant::Brokerage.default_tree();
        assert_eq!(at(&t, "page1.metrics.sellSide"), Some(TreeValue::Number(67.0)));
        assert_eq!(at(&t, "page1.metrics.buySide"), Some(TreeValue::Number(37.0)));
        assert_eq!(at(&t, "page2.priceRatios.allSides"), Some(TreeValue::Number(5.6)));
        assert_eq!(at(&t, "page3.listingStatus.0.name"), Some(TreeValue::from("Closed")));
    }

    #[test]
    fn financial_defaults_hold_known_values() {
        let t = Variant::Financial.default_tree();
        assert_eq!(at(&t, "netProfitMargin"), Some(TreeValue::Number(27.17)));
        assert_eq!(at(&t, "topOffices.3.margin"), Some(TreeValue::Number(23.0)));
    }

    #[test]
    fn defaults_pass_their_own_validator() {
        for v in [Variant::Brokerage, Variant::Financial] {
            assert!(v.validator().validate(&v.default_tree()).is_ok(), "{}", v);
        }
    }

    #[test]
    fn storage_keys_and_prefixes() {
        assert_eq!(Variant::Brokerage.storage_key(), "dashboardData");
        assert_eq!(Variant::Financial.storage_key(), "financial-dashboard-data");
        assert_eq!(Variant::Financial.export_prefix(), "financial-dashboard");
    }

    #[test]
    fn parse_variant_names() {
        assert_eq!("brokerage".parse::<Variant>(), Ok(Variant::Brokerage));
        assert_eq!("financial".parse::<Variant>(), Ok(Variant::Financial));
        assert!("other".parse::<Variant>().is_err());
    }

    #[test]
    fn profile_carries_variant_settings() {
        let p = Variant::Financial.profile();
        assert_eq!(p.name(), "financial");
        assert_eq!(p.storage_key(), "financial-dashboard-data");
        assert!(p.defaults().as_record().unwrap().contains_key("kpi"));
    }
}
