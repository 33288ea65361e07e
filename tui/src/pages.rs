//! Page definitions: which fields, charts and derived figures each
//! dashboard page shows.
//!
//! Pages only describe layout. Values always come from the store at render
//! time, so every view of a path shows the same number after a commit.

use dashdeck_core::{DataPath, DataStore, PathError, TreeValue, Variant};

use crate::field::{EditableField, FieldKind};
use crate::format::{compact_currency, NumberFormat};


// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub fields: Vec<EditableField>,
}

/// Where a chart reads its segments from.
#[derive(Debug, Clone)]
pub enum ChartSource {
    /// A sequence of records; each record is one segment.
    Sequence {
        path: DataPath,
        label_key: &'static str,
        value_key: &'static str,
        note_key: Option<&'static str>,
    },
    /// Fixed keys of one record, each a segment.
    Record {
        path: DataPath,
        entries: Vec<(&'static str, &'static str)>,
    },
}

#[derive(Debug, Clone)]
pub struct SegmentChart {
    pub title: String,
    pub source: ChartSource,
    pub format: NumberFormat,
}

/// One bar of a segment chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub value: f64,
    pub note: Option<String>,
}

/// A read-only figure computed from other values.
#[derive(Clone)]
pub struct Derived {
    pub label: &'static str,
    compute: fn(&DataStore) -> Option<String>,
}

#[derive(Debug, Clone)]
pub struct Page {
    pub title: String,
    pub sections: Vec<Section>,
    pub charts: Vec<SegmentChart>,
    pub derived: Vec<Derived>,
}


impl SegmentChart {
    /// Read the segments from the store. Missing entries are skipped.
    pub fn segments(&self, store: &DataStore) -> Vec<Segment> {
        match &self.source {
            ChartSource::Sequence { path, label_key, value_key, note_key } => {
                let Some(items) = store.lookup(path).and_then(TreeValue::as_sequence) else {
                    return Vec::new();
                };
                items
                    .iter()
                    .filter_map(|item| {
                        let record = item.as_record()?;
                        Some(Segment {
                            label: record.get(*label_key)?.display_string(),
                            value: record.get(*value_key).and_then(TreeValue::as_f64).unwrap_or(0.0),
                            note: note_key
                                .and_then(|k| record.get(k))
                                .map(TreeValue::display_string),
                        })
                    })
                    .collect()
            }
            ChartSource::Record { path, entries } => {
                let Some(record) = store.lookup(path).and_then(TreeValue::as_record) else {
                    return Vec::new();
                };
                entries
                    .iter()
                    .filter_map(|(label, key)| {
                        Some(Segment {
                            label: label.to_string(),
                            value: record.get(*key)?.as_f64()?,
                            note: None,
                        })
                    })
                    .collect()
            }
        }
    }
}

impl Derived {
    pub fn value(&self, store: &DataStore) -> String {
        (self.compute)(store).unwrap_or_else(|| "n/a".to_string())
    }
}

impl std::fmt::Debug for Derived {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived").field("label", &self.label).finish()
    }
}

impl Page {
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    /// Fields in reading order, across sections.
    pub fn fields(&self) -> impl Iterator<Item = &EditableField> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, index: usize) -> Option<&EditableField> {
        self.fields().nth(index)
    }

    pub fn field_mut(&mut self, index: usize) -> Option<&mut EditableField> {
        self.sections.iter_mut().flat_map(|s| s.fields.iter_mut()).nth(index)
    }
}


// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Pages for `variant`. Sequence-backed fields are built for however many
/// entries the store currently holds, so rebuild after an import or reset.
pub fn build_pages(variant: Variant, store: &DataStore) -> Result<Vec<Page>, PathError> {
    match variant {
        Variant::Brokerage => Ok(vec![sales_overview()?, agents_revenue()?, market_status()?]),
        Variant::Financial => Ok(vec![financial_overview(store)?, market_kpis()?]),
    }
}


fn section(title: &str, fields: Vec<EditableField>) -> Section {
    Section {
        title: title.to_string(),
        fields,
    }
}

fn num(path: &str, label: &str) -> Result<EditableField, PathError> {
    EditableField::number(path, label)
}

fn text(path: &str, label: &str) -> Result<EditableField, PathError> {
    EditableField::text(path, label)
}

fn money(path: &str, label: &str) -> Result<EditableField, PathError> {
    Ok(num(path, label)?.with_format(NumberFormat::currency(0)))
}

fn percent(path: &str, label: &str) -> Result<EditableField, PathError> {
    Ok(EditableField::number(path, label)?.with_format(NumberFormat::percentage(0)))
}

fn sequence_chart(
    title: &str,
    path: &str,
    value_key: &'static str,
    note_key: Option<&'static str>,
    format: NumberFormat,
) -> Result<SegmentChart, PathError> {
    Ok(SegmentChart {
        title: title.to_string(),
        source: ChartSource::Sequence {
            path: DataPath::parse(path)?,
            label_key: "name",
            value_key,
            note_key,
        },
        format,
    })
}


// -- brokerage --------------------------------------------------------------

fn sales_overview() -> Result<Page, PathError> {
    Ok(Page {
        title: "Sales Overview".into(),
        sections: vec![
            section("Closed Deal", vec![
                text("page1.closedDeal.value", "Volume")?.with_prefix("$"),
                text("page1.closedDeal.allocation", "Allocation")?,
            ]),
            section("Deal Metrics", vec![
                num("page1.metrics.sellSide", "# Sell Side")?,
                num("page1.metrics.dualSide", "# Dual Side")?,
                num("page1.metrics.buySide", "# Buy Side")?,
                num("page1.metrics.closedDeals", "Closed Deal")?,
            ]),
            section("Pending", vec![
                text("page1.pending.value", "Volume")?.with_prefix("$"),
                num("page1.pending.sellSide", "Sell Side")?,
                num("page1.pending.dual", "Dual")?,
                num("page1.pending.buySide", "Buy Side")?,
            ]),
            section("Active", vec![
                text("page1.active.value", "Volume")?.with_prefix("$"),
                num("page1.active.total", "Total")?,
            ]),
            section("Price Range", vec![
                text("page1.priceRange.range", "Range")?,
                text("page1.priceRange.avgSoldPrice", "Avg. Sold Price")?,
            ]),
            section("Total Closed Deals Analysis", vec![
                num("page1.totalClosedDeals", "Total Closed Deals")?,
            ]),
        ],
        charts: vec![
            sequence_chart(
                "Volume($) by Deal Type",
                "page1.chartData.volumeByDealType",
                "percentage",
                None,
                NumberFormat::percentage(0),
            )?,
            sequence_chart(
                "Top Agents by Volume($)",
                "page1.chartData.topAgents",
                "value",
                Some("dollarValue"),
                NumberFormat::Plain,
            )?,
        ],
        derived: Vec::new(),
    })
}

fn agents_revenue() -> Result<Page, PathError> {
    Ok(Page {
        title: "Agents & Revenue".into(),
        sections: vec![
            section("Agents & Offices", vec![
                num("page2.agentsOffices.totalAgents", "Current Total Agents")?,
                num("page2.agentsOffices.activeAgents", "Current Active Agents")?,
                num("page2.agentsOffices.inactiveAgents", "Current Inactive Agents")?,
                num("page2.agentsOffices.offices", "# Offices")?,
            ]),
            section("Sold to List Price Ratio Change (%)", vec![
                EditableField::number("page2.priceRatios.allSides", "All Sides")?
                    .with_prefix("+")
                    .with_suffix("%"),
                EditableField::number("page2.priceRatios.buyPrevCurrent", "Buy Side (Prev vs Current)")?
                    .with_prefix("+")
                    .with_suffix("%"),
                EditableField::number("page2.priceRatios.buyTargetActual", "Buy Side (Target vs Actual)")?
                    .with_prefix("+")
                    .with_suffix("%"),
            ]),
            section("Avg. Days on Market (List to Close)", vec![
                num("page2.daysOnMarket.allSides", "All Sides")?,
                num("page2.daysOnMarket.buyPrevCurrent", "Buy Side (Prev vs Current)")?,
                num("page2.daysOnMarket.buyTargetActual", "Buy Side (Target vs Actual)")?,
            ]),
            section("Estimated Total Org. Revenue", vec![
                text("page2.revenue.total", "Total")?.with_prefix("$"),
                text("page2.revenue.overhead", "Overhead")?,
                text("page2.revenue.brokerage", "Brokerage Share")?,
                num("page2.revenue.monthlySales", "Monthly Sales")?,
                num("page2.revenue.weeklySales", "Weekly Sales")?,
                text("page2.revenue.dailySales", "Daily Sales")?,
                num("page2.revenue.dealsPerAgent", "Deals/Agent")?,
            ]),
            section("Market Rank (TTM*)", vec![
                num("page2.marketRank", "Rank")?.with_prefix("#"),
            ]),
        ],
        charts: Vec::new(),
        derived: Vec::new(),
    })
}

fn market_status() -> Result<Page, PathError> {
    Ok(Page {
        title: "Market Status".into(),
        sections: vec![
            section("Listings", vec![
                num("page3.averageListingPrice", "Average Listing Price")?
                    .with_prefix("$")
                    .with_suffix("K"),
                num("page3.activeAgents", "Active Agents")?.with_format(NumberFormat::number(0)),
            ]),
            section("Market Status", vec![
                num("page3.marketStatus.closed", "Closed")?.with_format(NumberFormat::number(0)),
                num("page3.marketStatus.pending", "Pending")?.with_format(NumberFormat::number(0)),
                num("page3.marketStatus.active", "Active")?.with_format(NumberFormat::number(0)),
                text("page3.marketStatus.median", "Median")?.with_prefix("$"),
                text("page3.marketStatus.grossCommission", "Gross Commission")?.with_prefix("$"),
            ]),
            section("Deal Types", vec![
                num("page3.dealTypes.multiAgentSeller", "Multi-Agent Seller")?,
                num("page3.dealTypes.multiAgentBuyer", "Multi-Agent Buyer")?,
                num("page3.dealTypes.dual", "Dual")?,
                num("page3.dealTypes.singleAgentSeller", "Single-Agent Seller")?,
                num("page3.dealTypes.singleAgentBuyer", "Single-Agent Buyer")?,
            ]),
        ],
        charts: vec![sequence_chart(
            "Distribution of Property Listing Status",
            "page3.listingStatus",
            "percentage",
            None,
            NumberFormat::percentage(0),
        )?],
        derived: Vec::new(),
    })
}


// -- financial --------------------------------------------------------------

fn financial_overview(store: &DataStore) -> Result<Page, PathError> {
    let offices_path = DataPath::parse("topOffices")?;
    let offices = store
        .lookup(&offices_path)
        .and_then(TreeValue::as_sequence)
        .map(|items| items.len())
        .unwrap_or(0);
    let mut office_fields = Vec::with_capacity(offices * 2);
    for i in 0..offices {
        let office = offices_path.child(&i.to_string())?;
        let name = store
            .lookup(&office.child("name")?)
            .map(TreeValue::display_string)
            .unwrap_or_else(|| format!("Office {}", i + 1));
        office_fields.push(
            EditableField::at(office.child("revenue")?, &format!("{} Revenue", name), FieldKind::Number)
                .with_format(NumberFormat::currency(0)),
        );
        office_fields.push(
            EditableField::at(office.child("margin")?, &format!("{} Margin", name), FieldKind::Number)
                .with_format(NumberFormat::percentage(0)),
        );
    }

    Ok(Page {
        title: "Overview & Income Statement".into(),
        sections: vec![
            section("Headline", vec![
                money("grossRevenue", "Gross Revenue")?,
                money("avgCommission", "Avg. Commission")?,
                money("netProfit", "Net Profit")?,
                EditableField::number("netProfitMargin", "Net Profit Margin")?
                    .with_format(NumberFormat::percentage(2)),
            ]),
            section("Income Statement - Current Quarter", vec![
                money("currentQuarter.revenue", "Revenue")?,
                money("currentQuarter.cogs", "Cost of Goods Sold")?,
                money("currentQuarter.operatingExpenses", "Operating Expenses")?,
                money("currentQuarter.netIncome", "Net Income")?,
            ]),
            section("Income Statement - Previous Quarter", vec![
                money("previousQuarter.revenue", "Revenue")?,
                money("previousQuarter.cogs", "Cost of Goods Sold")?,
                money("previousQuarter.operatingExpenses", "Operating Expenses")?,
                money("previousQuarter.netIncome", "Net Income")?,
            ]),
            section("Top Offices Performance", office_fields),
        ],
        charts: vec![sequence_chart(
            "Revenue by Office",
            "topOffices",
            "revenue",
            None,
            NumberFormat::currency(0),
        )?],
        derived: vec![
            Derived { label: "Gross Profit (Current Quarter)", compute: gross_profit },
            Derived { label: "Revenue Growth QoQ", compute: revenue_growth },
            Derived { label: "Net Income Growth QoQ", compute: net_income_growth },
        ],
    })
}

fn market_kpis() -> Result<Page, PathError> {
    Ok(Page {
        title: "Market & KPIs".into(),
        sections: vec![
            section("Market Analysis", vec![
                money("marketAnalysis.averagePrice", "Average Price")?,
                num("marketAnalysis.totalListings", "Total Listings")?.with_format(NumberFormat::number(0)),
                money("marketAnalysis.pricePerSqFt", "Price per Sq Ft")?,
                num("marketAnalysis.medianDaysOnMarket", "Median Days on Market")?
                    .with_format(NumberFormat::number(0)),
                num("marketAnalysis.inventoryMonths", "Inventory (Months)")?
                    .with_format(NumberFormat::number(1)),
            ]),
            section("Property Listing Status", vec![
                percent("propertyDistribution.active", "Active")?,
                percent("propertyDistribution.pending", "Pending")?,
                percent("propertyDistribution.sold", "Sold")?,
                percent("propertyDistribution.expired", "Expired")?,
            ]),
            section("Key Performance Indicators", vec![
                percent("kpi.agentRetention", "Agent Retention")?,
                EditableField::number("kpi.clientSatisfaction", "Client Satisfaction")?
                    .with_format(NumberFormat::number(1))
                    .with_suffix("/5"),
                percent("kpi.marketShare", "Market Share")?,
                percent("kpi.referralRate", "Referral Rate")?,
            ]),
            section("Additional Market Metrics", vec![
                num("marketAnalysis.soldProperties", "Sold Properties")?.with_format(NumberFormat::number(0)),
                money("marketAnalysis.totalVolume", "Total Volume")?,
                num("marketAnalysis.avgDaysOnMarket", "Avg. Days on Market")?.with_format(NumberFormat::number(0)),
            ]),
            section("Recognition", vec![
                num("awards.count", "Awards")?,
                text("awards.description", "Description")?,
            ]),
        ],
        charts: vec![SegmentChart {
            title: "Property Listing Status".into(),
            source: ChartSource::Record {
                path: DataPath::parse("propertyDistribution")?,
                entries: vec![
                    ("Active", "active"),
                    ("Pending", "pending"),
                    ("Sold", "sold"),
                    ("Expired", "expired"),
                ],
            },
            format: NumberFormat::percentage(0),
        }],
        derived: Vec::new(),
    })
}


// -- derived figures ----------------------------------------------------------

fn number_at(store: &DataStore, path: &str) -> Option<f64> {
    store.get(path, TreeValue::Null).as_f64()
}

fn gross_profit(store: &DataStore) -> Option<String> {
    let revenue = number_at(store, "currentQuarter.revenue")?;
    let cogs = number_at(store, "currentQuarter.cogs")?;
    Some(compact_currency(revenue - cogs))
}

fn growth(store: &DataStore, current: &str, previous: &str) -> Option<String> {
    let cur = number_at(store, current)?;
    let prev = number_at(store, previous)?;
    if prev == 0.0 {
        return None;
    }
    let pct = (cur - prev) / prev.abs() * 100.0;
    let sign = if pct >= 0.0 { "+" } else { "" };
    Some(format!("{}{:.1}%", sign, pct))
}

fn revenue_growth(store: &DataStore) -> Option<String> {
    growth(store, "currentQuarter.revenue", "previousQuarter.revenue")
}

fn net_income_growth(store: &DataStore) -> Option<String> {
    growth(store, "currentQuarter.netIncome", "previousQuarter.netIncome")
}


#[cfg(test)]
mod tests {
    use super::*;
    use dashdeck_core::persist::MemoryStore;

    fn store(variant: Variant) -> DataStore {
        DataStore::open(variant.profile(), MemoryStore::new())
    }

    #[test]
    fn brokerage_has_three_pages() {
        let s = store(Variant::Brokerage);
        let pages = build_pages(Variant::Brokerage, &s).unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Sales Overview", "Agents & Revenue", "Market Status"]);
    }

    #[test]
    fn financial_has_two_pages() {
        let s = store(Variant::Financial);
        let pages = build_pages(Variant::Financial, &s).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].title, "Overview & Income Statement");
    }

    #[test]
    fn every_field_resolves_in_defaults() {
        for variant in [Variant::Brokerage, Variant::Financial] {
            let s = store(variant);
            for page in build_pages(variant, &s).unwrap() {
                for field in page.fields() {
                    assert!(s.lookup(field.path()).is_some(), "{} missing", field.path());
                }
            }
        }
    }

    #[test]
    fn office_fields_follow_store() {
        let mut s = store(Variant::Financial);
        let page = &build_pages(Variant::Financial, &s).unwrap()[0];
        let offices = page.sections.iter().find(|x| x.title == "Top Offices Performance").unwrap();
        assert_eq!(offices.fields.len(), 8);
        assert_eq!(offices.fields[0].label(), "Northside Office Revenue");

        s.update("topOffices.4", TreeValue::from(serde_json::json!({ "name": "Eastside", "revenue": 1, "margin": 2 })))
            .unwrap();
        let page = &build_pages(Variant::Financial, &s).unwrap()[0];
        assert_eq!(page.sections[3].fields.len(), 10);
    }

    #[test]
    fn field_index_spans_sections() {
        let s = store(Variant::Brokerage);
        let mut pages = build_pages(Variant::Brokerage, &s).unwrap();
        let page = &mut pages[0];
        assert_eq!(page.field_count(), 15);
        assert_eq!(page.field(2).unwrap().path().to_string(), "page1.metrics.sellSide");
        assert!(page.field_mut(15).is_none());
    }

    #[test]
    fn sequence_chart_reads_segments() {
        let s = store(Variant::Brokerage);
        let pages = build_pages(Variant::Brokerage, &s).unwrap();
        let agents = pages[0].charts[1].segments(&s);
        assert_eq!(agents.len(), 4);
        assert_eq!(
            agents[0],
            Segment { label: "Jenny Wilson".into(), value: 35.0, note: Some("$12.5M".into()) }
        );
        let listing = pages[2].charts[0].segments(&s);
        assert_eq!(listing.iter().map(|x| x.value).sum::<f64>(), 100.0);
    }

    #[test]
    fn record_chart_reads_segments() {
        let s = store(Variant::Financial);
        let pages = build_pages(Variant::Financial, &s).unwrap();
        let segments = pages[1].charts[0].segments(&s);
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[2].label, "Sold");
        assert_eq!(segments[2].value, 20.0);
    }

    #[test]
    fn chart_on_missing_data_is_empty() {
        let s = DataStore::with_tree(
            Variant::Brokerage.profile(),
            MemoryStore::new(),
            TreeValue::from(serde_json::json!({ "page1": {}, "page2": {}, "page3": {} })),
        );
        let pages = build_pages(Variant::Brokerage, &s).unwrap();
        assert!(pages[0].charts[0].segments(&s).is_empty());
    }

    #[test]
    fn derived_figures() {
        let mut s = store(Variant::Financial);
        let pages = build_pages(Variant::Financial, &s).unwrap();
        let derived = &pages[0].derived;
        assert_eq!(derived[0].value(&s), "$25.0M");
        assert_eq!(derived[1].value(&s), "+9.5%");
        assert_eq!(derived[2].value(&s), "+16.8%");

        s.update("previousQuarter.revenue", 0).unwrap();
        assert_eq!(derived[1].value(&s), "n/a");
    }

    #[test]
    fn losses_and_negative_margins_commit() {
        let mut s = store(Variant::Financial);
        let mut pages = build_pages(Variant::Financial, &s).unwrap();
        let page = &mut pages[0];
        for (index, path, raw) in [(7, "currentQuarter.netIncome", "-500000"), (13, "topOffices.0.margin", "-4")] {
            let field = page.field_mut(index).unwrap();
            assert_eq!(field.path().to_string(), path);
            field.activate(&s);
            let draft = field.draft_mut().unwrap();
            draft.clear();
            draft.insert_str(raw);
            assert_eq!(field.commit(&mut s).unwrap(), crate::field::Commit::Committed);
        }
        assert_eq!(s.number("currentQuarter.netIncome", 0.0), -500000.0);
        assert_eq!(s.number("topOffices.0.margin", 0.0), -4.0);
    }
}
