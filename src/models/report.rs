// src/models/report.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::tip::Tip;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Today,
    #[default]
    Week,
    Month,
    Year,
}

impl ReportPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportPeriod::Today => "today",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportKpis {
    pub total_bravos: usize,
    #[schema(value_type = f64)]
    pub total_tip_value: Decimal,
    pub bravos_with_tips: usize,
    #[schema(value_type = f64)]
    pub average_tip_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub associate_id: String,
    pub name: String,
    pub role: String,
    pub avatar_url: String,
    pub bravo_count: usize,
    #[schema(value_type = f64)]
    pub total_tip_value: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporateReport {
    pub period: ReportPeriod,
    pub since: DateTime<Utc>,
    pub kpis: ReportKpis,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EarningsBucket {
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssociateEarnings {
    pub today: EarningsBucket,
    pub week: EarningsBucket,
    pub month: EarningsBucket,
    pub total: EarningsBucket,
}

// Painel da corporação: o pool atual (o que seria distribuído)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorporateSummary {
    pub date: NaiveDate,
    pub daily_tips: Vec<Tip>,
    #[schema(value_type = f64)]
    pub total_collected: Decimal,
    #[schema(value_type = f64)]
    pub tax_withheld: Decimal,
    #[schema(value_type = f64)]
    pub net_distribution: Decimal,
    pub associates: Vec<LeaderboardEntry>,
}
