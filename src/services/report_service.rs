// src/services/report_service.rs

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{AssociateRepository, TipRepository},
    models::{
        associate::Associate,
        report::{
            AssociateEarnings, CorporateReport, CorporateSummary, EarningsBucket, LeaderboardEntry,
            ReportKpis, ReportPeriod,
        },
        tip::Tip,
    },
    services::tip_service::withholding_rate,
};

pub const CSV_HEADER: &str = "Associate Name,Role,Bravo Count,Total Tip Value ($)";

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// Início do período (UTC). A semana começa no domingo.
pub fn period_start(period: ReportPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let date = match period {
        ReportPeriod::Today => today,
        ReportPeriod::Week => today
            .checked_sub_days(Days::new(today.weekday().num_days_from_sunday().into()))
            .unwrap_or(today),
        ReportPeriod::Month => today.with_day(1).unwrap_or(today),
        ReportPeriod::Year => today.with_ordinal(1).unwrap_or(today),
    };
    start_of_day(date)
}

fn bucket<'a>(tips: impl Iterator<Item = &'a Tip>) -> EarningsBucket {
    tips.fold(EarningsBucket::default(), |mut acc, tip| {
        acc.amount += tip.amount;
        acc.count += 1;
        acc
    })
}

pub fn kpis(tips: &[&Tip]) -> ReportKpis {
    let total_tip_value: Decimal = tips.iter().map(|t| t.amount).sum();
    let bravos_with_tips = tips.iter().filter(|t| t.amount > Decimal::ZERO).count();
    let average_tip_amount = if bravos_with_tips > 0 {
        (total_tip_value / Decimal::from(bravos_with_tips)).round_dp(2)
    } else {
        Decimal::ZERO
    };
    ReportKpis {
        total_bravos: tips.len(),
        total_tip_value,
        bravos_with_tips,
        average_tip_amount,
    }
}

/// Ranking: mais Bravos primeiro; empate decidido pelo valor.
pub fn leaderboard(team: &[Associate], tips: &[&Tip]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = team
        .iter()
        .map(|associate| {
            let totals = bucket(tips.iter().copied().filter(|t| t.associate_id == associate.id));
            LeaderboardEntry {
                associate_id: associate.id.clone(),
                name: associate.name.clone(),
                role: associate.role.clone(),
                avatar_url: associate.avatar_url.clone(),
                bravo_count: totals.count,
                total_tip_value: totals.amount,
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.bravo_count
            .cmp(&a.bravo_count)
            .then_with(|| b.total_tip_value.cmp(&a.total_tip_value))
    });
    entries
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn leaderboard_csv(entries: &[LeaderboardEntry]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for entry in entries {
        csv.push_str(&format!(
            "{},{},{},{:.2}\n",
            quoted(&entry.name),
            quoted(&entry.role),
            entry.bravo_count,
            entry.total_tip_value
        ));
    }
    csv
}

pub fn report_file_name(period: ReportPeriod, now: DateTime<Utc>) -> String {
    format!("bravos_report_{}_{}.csv", period.as_str(), now.format("%Y-%m-%d"))
}

pub fn earnings(tips: &[Tip], now: DateTime<Utc>) -> AssociateEarnings {
    let since = |period| {
        let start = period_start(period, now);
        bucket(tips.iter().filter(move |t| t.timestamp >= start))
    };
    AssociateEarnings {
        today: since(ReportPeriod::Today),
        week: since(ReportPeriod::Week),
        month: since(ReportPeriod::Month),
        total: bucket(tips.iter()),
    }
}

#[derive(Clone)]
pub struct ReportService {
    associates: AssociateRepository,
    tips: TipRepository,
}

impl ReportService {
    pub fn new(associates: AssociateRepository, tips: TipRepository) -> Self {
        Self { associates, tips }
    }

    pub async fn corporate_report(
        &self,
        corporate_id: &str,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> Result<CorporateReport, AppError> {
        let team = self.associates.find_by_corporation(corporate_id).await?;
        let tips = self.tips.find_by_corporation(corporate_id).await?;

        let since = period_start(period, now);
        let in_period: Vec<&Tip> = tips.iter().filter(|t| t.timestamp >= since).collect();

        Ok(CorporateReport {
            period,
            since,
            kpis: kpis(&in_period),
            leaderboard: leaderboard(&team, &in_period),
        })
    }

    pub async fn corporate_summary(&self, corporate_id: &str, now: DateTime<Utc>) -> Result<CorporateSummary, AppError> {
        let team = self.associates.find_by_corporation(corporate_id).await?;
        let mut tips = self.tips.find_by_corporation(corporate_id).await?;
        tips.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let all: Vec<&Tip> = tips.iter().collect();
        let associates = leaderboard(&team, &all);
        let total_collected: Decimal = tips.iter().map(|t| t.amount).sum();
        let tax_withheld = total_collected * withholding_rate();

        let today = period_start(ReportPeriod::Today, now);
        Ok(CorporateSummary {
            date: now.date_naive(),
            daily_tips: tips.iter().filter(|t| t.timestamp >= today).cloned().collect(),
            total_collected,
            tax_withheld,
            net_distribution: total_collected - tax_withheld,
            associates,
        })
    }

    pub async fn associate_earnings(&self, associate_id: &str, now: DateTime<Utc>) -> Result<AssociateEarnings, AppError> {
        let tips = self.tips.find_by_associate(associate_id).await?;
        Ok(earnings(&tips, now))
    }
}
