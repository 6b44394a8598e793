use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::rules::{
    analyze_trend, generate_alerts, score_rate, Alert, SeverityLevel, TrendAnalysis,
    TrendDirection, UnemploymentScore,
};
use crate::indicators::{FieldPath, FieldPathError, IndicatorRecord, ProvinceDirectory};
use crate::scoring::normalize::{mean, round2, round_to, sample_stdev};
use crate::store::{IndicatorStore, StoreError};

/// Collection the unemployment rules read.
pub const UNEMPLOYMENT_COLLECTION: &str = "tingkat_pengangguran_terbuka";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceAnalysis {
    pub province_id: String,
    pub province_name: String,
    pub year: i32,
    pub unemployment_rate: f64,
    pub score: UnemploymentScore,
    pub trend: Option<TrendAnalysis>,
    pub alerts: Vec<Alert>,
    /// 1 is the lowest rate.
    pub rank: Option<usize>,
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalGapAnalysis {
    pub year: i32,
    pub national_average: f64,
    pub provinces: Vec<ProvinceAnalysis>,
    pub total_provinces: usize,
    pub critical_provinces: usize,
    pub high_risk_provinces: usize,
    /// Coefficient of variation of the provincial rates.
    pub gap_index: f64,
    pub summary: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonAnalysis {
    pub year_from: i32,
    pub year_to: i32,
    pub provinces_improved: usize,
    pub provinces_worsened: usize,
    pub provinces_stable: usize,
    pub biggest_improvement: Option<ProvinceAnalysis>,
    pub biggest_decline: Option<ProvinceAnalysis>,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalProvince {
    pub province_id: String,
    pub province_name: String,
    pub unemployment_rate: f64,
    pub score: u8,
    pub severity: SeverityLevel,
    pub alerts: Vec<Alert>,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalAlerts {
    pub year: i32,
    pub total_critical: usize,
    pub provinces: Vec<CriticalProvince>,
    pub status: &'static str,
}

/// Error raised by the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No data found for year {0}")]
    NoData(i32),
    #[error("year_from must be less than year_to")]
    InvalidRange,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid rate field path: {0}")]
    FieldPath(#[from] FieldPathError),
}

/// Unemployment scoring, trends and regional gap detection.
pub struct UnemploymentAnalysisService<S: ?Sized, P: ?Sized> {
    store: Arc<S>,
    provinces: Arc<P>,
    annual_rate: FieldPath,
    august_rate: FieldPath,
}

impl<S, P> UnemploymentAnalysisService<S, P>
where
    S: IndicatorStore + ?Sized + 'static,
    P: ProvinceDirectory + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, provinces: Arc<P>) -> Result<Self, AnalysisError> {
        Ok(Self {
            store,
            provinces,
            annual_rate: FieldPath::parse("data.tahunan")?,
            august_rate: FieldPath::parse("data.agustus")?,
        })
    }

    /// Annual rate, or the August survey when the annual figure is absent.
    fn rate(&self, record: &IndicatorRecord) -> Option<f64> {
        self.annual_rate
            .resolve(record)
            .as_number()
            .or_else(|| self.august_rate.resolve(record).as_number())
    }

    async fn province_name(&self, province_id: &str) -> String {
        self.provinces
            .resolve_name(province_id)
            .await
            .unwrap_or_else(|| province_id.to_string())
    }

    /// Rates for one year keyed by province code.
    async fn rates_for_year(&self, year: i32) -> Result<BTreeMap<String, f64>, StoreError> {
        let records = self
            .store
            .find_by_year(UNEMPLOYMENT_COLLECTION, year)
            .await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                self.rate(record)
                    .map(|rate| (record.province_id.clone(), rate))
            })
            .collect())
    }

    pub async fn regional_gap(&self, year: i32) -> Result<RegionalGapAnalysis, AnalysisError> {
        let current = self.rates_for_year(year).await?;
        if current.is_empty() {
            return Err(AnalysisError::NoData(year));
        }
        let previous = self.rates_for_year(year - 1).await?;

        let mut provinces = Vec::with_capacity(current.len());
        for (province_id, rate) in &current {
            let province_name = self.province_name(province_id).await;
            let score = score_rate(*rate);
            let trend = previous
                .get(province_id)
                .filter(|previous_rate| **previous_rate != 0.0)
                .map(|previous_rate| analyze_trend(*previous_rate, *rate, year - 1, year));
            let alerts = generate_alerts(&province_name, &score, trend.as_ref());

            provinces.push(ProvinceAnalysis {
                province_id: province_id.clone(),
                province_name,
                year,
                unemployment_rate: *rate,
                score,
                trend,
                alerts,
                rank: None,
                percentile: None,
            });
        }

        provinces.sort_by(|left, right| left.unemployment_rate.total_cmp(&right.unemployment_rate));
        let total = provinces.len();
        for (index, analysis) in provinces.iter_mut().enumerate() {
            analysis.rank = Some(index + 1);
            analysis.percentile = Some(round_to(index as f64 / total as f64 * 100.0, 1));
        }

        let rates: Vec<f64> = current.values().copied().collect();
        let national_average = mean(&rates).unwrap_or(0.0);
        let critical_provinces = count_severity(&provinces, SeverityLevel::Critical);
        let high_risk_provinces = count_severity(&provinces, SeverityLevel::High);
        let gap_index = if national_average > 0.0 {
            round_to(sample_stdev(&rates) / national_average, 3)
        } else {
            0.0
        };

        let summary = summarize(
            year,
            national_average,
            critical_provinces,
            high_risk_provinces,
            gap_index,
            &provinces,
        );

        Ok(RegionalGapAnalysis {
            year,
            national_average: round2(national_average),
            total_provinces: total,
            provinces,
            critical_provinces,
            high_risk_provinces,
            gap_index,
            summary,
            status: "success",
        })
    }

    pub async fn compare_years(
        &self,
        year_from: i32,
        year_to: i32,
    ) -> Result<ComparisonAnalysis, AnalysisError> {
        if year_from >= year_to {
            return Err(AnalysisError::InvalidRange);
        }

        let rates_from = self.rates_for_year(year_from).await?;
        let rates_to = self.rates_for_year(year_to).await?;

        let mut improved = Vec::new();
        let mut worsened = Vec::new();
        let mut stable = 0;

        for (province_id, rate_to) in &rates_to {
            let Some(rate_from) = rates_from.get(province_id) else {
                continue;
            };

            let province_name = self.province_name(province_id).await;
            let trend = analyze_trend(*rate_from, *rate_to, year_from, year_to);
            let score = score_rate(*rate_to);
            let alerts = generate_alerts(&province_name, &score, Some(&trend));
            let direction = trend.direction;

            let analysis = ProvinceAnalysis {
                province_id: province_id.clone(),
                province_name,
                year: year_to,
                unemployment_rate: *rate_to,
                score,
                trend: Some(trend),
                alerts,
                rank: None,
                percentile: None,
            };

            match direction {
                TrendDirection::Improving => improved.push(analysis),
                TrendDirection::Worsening => worsened.push(analysis),
                TrendDirection::Stable => stable += 1,
            }
        }

        Ok(ComparisonAnalysis {
            year_from,
            year_to,
            provinces_improved: improved.len(),
            provinces_worsened: worsened.len(),
            provinces_stable: stable,
            biggest_improvement: largest_change(improved),
            biggest_decline: largest_change(worsened),
            status: "success",
        })
    }

    /// Provinces carrying at least one high or critical alert.
    pub async fn critical_alerts(&self, year: i32) -> Result<CriticalAlerts, AnalysisError> {
        let analysis = self.regional_gap(year).await?;
        let provinces: Vec<CriticalProvince> = analysis
            .provinces
            .into_iter()
            .filter(|province| {
                province
                    .alerts
                    .iter()
                    .any(|alert| alert.severity.is_urgent())
            })
            .map(|province| CriticalProvince {
                province_id: province.province_id,
                province_name: province.province_name,
                unemployment_rate: province.unemployment_rate,
                score: province.score.score,
                severity: province.score.severity,
                alerts: province.alerts,
                rank: province.rank,
            })
            .collect();

        Ok(CriticalAlerts {
            year,
            total_critical: provinces.len(),
            provinces,
            status: "success",
        })
    }
}

fn count_severity(provinces: &[ProvinceAnalysis], severity: SeverityLevel) -> usize {
    provinces
        .iter()
        .filter(|province| province.score.severity == severity)
        .count()
}

/// First province with the largest absolute change.
fn largest_change(candidates: Vec<ProvinceAnalysis>) -> Option<ProvinceAnalysis> {
    let change = |analysis: &ProvinceAnalysis| {
        analysis
            .trend
            .as_ref()
            .map(|trend| trend.change_absolute.abs())
            .unwrap_or(0.0)
    };

    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if change(&current) >= change(&candidate) => Some(current),
        _ => Some(candidate),
    })
}

fn summarize(
    year: i32,
    average: f64,
    critical: usize,
    high_risk: usize,
    gap_index: f64,
    provinces: &[ProvinceAnalysis],
) -> String {
    let mut parts = vec![
        format!("Unemployment analysis for {year}:"),
        format!("National average: {average:.2}%"),
        format!("Total provinces analyzed: {}", provinces.len()),
    ];

    if critical > 0 {
        parts.push(format!(
            "⚠️ {critical} province(s) with CRITICAL unemployment (>10%)"
        ));
    }
    if high_risk > 0 {
        parts.push(format!(
            "⚠️ {high_risk} province(s) with HIGH unemployment (7-10%)"
        ));
    }

    if gap_index > 0.3 {
        parts.push(format!(
            "⚠️ High regional inequality detected (gap index: {gap_index})"
        ));
    } else if gap_index > 0.2 {
        parts.push(format!("Moderate regional inequality (gap index: {gap_index})"));
    } else {
        parts.push(format!("Low regional inequality (gap index: {gap_index})"));
    }

    if let (Some(best), Some(worst)) = (provinces.first(), provinces.last()) {
        parts.push(format!(
            "Best: {} ({}%)",
            best.province_name, best.unemployment_rate
        ));
        parts.push(format!(
            "Worst: {} ({}%)",
            worst.province_name, worst.unemployment_rate
        ));
    }

    parts.join(" | ")
}
