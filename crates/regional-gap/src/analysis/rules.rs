use serde::Serialize;

use crate::scoring::normalize::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn is_urgent(self) -> bool {
        matches!(self, SeverityLevel::High | SeverityLevel::Critical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
}

/// Banded 0..=100 rating of an unemployment rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnemploymentScore {
    pub rate: f64,
    pub score: u8,
    pub category: &'static str,
    pub severity: SeverityLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    pub year_from: i32,
    pub year_to: i32,
    pub rate_from: f64,
    pub rate_to: f64,
    pub change_absolute: f64,
    pub change_percentage: f64,
    pub direction: TrendDirection,
    pub is_significant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CriticalUnemployment,
    HighUnemployment,
    WorseningTrend,
    PositiveTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: SeverityLevel,
    pub message: String,
    pub recommendation: Option<String>,
}

/// Change in percentage points that counts as a real movement.
const SIGNIFICANT_CHANGE: f64 = 0.5;

/// Maps a rate onto its band; inside each band the score falls linearly and is truncated.
pub fn score_rate(rate: f64) -> UnemploymentScore {
    let (score, category, severity) = if rate <= 3.0 {
        (100 - (rate * 3.33) as i64, "Excellent", SeverityLevel::Low)
    } else if rate <= 5.0 {
        (90 - ((rate - 3.0) * 10.0) as i64, "Good", SeverityLevel::Low)
    } else if rate <= 7.0 {
        (70 - ((rate - 5.0) * 10.0) as i64, "Fair", SeverityLevel::Medium)
    } else if rate <= 10.0 {
        (50 - ((rate - 7.0) * 6.67) as i64, "Poor", SeverityLevel::High)
    } else {
        (
            (30 - ((rate - 10.0) * 3.0) as i64).max(0),
            "Critical",
            SeverityLevel::Critical,
        )
    };

    UnemploymentScore {
        rate,
        score: score.clamp(0, 100) as u8,
        category,
        severity,
    }
}

pub fn analyze_trend(rate_from: f64, rate_to: f64, year_from: i32, year_to: i32) -> TrendAnalysis {
    let change = rate_to - rate_from;
    let change_percentage = if rate_from > 0.0 {
        change / rate_from * 100.0
    } else {
        0.0
    };

    let direction = if change < -SIGNIFICANT_CHANGE {
        TrendDirection::Improving
    } else if change > SIGNIFICANT_CHANGE {
        TrendDirection::Worsening
    } else {
        TrendDirection::Stable
    };

    TrendAnalysis {
        year_from,
        year_to,
        rate_from,
        rate_to,
        change_absolute: round2(change),
        change_percentage: round2(change_percentage),
        direction,
        is_significant: change.abs() > SIGNIFICANT_CHANGE,
    }
}

pub fn generate_alerts(
    province_name: &str,
    score: &UnemploymentScore,
    trend: Option<&TrendAnalysis>,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    match score.severity {
        SeverityLevel::Critical => alerts.push(Alert {
            kind: AlertKind::CriticalUnemployment,
            severity: SeverityLevel::Critical,
            message: format!(
                "{province_name} has critical unemployment rate of {}%",
                score.rate
            ),
            recommendation: Some(
                "Immediate intervention needed: job creation programs, skills training, and economic stimulus"
                    .to_string(),
            ),
        }),
        SeverityLevel::High => alerts.push(Alert {
            kind: AlertKind::HighUnemployment,
            severity: SeverityLevel::High,
            message: format!(
                "{province_name} has high unemployment rate of {}%",
                score.rate
            ),
            recommendation: Some(
                "Implement targeted employment programs and monitor closely".to_string(),
            ),
        }),
        SeverityLevel::Low | SeverityLevel::Medium => {}
    }

    let Some(trend) = trend.filter(|trend| trend.is_significant) else {
        return alerts;
    };

    match trend.direction {
        TrendDirection::Worsening => alerts.push(Alert {
            kind: AlertKind::WorseningTrend,
            severity: if trend.change_absolute.abs() > 1.0 {
                SeverityLevel::High
            } else {
                SeverityLevel::Medium
            },
            message: format!(
                "Unemployment increased by {:.1} percentage points from {} to {}",
                trend.change_absolute.abs(),
                trend.year_from,
                trend.year_to
            ),
            recommendation: Some(
                "Investigate causes and implement corrective measures".to_string(),
            ),
        }),
        TrendDirection::Improving => alerts.push(Alert {
            kind: AlertKind::PositiveTrend,
            severity: SeverityLevel::Low,
            message: format!(
                "Unemployment decreased by {:.1} percentage points - positive progress",
                trend.change_absolute.abs()
            ),
            recommendation: Some(
                "Continue current policies and share best practices".to_string(),
            ),
        }),
        TrendDirection::Stable => {}
    }

    alerts
}
