//! Unemployment analysis: banded rate scores, year-over-year trends,
//! regional gap detection and policy alerts.

pub mod router;
pub mod rules;
pub mod service;

pub use router::analysis_router;
pub use rules::{
    analyze_trend, generate_alerts, score_rate, Alert, AlertKind, SeverityLevel, TrendAnalysis,
    TrendDirection, UnemploymentScore,
};
pub use service::{
    AnalysisError, ComparisonAnalysis, CriticalAlerts, CriticalProvince, ProvinceAnalysis,
    RegionalGapAnalysis, UnemploymentAnalysisService, UNEMPLOYMENT_COLLECTION,
};
