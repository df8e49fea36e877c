//! Funnel statistics computed from conversion logs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw counts gathered from an organisation's conversion logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionTally {
    pub opens: u64,
    pub clicks: u64,
    pub total: u64,
}

/// Percentage `numerator / denominator * 100` rounded to two decimals, or 0
/// when the denominator is 0.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::percentage;
///
/// assert_eq!(percentage(1, 3), 33.33);
/// assert_eq!(percentage(5, 0), 0.0);
/// ```
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    // Log counts stay far below 2^52, so the casts are exact.
    let ratio = numerator as f64 / denominator as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// Open/click funnel for an organisation or a single campaign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversionStats {
    /// Opens.
    #[serde(rename = "O")]
    pub opens: u64,
    /// Clicks.
    #[serde(rename = "C")]
    pub clicks: u64,
    /// All logged events.
    #[serde(rename = "K")]
    pub total: u64,
    /// `O / K` as a percentage.
    pub open_rate: f64,
    /// `C / O` as a percentage.
    pub click_rate: f64,
    /// `C / K` as a percentage.
    pub conversion_rate: f64,
}

impl From<ConversionTally> for ConversionStats {
    fn from(tally: ConversionTally) -> Self {
        Self {
            opens: tally.opens,
            clicks: tally.clicks,
            total: tally.total,
            open_rate: percentage(tally.opens, tally.total),
            click_rate: percentage(tally.clicks, tally.opens),
            conversion_rate: percentage(tally.clicks, tally.total),
        }
    }
}

/// Dashboard summary of an organisation's newsletter performance.
///
/// `sent_total` counts authored campaigns. No send receipts exist, so it is a
/// proxy for "sent", not a delivery count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConversionReport {
    pub sent_total: u64,
    pub open_count: u64,
    pub click_count: u64,
    /// Every click is counted as an estimated conversion.
    pub estimated_conversions: u64,
}

impl ConversionReport {
    /// Combine the log tally with the campaign count.
    pub fn new(tally: ConversionTally, campaign_count: u64) -> Self {
        Self {
            sent_total: campaign_count,
            open_count: tally.opens,
            click_count: tally.clicks,
            estimated_conversions: tally.clicks,
        }
    }
}

/// Report served by the public, CORS-open reporting endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicConversionReport {
    #[serde(flatten)]
    pub report: ConversionReport,
    /// `open_count / sent_total` as a percentage.
    pub open_rate: f64,
    /// `click_count / open_count` as a percentage.
    pub click_rate: f64,
}

impl From<ConversionReport> for PublicConversionReport {
    fn from(report: ConversionReport) -> Self {
        Self {
            report,
            open_rate: percentage(report.open_count, report.sent_total),
            click_rate: percentage(report.click_count, report.open_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(3, 0, 0.0)]
    #[case(1, 3, 33.33)]
    #[case(2, 3, 66.67)]
    #[case(3, 3, 100.0)]
    fn percentages_round_and_guard_zero(
        #[case] numerator: u64,
        #[case] denominator: u64,
        #[case] expected: f64,
    ) {
        assert!((percentage(numerator, denominator) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn click_rate_is_zero_without_opens() {
        let stats = ConversionStats::from(ConversionTally {
            opens: 0,
            clicks: 4,
            total: 4,
        });
        assert_eq!(stats.click_rate, 0.0);
        assert_eq!(stats.conversion_rate, 100.0);
    }

    #[rstest]
    fn empty_logs_yield_zero_rates() {
        let stats = ConversionStats::from(ConversionTally::default());
        assert_eq!(stats.open_rate, 0.0);
        assert_eq!(stats.click_rate, 0.0);
        assert_eq!(stats.conversion_rate, 0.0);
    }

    #[rstest]
    fn stats_serialise_with_single_letter_counts() {
        let stats = ConversionStats::from(ConversionTally {
            opens: 2,
            clicks: 1,
            total: 3,
        });
        assert_eq!(
            serde_json::to_value(stats).expect("serialise"),
            json!({
                "O": 2,
                "C": 1,
                "K": 3,
                "open_rate": 66.67,
                "click_rate": 50.0,
                "conversion_rate": 33.33,
            })
        );
    }

    #[rstest]
    fn public_report_rates_use_sent_total_and_opens() {
        let report = ConversionReport::new(
            ConversionTally {
                opens: 3,
                clicks: 1,
                total: 4,
            },
            4,
        );
        let public = PublicConversionReport::from(report);
        assert_eq!(public.open_rate, 75.0);
        assert_eq!(public.click_rate, 33.33);
        let value = serde_json::to_value(public).expect("serialise");
        assert_eq!(value["sent_total"], 4);
        assert_eq!(value["estimated_conversions"], 1);
    }
}
