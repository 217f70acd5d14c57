//! Mood statistics over classified diary entries

use crate::types::SentimentLabel;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The parts of a diary entry the statistics need
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntrySummary {
    /// When the entry was written
    pub date: DateTime<Utc>,

    /// Sentiment assigned when the entry was saved
    pub sentiment: SentimentLabel,
}

/// Entry counts per sentiment label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
        }
    }
}

/// One chart row: counts for a single calendar day (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySentiment {
    /// Day formatted as `YYYY-MM-DD`
    pub date: String,

    #[serde(flatten)]
    pub counts: SentimentCounts,
}

/// Mood statistics for a time window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentStats {
    /// Entries inside the window
    pub total: usize,

    /// Per-label totals
    pub sentiments: SentimentCounts,

    /// Per-day rows in ascending date order
    pub chart_data: Vec<DailySentiment>,
}

impl SentimentStats {
    /// Compute statistics for entries written in the last `window_days` days.
    /// A window reaching past the earliest representable date includes every
    /// entry.
    pub fn compute<'a, I>(entries: I, now: DateTime<Utc>, window_days: u32) -> Self
    where
        I: IntoIterator<Item = &'a DiaryEntrySummary>,
    {
        let start = now.checked_sub_signed(Duration::days(i64::from(window_days)));

        let mut total = 0;
        let mut sentiments = SentimentCounts::default();
        let mut daily: BTreeMap<NaiveDate, SentimentCounts> = BTreeMap::new();

        for entry in entries.into_iter().filter(|e| start.map_or(true, |start| e.date >= start)) {
            total += 1;
            sentiments.record(entry.sentiment);
            daily
                .entry(entry.date.date_naive())
                .or_default()
                .record(entry.sentiment);
        }

        let chart_data = daily
            .into_iter()
            .map(|(day, counts)| DailySentiment {
                date: day.format("%Y-%m-%d").to_string(),
                counts,
            })
            .collect();

        Self {
            total,
            sentiments,
            chart_data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(day: u32, hour: u32, sentiment: SentimentLabel) -> DiaryEntrySummary {
        DiaryEntrySummary {
            date: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            sentiment,
        }
    }

    #[test]
    fn test_counts_and_daily_rows() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let entries = vec![
            entry(19, 9, SentimentLabel::Positive),
            entry(18, 8, SentimentLabel::Negative),
            entry(19, 21, SentimentLabel::Neutral),
            entry(18, 22, SentimentLabel::Negative),
        ];

        let stats = SentimentStats::compute(&entries, now, 30);

        assert_eq!(stats.total, 4);
        assert_eq!(
            stats.sentiments,
            SentimentCounts {
                positive: 1,
                negative: 2,
                neutral: 1
            }
        );
        assert_eq!(stats.chart_data.len(), 2);
        assert_eq!(stats.chart_data[0].date, "2024-03-18");
        assert_eq!(stats.chart_data[0].counts.negative, 2);
        assert_eq!(stats.chart_data[1].date, "2024-03-19");
        assert_eq!(stats.chart_data[1].counts.positive, 1);
        assert_eq!(stats.chart_data[1].counts.neutral, 1);
    }

    #[test]
    fn test_window_excludes_old_entries() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let entries = vec![
            entry(1, 9, SentimentLabel::Positive),
            entry(15, 9, SentimentLabel::Negative),
        ];

        let stats = SentimentStats::compute(&entries, now, 7);

        assert_eq!(stats.total, 1);
        assert_eq!(stats.sentiments.negative, 1);
        assert_eq!(stats.sentiments.positive, 0);
    }

    #[test]
    fn test_empty_entries() {
        let stats = SentimentStats::compute(&Vec::<DiaryEntrySummary>::new(), Utc::now(), 30);
        assert_eq!(stats.total, 0);
        assert!(stats.chart_data.is_empty());
    }

    #[test]
    fn test_unbounded_window_includes_everything() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let entries = vec![
            entry(1, 9, SentimentLabel::Positive),
            DiaryEntrySummary {
                date: Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
                sentiment: SentimentLabel::Neutral,
            },
        ];

        let stats = SentimentStats::compute(&entries, now, u32::MAX);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.chart_data[0].date, "1970-01-01");
    }

    #[test]
    fn test_chart_row_serialization() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let entries = vec![entry(19, 9, SentimentLabel::Positive)];
        let json = serde_json::to_value(SentimentStats::compute(&entries, now, 30)).unwrap();

        assert_eq!(json["chartData"][0]["date"], "2024-03-19");
        assert_eq!(json["chartData"][0]["positive"], 1);
        assert_eq!(json["sentiments"]["neutral"], 0);
    }
}
