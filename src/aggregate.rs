//! Pure reducers shared by the user-scoped and admin-scoped statistics
//! endpoints. Nothing in this module touches the store or fails on empty
//! input; the only non-total case is [`device_stats`], which reports an
//! empty record set as `None` so the handler can 404.

use crate::CellRecord;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Percentage distribution over a fixed category list.
///
/// Every record counts toward the denominator, including records whose
/// category is outside `categories`; only the fixed categories appear in the
/// output. Percentages are formatted with two decimals and a trailing `%`,
/// and an empty record set yields "0.00%" for every category.
pub fn percentage_by<F>(
    records: &[CellRecord],
    categories: &[&str],
    extract: F,
) -> HashMap<String, String>
where
    F: Fn(&CellRecord) -> &str,
{
    let total = records.len();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(extract(record)).or_insert(0) += 1;
    }
    categories
        .iter()
        .map(|&category| {
            let share = if total == 0 {
                0.0
            } else {
                counts.get(category).copied().unwrap_or(0) as f64 / total as f64 * 100.0
            };
            (category.to_string(), format!("{share:.2}%"))
        })
        .collect()
}

/// Per-category mean of an extracted value over a fixed category list. A
/// category with no samples averages to 0.0 rather than erroring.
pub fn average_by<C, V>(
    records: &[CellRecord],
    categories: &[&str],
    category: C,
    value: V,
) -> HashMap<String, f64>
where
    C: Fn(&CellRecord) -> &str,
    V: Fn(&CellRecord) -> f64,
{
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for record in records {
        let entry = sums.entry(category(record)).or_insert((0.0, 0));
        entry.0 += value(record);
        entry.1 += 1;
    }
    categories
        .iter()
        .map(|&category| {
            let average = match sums.get(category) {
                Some((sum, samples)) if *samples > 0 => sum / *samples as f64,
                _ => 0.0,
            };
            (category.to_string(), average)
        })
        .collect()
}

/// Buckets records by hour ("YYYY-MM-DD HH:00") and returns the sorted
/// bucket labels with their parallel counts.
pub fn hourly_trend(records: &[CellRecord]) -> (Vec<String>, Vec<u64>) {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let slot = record.timestamp.format("%Y-%m-%d %H:00").to_string();
        *buckets.entry(slot).or_insert(0) += 1;
    }
    buckets.into_iter().unzip()
}

#[derive(Debug, Serialize)]
pub struct DeviceStats {
    pub records_count: usize,
    pub average_signal_power: f64,
    pub average_sinr: f64,
    pub connected_network_types: Vec<String>,
    pub last_seen: NaiveDateTime,
}

/// Summary view of one device's records. `None` on an empty record set.
pub fn device_stats(records: &[CellRecord]) -> Option<DeviceStats> {
    let last_seen = records.iter().map(|record| record.timestamp).max()?;
    let mut network_types: Vec<String> = Vec::new();
    for record in records {
        if !network_types.contains(&record.network_type) {
            network_types.push(record.network_type.clone());
        }
    }
    Some(DeviceStats {
        records_count: records.len(),
        average_signal_power: mean(records.iter().map(|record| record.signal_power)),
        average_sinr: mean(records.iter().map(|record| record.sinr)),
        connected_network_types: network_types,
        last_seen,
    })
}

/// Arithmetic mean, 0.0 on empty input.
pub fn mean<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut sum = 0.0;
    let mut samples = 0usize;
    for value in values {
        sum += value;
        samples += 1;
    }
    if samples == 0 {
        0.0
    } else {
        sum / samples as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_record::{NETWORK_TYPES, OPERATORS};

    fn record(operator: &str, network_type: &str, signal_power: f64, sinr: f64, ts: &str) -> CellRecord {
        CellRecord {
            operator: operator.to_string(),
            signal_power,
            sinr,
            network_type: network_type.to_string(),
            frequency_band: "B3".to_string(),
            cell_id: "cell-1".to_string(),
            timestamp: ts.parse().unwrap(),
            device_ip: "10.0.0.1".to_string(),
            device_mac: "aa:bb:cc:dd:ee:ff".to_string(),
            device_id: "device-1".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn operator_percentages() {
        let records = vec![
            record("Alfa", "4G", -90.0, 10.0, "2024-01-15T10:00:00"),
            record("Alfa", "4G", -95.0, 12.0, "2024-01-15T10:10:00"),
            record("Touch", "3G", -100.0, 8.0, "2024-01-15T11:00:00"),
        ];
        let stats = percentage_by(&records, OPERATORS, |r| &r.operator);
        assert_eq!(stats["Alfa"], "66.67%");
        assert_eq!(stats["Touch"], "33.33%");
    }

    #[test]
    fn percentages_on_empty_input() {
        let stats = percentage_by(&[], OPERATORS, |r| &r.operator);
        assert_eq!(stats["Alfa"], "0.00%");
        assert_eq!(stats["Touch"], "0.00%");
    }

    #[test]
    fn unknown_categories_count_toward_total_but_are_not_emitted() {
        let records = vec![
            record("Alfa", "4G", -90.0, 10.0, "2024-01-15T10:00:00"),
            record("Alfa", "4G", -95.0, 12.0, "2024-01-15T10:10:00"),
            record("Ogero", "4G", -91.0, 9.0, "2024-01-15T10:20:00"),
        ];
        let stats = percentage_by(&records, OPERATORS, |r| &r.operator);
        assert_eq!(stats.len(), OPERATORS.len());
        assert_eq!(stats["Alfa"], "66.67%");
        assert_eq!(stats["Touch"], "0.00%");
    }

    #[test]
    fn per_network_averages() {
        let records = vec![
            record("Alfa", "4G", -90.0, 10.0, "2024-01-15T10:00:00"),
            record("Alfa", "4G", -100.0, 14.0, "2024-01-15T10:10:00"),
            record("Touch", "2G", -110.0, 2.0, "2024-01-15T11:00:00"),
        ];
        let stats = average_by(&records, NETWORK_TYPES, |r| &r.network_type, |r| r.signal_power);
        assert_eq!(stats["4G"], -95.0);
        assert_eq!(stats["2G"], -110.0);
        // no 3G samples, average must be zero instead of a division error
        assert_eq!(stats["3G"], 0.0);
    }

    #[test]
    fn trend_labels_are_sorted_and_parallel() {
        let records = vec![
            record("Alfa", "4G", -90.0, 10.0, "2024-01-15T11:45:00"),
            record("Alfa", "4G", -95.0, 12.0, "2024-01-15T10:10:00"),
            record("Touch", "3G", -100.0, 8.0, "2024-01-15T10:59:00"),
            record("Touch", "3G", -101.0, 8.5, "2024-01-14T23:59:00"),
        ];
        let (labels, counts) = hourly_trend(&records);
        assert_eq!(
            labels,
            vec!["2024-01-14 23:00", "2024-01-15 10:00", "2024-01-15 11:00"]
        );
        assert_eq!(counts, vec![1, 2, 1]);
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn device_stats_on_empty_input() {
        assert!(device_stats(&[]).is_none());
    }

    #[test]
    fn device_stats_last_seen_is_max_timestamp() {
        let records = vec![
            record("Alfa", "4G", -90.0, 10.0, "2024-01-15T10:00:00"),
            record("Alfa", "3G", -100.0, 6.0, "2024-01-16T09:30:00"),
            record("Alfa", "4G", -95.0, 8.0, "2024-01-14T22:00:00"),
        ];
        let stats = device_stats(&records).unwrap();
        assert_eq!(stats.records_count, 3);
        assert_eq!(stats.last_seen, "2024-01-16T09:30:00".parse().unwrap());
        assert_eq!(stats.average_signal_power, -95.0);
        assert_eq!(stats.average_sinr, 8.0);
        assert_eq!(stats.connected_network_types.len(), 2);
    }

    #[test]
    fn mean_on_empty_input() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(mean([3.0, 5.0]), 4.0);
    }
}
