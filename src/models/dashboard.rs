//! Dashboard aggregate as computed by the backend

use serde::{Deserialize, Serialize};

use crate::models::wire::{count, string_or_number};

/// Registration and vaccination counts for one appointment slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    #[serde(default, deserialize_with = "string_or_number")]
    pub slot: String,
    #[serde(default, deserialize_with = "count")]
    pub registrations: u64,
    #[serde(default, deserialize_with = "count")]
    pub vaccinated: u64,
}

/// Backend-computed totals plus per-slot rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAggregate {
    #[serde(default, deserialize_with = "count")]
    pub total_registrations: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_vaccinations: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_unique_vaccinated: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_unvaccinated: u64,
    #[serde(default)]
    pub slots: Vec<SlotSummary>,
}

/// Two bar series keyed by the same slot labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub registered: Vec<u64>,
    pub vaccinated: Vec<u64>,
}

impl DashboardAggregate {
    /// Table rows as `(slot, registrations, vaccinated)` in backend order
    pub fn rows(&self) -> impl Iterator<Item = (&str, u64, u64)> + '_ {
        self.slots
            .iter()
            .map(|row| (row.slot.as_str(), row.registrations, row.vaccinated))
    }

    /// Grouped-bar series in slot order
    #[must_use]
    pub fn chart_series(&self) -> ChartSeries {
        let mut series = ChartSeries::default();
        for (slot, registered, vaccinated) in self.rows() {
            series.labels.push(slot.to_string());
            series.registered.push(registered);
            series.vaccinated.push(vaccinated);
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_series_keeps_slot_order() {
        let aggregate: DashboardAggregate = serde_json::from_str(
            r#"{"totalRegistrations": 5, "totalVaccinations": 3,
                "totalUniqueVaccinated": 2, "totalUnvaccinated": 3,
                "slots": [
                    {"slot": "13:00-14:00", "registrations": 2, "vaccinated": null},
                    {"slot": "09:00-10:00", "registrations": 3, "vaccinated": 2}
                ]}"#,
        )
        .unwrap();

        let series = aggregate.chart_series();
        assert_eq!(series.labels, vec!["13:00-14:00", "09:00-10:00"]);
        assert_eq!(series.registered, vec![2, 3]);
        assert_eq!(series.vaccinated, vec![0, 2]);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let aggregate: DashboardAggregate = serde_json::from_str("{}").unwrap();
        assert_eq!(aggregate, DashboardAggregate::default());
        assert_eq!(aggregate.rows().count(), 0);
    }
}
