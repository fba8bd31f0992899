use serde::Serialize;

use crate::model::EnergyForecast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestTimes {
    pub solar: String,
    pub wind: String,
    pub combined: String,
}

/// Index of the first maximum; `None` for an empty slice.
pub(crate) fn first_max_index(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ if value.is_nan() => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Labels of the peak solar, wind and combined hours, earliest on ties.
///
/// Returns `None` when the forecast has no entries.
pub fn best_times(forecast: &EnergyForecast) -> Option<BestTimes> {
    let labels = forecast.labels();
    let label_at = |idx: usize| labels[idx].clone();

    let solar = first_max_index(forecast.solar()).map(label_at)?;
    let wind = first_max_index(forecast.wind()).map(label_at)?;
    let combined = first_max_index(&forecast.combined()).map(label_at)?;

    Some(BestTimes { solar, wind, combined })
}
