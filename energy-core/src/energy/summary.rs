use serde::Serialize;

use crate::model::EnergyForecast;

use super::best_time::first_max_index;

/// Current value, window peak and peak label for one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub current: f64,
    pub max: f64,
    pub best_time: String,
}

/// Headline figures for the metric cards.
///
/// Combined values are sums of two 0..100 scores; `combined.current` and
/// `combined.max` are halved back onto the 0..100 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergySummary {
    pub solar: SeriesSummary,
    pub wind: SeriesSummary,
    pub combined: SeriesSummary,
}

impl EnergySummary {
    pub fn from_forecast(forecast: &EnergyForecast) -> Option<Self> {
        let combined = forecast.combined();
        let mut combined_summary = summarize(&combined, forecast.labels())?;
        combined_summary.current /= 2.0;
        combined_summary.max /= 2.0;

        Some(Self {
            solar: summarize(forecast.solar(), forecast.labels())?,
            wind: summarize(forecast.wind(), forecast.labels())?,
            combined: combined_summary,
        })
    }
}

fn summarize(values: &[f64], labels: &[String]) -> Option<SeriesSummary> {
    let idx = first_max_index(values)?;
    Some(SeriesSummary {
        current: *values.first()?,
        max: values[idx],
        best_time: labels.get(idx)?.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_all_three_series() {
        let forecast = EnergyForecast::from_series(
            vec![10.0, 80.0, 40.0],
            vec![60.0, 20.0, 50.0],
            vec!["6AM".into(), "12PM".into(), "6PM".into()],
        )
        .unwrap();

        let summary = EnergySummary::from_forecast(&forecast).unwrap();

        assert_eq!(summary.solar.current, 10.0);
        assert_eq!(summary.solar.max, 80.0);
        assert_eq!(summary.solar.best_time, "12PM");

        assert_eq!(summary.wind.current, 60.0);
        assert_eq!(summary.wind.max, 60.0);
        assert_eq!(summary.wind.best_time, "6AM");

        assert_eq!(summary.combined.current, 35.0);
        assert_eq!(summary.combined.max, 50.0);
        assert_eq!(summary.combined.best_time, "12PM");
    }

    #[test]
    fn combined_peak_stays_on_percent_scale() {
        let forecast = EnergyForecast::from_series(
            vec![10.0, 90.0],
            vec![60.0, 90.0],
            vec!["6:00 AM".into(), "9:00 AM".into()],
        )
        .unwrap();

        let combined = EnergySummary::from_forecast(&forecast).unwrap().combined;

        assert_eq!(combined.current, 35.0);
        assert_eq!(combined.max, 90.0);
        assert_eq!(combined.best_time, "9:00 AM");
        assert!(combined.max <= 100.0);
    }

    #[test]
    fn empty_forecast_has_no_summary() {
        assert!(EnergySummary::from_forecast(&EnergyForecast::default()).is_none());
    }
}
