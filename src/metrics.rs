//! Derived epidemiological indicators.
//!
//! Everything here is a pure function of its inputs. Absent or malformed
//! inputs arrive as non-finite numbers and are reported as a [`MetricError`]
//! instead of leaking NaN or infinity into the view.

use std::fmt;

use serde::{Serialize,Serializer,Deserialize};

use super::dataset::{RegionRecord,Measure};


#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum MetricError {
    DivisionByZero,
    InsufficientData,
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Self::DivisionByZero => write!(f, "division by zero"),
	    Self::InsufficientData => write!(f, "insufficient data"),
	}
    }
}

pub type Outcome = std::result::Result<f64,MetricError>;
pub type Rated = std::result::Result<Indicator,MetricError>;


#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadWindow {
    DayOverDay,
    Legacy,
}

impl Default for SpreadWindow {
    fn default() -> Self {
	Self::DayOverDay
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Scale {
    HigherIsWorse,
    HigherIsBetter,
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub struct Rgb(pub u8,pub u8,pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok,S::Error> {
	serializer.collect_str(self)
    }
}


fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn clamp_percent(value: f64) -> f64 {
    value.max(0.0).min(100.0)
}


/// Percentage of `numerator` in `denominator`, clamped to [0, 100] and
/// rounded to two decimals.
pub fn rate(numerator: f64, denominator: f64) -> Outcome {
    if !numerator.is_finite() || !denominator.is_finite() || denominator == 0.0 {
	return Err(MetricError::DivisionByZero);
    }
    Ok(round_to(clamp_percent(numerator / denominator * 100.0), 2))
}


/// Index of the equal-width bin of `[min, max]` holding `value`, clamped to
/// `[0, buckets - 1]`.
pub fn danger_level(min: f64, max: f64, buckets: usize, value: f64) -> usize {

    if buckets == 0 || value.is_nan() || !(max > min) {
	return 0;
    }

    let step = (max - min) / buckets as f64;
    let level = ((value - min) / step).floor();

    match level < 0.0 {
	true => 0,
	false => (level as usize).min(buckets - 1)
    }

}


/// Average day-over-day growth factor of the sick count.
pub fn spread_coefficient(sick: &[f64], window: SpreadWindow) -> Outcome {

    if sick.len() < 3 {
	return Err(MetricError::InsufficientData);
    }

    // the legacy window stops one ratio short of the last day
    let end = match window {
	SpreadWindow::DayOverDay => sick.len(),
	SpreadWindow::Legacy => sick.len() - 1,
    };

    let ratios = (1..end).map(
	|i| match sick[i-1] == 0.0 || !sick[i-1].is_finite() || !sick[i].is_finite() {
	    true => Err(MetricError::DivisionByZero),
	    false => Ok(sick[i] / sick[i-1])
	}
    ).collect::<std::result::Result<Vec<_>,_>>()?;

    Ok(round_to(ratios.iter().sum::<f64>() / ratios.len() as f64, 2))

}


/// Area (km²) occupied by the sick population at the region's density.
pub fn affected_area(sick: f64, density: f64) -> Outcome {
    if !sick.is_finite() || !density.is_finite() || density == 0.0 {
	return Err(MetricError::DivisionByZero);
    }
    Ok((sick / density).round())
}

/// Expected number of sick people a month ahead.
pub fn monthly_projection(sick: f64, spread: f64) -> Outcome {
    if !sick.is_finite() || !spread.is_finite() {
	return Err(MetricError::DivisionByZero);
    }
    Ok((sick * (spread * 2.0 - 1.0)).round())
}

/// Chance (in percent) to get infected, scaled by a protection factor where
/// 1.0 means no protection at all.
pub fn infection_risk(sick: f64, population: f64, spread: f64, protection: f64) -> Outcome {
    if !sick.is_finite() || !population.is_finite() || population == 0.0
	|| !spread.is_finite() || !protection.is_finite() {
	return Err(MetricError::DivisionByZero);
    }
    Ok(round_to(clamp_percent(sick / population * 100.0 * spread * protection), 3))
}


/// Continuous green (0) to red (100) colour of a percentage.
pub fn colorize(percent: f64, scale: Scale) -> Rgb {

    let percent = match percent.is_nan() {
	true => 0.0,
	false => clamp_percent(percent)
    };

    let percent = match scale {
	Scale::HigherIsWorse => percent,
	Scale::HigherIsBetter => 100.0 - percent,
    };

    let health = 100.0 - percent;
    match health < 50.0 {
	true => Rgb(255, (5.1 * health).round() as u8, 0),
	false => Rgb((510.0 - 5.1 * health).round() as u8, 255, 0)
    }

}

/// Map fill of a sub-region: white when nobody is sick, reaching full red at
/// the country's peak.
pub fn shade(sick: f64, peak: f64) -> Rgb {
    let step = match peak / 256.0 > 0.0 {
	true => peak / 256.0,
	false => 1.0
    };
    let level = (255.0 - sick / step).max(0.0).min(255.0) as u8;
    Rgb(255, level, level)
}


#[derive(Clone,Copy,Debug,PartialEq,Serialize,Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(min: f64, max: f64) -> Self {
	Self { min, max }
    }
}

#[derive(Clone,Debug,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct Settings {
    pub protection_factor: f64,
    pub spread_window: SpreadWindow,
    pub buckets: usize,
    pub spread: Band,
    pub death: Band,
    pub unprotected: Band,
    pub protected: Band,
    /// Upper bound of the affected-area band, as a share of the region's area.
    pub area_share: f64,
    /// Upper bound of the projection band, as a multiple of the sick count.
    pub projection_factor: f64,
}

impl Default for Settings {
    fn default() -> Self {
	Self {
	    protection_factor: 0.1,
	    spread_window: SpreadWindow::default(),
	    buckets: 5,
	    spread: Band::new(0.8, 1.2),
	    death: Band::new(0.0, 20.0),
	    unprotected: Band::new(0.0, 2.0),
	    protected: Band::new(0.0, 1.0),
	    area_share: 0.01,
	    projection_factor: 2.0,
	}
    }
}


#[derive(Clone,Copy,Debug,PartialEq)]
pub struct Indicator {
    pub value: f64,
    pub level: usize,
}

#[derive(Clone,Debug,PartialEq)]
pub struct DerivedMetrics {
    pub positivity: Outcome,
    pub sick_rate: Outcome,
    pub recovery: Outcome,
    pub mortality: Outcome,
    pub spread: Rated,
    pub death: Rated,
    pub affected_area: Rated,
    pub projection: Rated,
    pub risk_unprotected: Rated,
    pub risk_protected: Rated,
}


#[derive(Clone,Debug,Default)]
pub struct MetricsEngine {
    settings: Settings,
}

impl MetricsEngine {

    pub fn new(settings: Settings) -> Self {
	Self { settings }
    }

    pub fn settings(&self) -> &Settings {
	&self.settings
    }

    fn banded(&self, band: Band, value: Outcome) -> Rated {
	value.map(|value| Indicator {
	    value, level: danger_level(band.min, band.max, self.settings.buckets, value)
	})
    }

    pub fn derive(&self, record: &RegionRecord) -> DerivedMetrics {

	let s = &self.settings;
	let tested = record.value(Measure::Tested);
	let sick = record.value(Measure::Sick);
	let recovered = record.value(Measure::Recovered);
	let dead = record.value(Measure::Dead);
	let population = record.region.population.map_or(f64::NAN, |p| p as f64);
	let area = record.region.area.unwrap_or(f64::NAN);
	let density = record.region.density.unwrap_or(f64::NAN);

	let mortality = rate(dead, sick);
	let spread = spread_coefficient(&record.series.values(Measure::Sick), s.spread_window);

	DerivedMetrics {
	    positivity: rate(tested, population),
	    sick_rate: rate(sick, population),
	    recovery: rate(recovered, sick),
	    mortality,
	    spread: self.banded(s.spread, spread),
	    death: self.banded(s.death, mortality),
	    affected_area: self.banded(Band::new(0.0, area * s.area_share),
				       affected_area(sick, density)),
	    projection: self.banded(Band::new(0.0, sick * s.projection_factor),
				    spread.and_then(|spread| monthly_projection(sick, spread))),
	    risk_unprotected: self.banded(s.unprotected, spread.and_then(
		|spread| infection_risk(sick, population, spread, 1.0))),
	    risk_protected: self.banded(s.protected, spread.and_then(
		|spread| infection_risk(sick, population, spread, s.protection_factor))),
	}

    }

}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rate_of_tested_population() {
	assert_eq!(rate(1000.0, 10000.0), Ok(10.0));
	assert_eq!(format!("{:.2} %", rate(1000.0, 10000.0).unwrap()), "10.00 %");
	assert_eq!(rate(1.0, 3.0), Ok(33.33));
    }

    #[test]
    fn rate_is_clamped_and_monotonic() {
	let mut last = 0.0;
	for sick in (0..30000).step_by(250) {
	    let value = rate(sick as f64, 10000.0).unwrap();
	    assert!(value >= 0.0 && value <= 100.0);
	    assert!(value >= last);
	    last = value;
	}
	assert_eq!(rate(-5.0, 10.0), Ok(0.0));
    }

    #[test]
    fn rate_rejects_zero_and_missing_denominators() {
	assert_eq!(rate(5.0, 0.0), Err(MetricError::DivisionByZero));
	assert_eq!(rate(5.0, f64::NAN), Err(MetricError::DivisionByZero));
	assert_eq!(rate(f64::NAN, 5.0), Err(MetricError::DivisionByZero));
    }

    #[test]
    fn danger_level_buckets() {
	assert_eq!(danger_level(0.0, 20.0, 5, 0.0), 0);
	assert_eq!(danger_level(0.0, 20.0, 5, 3.99), 0);
	assert_eq!(danger_level(0.0, 20.0, 5, 4.0), 1);
	assert_eq!(danger_level(0.0, 20.0, 5, 19.9), 4);
	assert_eq!(danger_level(0.0, 20.0, 5, 20.0), 4);
	assert_eq!(danger_level(0.8, 1.2, 5, 1.05), 3);
    }

    #[test]
    fn danger_level_out_of_range() {
	assert_eq!(danger_level(0.0, 100.0, 5, -50.0), 0);
	assert_eq!(danger_level(0.0, 100.0, 5, 1e9), 4);
	assert_eq!(danger_level(0.0, 100.0, 5, f64::INFINITY), 4);
	assert_eq!(danger_level(0.0, 100.0, 5, f64::NAN), 0);
	assert_eq!(danger_level(5.0, 5.0, 5, 7.0), 0);
	assert_eq!(danger_level(0.0, 1.0, 0, 0.5), 0);
    }

    #[test]
    fn danger_level_is_monotonic() {
	let mut last = 0;
	for i in -100..300 {
	    let level = danger_level(0.0, 200.0, 7, i as f64);
	    assert!(level >= last && level < 7);
	    last = level;
	}
    }

    #[test]
    fn colorize_endpoints() {
	assert_eq!(colorize(0.0, Scale::HigherIsWorse), Rgb(0, 255, 0));
	assert_eq!(colorize(100.0, Scale::HigherIsWorse), Rgb(255, 0, 0));
	assert_eq!(colorize(50.0, Scale::HigherIsWorse), Rgb(255, 255, 0));
	assert_eq!(colorize(0.0, Scale::HigherIsWorse).to_string(), "#00ff00");
	assert_eq!(colorize(250.0, Scale::HigherIsWorse), Rgb(255, 0, 0));
    }

    #[test]
    fn colorize_inversion() {
	for p in -10..=110 {
	    let p = p as f64;
	    assert_eq!(colorize(p, Scale::HigherIsBetter), colorize(100.0 - p, Scale::HigherIsWorse));
	}
    }

    #[test]
    fn colorize_is_continuous() {
	let mut last = colorize(0.0, Scale::HigherIsWorse);
	for i in 1..=1000 {
	    let next = colorize(i as f64 / 10.0, Scale::HigherIsWorse);
	    assert!((next.0 as i32 - last.0 as i32).abs() <= 1);
	    assert!((next.1 as i32 - last.1 as i32).abs() <= 1);
	    last = next;
	}
    }

    #[test]
    fn shade_follows_peak() {
	assert_eq!(shade(0.0, 900.0), Rgb(255, 255, 255));
	assert_eq!(shade(450.0, 900.0), Rgb(255, 127, 127));
	assert_eq!(shade(900.0, 900.0), Rgb(255, 0, 0));
	assert_eq!(shade(5000.0, 900.0), Rgb(255, 0, 0));
	assert_eq!(shade(5.0, 0.0), Rgb(255, 250, 250));
	assert_eq!(shade(1000.0, 0.0), Rgb(255, 0, 0));
    }

    #[test]
    fn spread_coefficient_windows() {
	let sick = [100.0, 110.0, 121.0, 242.0];
	assert_relative_eq!(spread_coefficient(&sick, SpreadWindow::DayOverDay).unwrap(), 1.4);
	assert_relative_eq!(spread_coefficient(&sick, SpreadWindow::Legacy).unwrap(), 1.1);
    }

    #[test]
    fn spread_coefficient_needs_three_points() {
	assert_eq!(spread_coefficient(&[1.0, 2.0], SpreadWindow::DayOverDay),
		   Err(MetricError::InsufficientData));
	assert_eq!(spread_coefficient(&[], SpreadWindow::Legacy),
		   Err(MetricError::InsufficientData));
	assert_eq!(spread_coefficient(&[0.0, 2.0, 3.0], SpreadWindow::DayOverDay),
		   Err(MetricError::DivisionByZero));
    }

    #[test]
    fn derivations() {
	assert_eq!(affected_area(1000.0, 69.4), Ok(14.0));
	assert_eq!(affected_area(1000.0, 0.0), Err(MetricError::DivisionByZero));
	assert_eq!(monthly_projection(1000.0, 1.05), Ok(1100.0));
	assert_eq!(monthly_projection(f64::NAN, 1.05), Err(MetricError::DivisionByZero));
	assert_eq!(infection_risk(500.0, 100000.0, 1.2, 1.0), Ok(0.6));
	assert_eq!(infection_risk(500.0, 100000.0, 1.2, 0.1), Ok(0.06));
	assert_eq!(infection_risk(500.0, 0.0, 1.2, 1.0), Err(MetricError::DivisionByZero));
    }
}
