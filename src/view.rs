//! Render-ready snapshot of one region.
//!
//! A [`ViewModel`] holds only display strings, bucket indices and colours so
//! the presentation layer never computes anything itself. Values that could
//! not be derived show up as the `—` placeholder with no bucket.

use serde::Serialize;

use super::dataset::{RegionRecord,Measure,Notice,SubRegionRow,TimeSeries};
use super::format::{self,PLACEHOLDER};
use super::metrics::{DerivedMetrics,Outcome,Rated,Rgb,Scale,colorize};


pub const CURE_STAGES: u8 = 7;

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct CountView {
    pub measure: Measure,
    pub text: String,
    pub delta: Option<i64>,
    pub delta_text: String,
    pub delta_is_good: bool,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Details {
    pub population: String,
    pub area: String,
    pub density: String,
    pub description: String,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct ProgressBar {
    pub text: String,
    pub width: f64,
    pub color: Option<Rgb>,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Progress {
    pub tested: ProgressBar,
    pub sick: ProgressBar,
    pub recovered: ProgressBar,
    pub dead: ProgressBar,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct RiskMarker {
    pub text: String,
    pub level: Option<usize>,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Risks {
    pub spread: RiskMarker,
    pub death: RiskMarker,
    pub affected_area: RiskMarker,
    pub projection: RiskMarker,
    pub risk_unprotected: RiskMarker,
    pub risk_protected: RiskMarker,
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageState {
    Complete,
    Active,
    Pending,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct ViewModel {
    pub region_id: String,
    pub name: String,
    pub peak: String,
    pub tested: CountView,
    pub sick: CountView,
    pub recovered: CountView,
    pub dead: CountView,
    pub details: Details,
    pub progress: Progress,
    pub risks: Risks,
    pub cure: Vec<StageState>,
    pub notice: Option<Notice>,
    pub sub_regions: Vec<SubRegionRow>,
    #[serde(skip)]
    pub series: TimeSeries,
}


impl ViewModel {

    pub fn build(record: &RegionRecord, metrics: &DerivedMetrics) -> Self {

	let region = &record.region;
	let count = |measure| count_view(record, measure);

	Self {
	    region_id: region.id.clone(),
	    name: region.name.clone(),
	    peak: region.peak.map_or(PLACEHOLDER.to_string(), format::count),
	    tested: count(Measure::Tested),
	    sick: count(Measure::Sick),
	    recovered: count(Measure::Recovered),
	    dead: count(Measure::Dead),
	    details: Details {
		population: region.population.map_or(PLACEHOLDER.to_string(), format::count),
		area: region.area.map_or(PLACEHOLDER.to_string(), |a| format::decimal(a, 0)),
		density: region.density.map_or(PLACEHOLDER.to_string(), |d| format::decimal(d, 2)),
		description: region.description.clone(),
	    },
	    progress: Progress {
		tested: progress_bar(metrics.positivity, Scale::HigherIsBetter),
		sick: progress_bar(metrics.sick_rate, Scale::HigherIsWorse),
		recovered: progress_bar(metrics.recovery, Scale::HigherIsBetter),
		dead: progress_bar(metrics.mortality, Scale::HigherIsWorse),
	    },
	    risks: Risks {
		spread: marker(metrics.spread, |v| format!("{:.2}", v)),
		death: marker(metrics.death, |v| format!("{:.2} %", v)),
		affected_area: marker(metrics.affected_area,
				      |v| format!("{} km²", format::decimal(v, 0))),
		projection: marker(metrics.projection,
				   |v| format!("{} people", format::decimal(v, 0))),
		risk_unprotected: marker(metrics.risk_unprotected, |v| format!("{:.3} %", v)),
		risk_protected: marker(metrics.risk_protected, |v| format!("{:.3} %", v)),
	    },
	    cure: cure_timeline(region.cure),
	    notice: region.notice.clone(),
	    sub_regions: record.sub_regions.clone(),
	    series: record.series.clone(),
	}

    }

    pub fn count(&self, measure: Measure) -> &CountView {
	match measure {
	    Measure::Tested => &self.tested,
	    Measure::Sick => &self.sick,
	    Measure::Recovered => &self.recovered,
	    Measure::Dead => &self.dead
	}
    }

}


fn count_view(record: &RegionRecord, measure: Measure) -> CountView {
    match record.snapshot.get(measure) {
	Some(count) => CountView {
	    measure,
	    text: format::count(count.value),
	    delta: Some(count.delta),
	    delta_text: delta_text(count.delta),
	    delta_is_good: delta_is_good(measure, count.delta),
	},
	None => CountView {
	    measure,
	    text: PLACEHOLDER.to_string(),
	    delta: None,
	    delta_text: PLACEHOLDER.to_string(),
	    delta_is_good: false,
	}
    }
}

pub fn delta_text(delta: i64) -> String {
    match delta > 0 {
	true => format!("🔼 {}", format::count(delta.unsigned_abs())),
	false => format!("🔽 {}", format::count(delta.unsigned_abs()))
    }
}

/// A flat delta counts as a rise that did not happen.
pub fn delta_is_good(measure: Measure, delta: i64) -> bool {
    match delta > 0 {
	true => measure.rising_is_good(),
	false => !measure.rising_is_good()
    }
}

fn progress_bar(value: Outcome, scale: Scale) -> ProgressBar {
    match value {
	Ok(percent) => ProgressBar {
	    text: format!("{:.2} %", percent),
	    width: percent,
	    color: Some(colorize(percent, scale)),
	},
	Err(_) => ProgressBar {
	    text: PLACEHOLDER.to_string(),
	    width: 0.0,
	    color: None,
	}
    }
}

fn marker<F>(value: Rated, text: F) -> RiskMarker
where F: Fn(f64) -> String {
    match value {
	Ok(indicator) => RiskMarker { text: text(indicator.value), level: Some(indicator.level) },
	Err(_) => RiskMarker { text: PLACEHOLDER.to_string(), level: None }
    }
}

pub fn cure_timeline(stage: u8) -> Vec<StageState> {
    (1..=CURE_STAGES).map(|i| match i.cmp(&stage) {
	std::cmp::Ordering::Less => StageState::Complete,
	std::cmp::Ordering::Equal => StageState::Active,
	std::cmp::Ordering::Greater => StageState::Pending,
    }).collect()
}
