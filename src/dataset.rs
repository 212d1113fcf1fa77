use std::collections::BTreeMap;

use serde::{Serialize,Deserialize};
use chrono::naive::NaiveDate;
use lazy_static::lazy_static;
use tracing::{debug,info};

use super::database::{Database,CountryReport};
use super::error::{Result,Error};
use super::format::{self,PLACEHOLDER};
use super::metrics::{Rgb,danger_level,shade};


#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash,Serialize,Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Tested,
    Sick,
    Recovered,
    Dead,
}

impl Measure {

    pub const ALL: [Measure; 4] = [Measure::Tested, Measure::Sick,
				   Measure::Recovered, Measure::Dead];

    pub fn name(&self) -> &'static str {
	match self {
	    Self::Tested => "tested",
	    Self::Sick => "sick",
	    Self::Recovered => "recovered",
	    Self::Dead => "dead"
	}
    }

    /// Whether an increase of this measure is good news.
    pub fn rising_is_good(&self) -> bool {
	match self {
	    Self::Tested | Self::Recovered => true,
	    Self::Sick | Self::Dead => false
	}
    }

}


#[derive(Clone,Debug,PartialEq,Default,Serialize)]
pub struct Region {
    pub id: String,
    pub name: String,
    pub population: Option<u64>,
    pub area: Option<f64>,
    pub density: Option<f64>,
    pub description: String,
    pub cure: u8,
    pub peak: Option<u64>,
    pub notice: Option<Notice>,
}

#[derive(Clone,Debug,PartialEq,Eq,Serialize)]
pub struct Notice {
    pub message: String,
    pub icon: String,
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
pub struct Count {
    pub value: u64,
    pub delta: i64,
}

impl Count {
    pub fn new(today: u64, yesterday: Option<u64>) -> Self {
	Self { value: today, delta: today as i64 - yesterday.unwrap_or(today) as i64 }
    }
}

#[derive(Clone,Debug,PartialEq,Default,Serialize)]
pub struct Snapshot {
    pub tested: Option<Count>,
    pub sick: Option<Count>,
    pub recovered: Option<Count>,
    pub dead: Option<Count>,
}

impl Snapshot {
    pub fn get(&self, measure: Measure) -> Option<Count> {
	match measure {
	    Measure::Tested => self.tested,
	    Measure::Sick => self.sick,
	    Measure::Recovered => self.recovered,
	    Measure::Dead => self.dead
	}
    }
}


#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct DayPoint {
    pub label: String,
    pub tested: u64,
    pub sick: u64,
    pub recovered: u64,
    pub dead: u64,
}

impl DayPoint {
    pub fn get(&self, measure: Measure) -> u64 {
	match measure {
	    Measure::Tested => self.tested,
	    Measure::Sick => self.sick,
	    Measure::Recovered => self.recovered,
	    Measure::Dead => self.dead
	}
    }
}

/// Chronological daily values; one point per day keeps the four measures
/// aligned by index.
#[derive(Clone,Debug,PartialEq,Default,Serialize)]
#[serde(transparent)]
pub struct TimeSeries(Vec<DayPoint>);

impl TimeSeries {

    pub fn new(points: Vec<DayPoint>) -> Self {
	Self(points)
    }

    pub fn points(&self) -> &[DayPoint] {
	&self.0
    }

    pub fn len(&self) -> usize {
	self.0.len()
    }

    pub fn is_empty(&self) -> bool {
	self.0.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
	self.0.iter().map(|p| p.label.clone()).collect()
    }

    pub fn values(&self, measure: Measure) -> Vec<f64> {
	self.0.iter().map(|p| p.get(measure) as f64).collect()
    }

}


#[derive(Clone,Debug,PartialEq,Eq,Serialize)]
pub struct SubRegionRow {
    pub name: String,
    pub sick: u64,
    pub delta: i64,
    pub sick_class: String,
    pub delta_class: String,
    pub fill: Rgb,
}


#[derive(Clone,Debug,PartialEq,Default)]
pub struct RegionRecord {
    pub region: Region,
    pub snapshot: Snapshot,
    pub series: TimeSeries,
    pub sub_regions: Vec<SubRegionRow>,
}

impl RegionRecord {

    pub fn placeholder() -> Self {
	Self {
	    region: Region {
		name: PLACEHOLDER.to_string(),
		description: PLACEHOLDER.to_string(),
		..Region::default()
	    },
	    ..Self::default()
	}
    }

    /// Current count of a measure, NaN when the region does not report it.
    pub fn value(&self, measure: Measure) -> f64 {
	self.snapshot.get(measure).map_or(f64::NAN, |c| c.value as f64)
    }

}

lazy_static! {
    static ref PLACEHOLDER_RECORD: RegionRecord = RegionRecord::placeholder();
}


pub fn sub_region_id(country: &str, name: &str) -> String {
    format!("{}:{}", country, format::slug(name))
}

fn danger_class(level: usize) -> String {
    format!("dtrr_danger{}", level)
}


#[derive(Clone,Debug,Default)]
pub struct RegionDataset {
    as_of: Option<NaiveDate>,
    records: BTreeMap<String,RegionRecord>,
}

impl RegionDataset {

    pub fn from_records<I>(records: I) -> Self
    where I: IntoIterator<Item = RegionRecord> {
	Self {
	    as_of: None,
	    records: records.into_iter().map(|r| (r.region.id.clone(), r)).collect()
	}
    }

    pub fn build(db: &Database, as_of: NaiveDate, days_to_show: usize) -> Result<Self> {

	let today = db.report(as_of).ok_or(Error::MissingData)?;
	let yesterday = as_of.pred_opt().and_then(|date| db.report(date));
	let mut records = BTreeMap::new();

	for (country,report) in today {

	    let previous = yesterday.and_then(|y| y.get(country));
	    let code = match report.code.is_empty() {
		true => format::slug(country),
		false => report.code.clone()
	    };

	    let sub_regions = sub_region_rows(report, previous);
	    for row in &sub_regions {
		let id = sub_region_id(&code, &row.name);
		records.insert(id.clone(), RegionRecord {
		    region: Region { id, name: row.name.clone(), ..Region::default() },
		    snapshot: Snapshot {
			sick: match row.sick {
			    0 => None,
			    sick => Some(Count { value: sick, delta: row.delta })
			},
			..Snapshot::default()
		    },
		    ..RegionRecord::default()
		});
	    }

	    let series = db.history(country, as_of).map(|(date,r)| DayPoint {
		label: date.format("%d.%m").to_string(),
		tested: r.tested,
		sick: r.sick,
		recovered: r.recovered,
		dead: r.dead,
	    }).collect::<Vec<_>>();
	    let skip = series.len().saturating_sub(days_to_show);

	    records.insert(code.clone(), RegionRecord {
		region: Region {
		    id: code,
		    name: match report.name.is_empty() {
			true => country.clone(),
			false => report.name.clone()
		    },
		    population: Some(report.population),
		    area: Some(report.area),
		    density: match report.area > 0.0 {
			true => Some(report.population as f64 / report.area),
			false => None
		    },
		    description: report.description.clone(),
		    cure: report.cure,
		    peak: Some(report.peak),
		    notice: report.vii.as_ref().map(|(message,icon)| Notice {
			message: message.clone(),
			icon: icon.clone(),
		    }),
		},
		snapshot: Snapshot {
		    tested: Some(Count::new(report.tested, previous.map(|p| p.tested))),
		    sick: Some(Count::new(report.sick, previous.map(|p| p.sick))),
		    recovered: Some(Count::new(report.recovered, previous.map(|p| p.recovered))),
		    dead: Some(Count::new(report.dead, previous.map(|p| p.dead))),
		},
		series: TimeSeries::new(series.into_iter().skip(skip).collect()),
		sub_regions,
	    });

	}

	info!("Built dataset of {} regions as of {}", records.len(), as_of);
	Ok(Self { as_of: Some(as_of), records })

    }

    /// Record of a region, or the placeholder record when it is unknown.
    pub fn lookup(&self, id: &str) -> &RegionRecord {
	match self.records.get(id) {
	    Some(record) => record,
	    None => {
		debug!("Unknown region {:?}, using placeholder", id);
		&PLACEHOLDER_RECORD
	    }
	}
    }

    pub fn get(&self, id: &str) -> Option<&RegionRecord> {
	self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
	self.records.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
	self.records.keys().map(|id| id.as_str())
    }

    pub fn len(&self) -> usize {
	self.records.len()
    }

    pub fn is_empty(&self) -> bool {
	self.records.is_empty()
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
	self.as_of
    }

}


/// Sub-region breakdown sorted by sick count, with both columns split into
/// five danger zones over their `[min, max]` range and a map fill scaled to
/// the country's peak.
fn sub_region_rows(report: &CountryReport, previous: Option<&CountryReport>) -> Vec<SubRegionRow> {

    let mut rows = report.regions.iter().map(|(name,&sick)| {
	let before = previous.and_then(|p| p.regions.get(name)).copied();
	(name.clone(), Count::new(sick, before))
    }).collect::<Vec<_>>();

    let sick_range = rows.iter().map(|(_,c)| c.value as f64)
	.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo,hi),v| (lo.min(v), hi.max(v)));
    let delta_range = rows.iter().map(|(_,c)| c.delta as f64)
	.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo,hi),v| (lo.min(v), hi.max(v)));

    rows.sort_by(|(_,a),(_,b)| b.value.cmp(&a.value));

    rows.into_iter().map(|(name,count)| SubRegionRow {
	sick_class: danger_class(danger_level(sick_range.0, sick_range.1 + 1.0, 5,
					      count.value as f64)),
	delta_class: danger_class(danger_level(delta_range.0, delta_range.1 + 1.0, 5,
					       count.delta as f64)),
	fill: shade(count.value as f64, report.peak as f64),
	name,
	sick: count.value,
	delta: count.delta,
    }).collect()

}
