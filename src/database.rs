use std::io;
use std::fs::File;
use std::path::Path;
use std::collections::BTreeMap;

use serde::{Serialize,Deserialize};
use chrono::naive::NaiveDate;
use tracing::info;

use super::error::Result;


/// One country's figures for one day, as written by the collector.
#[derive(Serialize,Deserialize,Debug,Clone,Default,PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct CountryReport {
    pub name: String,
    pub code: String,
    pub population: u64,
    pub area: f64,
    pub tested: u64,
    pub sick: u64,
    pub recovered: u64,
    pub dead: u64,
    pub peak: u64,
    pub description: String,
    pub cure: u8,
    pub regions: BTreeMap<String,u64>,
    /// Notice about the data: message and icon.
    #[serde(rename = "vii", alias = "Vii")]
    pub vii: Option<(String,String)>,
}

pub type DailyReport = BTreeMap<String,CountryReport>;

#[derive(Debug,Clone,Default,PartialEq)]
pub struct Database {
    reports: BTreeMap<NaiveDate,DailyReport>,
}


pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let date = date.trim();
    match NaiveDate::parse_from_str(date, "%d %b %Y") {
	Ok(date) => Ok(date),
	Err(_) => Ok(NaiveDate::parse_from_str(date, "%Y-%m-%d")?)
    }
}


impl Database {

    pub fn load(path: &Path) -> Result<Self> {
	let raw = serde_json::from_reader::<_,BTreeMap<String,DailyReport>>(
	    io::BufReader::new(File::open(path)?))?;
	let db = Self::from_raw(raw)?;
	info!("Loaded {} daily reports from {}", db.reports.len(), path.display());
	Ok(db)
    }

    pub fn from_str(text: &str) -> Result<Self> {
	Self::from_raw(serde_json::from_str(text)?)
    }

    fn from_raw(raw: BTreeMap<String,DailyReport>) -> Result<Self> {
	Ok(Self {
	    reports: raw.into_iter().map(
		|(date,report)| Ok((parse_date(&date)?, report))
	    ).collect::<Result<_>>()?
	})
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
	self.reports.keys().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
	self.reports.keys().next_back().copied()
    }

    pub fn report(&self, date: NaiveDate) -> Option<&DailyReport> {
	self.reports.get(&date)
    }

    /// Reports of one country up to and including `until`, oldest first.
    pub fn history<'a>(&'a self, country: &'a str, until: NaiveDate)
		       -> impl Iterator<Item = (NaiveDate,&'a CountryReport)> + 'a {
	self.reports.range(..=until).filter_map(
	    move |(date,report)| report.get(country).map(|r| (*date, r))
	)
    }

}
