use std::io::{self,Write};
use std::str::FromStr;

use serde::{Serialize,Deserialize};

use super::dataset::Measure;
use super::error::{Error,Result};
use super::format::{self,PLACEHOLDER};
use super::view::{CountView,ViewModel};


#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash,Serialize,Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CopyKind {
    All,
    Tested,
    Sick,
    Recovered,
    Dead,
}

impl CopyKind {
    fn includes(self, measure: Measure) -> bool {
	match self {
	    CopyKind::All => true,
	    CopyKind::Tested => measure == Measure::Tested,
	    CopyKind::Sick => measure == Measure::Sick,
	    CopyKind::Recovered => measure == Measure::Recovered,
	    CopyKind::Dead => measure == Measure::Dead
	}
    }
}

impl FromStr for CopyKind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
	match s {
	    "" | "all" => Ok(CopyKind::All),
	    "tested" | "test" => Ok(CopyKind::Tested),
	    "sick" => Ok(CopyKind::Sick),
	    "recovered" | "recv" => Ok(CopyKind::Recovered),
	    "dead" => Ok(CopyKind::Dead),
	    other => Err(Error::UnknownEvent(format!("copy {}", other)))
	}
    }
}


/// Natural-language summary of the counts in a view.
pub fn summary(view: &ViewModel, kind: CopyKind) -> String {
    let phrases: Vec<String> = Measure::ALL.iter()
	.filter(|measure| kind.includes(**measure))
	.map(|measure| view.count(*measure))
	.filter(|count| count.text != PLACEHOLDER)
	.map(phrase)
	.collect();
    format!(" In region \"{}\" {}.", view.name, phrases.join(", "))
}

fn phrase(count: &CountView) -> String {
    let verb = match count.measure {
	Measure::Tested => "tested",
	Measure::Sick => "fell ill",
	Measure::Recovered => "recovered",
	Measure::Dead => "died"
    };
    let delta = match count.delta {
	Some(delta) if delta < 0 => format!("-{}", format::count(delta.unsigned_abs())),
	Some(delta) => format!("+{}", format::count(delta.unsigned_abs())),
	None => PLACEHOLDER.to_string()
    };
    format!("{} {} people ({} per day)", verb, count.text, delta)
}

pub fn copied_message(view: &ViewModel) -> String {
    format!("Data for region \"{}\" copied to clipboard.", view.name)
}


pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// No clipboard on this system.
pub struct Unavailable;

impl Clipboard for Unavailable {
    fn copy(&mut self, _text: &str) -> Result<()> {
	Err(Error::ClipboardUnavailable)
    }
}

#[derive(Clone,Debug,Default)]
pub struct Buffer(pub Vec<String>);

impl Buffer {
    pub fn last(&self) -> Option<&str> {
	self.0.last().map(|s| s.as_str())
    }
}

impl Clipboard for Buffer {
    fn copy(&mut self, text: &str) -> Result<()> {
	self.0.push(text.to_string());
	Ok(())
    }
}

pub struct Stdout;

impl Clipboard for Stdout {
    fn copy(&mut self, text: &str) -> Result<()> {
	let stdout = io::stdout();
	let mut out = stdout.lock();
	writeln!(out, "{}", text.trim_start())?;
	Ok(())
    }
}
