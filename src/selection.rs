use std::rc::Rc;

use tracing::{debug,warn};

use super::dataset::RegionDataset;
use super::metrics::MetricsEngine;
use super::view::ViewModel;


#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum State {
    Selected,
    HoverPreview,
}

/// Owns the selected region and the transient hover preview. Every
/// transition swaps in a complete, freshly built view model.
pub struct SelectionController {
    dataset: RegionDataset,
    engine: MetricsEngine,
    home: String,
    selected: Rc<ViewModel>,
    preview: Option<Rc<ViewModel>>,
}

impl SelectionController {

    pub fn new(dataset: RegionDataset, engine: MetricsEngine, home: &str) -> Self {
	if !dataset.contains(home) {
	    warn!("Home region {:?} is not in the dataset", home);
	}
	let selected = Rc::new(build_view(&dataset, &engine, home));
	Self { dataset, engine, home: home.to_string(), selected, preview: None }
    }

    pub fn view(&self, id: &str) -> ViewModel {
	build_view(&self.dataset, &self.engine, id)
    }

    pub fn select(&mut self, id: &str) -> Rc<ViewModel> {
	debug!("Selecting {:?}", id);
	self.selected = Rc::new(self.view(id));
	self.preview = None;
	self.selected.clone()
    }

    pub fn hover(&mut self, id: &str) -> Rc<ViewModel> {
	let view = Rc::new(self.view(id));
	self.preview = Some(view.clone());
	view
    }

    pub fn leave(&mut self) -> Rc<ViewModel> {
	self.preview = None;
	self.selected.clone()
    }

    pub fn clear(&mut self) -> Rc<ViewModel> {
	let home = self.home.clone();
	self.select(&home)
    }

    pub fn current(&self) -> Rc<ViewModel> {
	self.preview.as_ref().unwrap_or(&self.selected).clone()
    }

    pub fn selected(&self) -> Rc<ViewModel> {
	self.selected.clone()
    }

    pub fn state(&self) -> State {
	match self.preview.is_some() {
	    true => State::HoverPreview,
	    false => State::Selected
	}
    }

    pub fn dataset(&self) -> &RegionDataset {
	&self.dataset
    }

}


fn build_view(dataset: &RegionDataset, engine: &MetricsEngine, id: &str) -> ViewModel {
    let record = dataset.lookup(id);
    ViewModel::build(record, &engine.derive(record))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RegionRecord,Region,Snapshot,Count,DayPoint,TimeSeries};
    use crate::metrics::{MetricError,Settings};

    fn record(id: &str, tested: u64, sick: u64, dead: u64) -> RegionRecord {
	let series = (0..5u64).map(|i| DayPoint {
	    label: format!("{:02}.12", i + 1),
	    tested,
	    sick: sick + i * 10,
	    recovered: 0,
	    dead,
	}).collect();
	RegionRecord {
	    region: Region {
		id: id.to_string(),
		name: id.to_uppercase(),
		population: Some(10000),
		area: Some(500.0),
		density: Some(20.0),
		description: String::new(),
		cure: 2,
		peak: Some(300),
		notice: None,
	    },
	    snapshot: Snapshot {
		tested: Some(Count { value: tested, delta: 10 }),
		sick: Some(Count { value: sick, delta: -1 }),
		recovered: Some(Count { value: 0, delta: 0 }),
		dead: Some(Count { value: dead, delta: 0 }),
	    },
	    series: TimeSeries::new(series),
	    sub_regions: vec![],
	}
    }

    fn controller() -> SelectionController {
	let dataset = RegionDataset::from_records(vec![
	    record("ukr", 1000, 200, 4),
	    record("pol", 500, 0, 0),
	]);
	SelectionController::new(dataset, MetricsEngine::new(Settings::default()), "ukr")
    }

    #[test]
    fn starts_on_home_region() {
	let c = controller();
	assert_eq!(c.state(), State::Selected);
	assert_eq!(c.current().region_id, "ukr");
	assert_eq!(c.current().progress.tested.text, "10.00 %");
	assert_eq!(c.current().risks.death.text, "2.00 %");
    }

    #[test]
    fn reselecting_is_idempotent() {
	let mut c = controller();
	let first = c.select("ukr");
	c.select("pol");
	let again = c.select("ukr");
	assert_eq!(*first, *again);
    }

    #[test]
    fn zero_sick_shows_placeholder_mortality() {
	let c = controller();
	let engine = MetricsEngine::default();
	let metrics = engine.derive(c.dataset().lookup("pol"));
	assert_eq!(metrics.mortality, Err(MetricError::DivisionByZero));
	let view = c.view("pol");
	assert_eq!(view.progress.dead.text, "—");
	assert_eq!(view.risks.death.level, None);
    }

    #[test]
    fn unknown_region_is_placeholder_view() {
	let mut c = controller();
	let placeholder = ViewModel::build(&RegionRecord::placeholder(),
					   &MetricsEngine::default().derive(&RegionRecord::placeholder()));
	assert_eq!(*c.select("xx"), placeholder);
	assert_eq!(placeholder.name, "—");
	assert_eq!(placeholder.sick.text, "—");
	assert!(placeholder.series.is_empty());
    }

    #[test]
    fn hover_reverts_on_leave() {
	let mut c = controller();
	c.hover("pol");
	assert_eq!(c.state(), State::HoverPreview);
	assert_eq!(c.current().region_id, "pol");
	assert_eq!(c.selected().region_id, "ukr");
	assert_eq!(c.leave().region_id, "ukr");
	assert_eq!(c.state(), State::Selected);
    }

    #[test]
    fn select_drops_preview_and_clear_goes_home() {
	let mut c = controller();
	c.hover("ukr");
	c.select("pol");
	assert_eq!(c.state(), State::Selected);
	assert_eq!(c.current().region_id, "pol");
	assert_eq!(c.clear().region_id, "ukr");
	assert_eq!(c.current().region_id, "ukr");
    }
}
