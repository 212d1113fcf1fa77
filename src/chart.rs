use std::collections::BTreeMap;

use tracing::{debug,warn};

use super::dataset::{Measure,TimeSeries};
use super::error::Result;


#[derive(Clone,Debug,PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub line_color: String,
    /// Fill gradient stops, top to bottom.
    pub fill: Vec<(f64,String)>,
    pub tension: f64,
}

impl ChartOptions {
    pub fn new(title: &str) -> Self {
	Self {
	    title: title.to_string(),
	    line_color: "#911215".to_string(),
	    fill: vec![(0.0, "rgba(255, 0, 0, 0.5)".to_string()),
		       (0.5, "rgba(255, 0, 0, 0.25)".to_string()),
		       (1.0, "rgba(255, 0, 0, 0)".to_string())],
	    tension: 0.4,
	}
    }
}

#[derive(Clone,Debug,PartialEq)]
pub struct ChartData {
    pub region: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub options: ChartOptions,
}

impl ChartData {
    pub fn new(region: &str, measure: Measure, series: &TimeSeries) -> Self {
	Self {
	    region: region.to_string(),
	    labels: series.labels(),
	    values: series.values(measure),
	    options: ChartOptions::new(&format!("{} ({})", measure.name(), region)),
	}
    }
}


/// Draws charts and releases them again.
pub trait ChartRenderer {
    type Handle;
    fn draw(&mut self, measure: Measure, chart: &ChartData) -> Result<Self::Handle>;
    fn dispose(&mut self, handle: Self::Handle) -> Result<()>;
}


/// Keeps at most one live chart per measure and only draws while the chart
/// panel is open; requests made while it is closed wait for `open()`.
pub struct ChartAdapter<R: ChartRenderer> {
    renderer: R,
    live: BTreeMap<Measure,R::Handle>,
    pending: BTreeMap<Measure,ChartData>,
    open: bool,
}

impl<R: ChartRenderer> ChartAdapter<R> {

    pub fn new(renderer: R) -> Self {
	Self { renderer, live: BTreeMap::new(), pending: BTreeMap::new(), open: false }
    }

    pub fn render(&mut self, measure: Measure, chart: ChartData) {
	match self.open {
	    false => {
		debug!("Chart panel closed, deferring {} chart", measure.name());
		self.pending.insert(measure, chart);
	    }
	    true => self.redraw(measure, &chart)
	}
    }

    pub fn render_series(&mut self, region: &str, series: &TimeSeries) {
	for measure in Measure::ALL.iter() {
	    self.render(*measure, ChartData::new(region, *measure, series));
	}
    }

    fn redraw(&mut self, measure: Measure, chart: &ChartData) {
	if let Some(handle) = self.live.remove(&measure) {
	    if let Err(err) = self.renderer.dispose(handle) {
		warn!("Disposing {} chart failed: {}", measure.name(), err);
	    }
	}
	match self.renderer.draw(measure, chart) {
	    Ok(handle) => { self.live.insert(measure, handle); }
	    Err(err) => warn!("Drawing {} chart failed: {}", measure.name(), err)
	}
    }

    pub fn open(&mut self) {
	self.open = true;
	let pending = std::mem::take(&mut self.pending);
	for (measure,chart) in pending {
	    self.redraw(measure, &chart);
	}
    }

    pub fn close(&mut self) {
	self.open = false;
    }

    pub fn is_open(&self) -> bool {
	self.open
    }

    pub fn dispose_all(&mut self) {
	let live = std::mem::take(&mut self.live);
	for (measure,handle) in live {
	    if let Err(err) = self.renderer.dispose(handle) {
		warn!("Disposing {} chart failed: {}", measure.name(), err);
	    }
	}
    }

    pub fn live_count(&self) -> usize {
	self.live.len()
    }

    pub fn pending_count(&self) -> usize {
	self.pending.len()
    }

    pub fn renderer(&self) -> &R {
	&self.renderer
    }

}


#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::dataset::DayPoint;
    use crate::error::Error;

    /// Renderer keeping track of the charts it has alive.
    #[derive(Default)]
    pub struct Recorder {
	pub next: usize,
	pub alive: Vec<usize>,
	pub drawn: Vec<(Measure,String)>,
	pub disposed: usize,
	pub fail: bool,
    }

    impl ChartRenderer for Recorder {
	type Handle = usize;
	fn draw(&mut self, measure: Measure, chart: &ChartData) -> Result<usize> {
	    if self.fail {
		return Err(Error::MissingData);
	    }
	    self.next += 1;
	    self.alive.push(self.next);
	    self.drawn.push((measure, chart.region.clone()));
	    Ok(self.next)
	}
	fn dispose(&mut self, handle: usize) -> Result<()> {
	    self.alive.retain(|h| *h != handle);
	    self.disposed += 1;
	    Ok(())
	}
    }

    fn series() -> TimeSeries {
	TimeSeries::new((1..=3).map(|d| DayPoint {
	    label: format!("{:02}.12", d), tested: d * 10, sick: d, recovered: 0, dead: 0
	}).collect())
    }

    #[test]
    fn chart_data_follows_series() {
	let chart = ChartData::new("ukr", Measure::Tested, &series());
	assert_eq!(chart.labels, vec!["01.12", "02.12", "03.12"]);
	assert_eq!(chart.values, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn replacing_a_chart_disposes_the_old_one() {
	let mut adapter = ChartAdapter::new(Recorder::default());
	adapter.open();
	adapter.render(Measure::Sick, ChartData::new("ukr", Measure::Sick, &series()));
	adapter.render(Measure::Sick, ChartData::new("pol", Measure::Sick, &series()));
	assert_eq!(adapter.live_count(), 1);
	assert_eq!(adapter.renderer().alive.len(), 1);
	assert_eq!(adapter.renderer().disposed, 1);
    }

    #[test]
    fn closed_panel_defers_drawing() {
	let mut adapter = ChartAdapter::new(Recorder::default());
	adapter.render_series("ukr", &series());
	adapter.render_series("pol", &series());
	assert!(adapter.renderer().drawn.is_empty());
	assert_eq!(adapter.pending_count(), 4);
	adapter.open();
	assert_eq!(adapter.live_count(), 4);
	assert_eq!(adapter.pending_count(), 0);
	assert!(adapter.renderer().drawn.iter().all(|(_,region)| region == "pol"));
    }

    #[test]
    fn closing_keeps_charts_until_replaced() {
	let mut adapter = ChartAdapter::new(Recorder::default());
	adapter.open();
	adapter.render_series("ukr", &series());
	adapter.close();
	adapter.render_series("pol", &series());
	assert_eq!(adapter.renderer().alive.len(), 4);
	adapter.open();
	assert_eq!(adapter.renderer().alive.len(), 4);
	assert_eq!(adapter.renderer().disposed, 4);
	adapter.dispose_all();
	assert!(adapter.renderer().alive.is_empty());
	assert_eq!(adapter.live_count(), 0);
    }

    #[test]
    fn draw_failures_are_not_fatal() {
	let mut adapter = ChartAdapter::new(Recorder { fail: true, ..Recorder::default() });
	adapter.open();
	adapter.render_series("ukr", &series());
	assert_eq!(adapter.live_count(), 0);
    }
}
