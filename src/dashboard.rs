use std::rc::Rc;
use std::convert::TryFrom;
use std::str::FromStr;

use chrono::{DateTime,Duration,Utc};
use tracing::{debug,info};

use super::chart::{ChartAdapter,ChartRenderer};
use super::clipboard::{self,Clipboard,CopyKind};
use super::config::Notifications;
use super::error::{Error,Result};
use super::notify::{NotificationSink,Notifier};
use super::selection::SelectionController;
use super::view::ViewModel;


#[derive(Clone,Debug,PartialEq,Eq)]
pub enum Event {
    Enter(String),
    Leave,
    Select(String),
    Clear,
    Click,
    Copy(CopyKind),
    OpenCharts,
    CloseCharts,
    Dismiss,
    Info,
    Tick,
}

impl FromStr for Event {
    type Err = Error;
    fn from_str(line: &str) -> Result<Self> {
	let mut words = line.split_whitespace();
	let command = words.next().unwrap_or("");
	let arg = words.next();
	if words.next().is_some() {
	    return Err(Error::UnknownEvent(line.trim().to_string()));
	}
	match (command, arg) {
	    ("enter", Some(id)) => Ok(Event::Enter(id.to_string())),
	    ("leave", None) => Ok(Event::Leave),
	    ("select", Some(id)) => Ok(Event::Select(id.to_string())),
	    ("clear", None) => Ok(Event::Clear),
	    ("click", None) => Ok(Event::Click),
	    ("copy", kind) => Ok(Event::Copy(kind.unwrap_or("all").parse()?)),
	    ("open", None) => Ok(Event::OpenCharts),
	    ("close", None) => Ok(Event::CloseCharts),
	    ("dismiss", None) => Ok(Event::Dismiss),
	    ("info", None) => Ok(Event::Info),
	    ("tick", None) | ("", None) => Ok(Event::Tick),
	    _ => Err(Error::UnknownEvent(line.trim().to_string()))
	}
    }
}


/// Wires the selection, charts, clipboard and notifications together.
pub struct Dashboard<R: ChartRenderer, C: Clipboard, S: NotificationSink> {
    selection: SelectionController,
    charts: ChartAdapter<R>,
    notifier: Notifier<S>,
    clipboard: C,
    welcome: Duration,
    copied: Duration,
}

impl<R: ChartRenderer, C: Clipboard, S: NotificationSink> Dashboard<R,C,S> {

    pub fn new(selection: SelectionController, renderer: R, clipboard: C, sink: S,
	       notifications: &Notifications) -> Self {
	Self {
	    selection,
	    charts: ChartAdapter::new(renderer),
	    notifier: Notifier::new(sink),
	    clipboard,
	    welcome: millis(notifications.welcome_ms),
	    copied: millis(notifications.copy_ms),
	}
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Rc<ViewModel> {
	let view = self.selection.clear();
	let dataset = self.selection.dataset();
	match dataset.as_of() {
	    Some(date) => info!("Showing {:?} ({} regions, as of {})", view.name, dataset.len(), date),
	    None => info!("Showing {:?} ({} regions)", view.name, dataset.len())
	}
	self.charts.render_series(&view.name, &view.series);
	self.notifier.notify(WELCOME, self.welcome, now);
	view
    }

    pub fn dispatch(&mut self, event: Event, now: DateTime<Utc>) -> Rc<ViewModel> {

	self.notifier.tick(now);

	match event {
	    Event::Enter(id) => self.selection.hover(&id),
	    Event::Leave => self.selection.leave(),
	    Event::Select(id) => {
		let view = self.selection.select(&id);
		self.charts.render_series(&view.name, &view.series);
		view
	    }
	    Event::Clear => {
		let view = self.selection.clear();
		self.charts.render_series(&view.name, &view.series);
		view
	    }
	    Event::Click => self.copy(CopyKind::All, now),
	    Event::Copy(kind) => self.copy(kind, now),
	    Event::OpenCharts => {
		self.charts.open();
		self.selection.current()
	    }
	    Event::CloseCharts => {
		self.charts.close();
		self.selection.current()
	    }
	    Event::Dismiss => {
		self.notifier.dismiss();
		self.selection.current()
	    }
	    Event::Info => {
		let view = self.selection.current();
		match &view.notice {
		    Some(notice) => { self.notifier.notify(&notice.message, self.welcome, now); }
		    None => debug!("No notice for {:?}", view.name)
		}
		view
	    }
	    Event::Tick => self.selection.current()
	}

    }

    fn copy(&mut self, kind: CopyKind, now: DateTime<Utc>) -> Rc<ViewModel> {
	let view = self.selection.current();
	if let Err(err) = self.clipboard.copy(&clipboard::summary(&view, kind)) {
	    debug!("Copy failed: {}", err);
	}
	self.notifier.notify(&clipboard::copied_message(&view), self.copied, now);
	view
    }

    pub fn current(&self) -> Rc<ViewModel> {
	self.selection.current()
    }

    pub fn selection(&self) -> &SelectionController {
	&self.selection
    }

    pub fn charts(&self) -> &ChartAdapter<R> {
	&self.charts
    }

    pub fn notifier(&self) -> &Notifier<S> {
	&self.notifier
    }

    pub fn clipboard(&self) -> &C {
	&self.clipboard
    }

    pub fn shutdown(&mut self) {
	self.charts.dispose_all();
    }

}

fn millis(ms: u64) -> Duration {
    Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

pub const WELCOME: &str = "Hover a region to preview it, click to copy its summary.";
