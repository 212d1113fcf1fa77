use chrono::{DateTime,Duration,Utc};
use tracing::debug;


/// Where notifications are displayed.
pub trait NotificationSink {
    fn show(&mut self, message: &str);
    fn hide(&mut self);
}

#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct TimerId(u64);

#[derive(Clone,Debug,PartialEq)]
struct Pending {
    id: TimerId,
    message: String,
    /// None when the deadline is past the end of time.
    deadline: Option<DateTime<Utc>>,
}

/// Notification banner with a single auto-dismiss timer. A new message
/// replaces the outstanding timer so it can not clear the new message early.
pub struct Notifier<S: NotificationSink> {
    sink: S,
    pending: Option<Pending>,
    next_id: u64,
}

impl<S: NotificationSink> Notifier<S> {

    pub fn new(sink: S) -> Self {
	Self { sink, pending: None, next_id: 0 }
    }

    pub fn notify(&mut self, message: &str, duration: Duration, now: DateTime<Utc>) -> TimerId {
	if let Some(old) = self.pending.take() {
	    debug!("Cancelling dismissal timer {:?} for {:?}", old.id, old.message);
	}
	self.next_id += 1;
	let id = TimerId(self.next_id);
	self.sink.show(message);
	self.pending = Some(Pending {
	    id,
	    message: message.to_string(),
	    deadline: now.checked_add_signed(duration),
	});
	id
    }

    /// Fires the dismissal when it is due.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TimerId> {
	match &self.pending {
	    Some(Pending { id, deadline: Some(deadline), .. }) if *deadline <= now => {
		let id = *id;
		self.pending = None;
		self.sink.hide();
		Some(id)
	    }
	    _ => None
	}
    }

    pub fn dismiss(&mut self) {
	self.pending = None;
	self.sink.hide();
    }

    pub fn pending(&self) -> Option<TimerId> {
	self.pending.as_ref().map(|p| p.id)
    }

    pub fn message(&self) -> Option<&str> {
	self.pending.as_ref().map(|p| p.message.as_str())
    }

    pub fn sink(&self) -> &S {
	&self.sink
    }

}


/// Sink recording what was shown, for headless use.
#[derive(Clone,Debug,Default,PartialEq)]
pub struct Banner {
    pub visible: Option<String>,
    pub shown: Vec<String>,
    pub hidden: usize,
}

impl NotificationSink for Banner {
    fn show(&mut self, message: &str) {
	self.visible = Some(message.to_string());
	self.shown.push(message.to_string());
    }
    fn hide(&mut self) {
	self.visible = None;
	self.hidden += 1;
    }
}
