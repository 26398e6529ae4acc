//! Host navigation capability.
//!
//! Browser hosts map [`Navigator::replace_history`] onto `history.replaceState` and
//! [`Navigator::navigate`] onto a full page load. Native hosts typically open the system browser
//! for `navigate` and ignore history replacement.

// self
use crate::_prelude::*;

/// Moves the user agent between pages.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Rewrites the visible location to `path` without loading anything.
	fn replace_history(&self, path: &str);

	/// Performs a full navigation to `url`.
	fn navigate(&self, url: &Url);
}

/// One recorded [`Navigator`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
	/// [`Navigator::replace_history`] was called with this path.
	ReplaceHistory(String),
	/// [`Navigator::navigate`] was called with this URL.
	Navigate(Url),
}

/// [`Navigator`] that records calls in order; used by tests and headless hosts.
#[derive(Debug, Default)]
pub struct MemoryNavigator(Mutex<Vec<NavigationEvent>>);
impl MemoryNavigator {
	/// Every call recorded so far, oldest first.
	pub fn events(&self) -> Vec<NavigationEvent> {
		self.0.lock().clone()
	}

	/// Most recent full navigation target.
	pub fn last_navigation(&self) -> Option<Url> {
		self.0.lock().iter().rev().find_map(|event| match event {
			NavigationEvent::Navigate(url) => Some(url.clone()),
			NavigationEvent::ReplaceHistory(_) => None,
		})
	}
}
impl Navigator for MemoryNavigator {
	fn replace_history(&self, path: &str) {
		self.0.lock().push(NavigationEvent::ReplaceHistory(path.to_owned()));
	}

	fn navigate(&self, url: &Url) {
		self.0.lock().push(NavigationEvent::Navigate(url.clone()));
	}
}
