//! Windowing boundary.
//!
//! Only title matching, visibility toggling, close requests and owner lookup
//! are ever performed against the desktop; nothing else is modelled.

/// Opaque OS window handle (`HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Snapshot of one top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
	pub handle: WindowHandle,
	pub title: String,
	pub visible: bool,
}

/// Access to the top-level windows of the current desktop session.
pub trait WindowSystem: Send + Sync {
	/// Enumerates all top-level windows.
	fn top_level_windows(&self) -> Vec<WindowInfo>;

	fn is_visible(&self, window: WindowHandle) -> bool;

	fn set_visible(&self, window: WindowHandle, visible: bool);

	/// Posts a close request without waiting for it to be processed.
	fn post_close(&self, window: WindowHandle);

	/// Process id owning the window, if it still exists.
	fn owner_pid(&self, window: WindowHandle) -> Option<u32>;
}

fn find_preferring_visible(windows: &dyn WindowSystem, matches: impl Fn(&WindowInfo) -> bool) -> Option<WindowInfo> {
	let mut hidden = None;
	for info in windows.top_level_windows() {
		if !matches(&info) {
			continue;
		}
		if info.visible {
			return Some(info);
		}
		hidden.get_or_insert(info);
	}
	hidden
}

/// Finds the first window whose title contains `needle`, preferring
/// visible windows over hidden ones.
pub fn find_by_title(windows: &dyn WindowSystem, needle: &str) -> Option<WindowInfo> {
	find_preferring_visible(windows, |info| info.title.contains(needle))
}

/// Like [`find_by_title`], but windows listed in `existing` only match when
/// no other window does.
///
/// Titles overlap (`"Cross Section"` is part of `"Cross Section Data"`), so a
/// window opened by the last call wins over one that was already open.
pub fn find_opened_by_title(windows: &dyn WindowSystem, needle: &str, existing: &[WindowHandle]) -> Option<WindowInfo> {
	find_preferring_visible(windows, |info| !existing.contains(&info.handle) && info.title.contains(needle))
		.or_else(|| find_by_title(windows, needle))
}

/// Finds the first window whose title starts with `prefix`, preferring
/// visible windows. A session that was just shown is the visible one.
pub fn find_by_prefix(windows: &dyn WindowSystem, prefix: &str) -> Option<WindowInfo> {
	find_preferring_visible(windows, |info| info.title.starts_with(prefix))
}

/// Window system with no windows, used where no desktop is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessWindows;

impl WindowSystem for HeadlessWindows {
	fn top_level_windows(&self) -> Vec<WindowInfo> {
		Vec::new()
	}

	fn is_visible(&self, _window: WindowHandle) -> bool {
		false
	}

	fn set_visible(&self, _window: WindowHandle, _visible: bool) {}

	fn post_close(&self, _window: WindowHandle) {}

	fn owner_pid(&self, _window: WindowHandle) -> Option<u32> {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakeWindows;

	#[test]
	fn title_search_prefers_visible_windows() {
		let windows = FakeWindows::new();
		let hidden = windows.add_window("Cross Section Data - old", 1);
		windows.set_visible(hidden, false);
		let shown = windows.add_window("Cross Section Data - Beaver Creek", 1);

		let found = find_by_title(&windows, "Cross Section Data").unwrap();
		assert_eq!(found.handle, shown);
	}

	#[test]
	fn title_search_falls_back_to_hidden_windows() {
		let windows = FakeWindows::new();
		let hidden = windows.add_window("Geometric Data - bvr", 1);
		windows.set_visible(hidden, false);

		assert_eq!(find_by_title(&windows, "Geometric Data").unwrap().handle, hidden);
		assert!(find_by_title(&windows, "Sediment Data").is_none());
	}

	#[test]
	fn prefix_search_matches_start_only() {
		let windows = FakeWindows::new();
		windows.add_window("About HEC-RAS 5.0.7", 1);
		let main = windows.add_window("HEC-RAS 5.0.7", 1);

		assert_eq!(find_by_prefix(&windows, "HEC-RAS ").unwrap().handle, main);
	}

	#[test]
	fn newly_opened_window_beats_overlapping_title() {
		let windows = FakeWindows::new();
		let table = windows.add_window("Cross Section Output - Beaver Creek", 1);
		let existing = [table];
		let plot = windows.add_window("Cross Section - Beaver Creek", 1);

		assert_eq!(find_by_title(&windows, "Cross Section").unwrap().handle, table);
		assert_eq!(find_opened_by_title(&windows, "Cross Section", &existing).unwrap().handle, plot);
	}

	#[test]
	fn already_open_window_still_matches_when_nothing_new_appears() {
		let windows = FakeWindows::new();
		let editor = windows.add_window("Cross Section Data - Beaver Creek", 1);

		assert_eq!(find_opened_by_title(&windows, "Cross Section Data", &[editor]).unwrap().handle, editor);
		assert!(find_opened_by_title(&windows, "Profile Plot", &[editor]).is_none());
	}

	#[test]
	fn headless_windows_find_nothing() {
		assert!(find_by_title(&HeadlessWindows, "anything").is_none());
	}
}
