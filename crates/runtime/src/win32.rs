//! Desktop window access through `user32`.

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
	EnumWindows, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsWindow, IsWindowVisible,
	PostMessageW, SW_HIDE, SW_SHOW, ShowWindow, WM_CLOSE,
};
use tracing::trace;

use crate::window::{WindowHandle, WindowInfo, WindowSystem};

/// [`WindowSystem`] over the interactive desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Windows;

unsafe extern "system" fn collect(hwnd: HWND, lparam: LPARAM) -> BOOL {
	let handles = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
	handles.push(hwnd);
	BOOL(1)
}

fn title(hwnd: HWND) -> String {
	let len = unsafe { GetWindowTextLengthW(hwnd) };
	if len <= 0 {
		return String::new();
	}
	let mut buf = vec![0u16; len as usize + 1];
	let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
	String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}

impl WindowSystem for Win32Windows {
	fn top_level_windows(&self) -> Vec<WindowInfo> {
		let mut handles: Vec<HWND> = Vec::new();
		if let Err(err) = unsafe { EnumWindows(Some(collect), LPARAM(&mut handles as *mut Vec<HWND> as isize)) } {
			trace!(target = "ras.sync", error = %err, "EnumWindows stopped early");
		}

		handles
			.into_iter()
			.map(|hwnd| WindowInfo {
				handle: WindowHandle(hwnd.0),
				title: title(hwnd),
				visible: unsafe { IsWindowVisible(hwnd) }.as_bool(),
			})
			.filter(|info| !info.title.is_empty())
			.collect()
	}

	fn is_visible(&self, window: WindowHandle) -> bool {
		let hwnd = HWND(window.0);
		unsafe { IsWindow(hwnd).as_bool() && IsWindowVisible(hwnd).as_bool() }
	}

	fn set_visible(&self, window: WindowHandle, visible: bool) {
		let cmd = if visible { SW_SHOW } else { SW_HIDE };
		unsafe {
			let _ = ShowWindow(HWND(window.0), cmd);
		}
	}

	fn post_close(&self, window: WindowHandle) {
		if let Err(err) = unsafe { PostMessageW(HWND(window.0), WM_CLOSE, WPARAM(0), LPARAM(0)) } {
			trace!(target = "ras.sync", error = %err, "WM_CLOSE not posted");
		}
	}

	fn owner_pid(&self, window: WindowHandle) -> Option<u32> {
		let hwnd = HWND(window.0);
		if !unsafe { IsWindow(hwnd) }.as_bool() {
			return None;
		}
		let mut pid = 0u32;
		unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
		(pid != 0).then_some(pid)
	}
}
