//! Windows low-level keyboard/mouse hook capture, ported directly from
//! `crossmacro-daemon::infrastructure::input_capture::windows`: same
//! `WH_KEYBOARD_LL`/`WH_MOUSE_LL` hooks on a dedicated message-loop thread,
//! same 300ms hook-callback budget, adapted to emit [`RawInputEvent`]
//! instead of the daemon's Windows-specific event enum, since this side of
//! the wire speaks the kernel-input vocabulary directly.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::thread;

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, HHOOK,
    KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_MOUSEHWHEEL, WM_RBUTTONDOWN,
    WM_RBUTTONUP, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP, XBUTTON1,
};

use crossmacro_core::domain::raw_event::RawInputEvent;
use crossmacro_core::keymap::evdev::codes;
use crossmacro_core::keymap::KeyMapper;

use super::CaptureProvider;

static EVENT_SENDER: OnceLock<UnboundedSender<RawInputEvent>> = OnceLock::new();
static CAPTURE_MOUSE: AtomicBool = AtomicBool::new(true);
static CAPTURE_KEYBOARD: AtomicBool = AtomicBool::new(true);

pub struct WindowsCaptureProvider {
    stopped: AtomicBool,
}

impl WindowsCaptureProvider {
    pub fn new() -> Self {
        Self { stopped: AtomicBool::new(false) }
    }
}

impl Default for WindowsCaptureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for WindowsCaptureProvider {
    fn configure(&mut self, capture_mouse: bool, capture_keyboard: bool) {
        CAPTURE_MOUSE.store(capture_mouse, Ordering::SeqCst);
        CAPTURE_KEYBOARD.store(capture_keyboard, Ordering::SeqCst);
    }

    fn start(&mut self, cancel: CancellationToken) -> Result<(mpsc::UnboundedReceiver<RawInputEvent>, mpsc::UnboundedReceiver<String>), String> {
        let (tx, rx) = mpsc::unbounded_channel();
        EVENT_SENDER.set(tx).map_err(|_| "capture provider already started once".to_string())?;

        thread::Builder::new().name("crossmacro-hook-loop".to_string()).spawn(move || run_hook_message_loop(cancel)).map_err(|e| e.to_string())?;

        let (_error_tx, error_rx) = mpsc::unbounded_channel();
        Ok((rx, error_rx))
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

fn run_hook_message_loop(cancel: CancellationToken) {
    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which the loop below does immediately after installing both hooks.
    let kbd_hook: HHOOK = unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0).expect("WH_KEYBOARD_LL install failed") };
    let mouse_hook: HHOOK = unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0).expect("WH_MOUSE_LL install failed") };

    let mut msg = MSG::default();
    // SAFETY: standard Win32 GetMessage/DispatchMessage pump; cancellation is
    // polled between messages since GetMessageW blocks until one arrives.
    unsafe {
        while !cancel.is_cancelled() && GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        UnhookWindowsHookEx(kbd_hook).ok();
        UnhookWindowsHookEx(mouse_hook).ok();
    }
}

fn send(event: RawInputEvent) {
    if let Some(sender) = EVENT_SENDER.get() {
        let _ = sender.send(event);
    }
}

/// # Safety
///
/// Called by Windows from the hook message loop thread; must return within
/// ~300ms or the OS removes the hook.
unsafe extern "system" fn keyboard_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 || !CAPTURE_KEYBOARD.load(Ordering::Relaxed) {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
    let vk = kbs.vkCode as u8;
    let key = KeyMapper::windows_vk_to_key(vk);
    let value = match w_param.0 as u32 {
        WM_KEYDOWN | WM_SYSKEYDOWN => 1,
        WM_KEYUP | WM_SYSKEYUP => 0,
        _ => return CallNextHookEx(None, n_code, w_param, l_param),
    };
    send(RawInputEvent::key(key as i32, value, kbs.time as u64));
    send(RawInputEvent::sync(kbs.time as u64));
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// # Safety
///
/// Called by Windows from the hook message loop thread; must return within
/// ~300ms or the OS removes the hook.
unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code != HC_ACTION as i32 || !CAPTURE_MOUSE.load(Ordering::Relaxed) {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let time = mhs.time as u64;

    match w_param.0 as u32 {
        WM_MOUSEMOVE => {
            send(RawInputEvent::mouse_move(codes::ABS_X, mhs.pt.x, time));
            send(RawInputEvent::mouse_move(codes::ABS_Y, mhs.pt.y, time));
            send(RawInputEvent::sync(time));
        }
        WM_LBUTTONDOWN => emit_button(codes::BTN_LEFT, 1, time),
        WM_LBUTTONUP => emit_button(codes::BTN_LEFT, 0, time),
        WM_RBUTTONDOWN => emit_button(codes::BTN_RIGHT, 1, time),
        WM_RBUTTONUP => emit_button(codes::BTN_RIGHT, 0, time),
        WM_MBUTTONDOWN => emit_button(codes::BTN_MIDDLE, 1, time),
        WM_MBUTTONUP => emit_button(codes::BTN_MIDDLE, 0, time),
        WM_XBUTTONDOWN => {
            let code = if (mhs.mouseData >> 16) as u16 == XBUTTON1 { codes::BTN_SIDE } else { codes::BTN_EXTRA };
            emit_button(code, 1, time);
        }
        WM_XBUTTONUP => {
            let code = if (mhs.mouseData >> 16) as u16 == XBUTTON1 { codes::BTN_SIDE } else { codes::BTN_EXTRA };
            emit_button(code, 0, time);
        }
        WM_MOUSEWHEEL => {
            let delta = (mhs.mouseData >> 16) as i16;
            send(RawInputEvent::mouse_scroll(codes::REL_WHEEL, delta.signum() as i32, time));
            send(RawInputEvent::sync(time));
        }
        WM_MOUSEHWHEEL => {
            let delta = (mhs.mouseData >> 16) as i16;
            send(RawInputEvent::mouse_scroll(codes::REL_HWHEEL, delta.signum() as i32, time));
            send(RawInputEvent::sync(time));
        }
        _ => return CallNextHookEx(None, n_code, w_param, l_param),
    }
    CallNextHookEx(None, n_code, w_param, l_param)
}

fn emit_button(code: i32, value: i32, time: u64) {
    send(RawInputEvent::mouse_button(code, value, time));
    send(RawInputEvent::sync(time));
}
