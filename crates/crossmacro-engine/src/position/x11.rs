//! X11 position provider using `XQueryPointer` (§4.9), grounded alongside
//! `capture::x11`'s connection setup.

#![cfg(target_os = "linux")]

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{ConnectionExt, Screen};

use super::PositionProvider;

pub struct X11PositionProvider {
    conn: x11rb::rust_connection::RustConnection,
    root: u32,
}

impl X11PositionProvider {
    pub fn connect() -> Result<Self, String> {
        let (conn, screen_num) = x11rb::rust_connection::RustConnection::connect(None).map_err(|e| e.to_string())?;
        let root = conn.setup().roots[screen_num].root;
        Ok(Self { conn, root })
    }

    fn screen(&self) -> &Screen {
        &self.conn.setup().roots[0]
    }
}

impl PositionProvider for X11PositionProvider {
    fn priority(&self) -> u8 {
        10
    }

    fn name(&self) -> &'static str {
        "x11"
    }

    fn get_absolute_position(&mut self) -> Option<(i32, i32)> {
        let reply = self.conn.query_pointer(self.root).ok()?.reply().ok()?;
        Some((reply.root_x as i32, reply.root_y as i32))
    }

    fn get_screen_resolution(&mut self) -> Option<(i32, i32)> {
        let screen = self.screen();
        Some((screen.width_in_pixels as i32, screen.height_in_pixels as i32))
    }
}
