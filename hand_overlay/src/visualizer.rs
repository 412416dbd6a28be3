//! `minifb` window: owns the framebuffer, forwards keys to the simulator and
//! presents whatever [`render`](crate::render) composed.

use std::sync::mpsc::Sender;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::debug;

use crate::canvas::Canvas;
use crate::config::WindowConfig;
use crate::detector::{SimInput, SimKey, VideoFrame};
use crate::error::{OverlayError, Result};
use crate::layout::Layout;
use crate::render;
use crate::session::{FrameReport, Session};

const TITLE: &str = "Hand Overlay";

/// Keys that fire once per press.
const ONE_SHOT: [Key; 14] = [
    Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5,
    Key::Key6, Key::Key7, Key::Key8, Key::Key9, Key::Key0,
    Key::C, Key::H, Key::B, Key::Q,
];

/// Keys that repeat while held.
const HELD: [Key; 4] = [Key::Left, Key::Right, Key::Up, Key::Down];

/// Simulator key bound to `key`, if any.
pub fn sim_key(key: Key) -> Option<SimKey> {
    let k = match key {
        Key::Key1 => SimKey::Pose(0),
        Key::Key2 => SimKey::Pose(1),
        Key::Key3 => SimKey::Pose(2),
        Key::Key4 => SimKey::Pose(3),
        Key::Key5 => SimKey::Pose(4),
        Key::Key6 => SimKey::Pose(5),
        Key::Key7 => SimKey::Pose(6),
        Key::Key8 => SimKey::Pose(7),
        Key::Key9 => SimKey::Pose(8),
        Key::Key0 => SimKey::Pose(9),
        Key::C     => SimKey::CustomPose,
        Key::Left  => SimKey::NudgeLeft,
        Key::Right => SimKey::NudgeRight,
        Key::Up    => SimKey::NudgeUp,
        Key::Down  => SimKey::NudgeDown,
        Key::H     => SimKey::ToggleHand,
        Key::B     => SimKey::ToggleSecond,
        Key::Q     => SimKey::Quit,
        _ => return None,
    };
    Some(k)
}

pub struct Visualizer {
    window: Window,
    canvas: Canvas,
    layout: Layout,
    /// Present only when the simulator is the detector source.
    sim_tx: Option<Sender<SimInput>>,
}

impl Visualizer {
    pub fn new(cfg: &WindowConfig, sim_tx: Option<Sender<SimInput>>) -> Result<Self> {
        let mut window = Window::new(
            TITLE,
            cfg.width, cfg.height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        ).map_err(|e| OverlayError::Window(e.to_string()))?;

        let fps = cfg.fps_cap.max(1) as u64;
        window.limit_update_rate(Some(Duration::from_micros(1_000_000 / fps)));

        Ok(Visualizer {
            window,
            canvas: Canvas::new(cfg.width, cfg.height),
            layout: Layout::new(cfg.width, cfg.height),
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    pub fn layout(&self) -> &Layout { &self.layout }

    /// Poll keyboard input and forward it to the simulator.  Returns false
    /// when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() || self.window.is_key_down(Key::Escape) {
            return false;
        }

        let mut pressed: Vec<Key> = ONE_SHOT
            .iter()
            .copied()
            .filter(|&k| self.window.is_key_pressed(k, KeyRepeat::No))
            .collect();
        pressed.extend(HELD.iter().copied().filter(|&k| self.window.is_key_pressed(k, KeyRepeat::Yes)));

        for key in pressed {
            if let (Some(tx), Some(k)) = (&self.sim_tx, sim_key(key)) {
                let _ = tx.send(SimInput::KeyDown(k));
            }
            if key == Key::Q {
                return false;
            }
        }
        true
    }

    /// New layout if the window was resized since the last call.
    pub fn take_resize(&mut self) -> Option<Layout> {
        let (w, h) = self.window.get_size();
        if (w, h) == (self.layout.width, self.layout.height) || w == 0 || h == 0 {
            return None;
        }
        debug!("window resized to {w}x{h}");
        self.canvas.resize(w, h);
        self.layout = Layout::new(w, h);
        Some(self.layout)
    }

    pub fn render(&mut self, session: &Session, report: &FrameReport, image: Option<&VideoFrame>) {
        render::draw_frame(&mut self.canvas, &self.layout, session, report, image);
        self.present();
    }

    pub fn render_failure(&mut self, reason: &str) {
        render::draw_failure(&mut self.canvas, &self.layout, reason);
        self.present();
    }

    fn present(&mut self) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        if let Err(e) = self.window.update_with_buffer(self.canvas.pixels(), w, h) {
            debug!("frame not presented: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_row_maps_to_registry_order() {
        assert_eq!(sim_key(Key::Key1), Some(SimKey::Pose(0)));
        assert_eq!(sim_key(Key::Key9), Some(SimKey::Pose(8)));
        assert_eq!(sim_key(Key::Key0), Some(SimKey::Pose(9)));
    }

    #[test]
    fn every_bound_key_has_a_sim_key() {
        for key in ONE_SHOT.iter().chain(HELD.iter()) {
            assert!(sim_key(*key).is_some(), "{key:?} unbound");
        }
        assert_eq!(sim_key(Key::Z), None);
    }
}
