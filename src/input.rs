// Pointer/touch state read by the particle field every frame.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    TouchStart,
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    Resize { width: usize, height: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
    /// A finger is down.
    pub touching: bool,
    /// Coordinates came from a real move. False at startup and after touch end,
    /// so the origin reset never pushes particles.
    pub tracked: bool,
}

impl PointerState {
    /// Apply one input event. Resize is not a pointer event and is ignored here.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } | InputEvent::TouchMove { x, y } => {
                self.x = x;
                self.y = y;
                self.tracked = true;
            }
            InputEvent::TouchStart => self.touching = true,
            InputEvent::TouchEnd => {
                self.touching = false;
                self.x = 0.0;
                self.y = 0.0;
                self.tracked = false;
            }
            InputEvent::Resize { .. } => {}
        }
    }

    /// Whether the pointer may push particles this frame. On touch-capable
    /// hosts only while a finger is down.
    pub fn can_scatter(&self, touch_capable: bool) -> bool {
        self.tracked && (self.touching || !touch_capable)
    }
}

/// Turns per-frame samples of window size, mouse position and left button
/// into [`InputEvent`]s.
///
/// Mouse motion is always a pointer move. With touch emulation the left
/// button is the finger: press = touch start (plus a touch move to where it
/// landed), drag = touch move, release = touch end.
#[derive(Debug, Clone)]
pub struct InputTracker {
    touch_emulation: bool,
    last_size: (usize, usize),
    last_mouse: Option<(f32, f32)>,
    finger_down: bool,
}

impl InputTracker {
    pub fn new(touch_emulation: bool, size: (usize, usize)) -> Self {
        Self { touch_emulation, last_size: size, last_mouse: None, finger_down: false }
    }

    /// Events since the previous sample: resize first, then touch start,
    /// moves, touch end.
    pub fn update(&mut self, size: (usize, usize), mouse: Option<(f32, f32)>, left_down: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if size != self.last_size {
            self.last_size = size;
            events.push(InputEvent::Resize { width: size.0, height: size.1 });
        }

        let moved = mouse.filter(|_| mouse != self.last_mouse);
        if mouse.is_some() {
            self.last_mouse = mouse;
        }

        if !self.touch_emulation || !left_down {
            if let Some((x, y)) = moved {
                events.push(InputEvent::PointerMove { x, y });
            }
            if self.touch_emulation && self.finger_down {
                self.finger_down = false;
                events.push(InputEvent::TouchEnd);
            }
            return events;
        }

        if !self.finger_down {
            self.finger_down = true;
            events.push(InputEvent::TouchStart);
            if let Some((x, y)) = mouse {
                events.push(InputEvent::TouchMove { x, y });
            }
        } else if let Some((x, y)) = moved {
            events.push(InputEvent::TouchMove { x, y });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_reports_resize_and_motion_once() {
        let mut t = InputTracker::new(false, (800, 600));
        assert!(t.update((800, 600), None, false).is_empty());
        assert_eq!(
            t.update((1024, 768), Some((1.0, 2.0)), false),
            vec![
                InputEvent::Resize { width: 1024, height: 768 },
                InputEvent::PointerMove { x: 1.0, y: 2.0 },
            ]
        );
        assert!(t.update((1024, 768), Some((1.0, 2.0)), false).is_empty());
        // Without emulation the button means nothing.
        assert!(t.update((1024, 768), Some((1.0, 2.0)), true).is_empty());
    }

    #[test]
    fn touch_emulation_still_tracks_hover() {
        let mut t = InputTracker::new(true, (800, 600));
        assert_eq!(
            t.update((800, 600), Some((10.0, 20.0)), false),
            vec![InputEvent::PointerMove { x: 10.0, y: 20.0 }]
        );

        let mut p = PointerState::default();
        for e in t.update((800, 600), Some((30.0, 40.0)), false) {
            p.apply(&e);
        }
        assert_eq!((p.x, p.y), (30.0, 40.0));
        assert!(!p.can_scatter(true));
    }

    #[test]
    fn touch_emulation_press_drag_release() {
        let mut t = InputTracker::new(true, (800, 600));
        assert_eq!(
            t.update((800, 600), Some((5.0, 5.0)), true),
            vec![InputEvent::TouchStart, InputEvent::TouchMove { x: 5.0, y: 5.0 }]
        );
        assert_eq!(
            t.update((800, 600), Some((6.0, 5.0)), true),
            vec![InputEvent::TouchMove { x: 6.0, y: 5.0 }]
        );
        assert!(t.update((800, 600), Some((6.0, 5.0)), true).is_empty());
        assert_eq!(t.update((800, 600), Some((6.0, 5.0)), false), vec![InputEvent::TouchEnd]);
    }

    #[test]
    fn mouse_scatters_only_after_first_move() {
        let mut p = PointerState::default();
        assert!(!p.can_scatter(false));
        p.apply(&InputEvent::PointerMove { x: 10.0, y: 20.0 });
        assert_eq!((p.x, p.y), (10.0, 20.0));
        assert!(p.can_scatter(false));
        assert!(!p.can_scatter(true));
    }

    #[test]
    fn touch_end_resets_to_origin_without_force() {
        let mut p = PointerState::default();
        p.apply(&InputEvent::TouchStart);
        p.apply(&InputEvent::TouchMove { x: 300.0, y: 400.0 });
        assert!(p.can_scatter(true));
        p.apply(&InputEvent::TouchEnd);
        assert_eq!((p.x, p.y), (0.0, 0.0));
        assert!(!p.touching);
        assert!(!p.can_scatter(true));
        assert!(!p.can_scatter(false));
    }

    #[test]
    fn resize_leaves_pointer_alone() {
        let mut p = PointerState::default();
        p.apply(&InputEvent::PointerMove { x: 1.0, y: 2.0 });
        let before = p;
        p.apply(&InputEvent::Resize { width: 10, height: 10 });
        assert_eq!(p, before);
    }
}
