//! Panel visibility and pointer-drag placement.

use ratatui::layout::Rect;

pub const DEFAULT_PANEL_WIDTH: u16 = 56;
pub const DEFAULT_PANEL_HEIGHT: u16 = 24;

/// Gap between an anchored panel and the right edge of the screen.
pub const ANCHOR_MARGIN_X: u16 = 2;
/// Gap between an anchored panel and the bottom edge; leaves room for the
/// opener button underneath.
pub const ANCHOR_MARGIN_Y: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Bottom-right corner, the default after every open.
    Anchored,
    /// Top-left corner set by a drag. May lie partly off screen; drawing
    /// clamps it without touching the stored value.
    Placed { x: i32, y: i32 },
}

/// Pointer input, whatever device it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    pointer_start: (i32, i32),
    window_start: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct Window {
    visibility: Visibility,
    position: Position,
    drag: Option<Drag>,
    width: u16,
    height: u16,
    pub input_focused: bool,
}

impl Default for Window {
    fn default() -> Self {
        Self::new(DEFAULT_PANEL_WIDTH, DEFAULT_PANEL_HEIGHT)
    }
}

impl Window {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            visibility: Visibility::Closed,
            position: Position::Anchored,
            drag: None,
            width,
            height,
            input_focused: false,
        }
    }

    pub fn open(&mut self) {
        self.position = Position::Anchored;
        self.visibility = Visibility::Open;
        self.input_focused = true;
    }

    pub fn close(&mut self) {
        self.visibility = Visibility::Closed;
        self.input_focused = false;
    }

    pub fn is_open(&self) -> bool {
        self.visibility == Visibility::Open
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// On-screen rectangle of the panel within `screen`.
    pub fn rect(&self, screen: Rect) -> Rect {
        let width = self.width.min(screen.width);
        let height = self.height.min(screen.height);
        let max_x = screen.right().saturating_sub(width);
        let max_y = screen.bottom().saturating_sub(height);

        let (x, y) = match self.position {
            Position::Anchored => (
                max_x.saturating_sub(ANCHOR_MARGIN_X).max(screen.x),
                max_y.saturating_sub(ANCHOR_MARGIN_Y).max(screen.y),
            ),
            Position::Placed { x, y } => (clamp(x, screen.x, max_x), clamp(y, screen.y, max_y)),
        };

        Rect::new(x, y, width, height)
    }

    /// Feed one pointer event. `handle` is the drag handle's current area,
    /// if it is on screen. Returns true when the event was used for dragging.
    pub fn pointer(&mut self, event: Pointer, handle: Option<Rect>, screen: Rect) -> bool {
        match event {
            Pointer::Down { x, y } => {
                let on_handle = handle.is_some_and(|h| contains(h, x, y));
                if !on_handle {
                    return false;
                }
                let window_start = match self.position {
                    Position::Placed { x, y } => (x, y),
                    Position::Anchored => {
                        let r = self.rect(screen);
                        (i32::from(r.x), i32::from(r.y))
                    }
                };
                self.drag = Some(Drag {
                    pointer_start: (x, y),
                    window_start,
                });
                tracing::trace!(x, y, "drag started");
                true
            }
            Pointer::Move { x, y } => match self.drag {
                Some(drag) => {
                    self.position = Position::Placed {
                        x: drag.window_start.0 + (x - drag.pointer_start.0),
                        y: drag.window_start.1 + (y - drag.pointer_start.1),
                    };
                    true
                }
                None => false,
            },
            Pointer::Up => {
                if self.drag.take().is_some() {
                    tracing::trace!(position = ?self.position, "drag ended");
                    true
                } else {
                    false
                }
            }
        }
    }
}

fn clamp(v: i32, lo: u16, hi: u16) -> u16 {
    let hi = hi.max(lo);
    u16::try_from(v.clamp(i32::from(lo), i32::from(hi))).unwrap_or(lo)
}

/// Check if a point is within a rectangle
pub fn contains(rect: Rect, x: i32, y: i32) -> bool {
    x >= i32::from(rect.x)
        && x < i32::from(rect.right())
        && y >= i32::from(rect.y)
        && y < i32::from(rect.bottom())
}
