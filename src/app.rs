use ratatui::layout::Rect;

use mzu_chat::ChatWidget;

/// Screen areas recorded during the last draw, for mouse hit-testing.
#[derive(Debug, Default, Clone)]
pub struct HitAreas {
    pub opener: Option<Rect>,
    pub title_bar: Option<Rect>,
    pub close: Option<Rect>,
    pub send: Option<Rect>,
    pub log: Option<Rect>,
    pub suggestions: Vec<Rect>,
}

impl HitAreas {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct App {
    pub should_quit: bool,
    pub widget: ChatWidget,

    // Full terminal area as of the last draw
    pub screen: Rect,
    pub areas: HitAreas,

    // Inner height of the message log, for half-page scrolling
    pub log_height: u16,

    // Animation state for the typing indicator (0-2 for dot cycling)
    pub animation_frame: u8,

    pub api_url: String,
}

impl App {
    pub fn new(widget: ChatWidget, api_url: String) -> Self {
        Self {
            should_quit: false,
            widget,
            screen: Rect::default(),
            areas: HitAreas::default(),
            log_height: 0,
            animation_frame: 0,
            api_url,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.transcript.has_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll by half the visible log height
    pub fn scroll_half_page_up(&mut self) {
        let half = (self.log_height / 2).max(1);
        self.widget.transcript.scroll_up(half);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.log_height / 2).max(1);
        self.widget.transcript.scroll_down(half);
    }
}
