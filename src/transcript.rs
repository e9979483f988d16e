//! The visible chat log: messages plus transient typing placeholders.

use crate::state::{Message, Role};

/// Identifies one typing placeholder so the query that created it can
/// remove exactly that one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypingHandle(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(Message),
    Typing(TypingHandle),
}

/// Append-only message log with a scroll position that follows the newest
/// entry until the user scrolls back.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_handle: u64,
    // Lines scrolled back from the bottom; 0 means pinned to the newest entry
    scroll_back: u16,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, text: impl Into<String>, role: Role) {
        self.entries.push(Entry::Message(Message::new(text, role)));
        self.scroll_to_bottom();
    }

    pub fn add_typing(&mut self) -> TypingHandle {
        let handle = TypingHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(Entry::Typing(handle));
        self.scroll_to_bottom();
        handle
    }

    /// Remove the placeholder behind `handle`. Returns false if it was
    /// already gone.
    pub fn remove_typing(&mut self, handle: TypingHandle) -> bool {
        match self
            .entries
            .iter()
            .rposition(|e| matches!(e, Entry::Typing(h) if *h == handle))
        {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Message(m) => Some(m),
            Entry::Typing(_) => None,
        })
    }

    pub fn has_typing(&self) -> bool {
        self.entries.iter().any(|e| matches!(e, Entry::Typing(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    /// First visible line when `total_lines` rendered lines are shown in a
    /// viewport `height` rows tall.
    ///
    /// `total_lines` must come from the renderer's own wrapping so that
    /// following the newest entry lands on the real last line.
    pub fn scroll_offset(&mut self, total_lines: usize, height: u16) -> u16 {
        let bottom = total_lines.saturating_sub(height as usize);
        let bottom = u16::try_from(bottom).unwrap_or(u16::MAX);

        // Clamp so scrolling back past the top doesn't accumulate
        self.scroll_back = self.scroll_back.min(bottom);
        bottom - self.scroll_back
    }
}
