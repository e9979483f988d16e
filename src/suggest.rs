//! Example questions offered while the user types.

pub const MAX_SUGGESTIONS: usize = 5;

pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "What is the NIRF ranking of Mizoram University?",
    "Latest notifications",
    "Latest recruitments",
    "Departments in MZU",
    "Courses offered at MZU",
    "Library information",
    "Hostel details",
    "Placement cell details",
    "MZU contact information",
    "Vice-Chancellor of Mizoram University",
    "Academic calendar",
    "Admission process",
    "Scholarships offered",
    "MZU location",
];

/// Fixed suggestion list plus the currently rendered matches.
#[derive(Debug, Clone)]
pub struct Suggestions {
    all: Vec<String>,
    visible: Vec<String>,
    selected: Option<usize>,
}

impl Default for Suggestions {
    fn default() -> Self {
        Self::new(DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect())
    }
}

impl Suggestions {
    pub fn new(all: Vec<String>) -> Self {
        Self {
            all,
            visible: Vec::new(),
            selected: None,
        }
    }

    /// Recompute the visible matches for the current input.
    pub fn update(&mut self, input: &str) {
        self.visible = filter(&self.all, input)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.selected = None;
    }

    pub fn clear(&mut self) {
        self.visible.clear();
        self.selected = None;
    }

    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.visible.get(idx).map(String::as_str)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected.and_then(|i| self.get(i))
    }

    pub fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            Some(i) => i,
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        self.selected = match self.selected {
            Some(0) | None => None,
            Some(i) => Some(i - 1),
        };
    }
}

/// Case-insensitive substring matches of the trimmed input, first
/// [`MAX_SUGGESTIONS`] in list order. Empty input matches nothing.
pub fn filter<'a>(all: &'a [String], input: &str) -> Vec<&'a str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    all.iter()
        .filter(|s| s.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(String::as_str)
        .collect()
}
