//! Marquee text: labels wider than the visible budget rotate left one
//! character per tick.

/// Rotate `text` left by one character, moving the first character to the end.
pub fn rotate_left_once(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => {
            let mut rotated: String = chars.collect();
            rotated.push(first);
            rotated
        }
        None => String::new(),
    }
}

/// Scroll state for one label.
#[derive(Debug, Clone)]
pub struct Marquee {
    max_chars: usize,
    spacer: String,
    spacer_chars: usize,
    source: Option<String>,
    text: String,
    active: bool,
}

impl Marquee {
    pub fn new(max_chars: usize, spacer: &str) -> Self {
        Self {
            max_chars,
            spacer: spacer.to_string(),
            spacer_chars: spacer.chars().count(),
            source: None,
            text: String::new(),
            active: false,
        }
    }

    /// Replace the label. The spacer is appended here, once.
    ///
    /// Returns `false` (and keeps the current rotation) when the label is
    /// unchanged.
    pub fn assign(&mut self, label: &str) -> bool {
        if self.source.as_deref() == Some(label) {
            return false;
        }
        self.restart(label);
        true
    }

    /// Start `label` over from its first character, even if it is the label
    /// already shown.
    pub fn restart(&mut self, label: &str) {
        self.source = Some(label.to_string());
        self.text = format!("{label}{}", self.spacer);
        self.active = true;
    }

    /// Label length without the spacer.
    pub fn label_chars(&self) -> usize {
        self.text.chars().count().saturating_sub(self.spacer_chars)
    }

    /// Scrolling is reserved for labels longer than the budget; a label no
    /// longer than the spacer can never qualify.
    pub fn needs_scroll(&self) -> bool {
        self.label_chars() > self.max_chars
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Padded text as it currently stands.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text to draw this tick, or `None` once a fitting label has been drawn.
    ///
    /// A scrolling label is returned and then rotated; a fitting label is
    /// returned once and the marquee goes inactive until the next
    /// [`assign`](Self::assign).
    pub fn tick(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        if self.needs_scroll() {
            let rotated = rotate_left_once(&self.text);
            Some(std::mem::replace(&mut self.text, rotated))
        } else {
            self.active = false;
            Some(self.text.clone())
        }
    }
}
