//! Item editor
//!
//! Temporary text state for editing one order line before commit. Parsing
//! is lenient in the way a keypad form is: a bad quantity keeps the old
//! one, a bad or zero discount clears it.

use shared::order::{OrderLine, is_valid_quantity};

/// Parsed edit to apply to a line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemEdit {
    /// Raw quantity text; ignored unless an integer in `1..=MAX_QUANTITY`
    pub quantity: Option<String>,
    /// Raw discount percent text; anything but a number in (0, 100] clears
    pub discount_percent: Option<String>,
    /// Written as given; empty removes the note
    pub note: Option<String>,
}

impl ItemEdit {
    pub fn quantity(mut self, text: impl Into<String>) -> Self {
        self.quantity = Some(text.into());
        self
    }

    pub fn discount(mut self, text: impl Into<String>) -> Self {
        self.discount_percent = Some(text.into());
        self
    }

    pub fn note(mut self, text: impl Into<String>) -> Self {
        self.note = Some(text.into());
        self
    }

    /// Apply to a line. Returns `true` when anything changed.
    pub fn apply_to(&self, line: &mut OrderLine) -> bool {
        let before = line.clone();
        if let Some(qty) = self.quantity.as_deref().and_then(parse_quantity) {
            line.quantity = qty;
        }
        if let Some(text) = &self.discount_percent {
            line.discount = parse_discount(text);
        }
        if let Some(note) = &self.note {
            line.note = (!note.is_empty()).then(|| note.clone());
        }
        *line != before
    }
}

/// Integer in `1..=MAX_QUANTITY`, surrounding whitespace allowed
pub fn parse_quantity(text: &str) -> Option<u32> {
    text.trim().parse::<u32>().ok().filter(|q| is_valid_quantity(*q))
}

/// Percentage in (0, 100]; `None` means "no discount"
pub fn parse_discount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0 && *p <= 100.0)
}

/// Edit-in-progress form for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEditor {
    pub line_id: u64,
    pub quantity: String,
    pub discount: String,
    pub note: String,
}

impl ItemEditor {
    /// Seed the form from the line's current values
    pub fn from_line(line_id: u64, line: &OrderLine) -> Self {
        Self {
            line_id,
            quantity: line.quantity.to_string(),
            discount: line.discount.map(|d| d.to_string()).unwrap_or_default(),
            note: line.note.clone().unwrap_or_default(),
        }
    }

    pub fn to_edit(&self) -> ItemEdit {
        ItemEdit {
            quantity: Some(self.quantity.clone()),
            discount_percent: Some(self.discount.clone()),
            note: Some(self.note.clone()),
        }
    }
}
