//! Read-outs for chart clicks, box selections and the x-range slider.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plot::XRange;

pub const NONE_CLICKED: &str = "none clicked";
pub const NONE_SELECTED: &str = "none selected";

/// Two-slot click memory. Each click overwrites the older slot, so the
/// read-out always compares the last two clicks.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickHistory {
    next: usize,
    slots: [[f64; 2]; 2],
    delta: [f64; 2],
}

impl Default for ClickHistory {
    fn default() -> Self {
        Self {
            next: 0,
            slots: [[0.0; 2]; 2],
            delta: [0.0; 2],
        }
    }
}

/// Outcome of one click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickReport {
    pub previous: [f64; 2],
    pub current: [f64; 2],
    pub delta: [f64; 2],
}

impl ClickReport {
    pub fn message(&self) -> String {
        format!(
            "Previous [x, y]: [{:.6}, {:.6}]\nCurrent [x, y]: [{:.6}, {:.6}]\nRange [x, y]: [{:.6}, {:.6}]",
            self.previous[0],
            self.previous[1],
            self.current[0],
            self.current[1],
            self.delta[0],
            self.delta[1],
        )
    }
}

impl ClickHistory {
    pub fn record(&mut self, x: f64, y: f64) -> ClickReport {
        let current = self.next;
        self.slots[current] = [x, y];
        self.next = 1 - current;
        let previous = self.next;

        let [cx, cy] = self.slots[current];
        let [px, py] = self.slots[previous];
        self.delta = [(cx - px).abs(), (cy - py).abs()];

        ClickReport {
            previous: self.slots[previous],
            current: self.slots[current],
            delta: self.delta,
        }
    }

    pub fn delta(&self) -> [f64; 2] {
        self.delta
    }
}

/// Click event posted by the page: the first clicked point, if any.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ClickEvent {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Box-select event posted by the page. Range keys carry the subplot
/// suffix (`x`, `y2`, ...); lasso selections have no range.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SelectionEvent {
    #[serde(default)]
    pub range: Option<BTreeMap<String, Vec<f64>>>,
}

impl SelectionEvent {
    fn axis(&self, prefix: char) -> Option<(f64, f64)> {
        let range = self.range.as_ref()?;
        let (_, bounds) = range.iter().find(|(key, _)| key.starts_with(prefix))?;
        match bounds.as_slice() {
            [a, b, ..] => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        let (Some((x_left, x_right)), Some((y_bottom, y_top))) = (self.axis('x'), self.axis('y'))
        else {
            return NONE_SELECTED.to_string();
        };
        let dx = (x_right - x_left).abs();
        let dy = (y_bottom - y_top).abs();
        format!(
            "Top left [x, y]: [{x_left:.6}, {y_top:.6}]\nBottom right [x, y]: [{x_right:.6}, {y_bottom:.6}]\nRange in [x, y]: [{dx:.6}, {dy:.6}]"
        )
    }
}

/// Slider change posted by the page: the slider position, the typed bounds,
/// and whether the Submit button sent it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SliderEvent {
    pub value: [f64; 2],
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub submit: bool,
}

impl SliderEvent {
    /// Range to rebuild with. Submitted bounds are limited to the tab's
    /// original extent; a missing typed bound keeps the slider value.
    pub fn resolve(&self, original_min: f64, original_max: f64) -> XRange {
        if !self.submit {
            return XRange::new(self.value[0], self.value[1]);
        }
        let start = self.start.unwrap_or(self.value[0]).max(original_min);
        let end = self.end.unwrap_or(self.value[1]).min(original_max);
        XRange::new(start, end)
    }
}

pub fn range_message(range: XRange) -> String {
    format!("Selected range [{:.6}, {:.6}]", range.start, range.end)
}

/// Slider state after a reset: original bounds, typed fields cleared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderReset {
    pub value: [f64; 2],
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl SliderReset {
    pub fn new(original_min: f64, original_max: f64) -> Self {
        Self {
            value: [original_min, original_max],
            start: None,
            end: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_history_ping_pongs() {
        let mut history = ClickHistory::default();

        let first = history.record(1.0, 1.0);
        assert_eq!(first.previous, [0.0, 0.0]);
        assert_eq!(first.delta, [1.0, 1.0]);

        let second = history.record(2.0, 2.0);
        assert_eq!(second.previous, [1.0, 1.0]);
        assert_eq!(second.delta, [1.0, 1.0]);

        let third = history.record(3.0, 3.0);
        assert_eq!(third.previous, [2.0, 2.0]);
        assert_eq!(third.current, [3.0, 3.0]);
        assert_eq!(third.delta, [1.0, 1.0]);
        assert_eq!(history.delta(), [1.0, 1.0]);
    }

    #[test]
    fn click_message_has_six_decimals() {
        let mut history = ClickHistory::default();
        let report = history.record(1.5, -2.0);
        assert_eq!(
            report.message(),
            "Previous [x, y]: [0.000000, 0.000000]\nCurrent [x, y]: [1.500000, -2.000000]\nRange [x, y]: [1.500000, 2.000000]"
        );
    }

    #[test]
    fn selection_keys_are_found_by_axis_prefix() {
        let event: SelectionEvent =
            serde_json::from_str(r#"{"range": {"y2": [-1.0, 3.0], "x": [2.0, 5.0]}}"#).unwrap();
        assert_eq!(
            event.message(),
            "Top left [x, y]: [2.000000, 3.000000]\nBottom right [x, y]: [5.000000, -1.000000]\nRange in [x, y]: [3.000000, 4.000000]"
        );
    }

    #[test]
    fn lasso_or_empty_selection_reports_none() {
        assert_eq!(SelectionEvent::default().message(), NONE_SELECTED);
        let event: SelectionEvent = serde_json::from_str(r#"{"range": {"x": [1.0, 2.0]}}"#).unwrap();
        assert_eq!(event.message(), NONE_SELECTED);
    }

    #[test]
    fn submitted_bounds_clamp_to_original_extent() {
        let event = SliderEvent {
            value: [2.0, 8.0],
            start: Some(-10.0),
            end: Some(50.0),
            submit: true,
        };
        assert_eq!(event.resolve(0.0, 10.0), XRange::new(0.0, 10.0));

        let partial = SliderEvent {
            start: Some(3.0),
            end: None,
            ..event
        };
        assert_eq!(partial.resolve(0.0, 10.0), XRange::new(3.0, 8.0));

        let dragged = SliderEvent {
            submit: false,
            ..event
        };
        assert_eq!(dragged.resolve(0.0, 10.0), XRange::new(2.0, 8.0));
    }

    #[test]
    fn range_message_and_reset() {
        assert_eq!(
            range_message(XRange::new(1.0, 2.5)),
            "Selected range [1.000000, 2.500000]"
        );
        let reset = SliderReset::new(0.0, 9.0);
        assert_eq!(reset.value, [0.0, 9.0]);
        assert!(reset.start.is_none() && reset.end.is_none());
    }
}
