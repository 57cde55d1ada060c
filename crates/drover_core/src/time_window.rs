use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Serialize, Clone, Default, PartialEq)]
pub struct TimeWindow {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl TimeWindow {
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        TimeWindow { start, end }
    }

    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Window start as epoch seconds, or `default` when the bound is open.
    pub fn start_seconds(&self, default: i64) -> i64 {
        self.start.map(|start| start.as_second()).unwrap_or(default)
    }

    /// Window end as epoch seconds, or `default` when the bound is open.
    pub fn end_seconds(&self, default: i64) -> i64 {
        self.end.map(|end| end.as_second()).unwrap_or(default)
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        let after_start = self.start.map(|start| at >= start).unwrap_or(true);
        let before_end = self.end.map(|end| at <= end).unwrap_or(true);
        after_start && before_end
    }
}

#[derive(Default)]
pub struct TimeWindowBuilder {
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl TimeWindowBuilder {
    pub fn with_start(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    pub fn build(self) -> TimeWindow {
        TimeWindow {
            start: self.start,
            end: self.end,
        }
    }
}
