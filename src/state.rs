use std::collections::VecDeque;

use chrono::Local;

use crate::catalog::CategoryCatalog;
use crate::context::AppContext;
use crate::encoding::FeatureField;
use crate::error::Result;
use crate::outcome::OutcomeMessage;
use crate::request::{MatchRequest, parse_attendance};

const MAX_LOGS: usize = 200;
const MAX_ATTENDANCE_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Weather,
    Team1,
    Team2,
    Location,
    Attendance,
}

impl Focus {
    pub const ALL: [Focus; 5] = [
        Focus::Weather,
        Focus::Team1,
        Focus::Team2,
        Focus::Location,
        Focus::Attendance,
    ];

    pub fn field(self) -> Option<FeatureField> {
        match self {
            Focus::Weather => Some(FeatureField::Weather),
            Focus::Team1 => Some(FeatureField::Team1),
            Focus::Team2 => Some(FeatureField::Team2),
            Focus::Location => Some(FeatureField::Location),
            Focus::Attendance => None,
        }
    }

    fn index(self) -> usize {
        Focus::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Focus::ALL[(self.index() + 1) % Focus::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let len = Focus::ALL.len();
        Focus::ALL[(self.index() + len - 1) % len]
    }
}

pub fn focus_label(focus: Focus) -> &'static str {
    match focus {
        Focus::Weather => "Weather",
        Focus::Team1 => "Team 1",
        Focus::Team2 => "Team 2",
        Focus::Location => "Location",
        Focus::Attendance => "Attendance",
    }
}

/// A dropdown over one catalog namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub field: FeatureField,
    pub options: Vec<String>,
    pub selected: usize,
}

impl Selector {
    pub fn new(field: FeatureField, catalog: &CategoryCatalog) -> Self {
        Self {
            field,
            options: catalog.values(field.category()).iter().cloned().collect(),
            selected: 0,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if self.options.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn select_prev(&mut self) {
        if self.options.is_empty() {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = self.options.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Predicted(OutcomeMessage),
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub focus: Focus,
    pub selectors: Vec<Selector>,
    pub attendance_input: String,
    pub attendance_step: u64,
    pub last_submission: Option<Submission>,
    pub submissions: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn from_catalog(catalog: &CategoryCatalog, attendance_step: u64) -> Self {
        let mut selectors = FeatureField::ALL
            .iter()
            .map(|field| Selector::new(*field, catalog))
            .collect::<Vec<_>>();
        // Start with two different teams when the catalog has them.
        if let Some(team2) = selectors
            .iter_mut()
            .find(|s| s.field == FeatureField::Team2)
            && team2.options.len() > 1
        {
            team2.selected = 1;
        }
        Self {
            focus: Focus::Weather,
            selectors,
            attendance_input: String::new(),
            attendance_step: attendance_step.max(1),
            last_submission: None,
            submissions: 0,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn selector(&self, field: FeatureField) -> Option<&Selector> {
        self.selectors.iter().find(|s| s.field == field)
    }

    pub fn selector_mut(&mut self, field: FeatureField) -> Option<&mut Selector> {
        self.selectors.iter_mut().find(|s| s.field == field)
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Right arrow: next option, or one attendance step up.
    pub fn cycle_next(&mut self) {
        match self.focus.field() {
            Some(field) => {
                if let Some(selector) = self.selector_mut(field) {
                    selector.select_next();
                }
            }
            None => {
                let current = parse_attendance(&self.attendance_input).unwrap_or(0);
                self.set_attendance(current.saturating_add(self.attendance_step));
            }
        }
    }

    /// Left arrow: previous option, or one attendance step down.
    pub fn cycle_prev(&mut self) {
        match self.focus.field() {
            Some(field) => {
                if let Some(selector) = self.selector_mut(field) {
                    selector.select_prev();
                }
            }
            None => {
                let current = parse_attendance(&self.attendance_input).unwrap_or(0);
                self.set_attendance(current.saturating_sub(self.attendance_step));
            }
        }
    }

    pub fn push_attendance_digit(&mut self, digit: char) {
        if self.focus != Focus::Attendance || !digit.is_ascii_digit() {
            return;
        }
        if self.attendance_input == "0" {
            self.attendance_input.clear();
        }
        if self.attendance_input.len() < MAX_ATTENDANCE_DIGITS {
            self.attendance_input.push(digit);
        }
    }

    pub fn pop_attendance_digit(&mut self) {
        if self.focus == Focus::Attendance {
            self.attendance_input.pop();
        }
    }

    fn set_attendance(&mut self, value: u64) {
        self.attendance_input = if value == 0 {
            String::new()
        } else {
            value.to_string()
        };
    }

    pub fn build_request(&self) -> Result<MatchRequest> {
        let value = |field| {
            self.selector(field)
                .and_then(Selector::value)
                .unwrap_or_default()
                .to_string()
        };
        let attendance = parse_attendance(&self.attendance_input)?;
        Ok(MatchRequest::build(
            value(FeatureField::Weather),
            value(FeatureField::Team1),
            value(FeatureField::Team2),
            value(FeatureField::Location),
            i64::try_from(attendance).unwrap_or(i64::MAX),
        ))
    }

    /// Runs one prediction for the current selections. Rejections are kept
    /// in the state; nothing here is fatal.
    pub fn submit(&mut self, ctx: &AppContext) {
        self.submissions += 1;
        let result = self.build_request().and_then(|request| {
            if request.same_team() {
                self.push_log(format!(
                    "[WARN] Team 1 and Team 2 are both {}",
                    request.team1
                ));
            }
            ctx.predict(&request)
        });
        match result {
            Ok(message) => {
                self.push_log(format!("[INFO] Prediction: {message}"));
                self.last_submission = Some(Submission::Predicted(message));
            }
            Err(err) => {
                self.push_log(format!("[WARN] Submission rejected: {err}"));
                self.last_submission = Some(Submission::Rejected(err.to_string()));
            }
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}
