//! Interfaces to the collaborators an editor plugs in around the document.
//!
//! Progress reporting, log output, undoable commands and display culture are
//! owned by the host application. This module defines the seams and provides
//! minimal implementations, which the CLI and the tests use.

use tracing::{debug, info};

use crate::date::{ApproxMode, DateExact, DateValue};
use crate::enums::Sex;
use crate::tree::Document;
use crate::utils::clean_xref;

// ------------- Progress -------------

/// Receives progress of whole-document scans, one step per unit of work.
pub trait ProgressSink {
    fn init(&mut self, title: &str, max: usize);
    fn step(&mut self);
    fn done(&mut self);
}

/// Ignores progress.
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn init(&mut self, _title: &str, _max: usize) {}
    fn step(&mut self) {}
    fn done(&mut self) {}
}

/// Counts steps and logs the start and end of each scan.
#[derive(Debug, Default)]
pub struct TracingProgress {
    title: String,
    max: usize,
    position: usize,
}

impl TracingProgress {
    pub fn position(&self) -> usize {
        self.position
    }
    pub fn max(&self) -> usize {
        self.max
    }
}

impl ProgressSink for TracingProgress {
    fn init(&mut self, title: &str, max: usize) {
        self.title = title.to_string();
        self.max = max;
        self.position = 0;
        debug!(title = %self.title, max, "progress started");
    }
    fn step(&mut self) {
        self.position += 1;
    }
    fn done(&mut self) {
        debug!(title = %self.title, steps = self.position, "progress done");
    }
}

// ------------- Log -------------

pub trait LogSink {
    fn write(&mut self, message: &str);
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn write(&mut self, message: &str) {
        info!(message, "log sink");
    }
}

// ------------- Commands -------------

/// A reversible edit of a document.
pub trait Command {
    fn name(&self) -> &str;
    /// Applies the edit, returning whether anything changed.
    fn execute(&mut self, document: &mut Document) -> bool;
    fn undo(&mut self, document: &mut Document) -> bool;
}

pub trait CommandExecutor {
    fn run(&mut self, document: &mut Document, command: Box<dyn Command>) -> bool;
}

/// Executes commands immediately and forgets them.
#[derive(Debug, Default)]
pub struct DirectExecutor;

impl CommandExecutor for DirectExecutor {
    fn run(&mut self, document: &mut Document, mut command: Box<dyn Command>) -> bool {
        command.execute(document)
    }
}

/// Keeps executed commands so they can be undone and redone.
#[derive(Default)]
pub struct HistoryExecutor {
    done: Vec<Box<dyn Command>>,
    undone: Vec<Box<dyn Command>>,
}

impl HistoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }
    pub fn undo(&mut self, document: &mut Document) -> bool {
        match self.done.pop() {
            Some(mut command) => {
                let changed = command.undo(document);
                debug!(command = command.name(), changed, "undo");
                self.undone.push(command);
                changed
            }
            None => false,
        }
    }
    pub fn redo(&mut self, document: &mut Document) -> bool {
        match self.undone.pop() {
            Some(mut command) => {
                let changed = command.execute(document);
                debug!(command = command.name(), changed, "redo");
                self.done.push(command);
                changed
            }
            None => false,
        }
    }
}

impl CommandExecutor for HistoryExecutor {
    fn run(&mut self, document: &mut Document, mut command: Box<dyn Command>) -> bool {
        let changed = command.execute(document);
        if changed {
            self.undone.clear();
            self.done.push(command);
        }
        changed
    }
}

/// Links an individual into a family as a child.
pub struct AddChildCommand {
    family: String,
    individual: String,
}

impl AddChildCommand {
    pub fn new(family: &str, individual: &str) -> Self {
        Self {
            family: clean_xref(family).to_string(),
            individual: clean_xref(individual).to_string(),
        }
    }
}

impl Command for AddChildCommand {
    fn name(&self) -> &str {
        "add child"
    }
    fn execute(&mut self, document: &mut Document) -> bool {
        document.add_child(&self.family, &self.individual)
    }
    fn undo(&mut self, document: &mut Document) -> bool {
        document.remove_child(&self.family, &self.individual)
    }
}

/// Links an individual into a family as husband or wife, by sex.
/// Undo restores whoever held the place before.
pub struct AddSpouseCommand {
    family: String,
    individual: String,
    previous: Option<String>,
}

impl AddSpouseCommand {
    pub fn new(family: &str, individual: &str) -> Self {
        Self {
            family: clean_xref(family).to_string(),
            individual: clean_xref(individual).to_string(),
            previous: None,
        }
    }
}

impl Command for AddSpouseCommand {
    fn name(&self) -> &str {
        "add spouse"
    }
    fn execute(&mut self, document: &mut Document) -> bool {
        let sex = document.find_by_xref(&self.individual).map(|r| r.sex());
        self.previous = match (document.find_by_xref(&self.family), sex) {
            (Some(family), Some(Sex::Male)) => family.husband(),
            (Some(family), Some(Sex::Female)) => family.wife(),
            _ => None,
        };
        document.add_spouse(&self.family, &self.individual)
    }
    fn undo(&mut self, document: &mut Document) -> bool {
        let removed = document.remove_spouse(&self.family, &self.individual);
        if let Some(previous) = self.previous.take().filter(|p| *p != self.individual) {
            document.add_spouse(&self.family, &previous);
        }
        removed
    }
}

// ------------- Culture -------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    #[default]
    Dmy,
    Mdy,
    Ymd,
}

/// How dates are shown to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Culture {
    pub date_order: DateOrder,
    pub separator: char,
}

impl Default for Culture {
    fn default() -> Self {
        Self { date_order: DateOrder::Dmy, separator: '.' }
    }
}

impl Culture {
    pub fn new(date_order: DateOrder, separator: char) -> Self {
        Self { date_order, separator }
    }
    /// Numeric form of one exact date; missing parts are left out.
    pub fn format_exact(&self, date: &DateExact) -> String {
        let (year, month, day, bc) = date.date_parts();
        let year = (year >= 0).then(|| format!("{:04}", year));
        let month = (month > 0).then(|| format!("{:02}", month));
        let day = (day > 0).then(|| format!("{:02}", day));
        let ordered = match self.date_order {
            DateOrder::Dmy => [day, month, year],
            DateOrder::Mdy => [month, day, year],
            DateOrder::Ymd => [year, month, day],
        };
        let mut result = ordered.into_iter().flatten().collect::<Vec<_>>().join(&self.separator.to_string());
        if bc {
            result.push_str(" BC");
        }
        result
    }
    pub fn format_display_date(&self, date: &DateValue) -> String {
        let exact = |d: &DateExact| self.format_exact(d);
        match date {
            DateValue::Empty => String::new(),
            DateValue::Exact(d) => exact(d),
            DateValue::Approximated { date, mode } => match mode {
                ApproxMode::Exact => exact(date),
                ApproxMode::About => format!("abt {}", exact(date)),
                ApproxMode::Calculated => format!("cal {}", exact(date)),
                ApproxMode::Estimated => format!("est {}", exact(date)),
            },
            DateValue::Range { after: Some(a), before: Some(b) } => format!("{} - {}", exact(a), exact(b)),
            DateValue::Range { after: Some(a), before: None } => format!("after {}", exact(a)),
            DateValue::Range { after: None, before: Some(b) } => format!("before {}", exact(b)),
            DateValue::Range { after: None, before: None } => String::new(),
            DateValue::Between { from, to } => format!("{} - {}", exact(from), exact(to)),
            DateValue::Period { from, to } => {
                let from = from.as_ref().map(exact);
                let to = to.as_ref().map(exact);
                match (from, to) {
                    (Some(f), Some(t)) => format!("from {} to {}", f, t),
                    (Some(f), None) => format!("from {}", f),
                    (None, Some(t)) => format!("to {}", t),
                    (None, None) => String::new(),
                }
            }
            DateValue::Interpreted { date, phrase } => {
                if phrase.is_empty() {
                    exact(date)
                } else {
                    format!("{} ({})", exact(date), phrase)
                }
            }
        }
    }
}
