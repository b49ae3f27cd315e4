// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::cell::RefCell;
use std::fmt::{self, Debug, Display, Formatter};

use tracing::{Level, event};

use crate::model::ElementRef;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The declaration is invalid and is excluded from generation.
    Error,
    /// Suspicious but accepted.
    Warning,
    /// Informational.
    Note,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
        })
    }
}

/// A single message attached to a location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    severity: Severity,
    message: String,
    location: ElementRef,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, location: ElementRef) -> Self {
        Self {
            severity,
            message: message.into(),
            location,
        }
    }

    /// The severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the problem is.
    #[must_use]
    pub fn location(&self) -> &ElementRef {
        &self.location
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location, self.message)
    }
}

/// The sink diagnostics are delivered to.
pub trait Messager: Debug {
    /// Delivers one diagnostic.
    fn print_message(&self, severity: Severity, message: &str, location: &ElementRef);
}

/// Logs a diagnostic and forwards it to the messager.
pub(crate) fn emit(messager: &dyn Messager, diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Error => event!(
            Level::DEBUG,
            location = %diagnostic.location,
            message = diagnostic.message.as_str(),
            "declaration rejected"
        ),
        Severity::Warning | Severity::Note => event!(
            Level::TRACE,
            severity = %diagnostic.severity,
            location = %diagnostic.location,
            message = diagnostic.message.as_str(),
            "diagnostic reported"
        ),
    }
    messager.print_message(diagnostic.severity, &diagnostic.message, &diagnostic.location);
}

/// A [`Messager`] that keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingMessager {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingMessager {
    /// Creates an empty messager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every diagnostic received so far, in delivery order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// The messages of every error received so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.message.clone())
            .collect()
    }

    /// Returns `true` if any error was received.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.severity == Severity::Error)
    }
}

impl Messager for CollectingMessager {
    fn print_message(&self, severity: Severity, message: &str, location: &ElementRef) {
        self.diagnostics
            .borrow_mut()
            .push(Diagnostic::new(severity, message, location.clone()));
    }
}

/// The outcome of validating one declaration.
#[derive(Clone, Debug)]
pub struct ValidationReport {
    subject: ElementRef,
    items: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Creates an empty report about `subject`.
    #[must_use]
    pub fn new(subject: ElementRef) -> Self {
        Self { subject, items: Vec::new() }
    }

    /// The validated declaration.
    #[must_use]
    pub fn subject(&self) -> &ElementRef {
        &self.subject
    }

    /// Adds an error located at the subject.
    pub fn add_error(&mut self, message: impl Into<String>) {
        let location = self.subject.clone();
        self.add_error_at(message, location);
    }

    /// Adds an error at a specific location.
    pub fn add_error_at(&mut self, message: impl Into<String>, location: ElementRef) {
        self.items.push(Diagnostic::new(Severity::Error, message, location));
    }

    /// Adds a warning located at the subject.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.items.push(Diagnostic::new(Severity::Warning, message, self.subject.clone()));
    }

    /// Appends all items of another report.
    pub fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    /// All items in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// The error messages.
    #[must_use]
    pub fn errors(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.severity == Severity::Error)
            .map(Diagnostic::message)
            .collect()
    }

    /// Returns `true` if the report holds no errors.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.items.iter().all(|item| item.severity != Severity::Error)
    }

    /// Delivers every item to the messager.
    pub fn print_messages_to(&self, messager: &dyn Messager) {
        for item in &self.items {
            emit(messager, item);
        }
    }
}
