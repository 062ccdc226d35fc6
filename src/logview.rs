//! On-screen console for the runtime shell, mirrored to the browser console.

use crate::dom;
use crate::error::UiError;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    Debug,
    Command,
}

impl LogLevel {
    /// Unknown names log as `Info`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "success" => LogLevel::Success,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "debug" => LogLevel::Debug,
            "command" => LogLevel::Command,
            _ => LogLevel::Info,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
            LogLevel::Command => "COMMAND",
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            LogLevel::Info => "log-info",
            LogLevel::Success => "log-success",
            LogLevel::Warning => "log-warning",
            LogLevel::Error => "log-error",
            LogLevel::Debug => "log-debug",
            LogLevel::Command => "log-command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    /// Line written to the browser console.
    pub fn mirror_text(&self) -> String {
        match self.level {
            LogLevel::Command => format!("[{}] $ {}", self.timestamp, self.message),
            _ => format!("[{}] {}", self.timestamp, self.message),
        }
    }
}

/// Append-only record of console entries. Only `clear` shrinks it.
#[derive(Debug, Default)]
pub struct LogBook {
    entries: Vec<LogEntry>,
}

impl LogBook {
    pub fn push(&mut self, entry: LogEntry) -> &LogEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }
}

pub struct LogView {
    doc: Document,
    output: Element,
    locale: String,
    auto_scroll: Cell<bool>,
    book: RefCell<LogBook>,
}

impl LogView {
    pub fn new(doc: Document, output: Element, locale: &str) -> Self {
        LogView {
            doc,
            output,
            locale: locale.to_string(),
            auto_scroll: Cell::new(true),
            book: RefCell::new(LogBook::default()),
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let timestamp = String::from(js_sys::Date::new_0().to_locale_time_string(&self.locale));
        let entry = LogEntry {
            level,
            timestamp,
            message: message.to_string(),
        };
        mirror(&entry);
        self.append_line(&entry);
        self.book.borrow_mut().push(entry);

        if self.auto_scroll.get() {
            dom::scroll_to_bottom(&self.output);
        }
    }

    fn append_line(&self, entry: &LogEntry) {
        let Ok(line) = dom::create(&self.doc, "div", "console-line") else {
            return;
        };
        let spans = [
            ("console-time".to_string(), entry.timestamp.as_str()),
            (
                format!("log-level {}", entry.level.class_name()),
                entry.level.label(),
            ),
            ("console-message".to_string(), entry.message.as_str()),
        ];
        for (class, text) in spans {
            if let Ok(span) = dom::create(&self.doc, "span", &class) {
                span.set_text_content(Some(text));
                let _ = line.append_child(&span);
            }
        }
        let _ = self.output.append_child(&line);
    }

    pub fn clear(&self) {
        self.output.set_inner_html("");
        self.book.borrow_mut().clear();
    }

    /// Returns the new setting.
    pub fn toggle_auto_scroll(&self) -> bool {
        let next = !self.auto_scroll.get();
        self.auto_scroll.set(next);
        next
    }

    /// Entries logged since the last clear, oldest first.
    pub fn entries_json(&self) -> Result<String, UiError> {
        Ok(serde_json::to_string(self.book.borrow().entries())?)
    }
}

fn mirror(entry: &LogEntry) {
    let text = JsValue::from_str(&entry.mirror_text());
    match entry.level {
        LogLevel::Error => web_sys::console::error_1(&text),
        LogLevel::Warning => web_sys::console::warn_1(&text),
        LogLevel::Debug => web_sys::console::debug_1(&text),
        _ => web_sys::console::log_1(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            level,
            timestamp: "10:00:00 AM".into(),
            message: message.into(),
        }
    }

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::from_name("warn"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("warning"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("command"), LogLevel::Command);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::Warning.label(), "WARN");
        assert_eq!(LogLevel::Success.class_name(), "log-success");
    }

    #[test]
    fn test_mirror_text() {
        assert_eq!(
            entry(LogLevel::Info, "ready").mirror_text(),
            "[10:00:00 AM] ready"
        );
        assert_eq!(
            entry(LogLevel::Command, "make build").mirror_text(),
            "[10:00:00 AM] $ make build"
        );
    }

    #[test]
    fn test_log_book_keeps_order() {
        let mut book = LogBook::default();
        book.push(entry(LogLevel::Info, "first"));
        let last = book.push(entry(LogLevel::Error, "second"));
        assert_eq!(last.message, "second");
        let messages: Vec<_> = book.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        book.clear();
        assert!(book.entries().is_empty());
    }

    #[test]
    fn test_entries_serialize_with_level_names() {
        let mut book = LogBook::default();
        book.push(entry(LogLevel::Command, "make build"));
        book.push(entry(LogLevel::Warning, "slow"));
        let json = serde_json::to_value(book.entries()).unwrap();
        assert_eq!(json[0]["level"], "command");
        assert_eq!(json[0]["message"], "make build");
        assert_eq!(json[1]["level"], "warning");
        assert_eq!(json[1]["timestamp"], "10:00:00 AM");
    }
}
