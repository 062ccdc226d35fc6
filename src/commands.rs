//! Command list grouping and run-output formatting for the command panel.

use crate::error::UiError;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub const OTHER_GROUP: &str = "other";

#[derive(Debug, Deserialize)]
pub struct CommandList {
    pub commands: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RunRequest<'a> {
    pub command: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunResponse {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

pub fn group_key(command: &str) -> &str {
    match command.split_once('-') {
        Some((prefix, _)) => prefix,
        None => OTHER_GROUP,
    }
}

pub fn group_title(group: &str) -> String {
    if group == OTHER_GROUP {
        "Other Commands".to_string()
    } else {
        format!("{}-*", group)
    }
}

/// Groups by prefix. Group names and the commands inside each group come back
/// sorted; `other` sorts like any other name.
pub fn group_commands(commands: &[String]) -> Vec<(String, Vec<String>)> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for cmd in commands {
        groups
            .entry(group_key(cmd).to_string())
            .or_default()
            .push(cmd.clone());
    }
    groups
        .into_iter()
        .map(|(name, mut cmds)| {
            cmds.sort();
            (name, cmds)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Success,
    Error,
}

impl OutputStyle {
    pub fn class_name(self) -> &'static str {
        match self {
            OutputStyle::Success => "success",
            OutputStyle::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub text: String,
    pub style: OutputStyle,
}

pub fn command_line(prefix: &str, command: &str) -> String {
    format!("$ {} {}", prefix, command)
}

pub fn running_text(prefix: &str, command: &str) -> String {
    format!("{}\n\nRunning...", command_line(prefix, command))
}

impl RunOutcome {
    pub fn from_response(prefix: &str, command: &str, resp: &RunResponse) -> Self {
        let mut text = format!("{}\n\n", command_line(prefix, command));
        if let Some(output) = resp.output.as_deref() {
            text.push_str(output);
        }
        let style = match resp.error.as_deref() {
            Some(err) if !err.is_empty() => {
                text.push_str("\n\nError:\n");
                text.push_str(err);
                OutputStyle::Error
            }
            _ => OutputStyle::Success,
        };
        RunOutcome { text, style }
    }

    pub fn from_error(prefix: &str, command: &str, err: &UiError) -> Self {
        RunOutcome {
            text: format!("{}\n\nError: {}", command_line(prefix, command), err),
            style: OutputStyle::Error,
        }
    }
}

/// Advisory single-flight flag. A second `try_acquire` while a ticket is
/// alive returns `None`; nothing is queued.
#[derive(Clone, Default)]
pub struct RunLock {
    busy: Rc<Cell<bool>>,
}

impl RunLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn try_acquire(&self) -> Option<RunTicket> {
        if self.busy.replace(true) {
            return None;
        }
        Some(RunTicket {
            busy: self.busy.clone(),
        })
    }
}

/// Releases the lock when dropped, on every exit path including unwinding.
pub struct RunTicket {
    busy: Rc<Cell<bool>>,
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

/// The control that triggers a run and shows whether one is in flight.
pub trait RunControl {
    fn show_busy(&self);
    fn show_idle(&self);
}

/// Holds the lock and keeps the control busy. Dropping it restores the
/// control before the lock is released.
pub struct RunGuard<'a, C: RunControl + ?Sized> {
    control: &'a C,
    _ticket: RunTicket,
}

impl<'a, C: RunControl + ?Sized> RunGuard<'a, C> {
    /// `None` while another run holds the lock; the control is left alone.
    pub fn engage(lock: &RunLock, control: &'a C) -> Option<Self> {
        let ticket = lock.try_acquire()?;
        control.show_busy();
        Some(RunGuard {
            control,
            _ticket: ticket,
        })
    }
}

impl<C: RunControl + ?Sized> Drop for RunGuard<'_, C> {
    fn drop(&mut self) {
        self.control.show_idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_group_by_prefix() {
        let groups = group_commands(&list(&["build-y", "test-a", "build-x"]));
        assert_eq!(
            groups,
            vec![
                ("build".to_string(), list(&["build-x", "build-y"])),
                ("test".to_string(), list(&["test-a"])),
            ]
        );
    }

    #[test]
    fn test_other_sorts_among_literal_names() {
        let groups = group_commands(&list(&["zeta-1", "clean", "alpha-1", "install"]));
        let names: Vec<_> = groups.iter().map(|(g, _)| g.as_str()).collect();
        assert_eq!(names, vec!["alpha", "other", "zeta"]);
        assert_eq!(groups[1].1, list(&["clean", "install"]));
    }

    #[test]
    fn test_every_command_in_exactly_one_group() {
        let input = list(&["a-b-c", "a", "-lead", "b-", "a-x", "b-"]);
        let groups = group_commands(&input);
        let total: usize = groups.iter().map(|(_, c)| c.len()).sum();
        assert_eq!(total, input.len());
        for cmd in &input {
            let hits = groups.iter().filter(|(_, c)| c.contains(cmd)).count();
            assert_eq!(hits, 1, "{} landed in {} groups", cmd, hits);
        }
        assert_eq!(group_key("a-b-c"), "a");
        assert_eq!(group_key("-lead"), "");
        assert_eq!(group_key("a"), OTHER_GROUP);
    }

    #[test]
    fn test_group_titles() {
        assert_eq!(group_title("other"), "Other Commands");
        assert_eq!(group_title("build"), "build-*");
    }

    #[test]
    fn test_success_output() {
        let resp = RunResponse {
            output: Some("OK".into()),
            error: None,
        };
        let outcome = RunOutcome::from_response("make", "build-x", &resp);
        assert_eq!(outcome.text, "$ make build-x\n\nOK");
        assert_eq!(outcome.style, OutputStyle::Success);
    }

    #[test]
    fn test_error_field_marks_region_error() {
        let resp = RunResponse {
            output: None,
            error: Some("boom".into()),
        };
        let outcome = RunOutcome::from_response("make", "build-x", &resp);
        assert_eq!(outcome.text, "$ make build-x\n\n\n\nError:\nboom");
        assert_eq!(outcome.style, OutputStyle::Error);
    }

    #[test]
    fn test_empty_error_field_is_success() {
        let resp = RunResponse {
            output: Some("done".into()),
            error: Some(String::new()),
        };
        let outcome = RunOutcome::from_response("make", "lint", &resp);
        assert_eq!(outcome.style, OutputStyle::Success);
        assert_eq!(outcome.text, "$ make lint\n\ndone");
    }

    #[test]
    fn test_transport_failure_output() {
        let outcome = RunOutcome::from_error("make", "deploy", &UiError::HttpStatus(500));
        assert_eq!(outcome.text, "$ make deploy\n\nError: HTTP error! status: 500");
        assert_eq!(outcome.style.class_name(), "error");
        assert_eq!(running_text("make", "deploy"), "$ make deploy\n\nRunning...");
    }

    #[test]
    fn test_run_lock_is_single_flight() {
        let lock = RunLock::new();
        let ticket = lock.try_acquire().expect("first acquire");
        assert!(lock.is_busy());
        assert!(lock.try_acquire().is_none());
        drop(ticket);
        assert!(!lock.is_busy());
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_run_lock_released_on_panic() {
        let lock = RunLock::new();
        let inner = lock.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _ticket = inner.try_acquire().unwrap();
            panic!("request blew up");
        }));
        assert!(result.is_err());
        assert!(!lock.is_busy());
    }

    #[derive(Default)]
    struct Button {
        disabled: Cell<bool>,
        label: RefCell<String>,
        changes: Cell<u32>,
    }

    impl Button {
        fn idle() -> Self {
            let button = Button::default();
            button.label.replace("Run".into());
            button
        }
    }

    impl RunControl for Button {
        fn show_busy(&self) {
            self.disabled.set(true);
            self.label.replace("Running...".into());
            self.changes.set(self.changes.get() + 1);
        }

        fn show_idle(&self) {
            self.disabled.set(false);
            self.label.replace("Run".into());
            self.changes.set(self.changes.get() + 1);
        }
    }

    fn guarded_run(
        lock: &RunLock,
        button: &Button,
        reply: Result<RunResponse, UiError>,
    ) -> Option<Result<RunOutcome, UiError>> {
        let _guard = RunGuard::engage(lock, button)?;
        assert!(button.disabled.get());
        assert_eq!(*button.label.borrow(), "Running...");
        let run = || -> Result<RunOutcome, UiError> {
            let resp = reply?;
            Ok(RunOutcome::from_response("make", "build-x", &resp))
        };
        Some(run())
    }

    fn assert_restored(lock: &RunLock, button: &Button) {
        assert!(!lock.is_busy());
        assert!(!button.disabled.get());
        assert_eq!(*button.label.borrow(), "Run");
    }

    #[test]
    fn test_guard_restores_control_after_success() {
        let (lock, button) = (RunLock::new(), Button::idle());
        let reply = Ok(RunResponse {
            output: Some("OK".into()),
            error: None,
        });
        let outcome = guarded_run(&lock, &button, reply).unwrap().unwrap();
        assert_eq!(outcome.style, OutputStyle::Success);
        assert_restored(&lock, &button);
    }

    #[test]
    fn test_guard_restores_control_after_error() {
        let (lock, button) = (RunLock::new(), Button::idle());
        let result = guarded_run(&lock, &button, Err(UiError::HttpStatus(502)));
        assert!(matches!(result, Some(Err(UiError::HttpStatus(502)))));
        assert_restored(&lock, &button);
    }

    #[test]
    fn test_guard_restores_control_after_panic() {
        let (lock, button) = (RunLock::new(), Button::idle());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = RunGuard::engage(&lock, &button).unwrap();
            panic!("response handler blew up");
        }));
        assert!(result.is_err());
        assert_restored(&lock, &button);
    }

    #[test]
    fn test_second_trigger_while_busy_changes_nothing() {
        let (lock, button) = (RunLock::new(), Button::idle());
        let first = RunGuard::engage(&lock, &button).unwrap();
        assert_eq!(button.changes.get(), 1);

        let reply = Ok(RunResponse::default());
        assert!(guarded_run(&lock, &button, reply).is_none());
        assert_eq!(button.changes.get(), 1);
        assert!(button.disabled.get());
        assert_eq!(*button.label.borrow(), "Running...");

        drop(first);
        assert_restored(&lock, &button);
    }
}
