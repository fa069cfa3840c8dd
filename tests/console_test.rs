//! Integration tests for the console dispatch loop and attachment protocol

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use conmux::config::Config;
use conmux::console::{AttachmentState, Console, ConsoleIo, DispatchOutcome};
use conmux::session::SessionManager;

#[derive(Clone, Default)]
struct Capture(Rc<RefCell<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Console wired to a capture buffer, with one registered session per name
fn console_with(sessions: &[&str]) -> (Console, Capture) {
    colored::control::set_override(false);

    let config = Config::default();
    let mut manager = SessionManager::new();
    for name in sessions {
        manager.register_session(*name);
    }

    let capture = Capture::default();
    let io = ConsoleIo::with_writer(Box::new(capture.clone()), config.attach_marker.clone());
    (Console::with_io(&config, manager, io), capture)
}

#[test]
fn test_unknown_command_is_reported_and_nonfatal() {
    let (mut console, capture) = console_with(&[]);

    let outcome = console.dispatch("bogus with args");
    assert_eq!(outcome, DispatchOutcome::Continue);
    assert_eq!(capture.text(), "Unknown command: bogus\n");
    assert_eq!(*console.attachment(), AttachmentState::Detached);
}

#[test]
fn test_empty_line_is_a_noop() {
    let (mut console, capture) = console_with(&[]);

    assert_eq!(console.dispatch(""), DispatchOutcome::Continue);
    assert_eq!(console.dispatch("   "), DispatchOutcome::Continue);
    assert_eq!(capture.text(), "");
    assert_eq!(*console.attachment(), AttachmentState::Detached);
}

#[test]
fn test_quit_aliases_invoke_the_same_handler() {
    for spelling in ["quit", "q", "exit"] {
        let (mut console, capture) = console_with(&[]);
        assert_eq!(console.dispatch(spelling), DispatchOutcome::Quit);
        assert_eq!(capture.text(), "");
    }
}

#[test]
fn test_help_lists_sorted_command_names() {
    let (mut console, capture) = console_with(&[]);

    console.dispatch("help");

    let text = capture.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        ["clear", "help", "kill", "quit", "session", "sessions", "set", "show"]
    );
}

#[test]
fn test_clear_emits_blank_block() {
    let (mut console, capture) = console_with(&[]);
    console.dispatch("clear");
    assert_eq!(capture.text(), "\n".repeat(1000));
}

#[test]
fn test_sessions_lists_all_sessions() {
    let (mut console, capture) = console_with(&["alpha", "beta"]);

    console.dispatch("sessions");

    let text = capture.text();
    assert!(text.starts_with("Sessions:\n"));
    assert!(text.contains("session 0 :: alpha"));
    assert!(text.contains("session 1 :: beta"));
}

#[test]
fn test_session_without_args_lists_sessions() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("session");
    assert!(capture.text().starts_with("Known sessions:\n"));
    assert!(capture.text().contains("session 0 :: alpha"));

    capture.clear();
    console.dispatch("session -l");
    assert!(capture.text().starts_with("Known sessions:\n"));

    assert_eq!(*console.attachment(), AttachmentState::Detached);
}

#[test]
fn test_session_attach_unknown_id_stays_detached() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("session -i 9");

    let text = capture.text();
    let error_at = text.find("Session 9 not found!").expect("error message");
    let listing_at = text.find("session 0 :: alpha").expect("session listing");
    assert!(error_at < listing_at, "listing follows the error");
    assert_eq!(*console.attachment(), AttachmentState::Detached);
}

#[test]
fn test_session_attach_known_id() {
    let (mut console, capture) = console_with(&["alpha", "beta"]);

    console.dispatch("session -i 1");

    assert_eq!(*console.attachment(), AttachmentState::Attached(1));
    assert_eq!(console.manager().attached_session(), Some(1));
    // Attaching produces no console output of its own
    assert_eq!(capture.text(), "");
}

#[test]
fn test_session_rejects_non_integer_id() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("session -i abc");

    assert!(capture.text().contains("ERROR:"));
    assert!(capture.text().contains("integer"));
    assert_eq!(*console.attachment(), AttachmentState::Detached);
}

#[test]
fn test_session_help_renders_usage_not_error() {
    let (mut console, capture) = console_with(&[]);

    console.dispatch("session --help");

    let text = capture.text();
    assert!(text.contains("Interact with a particular session"));
    assert!(text.contains("-i <integer>"));
    assert!(!text.contains("ERROR:"));
}

#[test]
fn test_set_forwards_name_value_pair() {
    let (mut console, _capture) = console_with(&[]);

    console.dispatch("set foo=bar");
    assert_eq!(console.manager().option("foo"), Some("bar"));
}

#[test]
fn test_set_joins_tokens_and_splits_once() {
    let (mut console, _capture) = console_with(&[]);

    console.dispatch("set greeting=hello there=world");
    assert_eq!(console.manager().option("greeting"), Some("hello there=world"));
}

#[test]
fn test_set_without_equals_prints_usage_and_sets_nothing() {
    let (mut console, capture) = console_with(&[]);

    console.dispatch("set foo");
    assert!(capture.text().contains("Usage: set <name>=<value>"));
    assert_eq!(console.manager().option("foo"), None);
}

#[test]
fn test_set_without_args_prints_usage_and_options() {
    let (mut console, capture) = console_with(&[]);
    console.manager_mut().set_option("color", "red");

    console.dispatch("set");
    let text = capture.text();
    assert!(text.contains("Usage: set <name>=<value>"));
    assert!(text.contains("color => red"));
}

#[test]
fn test_show_options_enumerates_store() {
    let (mut console, capture) = console_with(&[]);
    console.manager_mut().set_option("verbose", "true");
    console.manager_mut().set_option("color", "red");

    console.dispatch("show options");

    let text = capture.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, ["color => red", "verbose => true"]);
}

#[test]
fn test_show_rejects_other_targets_and_arity() {
    for line in ["show", "show sessions", "show options extra"] {
        let (mut console, capture) = console_with(&[]);
        console.dispatch(line);
        assert_eq!(capture.text(), "Usage: show options\n", "input: {line}");
    }
}

#[test]
fn test_kill_session() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("kill 0");
    assert!(capture.text().contains("Session killed"));
    assert_eq!(console.manager().session_count(), 0);

    capture.clear();
    console.dispatch("kill 0");
    assert!(capture.text().contains("Couldn't kill session!"));
}

#[test]
fn test_kill_wrong_arity_makes_no_manager_call() {
    let (mut console, capture) = console_with(&["alpha", "beta"]);

    console.dispatch("kill 5 6");
    assert!(capture.text().contains("Usage: kill <session_id>"));
    assert_eq!(console.manager().session_count(), 2);
}

#[test]
fn test_kill_non_numeric_id_is_rejected() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("kill abc");
    assert!(capture.text().contains("Invalid session id: abc"));
    assert_eq!(console.manager().session_count(), 1);
}

#[test]
fn test_killing_attached_session_falls_back_to_detached() {
    let (mut console, capture) = console_with(&["alpha"]);

    console.dispatch("session -i 0");
    assert_eq!(*console.attachment(), AttachmentState::Attached(0));

    capture.clear();
    console.dispatch("kill 0");

    assert_eq!(*console.attachment(), AttachmentState::Detached);
    assert!(capture.text().contains("Session 0 no longer exists!"));
}

#[test]
fn test_attached_output_reprints_prompt_marker() {
    let (mut console, capture) = console_with(&["alpha"]);
    console.dispatch("session -i 0");

    console.output("remote says hi");
    assert_eq!(capture.text(), "remote says hi\n>> ");

    console.detach();
    capture.clear();
    console.output("back in command mode");
    assert_eq!(capture.text(), "back in command mode\n");
}

#[tokio::test]
async fn test_run_terminates_on_quit() {
    let (mut console, capture) = console_with(&["alpha"]);

    let input = tokio::io::BufReader::new(&b"sessions\nquit\nsessions\n"[..]);
    console.run(input).await.unwrap();

    let text = capture.text();
    assert!(text.contains("Sessions:"));
    // Only the first `sessions` ran; the line after quit was never read
    assert_eq!(text.matches("session 0 :: alpha").count(), 1);
    assert_eq!(console.stats().lines_read, 2);
}

#[tokio::test]
async fn test_run_terminates_cleanly_on_eof() {
    let (mut console, capture) = console_with(&[]);

    let input = tokio::io::BufReader::new(&b"help\n"[..]);
    console.run(input).await.unwrap();

    assert!(capture.text().contains("clear"));
    assert!(capture.text().ends_with("\n"));
}

#[tokio::test]
async fn test_run_treats_read_errors_as_eof() {
    let (mut console, _capture) = console_with(&[]);

    let reader = tokio_test::io::Builder::new()
        .read(b"help\n")
        .read_error(std::io::Error::other("connection reset"))
        .build();
    console.run(tokio::io::BufReader::new(reader)).await.unwrap();

    assert_eq!(console.stats().lines_read, 1);
}

#[tokio::test]
async fn test_run_forwards_input_while_attached() {
    let (mut console, capture) = console_with(&["alpha"]);

    let input = tokio::io::BufReader::new(&b"session -i 0\nuname -a\n"[..]);
    console.run(input).await.unwrap();

    assert_eq!(*console.attachment(), AttachmentState::Attached(0));
    assert_eq!(
        console.manager().get_by_local_id(0).unwrap().pending_input(),
        ["uname -a".to_string()]
    );
    // The forwarded line was never dispatched as a command
    assert!(!capture.text().contains("Unknown command"));
}
