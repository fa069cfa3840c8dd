//! Console output channel
//!
//! All user-facing text flows through here. While the console is attached
//! to a session, each message re-prints the pass-through prompt marker so
//! the operator sees a consistent prompt; in command mode messages are
//! written directly.

use std::io::Write;

use colored::Colorize;

pub struct ConsoleIo {
    out: Box<dyn Write>,
    attach_marker: String,
}

impl ConsoleIo {
    pub fn stdout(attach_marker: impl Into<String>) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), attach_marker)
    }

    pub fn with_writer(out: Box<dyn Write>, attach_marker: impl Into<String>) -> Self {
        Self {
            out,
            attach_marker: attach_marker.into(),
        }
    }

    /// Info-level message, one line (or short block)
    pub fn output(&mut self, attached: bool, message: &str) {
        let _ = writeln!(self.out, "{message}");
        self.reframe(attached);
    }

    /// Error-framed message
    pub fn error(&mut self, attached: bool, message: &str) {
        let _ = writeln!(self.out, "{} {message}", "ERROR:".red().bold());
        self.reframe(attached);
    }

    /// Write a prompt without a trailing newline
    pub fn prompt(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn reframe(&mut self, attached: bool) {
        if attached {
            let _ = write!(self.out, "{}", self.attach_marker);
        }
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

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
    }

    #[test]
    fn test_detached_output_written_directly() {
        colored::control::set_override(false);
        let capture = Capture::default();
        let mut io = ConsoleIo::with_writer(Box::new(capture.clone()), ">> ");

        io.output(false, "hello");
        assert_eq!(capture.text(), "hello\n");
    }

    #[test]
    fn test_attached_output_reprints_marker() {
        colored::control::set_override(false);
        let capture = Capture::default();
        let mut io = ConsoleIo::with_writer(Box::new(capture.clone()), ">> ");

        io.output(true, "hello");
        assert_eq!(capture.text(), "hello\n>> ");
    }

    #[test]
    fn test_error_prefix() {
        colored::control::set_override(false);
        let capture = Capture::default();
        let mut io = ConsoleIo::with_writer(Box::new(capture.clone()), ">> ");

        io.error(false, "it broke");
        assert_eq!(capture.text(), "ERROR: it broke\n");

        io.error(true, "still broken");
        assert!(capture.text().ends_with("ERROR: still broken\n>> "));
    }
}
