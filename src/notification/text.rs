use super::{Failure, RunListener, RunResult};
use crate::{description::Description, errors::Error};
use colored::*;
use std::{
    collections::HashSet,
    io::{self, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

struct State {
    out: Box<dyn Write + Send>,
    /// Tests that failed or were ignored after starting.
    marked: HashSet<String>,
    passing: usize,
}

/// Prints a colored line per test and a summary once the run finishes.
///
/// ```text
/// ✓ adds(Calculator)
/// ✗ divides(Calculator)
///   attempt to divide by zero
/// ? overflows(Calculator) (ignored)
///   1 passing / 1 failing / 1 ignored (0.002s)
/// ```
pub struct TextListener {
    state: Mutex<State>,
}

impl TextListener {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        TextListener {
            state: Mutex::new(State {
                out: Box::new(out),
                marked: HashSet::new(),
                passing: 0,
            }),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::BufWriter::new(io::stdout()))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, line: String) -> Result<(), Error> {
        let mut state = self.state();
        writeln!(state.out, "{}", line)
            .and_then(|_| state.out.flush())
            .map_err(|err| Error::Listener(err.to_string()))
    }
}

/// Report string for a single failure.
fn report_str(failure: &Failure) -> String {
    let mut buf = String::new();
    buf.push_str(&"✗ ".red().to_string());
    buf.push_str(&failure.test_header().red().to_string());
    for line in failure.message().lines() {
        buf.push_str("\n  ");
        buf.push_str(&line.dimmed().to_string());
    }
    buf
}

impl RunListener for TextListener {
    fn test_finished(&self, description: &Description) -> Result<(), Error> {
        {
            let mut state = self.state();
            if state.marked.contains(description.display_name()) {
                return Ok(());
            }
            state.passing += 1;
        }
        self.emit(format!(
            "{}{}",
            "✓ ".green(),
            description.display_name().green()
        ))
    }

    fn test_failure(&self, failure: &Failure) -> Result<(), Error> {
        self.state()
            .marked
            .insert(failure.test_header().to_string());
        self.emit(report_str(failure))
    }

    fn test_ignored(&self, description: &Description) -> Result<(), Error> {
        self.state()
            .marked
            .insert(description.display_name().to_string());
        self.emit(format!(
            "{}{}{}",
            "? ".yellow(),
            description.display_name().yellow(),
            " (ignored)".dimmed()
        ))
    }

    fn test_run_finished(&self, result: &RunResult) -> Result<(), Error> {
        let failures = result.failures();
        let passing = std::mem::take(&mut self.state().passing);
        let mut buf = format!(
            "  {} / {} / {} {}",
            format!("{} passing", passing).green().bold(),
            format!("{} failing", failures.len()).red().bold(),
            format!("{} ignored", result.ignore_count()).yellow().bold(),
            format!("({:.3}s)", result.run_time().as_secs_f64()).dimmed(),
        );
        if !failures.is_empty() {
            buf.push_str(&format!("\n\n{}", "Failures:".red()));
            for (i, failure) in failures.iter().enumerate() {
                buf.push_str(&format!("\n  {}. {}", i + 1, failure));
            }
        }
        self.state().marked.clear();
        self.emit(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RunNotifier;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn prints_marks_and_summary() {
        let buffer = Buffer::default();
        let result = RunResult::new();
        let notifier = RunNotifier::new();
        notifier.add_listener(result.listener());
        notifier.add_listener(Arc::new(TextListener::new(buffer.clone())));

        let test = |name: &str| {
            Description::create_test("Calc", name, Vec::<String>::new())
        };
        let (ok, bad, skip) = (test("adds"), test("divides"), test("skips"));
        let assumed = test("assumes");

        notifier.fire_test_run_started(&Description::EMPTY);
        notifier.fire_test_started(&ok).unwrap();
        notifier.fire_test_finished(&ok);
        notifier.fire_test_started(&bad).unwrap();
        notifier.fire_test_failure(Failure::new(
            bad.clone(),
            Error::Failure("divide by zero".into()),
        ));
        notifier.fire_test_finished(&bad);
        notifier.fire_test_ignored(&skip);
        notifier.fire_test_started(&assumed).unwrap();
        notifier.fire_test_ignored(&assumed);
        notifier.fire_test_finished(&assumed);
        notifier.fire_test_run_finished(&result);

        let out = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("adds(Calc)"), "{}", out);
        assert!(out.contains("divide by zero"), "{}", out);
        assert!(out.contains("skips(Calc)"), "{}", out);
        assert!(out.contains("1 passing"), "{}", out);
        assert!(out.contains("1 failing"), "{}", out);
        assert!(out.contains("2 ignored"), "{}", out);
        assert!(out.contains("1. divides(Calc): divide by zero"), "{}", out);
        // a failed test gets no success mark
        assert_eq!(out.matches("divides(Calc)").count(), 2, "{}", out);
        // nor does a test ignored after it started
        assert_eq!(out.matches("assumes(Calc)").count(), 1, "{}", out);
    }
}
