//! Process I/O seam used by `print`, `input` and `flush`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

pub trait Console {
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Reads one line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// Console bound to the process standard streams.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        io::stdout().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(trim_line_ending(line)))
    }
}

/// In-memory console: collects output and replays scripted input lines.
///
/// Clones share one buffer, so a caller can keep a handle while the runtime
/// owns the console.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    state: Rc<RefCell<BufferState>>,
}

#[derive(Debug, Default)]
struct BufferState {
    output: String,
    input: VecDeque<String>,
    flushes: usize,
}

impl BufferConsole {
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let console = Self::default();
        console.state.borrow_mut().input = lines.into_iter().map(Into::into).collect();
        console
    }

    pub fn output(&self) -> String {
        self.state.borrow().output.clone()
    }

    pub fn flushes(&self) -> usize {
        self.state.borrow().flushes
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.state.borrow_mut().output.push_str(text);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.state.borrow_mut().input.pop_front())
    }
}

fn trim_line_ending(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}
