//! Everything the engine needs from the outside world.
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::diagnostics::StateDump;
use crate::ops::Word;
use crate::program::{FunctionId, Position};

/// Where the engine stopped in a stepping debug mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Breakpoint<'a> {
    /// About to enter function `id`, called from `position`.
    Call { file: &'a str, id: FunctionId, position: Position },
    /// About to execute `word`.
    Word { file: &'a str, word: &'a Word, position: Position },
}

/// Input, output and interaction for a running program.
///
/// [`IoHost`] covers real terminals and in-memory buffers alike; implement
/// this directly to intercept breakpoints or fatal errors differently.
pub trait Host {
    /// The next input character, [`None`] at the end of input.
    fn read_char(&mut self) -> io::Result<Option<char>>;
    /// The rest of the current input line without its line terminator.
    fn read_line(&mut self) -> io::Result<Option<String>>;
    fn write_str(&mut self, text: &str) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
    /// Blocks until the user lets execution continue.
    fn pause(&mut self, breakpoint: &Breakpoint) -> io::Result<()>;
    /// Called with the full state after a fatal error has been reported,
    /// right before the engine gives up.
    fn on_fatal(&mut self, _state: &StateDump) {}
}

/// A [`Host`] over any buffered reader and writer.
///
/// Characters are taken from the reader one line at a time, so `getchar`
/// and `in` can be mixed freely.
#[derive(Debug)]
pub struct IoHost<R: BufRead, W: Write> {
    input: R,
    output: W,
    pending: VecDeque<char>,
    input_done: bool,
}

/// A host on the process' standard input and output.
pub type StdHost = IoHost<io::StdinLock<'static>, io::Stdout>;

impl StdHost {
    pub fn stdio() -> Self {
        IoHost::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> IoHost<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, pending: VecDeque::new(), input_done: false }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Refills the pending characters, false once the input is exhausted.
    fn fill(&mut self) -> io::Result<bool> {
        if !self.pending.is_empty() {
            return Ok(true);
        }
        if self.input_done {
            return Ok(false);
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.input_done = true;
            return Ok(false);
        }
        self.pending.extend(line.chars());
        Ok(true)
    }
}

impl<R: BufRead, W: Write> Host for IoHost<R, W> {
    fn read_char(&mut self) -> io::Result<Option<char>> {
        self.output.flush()?;
        if !self.fill()? {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        if !self.fill()? {
            return Ok(None);
        }
        let mut line: String = self.pending.drain(..).collect();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }

    fn pause(&mut self, breakpoint: &Breakpoint) -> io::Result<()> {
        let prompt = match breakpoint {
            Breakpoint::Call { file, id, position } => format!("Function {id} was called from {file}:{position}"),
            Breakpoint::Word { file, word, position } => format!("Word `{word}` at {file}:{position}"),
        };
        writeln!(self.output, "{prompt}")?;
        // Any line, or the end of input, continues.
        self.read_line().map(|_| ())
    }
}
