//! Functions for executing programs.
use std::io;
use std::sync::Arc;

use num_traits::{Signed, ToPrimitive, Zero};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::get_config;
use crate::diagnostics::{report_fatal, StateDump};
use crate::host::{Breakpoint, Host};
use crate::ops::Word;
use crate::parser::parse_program;
use crate::program::{Command, CommandKind, Function, FunctionId, Position, Program};
use crate::stacks::StackRegistry;
use crate::value::{floor_div, floor_mod, from_char, from_i64, parse_value, render, to_char, to_exact_i64, to_truncated_i64, Value};


/// The function `run` starts with.
pub const ENTRY_POINT: FunctionId = 0;

/// Interactive stepping, set by the `debug` word.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebugMode {
    #[default]
    Off = 0,
    /// Pause before every function call.
    StepCalls = 1,
    /// Pause before every call and every word, dumping the state each time.
    StepWords = 2,
}

impl DebugMode {
    pub fn from_level(level: i64) -> Option<DebugMode> {
        match level {
            0 => Some(DebugMode::Off),
            1 => Some(DebugMode::StepCalls),
            2 => Some(DebugMode::StepWords),
            _ => None,
        }
    }
}

/// An error that can occur during the execution of a word.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Removing from an empty stack")]
    PopFailed,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Unknown Word: `{name}`")]
    UnknownWord { name: String },
    #[error("No Function {id} exists")]
    UnknownFunction { id: Value },
    #[error("Expected an integer, got {value}")]
    NotAnInteger { value: Value },
    #[error("Return depth must be at least 1, got {depth}")]
    InvalidReturnDepth { depth: Value },
    #[error("Invalid debug mode: {value}")]
    InvalidDebugMode { value: Value },
    #[error("Not a valid character code: {value}")]
    InvalidCharCode { value: Value },
    #[error("Invalid number: `{text}`")]
    InvalidLiteral { text: String },
    #[error("Reading past the end of input")]
    EndOfInput,
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for OperationError {
    fn from(err: io::Error) -> Self {
        OperationError::Io(err.to_string())
    }
}

/// A fatal error while running a program, at the word or call that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{position}: {error}")]
pub struct RunError {
    pub position: Position,
    pub error: OperationError,
}

impl RunError {
    pub fn new(position: Position, error: OperationError) -> Self {
        Self { position, error }
    }
}

/// How control leaves a command, a function body or a call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Unwind this many calls; always at least 1.
    Return(u64),
    /// Start the current function body over.
    Restart,
    Exit,
    /// Run the function with this id, from `call`.
    Call(FunctionId),
}

/// How a program finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Function 0 returned, normally or through `nret`.
    Completed,
    /// The `exit` word was executed.
    Exited,
}

/// Options for the engine.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// The debug mode at startup; programs change it with `debug`.
    pub debug_mode: DebugMode,
    /// Width of one column in state dumps.
    pub dump_cell_width: usize,
}

impl EngineOptions {
    pub fn new(debug_mode: DebugMode, dump_cell_width: usize) -> Self {
        Self { debug_mode, dump_cell_width }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { debug_mode: DebugMode::Off, dump_cell_width: get_config().dump_cell_width }
    }
}

/// The successful result of running a program.
#[derive(Debug)]
pub struct RunResult<H: Host> {
    pub termination: Termination,
    /// All stacks as they were left.
    pub stacks: StackRegistry,
    pub host: H,
}

/// Executes a parsed program.
///
/// Each engine owns all of its state, so independent programs only need
/// independent engines. Calls recurse on the native stack; a program that
/// nests calls deeply enough will overflow it.
pub struct Engine<H: Host> {
    file: String,
    program: Arc<Program>,
    stacks: StackRegistry,
    call_stack: Vec<FunctionId>,
    debug_mode: DebugMode,
    dump_cell_width: usize,
    host: H,
}

impl<H: Host> Engine<H> {
    /// `file` is only used in diagnostics.
    pub fn new(file: impl Into<String>, program: Program, options: EngineOptions, host: H) -> Self {
        Self {
            file: file.into(),
            program: Arc::new(program),
            stacks: StackRegistry::new(),
            call_stack: Vec::new(),
            debug_mode: options.debug_mode,
            dump_cell_width: options.dump_cell_width,
            host,
        }
    }

    pub fn stacks(&self) -> &StackRegistry {
        &self.stacks
    }

    /// Function ids of the calls in progress, outermost first.
    pub fn call_stack(&self) -> &[FunctionId] {
        &self.call_stack
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn dump(&self) -> StateDump<'_> {
        StateDump::new(&self.call_stack, &self.stacks, self.dump_cell_width)
    }

    pub fn into_result(self, termination: Termination) -> RunResult<H> {
        RunResult { termination, stacks: self.stacks, host: self.host }
    }

    /// Runs function 0.
    ///
    /// A fatal error is reported to the host (message and full state) before
    /// it is returned, and the call stack is left as it was when it happened.
    pub fn run(&mut self) -> Result<Termination, RunError> {
        match self.call(ENTRY_POINT, Position::default()) {
            Ok(flow) => {
                self.host.flush().map_err(|err| RunError::new(Position::default(), err.into()))?;
                Ok(if flow == Flow::Exit { Termination::Exited } else { Termination::Completed })
            }
            Err(err) => {
                let state = StateDump::new(&self.call_stack, &self.stacks, self.dump_cell_width);
                report_fatal(&mut self.host, &self.file, err.position, &err.error.to_string(), &state);
                Err(err)
            }
        }
    }

    fn call(&mut self, id: FunctionId, position: Position) -> Result<Flow, RunError> {
        let fail = |error: OperationError| RunError::new(position, error);

        if self.debug_mode >= DebugMode::StepCalls {
            self.host.pause(&Breakpoint::Call { file: &self.file, id, position }).map_err(|err| fail(err.into()))?;
        }

        let program = Arc::clone(&self.program);
        let function = program.get(id).ok_or_else(|| fail(OperationError::UnknownFunction { id: from_i64(id) }))?;

        self.call_stack.push(id);
        debug!(id, depth = self.call_stack.len(), "enter function");
        let flow = self.run_function(function)?;
        self.call_stack.pop();
        debug!(id, ?flow, "leave function");

        Ok(flow)
    }

    fn run_function(&mut self, function: &Function) -> Result<Flow, RunError> {
        'body: loop {
            for command in function.commands() {
                match self.execute(command)? {
                    Flow::Continue => {}
                    Flow::Restart => {
                        trace!(id = function.id(), "rerun");
                        continue 'body;
                    }
                    flow => return Ok(flow),
                }
            }
            return Ok(Flow::Continue);
        }
    }

    fn execute(&mut self, command: &Command) -> Result<Flow, RunError> {
        match &command.kind {
            CommandKind::Number(value) => {
                self.stacks.push(value.clone());
                Ok(Flow::Continue)
            }
            CommandKind::Word(word) => self.execute_word(word, command.position),
        }
    }

    fn execute_word(&mut self, word: &Word, position: Position) -> Result<Flow, RunError> {
        let fail = |error: OperationError| RunError::new(position, error);

        if self.debug_mode >= DebugMode::StepWords {
            self.host.pause(&Breakpoint::Word { file: &self.file, word, position }).map_err(|err| fail(err.into()))?;
            self.write_dump().map_err(fail)?;
        }

        trace!(word = word.name(), %position, "execute");
        match self.apply(word).map_err(fail)? {
            Flow::Call(id) => self.call_word(id, position),
            flow => Ok(flow),
        }
    }

    /// `call`: a return signal unwinds one more level per call it leaves,
    /// and the call it runs out at carries on after itself.
    fn call_word(&mut self, id: FunctionId, position: Position) -> Result<Flow, RunError> {
        Ok(match self.call(id, position)? {
            Flow::Return(1) => Flow::Continue,
            Flow::Return(depth) => Flow::Return(depth - 1),
            flow => flow,
        })
    }

    fn pop(&mut self) -> Result<Value, OperationError> {
        self.stacks.pop().ok_or(OperationError::PopFailed)
    }

    fn push(&mut self, value: Value) {
        self.stacks.push(value);
    }

    fn pop_function_id(&mut self) -> Result<FunctionId, OperationError> {
        let value = self.pop()?;
        if !value.is_integer() {
            return Err(OperationError::NotAnInteger { value });
        }
        to_exact_i64(&value).ok_or(OperationError::UnknownFunction { id: value })
    }

    fn pop_return_depth(&mut self) -> Result<u64, OperationError> {
        let depth = self.pop()?;
        if !depth.is_integer() {
            return Err(OperationError::NotAnInteger { value: depth });
        }
        if !depth.is_positive() {
            return Err(OperationError::InvalidReturnDepth { depth });
        }
        // Deeper than any reachable nesting either way.
        Ok(depth.numer().to_u64().unwrap_or(u64::MAX))
    }

    fn write_dump(&mut self) -> Result<(), OperationError> {
        let dump = self.dump().to_string();
        self.host.write_str(&dump)?;
        Ok(())
    }

    /// Applies one word; `call` only pops its target and hands it back as
    /// [`Flow::Call`]. The first value popped is the left operand of binary
    /// arithmetic.
    fn apply(&mut self, word: &Word) -> Result<Flow, OperationError> {
        match word {
            Word::Add => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a + b);
            }
            Word::Subtract => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a - b);
            }
            Word::Multiply => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a * b);
            }
            Word::Divide => {
                let a = self.pop()?;
                let b = self.pop()?;
                if b.is_zero() {
                    return Err(OperationError::DivisionByZero);
                }
                self.push(a / b);
            }
            Word::FloorDivide => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(floor_div(&a, &b).ok_or(OperationError::DivisionByZero)?);
            }
            Word::Modulo => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(floor_mod(&a, &b).ok_or(OperationError::DivisionByZero)?);
            }
            Word::Call => return Ok(Flow::Call(self.pop_function_id()?)),
            Word::Swap => {
                let a = self.pop()?;
                let b = self.pop()?;
                self.push(a);
                self.push(b);
            }
            Word::Dup => {
                let a = self.pop()?;
                self.push(a.clone());
                self.push(a);
            }
            Word::Rot => {
                let a = self.pop()?;
                let b = self.pop()?;
                let c = self.pop()?;
                self.push(a);
                self.push(c);
                self.push(b);
            }
            Word::Drop => {
                self.pop()?;
            }
            Word::Clear => self.stacks.clear(),
            Word::Exit => return Ok(Flow::Exit),
            Word::GetChar => {
                let c = self.host.read_char()?.ok_or(OperationError::EndOfInput)?;
                self.push(from_char(c));
            }
            Word::PutChar => {
                let value = self.pop()?;
                let c = to_char(&value).ok_or(OperationError::InvalidCharCode { value })?;
                self.host.write_str(c.encode_utf8(&mut [0; 4]))?;
            }
            Word::In => {
                let line = self.host.read_line()?.ok_or(OperationError::EndOfInput)?;
                let value = parse_value(&line).ok_or(OperationError::InvalidLiteral { text: line })?;
                self.push(value);
            }
            Word::Out => {
                let value = self.pop()?;
                self.host.write_str(&render(&value))?;
            }
            Word::NRet => return Ok(Flow::Return(self.pop_return_depth()?)),
            Word::Rerun => return Ok(Flow::Restart),
            Word::Change => {
                let id = self.pop()?;
                debug!(stack = %render(&id), "change active stack");
                self.stacks.change(id);
            }
            Word::Debug => {
                let value = self.pop()?;
                let mode = to_truncated_i64(&value)
                    .and_then(DebugMode::from_level)
                    .ok_or(OperationError::InvalidDebugMode { value })?;
                debug!(?mode, "debug mode");
                self.debug_mode = mode;
            }
            Word::Dump => self.write_dump()?,
            Word::Stack => {
                let id = self.stacks.active_id().clone();
                self.push(id);
            }
            Word::Move => {
                let id = self.pop()?;
                let value = self.pop()?;
                self.stacks.push_to(id, value);
            }
            Word::Unknown(name) => return Err(OperationError::UnknownWord { name: name.to_string() }),
        }

        Ok(Flow::Continue)
    }
}

/// Parse and run a program, reporting any fatal error to `host`.
///
/// # Example
/// ```
/// use ratstack::host::IoHost;
/// use ratstack::vm::{run_program, EngineOptions, Termination};
///
/// let host = IoHost::new(&b""[..], Vec::new());
/// let result = run_program("sum.rat", "def 0 4 3 + out end", EngineOptions::default(), host).unwrap();
/// assert_eq!(result.termination, Termination::Completed);
/// assert_eq!(result.host.into_output(), b"7");
/// ```
pub fn run_program<H: Host>(file: &str, source: &str, options: EngineOptions, mut host: H) -> Result<RunResult<H>, crate::Error> {
    let program = match parse_program(source) {
        Ok(program) => program,
        Err(err) => {
            let stacks = StackRegistry::new();
            let state = StateDump::new(&[], &stacks, options.dump_cell_width);
            report_fatal(&mut host, file, err.position, &err.kind.to_string(), &state);
            return Err(err.into());
        }
    };

    let mut engine = Engine::new(file, program, options, host);
    let termination = engine.run()?;
    Ok(engine.into_result(termination))
}
