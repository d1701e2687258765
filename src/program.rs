//! The parsed form of a program: numbered functions made of commands.
use std::collections::BTreeMap;
use std::fmt;

use crate::ops::Word;
use crate::value::{render, Value};

/// Identifier of a function, as written after `def`.
pub type FunctionId = i64;

/// A 1-based line and column in the source file.
///
/// The entry call made by the engine uses `0:0`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandKind {
    /// Push a literal.
    Number(Value),
    Word(Word),
}

/// A single command of a function body, with the position of its token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    pub kind: CommandKind,
    pub position: Position,
}

impl Command {
    pub fn number(value: Value, position: Position) -> Self {
        Self { kind: CommandKind::Number(value), position }
    }

    pub fn word(word: Word, position: Position) -> Self {
        Self { kind: CommandKind::Word(word), position }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            CommandKind::Number(value) => f.write_str(&render(value)),
            CommandKind::Word(word) => f.write_str(word.name()),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Function {
    id: FunctionId,
    commands: Vec<Command>,
}

impl Function {
    pub fn new(id: FunctionId, commands: Vec<Command>) -> Self {
        Self { id, commands }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The commands without their positions.
    pub fn kinds(&self) -> impl Iterator<Item = &CommandKind> {
        self.commands.iter().map(|command| &command.kind)
    }
}

/// The function table of a program. Read-only once parsed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Program {
    functions: BTreeMap<FunctionId, Function>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(&id)
    }

    pub fn contains(&self, id: FunctionId) -> bool {
        self.functions.contains_key(&id)
    }

    /// Adds a function. Returns it back if the id is already taken.
    pub fn insert(&mut self, function: Function) -> Result<(), Function> {
        if self.contains(function.id) {
            return Err(function);
        }
        self.functions.insert(function.id, function);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions in ascending id order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// Whether both programs have the same ids and commands, ignoring source positions.
    pub fn same_code(&self, other: &Program) -> bool {
        self.len() == other.len()
            && self.functions().zip(other.functions()).all(|(a, b)| a.id == b.id && a.kinds().eq(b.kinds()))
    }

    /// Source text which parses back into the same program.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for function in self.functions() {
            out.push_str(&format!("def {}\n", function.id));
            for command in &function.commands {
                out.push_str(&format!("    {command}\n"));
            }
            out.push_str("end\n");
        }
        out
    }
}
