//! Turning source text into a [`Program`].
//!
//! The grammar is line agnostic: a program is a sequence of
//! `def <id> <command>* end` blocks separated by whitespace, and `#` starts a
//! comment running to the end of the line.
use std::str::Chars;

use thiserror::Error;

use crate::ops::Word;
use crate::program::{Command, Function, FunctionId, Position, Program};
use crate::value::parse_value;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("A file can only contain function definitions on the top level, found `{0}`")]
    NotADefinition(String),
    #[error("Expected an integer function id, found `{0}`")]
    InvalidFunctionId(String),
    #[error("Every function can only be defined once, function {0} is defined again")]
    DuplicateFunction(FunctionId),
    #[error("Input ended unexpectedly")]
    UnexpectedEndOfInput,
}

/// A structural error in the source, with the position it was found at.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{position}: {kind}")]
pub struct ParseError {
    pub position: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(position: Position, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// Empty exactly at the end of input.
    pub text: String,
    /// Position of the first character.
    pub position: Position,
}

impl Token {
    pub fn is_end_of_input(&self) -> bool {
        self.text.is_empty()
    }
}

/// Splits source text into whitespace separated tokens, dropping comments.
pub struct Lexer<'a> {
    chars: Chars<'a>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { chars: source.chars(), line: 1, column: 1 }
    }

    /// Position of the next character to be read.
    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn read(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// The next character, or [`None`] at the end of input.
    ///
    /// A comment is consumed up to and including its newline and comes out as a
    /// single space.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.read()?;
        if c == '#' {
            while let Some(c) = self.read() {
                if c == '\n' {
                    break;
                }
            }
            return Some(' ');
        }
        Some(c)
    }

    pub fn next_token(&mut self) -> Token {
        let mut text = String::new();
        let position = loop {
            let position = self.current_position();
            match self.next_char() {
                None => return Token { text, position },
                Some(c) if c.is_whitespace() => continue,
                Some(c) => {
                    text.push(c);
                    break position;
                }
            }
        };

        while let Some(c) = self.next_char() {
            if c.is_whitespace() {
                break;
            }
            text.push(c);
        }

        Token { text, position }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        Some(self.next_token()).filter(|token| !token.is_end_of_input())
    }
}

/// Parse a whole program.
///
/// Command tokens are tried as number literals first and are words otherwise,
/// so a stray `def` inside a body is just an unknown word.
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut program = Program::new();

    loop {
        let token = lexer.next_token();
        if token.is_end_of_input() {
            break;
        }
        if token.text != "def" {
            return Err(ParseError::new(token.position, ParseErrorKind::NotADefinition(token.text)));
        }

        let id_token = lexer.next_token();
        if id_token.is_end_of_input() {
            return Err(ParseError::new(id_token.position, ParseErrorKind::UnexpectedEndOfInput));
        }
        let id: FunctionId = id_token
            .text
            .parse()
            .map_err(|_| ParseError::new(id_token.position, ParseErrorKind::InvalidFunctionId(id_token.text.clone())))?;

        let mut commands = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.is_end_of_input() {
                return Err(ParseError::new(lexer.current_position(), ParseErrorKind::UnexpectedEndOfInput));
            }
            if token.text == "end" {
                break;
            }
            commands.push(parse_command(&token));
        }

        program
            .insert(Function::new(id, commands))
            .map_err(|function| ParseError::new(id_token.position, ParseErrorKind::DuplicateFunction(function.id())))?;
    }

    Ok(program)
}

fn parse_command(token: &Token) -> Command {
    match parse_value(&token.text) {
        Some(value) => Command::number(value, token.position),
        None => Command::word(Word::from_name(&token.text), token.position),
    }
}
