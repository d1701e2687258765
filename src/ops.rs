use std::fmt;

/// A primitive operation, resolved from its source spelling once at parse time.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Word {
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Call,
    Swap,
    Dup,
    Rot,
    Drop,
    Clear,
    Exit,
    GetChar,
    PutChar,
    In,
    Out,
    NRet,
    Rerun,
    Change,
    Debug,
    Dump,
    Stack,
    Move,
    /// Any token that is neither a number nor a known word.
    /// Only an error once it is executed.
    Unknown(Box<str>),
}

impl Word {
    /// Every known primitive, in no particular order.
    pub const ALL: &'static [Word] = &[
        Word::Add,
        Word::Subtract,
        Word::Multiply,
        Word::Divide,
        Word::FloorDivide,
        Word::Modulo,
        Word::Call,
        Word::Swap,
        Word::Dup,
        Word::Rot,
        Word::Drop,
        Word::Clear,
        Word::Exit,
        Word::GetChar,
        Word::PutChar,
        Word::In,
        Word::Out,
        Word::NRet,
        Word::Rerun,
        Word::Change,
        Word::Debug,
        Word::Dump,
        Word::Stack,
        Word::Move,
    ];

    pub fn from_name(name: &str) -> Word {
        match name {
            "+" => Word::Add,
            "-" => Word::Subtract,
            "*" => Word::Multiply,
            "/" => Word::Divide,
            "//" => Word::FloorDivide,
            "%" => Word::Modulo,
            "call" => Word::Call,
            "swap" => Word::Swap,
            "dup" => Word::Dup,
            "rot" => Word::Rot,
            "drop" => Word::Drop,
            "clear" => Word::Clear,
            "exit" => Word::Exit,
            "getchar" => Word::GetChar,
            "putchar" => Word::PutChar,
            "in" => Word::In,
            "out" => Word::Out,
            "nret" => Word::NRet,
            "rerun" => Word::Rerun,
            "change" => Word::Change,
            "debug" => Word::Debug,
            "dump" => Word::Dump,
            "stack" => Word::Stack,
            "move" => Word::Move,
            other => Word::Unknown(other.into()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Word::Add => "+",
            Word::Subtract => "-",
            Word::Multiply => "*",
            Word::Divide => "/",
            Word::FloorDivide => "//",
            Word::Modulo => "%",
            Word::Call => "call",
            Word::Swap => "swap",
            Word::Dup => "dup",
            Word::Rot => "rot",
            Word::Drop => "drop",
            Word::Clear => "clear",
            Word::Exit => "exit",
            Word::GetChar => "getchar",
            Word::PutChar => "putchar",
            Word::In => "in",
            Word::Out => "out",
            Word::NRet => "nret",
            Word::Rerun => "rerun",
            Word::Change => "change",
            Word::Debug => "debug",
            Word::Dump => "dump",
            Word::Stack => "stack",
            Word::Move => "move",
            Word::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Word::Unknown(_))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[test]
fn names_round_trip() {
    for word in Word::ALL {
        assert!(word.is_known());
        assert_eq!(&Word::from_name(word.name()), word);
    }
    assert_eq!(Word::from_name("foo"), Word::Unknown("foo".into()));
    assert_eq!(Word::from_name("def").name(), "def");
    assert!(!Word::from_name("end").is_known());
}
