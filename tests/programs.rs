use ratstack::host::IoHost;
use ratstack::parser::{parse_program, ParseErrorKind};
use ratstack::program::Position;
use ratstack::vm::{run_program, DebugMode, EngineOptions, OperationError, Termination};
use ratstack::Error;

const FIB: &str = include_str!("../benches/programs/fib.rat");
const COUNTDOWN: &str = include_str!("../benches/programs/countdown.rat");

/// Runs a program and returns its result together with everything it printed.
fn run(source: &str, input: &str) -> (Result<Termination, Error>, String) {
    let mut output = Vec::new();
    let host = IoHost::new(input.as_bytes(), &mut output);
    let result = run_program("prog.rat", source, EngineOptions::new(DebugMode::Off, 10), host).map(|r| r.termination);
    (result, String::from_utf8(output).unwrap())
}

fn run_ok(source: &str) -> String {
    let (result, output) = run(source, "");
    assert_eq!(result, Ok(Termination::Completed), "{output}");
    output
}

#[test]
fn prints_sum() {
    assert_eq!(run_ok("def 0 3 4 + out end"), "7");
}

#[test]
fn prints_exact_fraction() {
    assert_eq!(run_ok("def 0 3 1 / out end"), "1/3");
    assert_eq!(run_ok("def 0 1 3 / out end"), "3");
}

#[test]
fn unknown_word_is_fatal() {
    let (result, output) = run("def 0 foo end", "");
    match result {
        Err(Error::Run(err)) => {
            assert_eq!(err.position, Position::new(1, 7));
            assert_eq!(err.error, OperationError::UnknownWord { name: "foo".to_string() });
        }
        other => panic!("unexpected result {other:?}"),
    }
    let first_line = output.lines().next().unwrap();
    assert!(first_line.starts_with("prog.rat:1:7: "), "{first_line}");
    assert!(first_line.contains("Unknown Word"), "{first_line}");
    assert!(first_line.contains("foo"), "{first_line}");
}

#[test]
fn nested_def_is_just_a_word() {
    let (result, output) = run("def 0 def end", "");
    assert!(matches!(result, Err(Error::Run(ref err)) if err.error == OperationError::UnknownWord { name: "def".to_string() }));
    assert!(output.starts_with("prog.rat:1:7: "));
}

#[test]
fn parse_errors_are_reported() {
    let (result, output) = run("def 0 1", "");
    let err = result.unwrap_err();
    assert_eq!(err.position(), Position::new(1, 8));
    assert!(matches!(err, Error::Parse(ref err) if err.kind == ParseErrorKind::UnexpectedEndOfInput));
    assert_eq!(output, "prog.rat:1:8: Input ended unexpectedly\n\n----------\n    0     \n");

    let (result, _) = run("def 0 end\nprint", "");
    assert!(matches!(result, Err(Error::Parse(ref err)) if err.kind == ParseErrorKind::NotADefinition("print".to_string())));
}

#[test]
fn hello_world() {
    let source = "
        # Prints a greeting, one character at a time.
        def 0
            72 putchar 101 putchar 108 dup putchar putchar 111 putchar
            10 putchar
        end
    ";
    assert_eq!(run_ok(source), "Hello\n");
}

#[test]
fn echoes_input_until_a_dot() {
    // Echo characters; 1 / (46 - c) fails on the first `.`.
    let source = "
        def 0 1 call end
        def 1
            getchar dup 46 - 1 / drop putchar rerun
        end
    ";
    let (result, output) = run(source, "ab.c");
    assert!(matches!(result, Err(Error::Run(ref err)) if err.error == OperationError::DivisionByZero));
    assert!(output.starts_with("abprog.rat:4:32: Division by zero\nat 1\nat 0\n"), "{output}");
}

#[test]
fn fibonacci() {
    assert_eq!(run_ok(FIB), "2584");
}

#[test]
fn countdown_loop() {
    assert_eq!(run_ok(COUNTDOWN), "");
}

#[test]
fn rendered_program_behaves_the_same() {
    for source in [FIB, COUNTDOWN, "def 0 1/2 .75 + out 3 change stack out end"] {
        let program = parse_program(source).unwrap();
        let rendered = program.render();
        assert!(program.same_code(&parse_program(&rendered).unwrap()));
        assert_eq!(run_ok(&rendered), run_ok(source));
    }
}

#[test]
fn exit_stops_everything() {
    let (result, output) = run("def 0 1 call 2 out end def 1 1 out exit end", "");
    assert_eq!(result, Ok(Termination::Exited));
    assert_eq!(output, "1");
}
