//! Rendering the engine state for the `dump` word, stepping and fatal errors.
use std::fmt;

use tracing::warn;

use crate::host::Host;
use crate::program::{FunctionId, Position};
use crate::stacks::StackRegistry;
use crate::value::render;

/// A view of the full state: the call stack and every stack in the registry.
///
/// Displayed as the call stack, innermost call first, followed by a grid with
/// one column per stack in ascending id order. The top row holds the values
/// at the height of the tallest stack, the bottom row the bottom values, and
/// a last row under a separator names the stacks.
#[derive(Clone, Copy, Debug)]
pub struct StateDump<'a> {
    pub call_stack: &'a [FunctionId],
    pub stacks: &'a StackRegistry,
    pub cell_width: usize,
}

impl<'a> StateDump<'a> {
    pub fn new(call_stack: &'a [FunctionId], stacks: &'a StackRegistry, cell_width: usize) -> Self {
        Self { call_stack, stacks, cell_width }
    }
}

impl fmt::Display for StateDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.cell_width;
        for id in self.call_stack.iter().rev() {
            writeln!(f, "at {id}")?;
        }
        writeln!(f)?;

        for depth in (1..=self.stacks.max_height()).rev() {
            let row: Vec<String> = self
                .stacks
                .iter()
                .map(|(_, stack)| {
                    let cell = stack.get(depth - 1).map(render).unwrap_or_default();
                    format!("{cell:^width$}")
                })
                .collect();
            writeln!(f, "{}", row.join(" | "))?;
        }

        let columns = self.stacks.len();
        writeln!(f, "{}", "-".repeat(((width + 3) * columns).saturating_sub(3)))?;
        let ids: Vec<String> = self.stacks.iter().map(|(id, _)| format!("{:^width$}", render(id))).collect();
        writeln!(f, "{}", ids.join(" | "))
    }
}

/// Prints `file:line:column: message` and the full state, then hands the state
/// to [`Host::on_fatal`].
pub fn report_fatal<H: Host>(host: &mut H, file: &str, position: Position, message: &str, state: &StateDump) {
    let text = format!("{file}:{position}: {message}\n{state}");
    if let Err(err) = host.write_str(&text).and_then(|_| host.flush()) {
        warn!("Failed to write the error report: {err}");
    }
    host.on_fatal(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{from_i64, parse_value};

    #[test]
    fn test_empty_state() {
        let stacks = StackRegistry::new();
        let dump = StateDump::new(&[], &stacks, 3).to_string();
        assert_eq!(dump, "\n---\n 0 \n");
    }

    #[test]
    fn test_grid_and_call_stack() {
        let mut stacks = StackRegistry::new();
        stacks.push(from_i64(1));
        stacks.push(from_i64(2));
        stacks.push(from_i64(3));
        stacks.push_to(parse_value("1/2").unwrap(), parse_value("-7/3").unwrap());
        stacks.push_to(from_i64(-4), from_i64(9));
        stacks.push_to(from_i64(-4), from_i64(10));

        let dump = StateDump::new(&[0, 5, 2], &stacks, 4).to_string();
        let expected = [
            "at 2",
            "at 5",
            "at 0",
            "",
            "     |  3   |     ",
            " 10  |  2   |     ",
            " 9   |  1   | -7/3",
            "------------------",
            " -4  |  0   | 1/2 ",
            "",
        ]
        .join("\n");
        assert_eq!(dump, expected);
    }
}
