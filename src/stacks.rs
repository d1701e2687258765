//! The registry of named stacks.
use std::collections::BTreeMap;

use num_traits::Zero;

use crate::value::Value;

/// All stacks of a running program, keyed by their rational id, together with
/// the id of the active one.
///
/// Stack `0` exists from the start and is the initial active stack. Any other
/// stack comes into existence, empty, the first time it is switched to or
/// moved into. Stacks are never removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackRegistry {
    stacks: BTreeMap<Value, Vec<Value>>,
    active: Value,
}

impl Default for StackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StackRegistry {
    pub fn new() -> Self {
        let mut stacks = BTreeMap::new();
        stacks.insert(Value::zero(), Vec::new());
        Self { stacks, active: Value::zero() }
    }

    pub fn active_id(&self) -> &Value {
        &self.active
    }

    pub fn active(&self) -> &[Value] {
        self.stacks.get(&self.active).map(Vec::as_slice).unwrap_or_default()
    }

    fn active_mut(&mut self) -> &mut Vec<Value> {
        self.stacks.entry(self.active.clone()).or_default()
    }

    pub fn push(&mut self, value: Value) {
        self.active_mut().push(value);
    }

    /// Removes the top of the active stack, [`None`] if it is empty.
    pub fn pop(&mut self) -> Option<Value> {
        self.active_mut().pop()
    }

    pub fn peek(&self) -> Option<&Value> {
        self.active().last()
    }

    pub fn clear(&mut self) {
        self.active_mut().clear();
    }

    /// Makes `id` the active stack, creating it if needed.
    pub fn change(&mut self, id: Value) {
        self.stacks.entry(id.clone()).or_default();
        self.active = id;
    }

    /// Pushes onto stack `id` without changing which stack is active.
    pub fn push_to(&mut self, id: Value, value: Value) {
        self.stacks.entry(id).or_default().push(value);
    }

    pub fn get(&self, id: &Value) -> Option<&[Value]> {
        self.stacks.get(id).map(Vec::as_slice)
    }

    /// Number of stacks in the registry.
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Stacks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &[Value])> {
        self.stacks.iter().map(|(id, stack)| (id, stack.as_slice()))
    }

    /// Height of the tallest stack.
    pub fn max_height(&self) -> usize {
        self.stacks.values().map(Vec::len).max().unwrap_or(0)
    }
}
