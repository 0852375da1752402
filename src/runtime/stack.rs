use crate::runtime::object::ObjectRef;

/// Operand stack with a fixed capacity.
///
/// Overflow and underflow are reported as `None`/`Err` so the engine can
/// turn them into typed failures instead of aborting.
#[derive(Debug)]
pub struct OperandStack {
    items: Vec<ObjectRef>,
    capacity: usize,
}

impl OperandStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Gives the value back when the stack is full.
    pub fn push(&mut self, value: ObjectRef) -> Result<(), ObjectRef> {
        if self.items.len() >= self.capacity {
            return Err(value);
        }
        self.items.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<ObjectRef> {
        self.items.pop()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn into_vec(self) -> Vec<ObjectRef> {
        self.items
    }
}

/// Fixed number of local slots, all absent at frame start.
#[derive(Debug)]
pub struct Locals {
    slots: Vec<Option<ObjectRef>>,
}

impl Locals {
    pub fn new(count: usize) -> Self {
        Self {
            slots: vec![None; count],
        }
    }

    /// `None` when the slot index is out of range; `Some(None)` when the slot
    /// exists but was never set.
    pub fn get(&self, slot: usize) -> Option<Option<&ObjectRef>> {
        self.slots.get(slot).map(Option::as_ref)
    }

    /// Returns false when the slot index is out of range.
    pub fn set(&mut self, slot: usize, value: ObjectRef) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                *s = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn into_vec(self) -> Vec<Option<ObjectRef>> {
        self.slots
    }
}
