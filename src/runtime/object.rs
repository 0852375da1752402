use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared, immutable handle to a runtime value.
///
/// Identity is pointer identity (`Arc::ptr_eq`); nothing hands out a mutable
/// path into an object once it is built.
pub type ObjectRef = Arc<Object>;

/// A runtime value.
#[derive(Debug, PartialEq, Eq)]
pub enum Object {
    Nil,
    Boolean(bool),
    Number(i64),
    String(String),
    /// Plain receiver object with no state beyond its identity.
    Instance(u64),
}

impl Object {
    /// Kind name used in diagnostics and by the dispatcher.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Nil => "Nil",
            Object::Boolean(_) => "Boolean",
            Object::Number(_) => "Number",
            Object::String(_) => "String",
            Object::Instance(_) => "Object",
        }
    }

    /// Nil and false are the only falsy values.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Nil | Object::Boolean(false))
    }

    pub fn number_value(&self) -> Option<i64> {
        match self {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Debug-ish rendering: strings quoted, nil spelled out.
    pub fn inspect(&self) -> String {
        match self {
            Object::Nil => "nil".to_string(),
            Object::String(s) => format!("{:?}", s),
            Object::Instance(id) => format!("#<Object:{}>", id),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Nil => Ok(()),
            Object::Boolean(b) => write!(f, "{}", b),
            Object::Number(n) => write!(f, "{}", n),
            Object::String(s) => write!(f, "{}", s),
            Object::Instance(id) => write!(f, "#<Object:{}>", id),
        }
    }
}

/// Object factory and owner of the shared singletons.
///
/// Built once by [`Runtime::init`] and torn down with [`Runtime::teardown`].
/// Every engine invocation borrows it, so no invocation can outlive it.
#[derive(Debug)]
pub struct Runtime {
    nil: ObjectRef,
    true_: ObjectRef,
    false_: ObjectRef,
    next_id: AtomicU64,
}

impl Runtime {
    pub fn init() -> Self {
        tracing::debug!("runtime initialised");
        Self {
            nil: Arc::new(Object::Nil),
            true_: Arc::new(Object::Boolean(true)),
            false_: Arc::new(Object::Boolean(false)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn teardown(self) {
        tracing::debug!(
            objects = self.next_id.load(Ordering::Relaxed) - 1,
            "runtime torn down"
        );
    }

    pub fn nil(&self) -> ObjectRef {
        Arc::clone(&self.nil)
    }

    pub fn boolean(&self, value: bool) -> ObjectRef {
        if value {
            Arc::clone(&self.true_)
        } else {
            Arc::clone(&self.false_)
        }
    }

    pub fn new_number(&self, value: i64) -> ObjectRef {
        Arc::new(Object::Number(value))
    }

    pub fn new_string(&self, value: &str) -> ObjectRef {
        Arc::new(Object::String(value.to_string()))
    }

    /// A fresh receiver, distinct from every other object.
    pub fn new_object(&self) -> ObjectRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Arc::new(Object::Instance(id))
    }
}
