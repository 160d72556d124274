//! Environment frames for lexical scoping.
//!
//! A scope chain is a linked list of `Frame`s, each shared through
//! `LocalScope`. Closures hold an `Env` handle to the frame they were created
//! in, so frames outlive the block or call that introduced them for exactly
//! as long as something refers to them.
//!
//! Slots start out uninitialized (the temporal dead zone) when a block is
//! entered and receive their value when the declaration executes.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sable_ir::{DeclKind, Name, NodeId};

use crate::value::Value;

/// Whether a variable binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// `let`, parameters.
    Mutable,
    /// `const`, function declarations, builtins.
    Immutable,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

impl From<DeclKind> for Mutability {
    fn from(kind: DeclKind) -> Self {
        if kind.is_const() {
            Mutability::Immutable
        } else {
            Mutability::Mutable
        }
    }
}

/// Why a scope operation failed.
///
/// The machine turns these into located diagnostics; the frame itself never
/// knows which node asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeError {
    /// Name already declared in this frame.
    Redeclaration,
    /// Name found, but its declaration has not executed yet.
    Uninitialized,
    /// Name not found in any frame of the chain.
    Undefined,
    /// Assignment to an immutable binding.
    Const,
}

/// A single-threaded scope wrapper for reference-counted interior mutability.
///
/// All frame allocations go through `LocalScope::new()`. The
/// `#[repr(transparent)]` layout is identical to `Rc<RefCell<T>>`.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether two handles share one allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Identifier of an environment frame, unique within one machine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnvId(u32);

impl EnvId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        EnvId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Clone)]
enum Binding {
    Uninitialized,
    Value(Value),
}

#[derive(Clone)]
struct Slot {
    binding: Binding,
    mutability: Mutability,
}

struct Frame {
    /// Debug name: `"global"`, `"program"`, `"block"`, `"for"` or a callee.
    name: &'static str,
    head: FxHashMap<Name, Slot>,
    tail: Option<Env>,
    /// The call expression that created this frame, for call frames.
    call_site: Option<NodeId>,
    /// `this` inside a method call.
    receiver: Option<Value>,
}

impl Frame {
    fn new(name: &'static str, tail: Option<Env>) -> Self {
        Frame {
            name,
            head: FxHashMap::default(),
            tail,
            call_site: None,
            receiver: None,
        }
    }
}

/// Handle to an environment frame.
///
/// Cloning the handle shares the frame. Two handles are the same
/// environment when their ids match.
#[derive(Clone)]
pub struct Env {
    id: EnvId,
    frame: LocalScope<Frame>,
}

impl Env {
    /// A frame with no parent.
    pub fn root(id: EnvId, name: &'static str) -> Self {
        Env {
            id,
            frame: LocalScope::new(Frame::new(name, None)),
        }
    }

    /// A block or loop frame whose parent is `self`.
    #[must_use]
    pub fn child(&self, id: EnvId, name: &'static str) -> Self {
        Env {
            id,
            frame: LocalScope::new(Frame::new(name, Some(self.clone()))),
        }
    }

    /// A function-call frame whose parent is `self` (the closure's
    /// environment).
    #[must_use]
    pub fn call(
        &self,
        id: EnvId,
        name: &'static str,
        call_site: NodeId,
        receiver: Option<Value>,
    ) -> Self {
        let mut frame = Frame::new(name, Some(self.clone()));
        frame.call_site = Some(call_site);
        frame.receiver = receiver;
        Env {
            id,
            frame: LocalScope::new(frame),
        }
    }

    #[inline]
    pub fn id(&self) -> EnvId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.frame.borrow().name
    }

    pub fn tail(&self) -> Option<Env> {
        self.frame.borrow().tail.clone()
    }

    pub fn call_site(&self) -> Option<NodeId> {
        self.frame.borrow().call_site
    }

    /// Number of frames from here to the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.tail();
        while let Some(env) = current {
            depth += 1;
            current = env.tail();
        }
        depth
    }

    /// Add an uninitialized slot to this frame.
    pub fn declare(&self, name: Name, mutability: Mutability) -> Result<(), ScopeError> {
        let mut frame = self.frame.borrow_mut();
        if frame.head.contains_key(&name) {
            return Err(ScopeError::Redeclaration);
        }
        frame.head.insert(
            name,
            Slot {
                binding: Binding::Uninitialized,
                mutability,
            },
        );
        Ok(())
    }

    /// Fill the slot of the nearest frame declaring `name`.
    ///
    /// Ignores mutability: this is the declaration itself executing.
    pub fn initialize(&self, name: Name, value: Value) -> Result<(), ScopeError> {
        self.with_slot(name, |slot| slot.binding = Binding::Value(value))
            .ok_or(ScopeError::Undefined)
    }

    /// Declare and initialize in one step.
    pub fn define(&self, name: Name, value: Value, mutability: Mutability) -> Result<(), ScopeError> {
        let mut frame = self.frame.borrow_mut();
        if frame.head.contains_key(&name) {
            return Err(ScopeError::Redeclaration);
        }
        frame.head.insert(
            name,
            Slot {
                binding: Binding::Value(value),
                mutability,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: Name) -> Result<Value, ScopeError> {
        match self.with_slot(name, |slot| slot.binding.clone()) {
            Some(Binding::Value(value)) => Ok(value),
            Some(Binding::Uninitialized) => Err(ScopeError::Uninitialized),
            None => Err(ScopeError::Undefined),
        }
    }

    pub fn assign(&self, name: Name, value: Value) -> Result<(), ScopeError> {
        self.with_slot(name, |slot| {
            if matches!(slot.binding, Binding::Uninitialized) {
                Err(ScopeError::Uninitialized)
            } else if !slot.mutability.is_mutable() {
                Err(ScopeError::Const)
            } else {
                slot.binding = Binding::Value(value);
                Ok(())
            }
        })
        .unwrap_or(Err(ScopeError::Undefined))
    }

    /// The nearest `this` binding in the chain.
    pub fn receiver(&self) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let next = {
                let frame = current.frame.borrow();
                if let Some(receiver) = &frame.receiver {
                    return Some(receiver.clone());
                }
                frame.tail.clone()
            };
            current = next?;
        }
    }

    /// A sibling frame (same parent) holding copies of the named slots.
    ///
    /// Used to give each loop iteration its own loop-variable bindings.
    #[must_use]
    pub fn copy_bindings(&self, id: EnvId, names: &[Name]) -> Self {
        let frame = self.frame.borrow();
        let mut copy = Frame::new(frame.name, frame.tail.clone());
        for name in names {
            if let Some(slot) = frame.head.get(name) {
                copy.head.insert(*name, slot.clone());
            }
        }
        Env {
            id,
            frame: LocalScope::new(copy),
        }
    }

    /// Run `f` on the slot of the nearest frame declaring `name`.
    fn with_slot<R>(&self, name: Name, f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        let mut current = self.clone();
        loop {
            let next = {
                let mut frame = current.frame.borrow_mut();
                if let Some(slot) = frame.head.get_mut(&name) {
                    return Some(f(slot));
                }
                frame.tail.clone()
            };
            current = next?;
        }
    }
}

impl PartialEq for Env {
    fn eq(&self, other: &Self) -> bool {
        self.frame.ptr_eq(&other.frame)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bindings may hold closures that point back here; print the header only.
        write!(f, "Env({}, {:?})", self.id.0, self.name())
    }
}

#[cfg(test)]
mod tests;
