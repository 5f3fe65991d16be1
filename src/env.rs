//! Environment model: chains of frames holding named mutable cells.
//!
//! A [`Frame`] is an ordered set of bindings created together - by one call,
//! one `let`, or one `letrec` - chained to a parent environment. Lookup walks
//! outward; the first matching binding wins, so inner frames shadow outer
//! ones. Frames never change membership after creation, with one deliberate
//! exception: the distinguished [`GlobalFrame`] grows through top-level
//! `define`, acting as the register of all top-level names.
//!
//! Frames are shared (`Rc`), and every binding is an interior-mutable cell
//! (`Rc<RefCell<..>>`). Cloning an [`Env`] therefore aliases the same cells:
//! a closure captures its defining environment by reference, and `set!`
//! through any alias is visible to all of them. This aliasing is the point -
//! it is how mutation-based recursion and shared-state closures work.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::Error;
use crate::value::Value;

/// A named mutable storage cell holding one current value.
///
/// Cloning a `Binding` shares the cell; [`Binding::set`] through any clone is
/// observed by every holder. Cells are created when a frame is built and live
/// as long as their frame.
#[derive(Clone)]
pub struct Binding(Rc<RefCell<Value>>);

impl Binding {
    pub fn new(value: Value) -> Self {
        Binding(Rc::new(RefCell::new(value)))
    }

    /// Read the cell's current value
    pub fn get(&self) -> Value {
        self.0.borrow().clone()
    }

    /// Replace the cell's current value in place; never fails
    pub fn set(&self, value: Value) {
        *self.0.borrow_mut() = value;
    }
}

/// The distinguished global frame.
///
/// Created empty at session start, grows monotonically through `define`, and
/// is discarded with the session. This is the only frame whose membership can
/// change after creation.
pub struct GlobalFrame {
    bindings: RefCell<HashMap<String, Binding>>,
}

impl GlobalFrame {
    pub fn new() -> Self {
        GlobalFrame {
            bindings: RefCell::new(HashMap::new()),
        }
    }

    /// Add or overwrite a global binding. Redefining an existing name mutates
    /// its cell in place, so closures that already captured the global
    /// environment observe the new value - last write wins.
    pub fn define(&self, name: &str, value: Value) {
        let mut bindings = self.bindings.borrow_mut();
        if let Some(cell) = bindings.get(name) {
            cell.set(value);
        } else {
            bindings.insert(name.to_owned(), Binding::new(value));
        }
    }

    fn lookup(&self, name: &str) -> Option<Binding> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Snapshot of all global bindings, sorted by name
    pub fn all_bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self
            .bindings
            .borrow()
            .iter()
            .map(|(name, cell)| (name.clone(), cell.get()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

impl Default for GlobalFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// A non-global frame: bindings created together, in order, plus the
/// enclosing environment.
pub struct Frame {
    bindings: Vec<(String, Binding)>,
    parent: Env,
}

/// An environment: the global frame, or a frame chained to a parent.
#[derive(Clone)]
pub enum Env {
    Global(Rc<GlobalFrame>),
    Scope(Rc<Frame>),
}

impl Env {
    /// Look up a variable's current value, walking the frame chain outward
    pub fn lookup(&self, name: &str) -> Result<Value, Error> {
        self.lookup_binding(name).map(|binding| binding.get())
    }

    /// Look up the mutable cell for a variable rather than its value.
    /// Needed by `set!` and by letrec's deferred fill-in; the search may
    /// cross frame boundaries, so mutation reaches whichever frame owns the
    /// name.
    pub fn lookup_binding(&self, name: &str) -> Result<Binding, Error> {
        let mut env = self;
        loop {
            match env {
                Env::Scope(frame) => {
                    if let Some((_, binding)) =
                        frame.bindings.iter().find(|(bound, _)| bound == name)
                    {
                        return Ok(binding.clone());
                    }
                    env = &frame.parent;
                }
                Env::Global(globals) => {
                    return globals
                        .lookup(name)
                        .ok_or_else(|| Error::UnboundVariable(name.to_owned()));
                }
            }
        }
    }

    /// Build one new frame with one binding per (name, value) pair, in the
    /// given order, parented to this environment. Callers check length
    /// equality before calling.
    pub fn extend(&self, names: Vec<String>, values: Vec<Value>) -> Env {
        debug_assert_eq!(names.len(), values.len());
        let bindings = names
            .into_iter()
            .zip(values)
            .map(|(name, value)| (name, Binding::new(value)))
            .collect();
        Env::Scope(Rc::new(Frame {
            bindings,
            parent: self.clone(),
        }))
    }

    /// The global frame at the root of this chain
    pub fn global_frame(&self) -> Rc<GlobalFrame> {
        let mut env = self;
        loop {
            match env {
                Env::Scope(frame) => env = &frame.parent,
                Env::Global(globals) => return globals.clone(),
            }
        }
    }
}

/// Create the empty global environment for one evaluation session.
///
/// Primitive operations are not seeded here: primitive references are their
/// own expression form, resolved against the registry at application time.
pub fn create_global_env() -> Env {
    Env::Global(Rc::new(GlobalFrame::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{val, Value};

    #[test]
    fn test_lookup_walks_outward() {
        let global = create_global_env();
        global.global_frame().define("x", val(1));

        let inner = global.extend(vec!["y".into()], vec![val(2)]);
        assert_eq!(inner.lookup("x"), Ok(val(1)));
        assert_eq!(inner.lookup("y"), Ok(val(2)));
        assert_eq!(
            inner.lookup("z"),
            Err(Error::UnboundVariable("z".to_owned()))
        );
    }

    #[test]
    fn test_shadowing_inner_frame_wins() {
        let global = create_global_env();
        global.global_frame().define("x", val(1));

        let shadowing = global.extend(vec!["x".into()], vec![val(99)]);
        assert_eq!(shadowing.lookup("x"), Ok(val(99)));
        // The outer binding is untouched
        assert_eq!(global.lookup("x"), Ok(val(1)));
    }

    #[test]
    fn test_mutation_is_shared_across_aliases() {
        let global = create_global_env();
        let env = global.extend(vec!["n".into()], vec![val(0)]);

        // A second environment chained to the same frame aliases the cell
        let alias = env.extend(vec!["other".into()], vec![val(0)]);

        let binding = env.lookup_binding("n").expect("n is bound");
        binding.set(val(41));
        binding.set(val(42));

        assert_eq!(env.lookup("n"), Ok(val(42)));
        assert_eq!(alias.lookup("n"), Ok(val(42)));
    }

    #[test]
    fn test_global_redefine_overwrites_in_place() {
        let global = create_global_env();
        let frame = global.global_frame();
        frame.define("x", val(1));

        // A binding handle captured before redefinition sees the new value
        let before = global.lookup_binding("x").expect("x is bound");
        frame.define("x", val(2));
        assert_eq!(before.get(), val(2));
        assert_eq!(global.lookup("x"), Ok(val(2)));
    }

    #[test]
    fn test_extend_preserves_order_and_duplicates_shadow() {
        let global = create_global_env();
        let env = global.extend(
            vec!["a".into(), "b".into()],
            vec![val(1), val(2)],
        );
        assert_eq!(env.lookup("a"), Ok(val(1)));
        assert_eq!(env.lookup("b"), Ok(val(2)));
    }

    #[test]
    fn test_global_frame_snapshot_sorted() {
        let global = create_global_env();
        let frame = global.global_frame();
        frame.define("zeta", val(1));
        frame.define("alpha", val(2));

        let names: Vec<String> = frame
            .all_bindings()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["alpha".to_owned(), "zeta".to_owned()]);
    }

    #[test]
    fn test_global_frame_reachable_from_nested_scopes() {
        let global = create_global_env();
        let nested = global
            .extend(vec!["a".into()], vec![val(1)])
            .extend(vec!["b".into()], vec![val(2)]);

        nested.global_frame().define("deep", val(3));
        assert_eq!(global.lookup("deep"), Ok(val(3)));
        assert_eq!(nested.lookup("deep"), Ok(val(3)));
    }

    #[test]
    fn test_void_placeholder_fill_in() {
        // The two-phase letrec pattern: bind to Void, then fill in
        let global = create_global_env();
        let env = global.extend(vec!["f".into()], vec![Value::Void]);

        let cell = env.lookup_binding("f").expect("f is bound");
        assert_eq!(cell.get(), Value::Void);
        cell.set(val(7));
        assert_eq!(env.lookup("f"), Ok(val(7)));
    }
}
