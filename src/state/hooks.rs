//! Component state - Signals that survive re-renders.
//!
//! A component claims state with [`use_state`] while it renders. Slots are
//! stored on the component's fiber in call order, so they live exactly as long
//! as the fiber: a patch that keeps the component tag keeps the state, a
//! replace or remove drops it.
//!
//! # Pattern: Hook Frame Stack
//!
//! The reconciler cannot hand the fiber to the render function (the arena is
//! borrowed while diffing), so it moves the fiber's slots into a thread-local
//! frame, runs the component, and moves them back. This mirrors the parent
//! context stack primitives use to find their parent while being created.
//!
//! # Scheduling
//!
//! Each slot wraps a `spark_signals` signal. When the component was rendered by
//! a [`Renderer`](crate::pipeline::Renderer), a watcher effect enqueues the
//! render target on every change. Nothing renders synchronously; the owner
//! flushes the queue.
//!
//! ```ignore
//! let counter = Component::new("Counter", |_props| {
//!     let count = use_state(|| 0);
//!     let inc = count.clone();
//!     Ok(VNode::element("button")
//!         .on("click", move |_| inc.update(|n| n + 1))
//!         .child(count.get() as i64)
//!         .into())
//! });
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::{Signal, effect, signal};

use crate::pipeline::Scheduler;

// =============================================================================
// Slots and Frames
// =============================================================================

/// One claimed state slot on a component fiber.
pub struct HookSlot {
    value: Rc<dyn Any>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

impl HookSlot {
    /// Stop the slot's watcher.
    pub(crate) fn dispose(mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

struct HookFrame {
    slots: Vec<HookSlot>,
    cursor: usize,
    scheduler: Option<Scheduler>,
}

thread_local! {
    /// Frames for the components currently rendering (innermost last).
    static FRAMES: RefCell<Vec<HookFrame>> = const { RefCell::new(Vec::new()) };
}

/// Run `render` with `slots` installed as the current hook frame.
///
/// Returns the render result and the (possibly grown) slot list.
pub(crate) fn with_hooks<R>(
    slots: Vec<HookSlot>,
    scheduler: Option<Scheduler>,
    render: impl FnOnce() -> R,
) -> (R, Vec<HookSlot>) {
    FRAMES.with(|frames| {
        frames.borrow_mut().push(HookFrame {
            slots,
            cursor: 0,
            scheduler,
        })
    });

    let out = render();

    let frame = FRAMES.with(|frames| frames.borrow_mut().pop());
    (out, frame.map(|f| f.slots).unwrap_or_default())
}

// =============================================================================
// State Handle
// =============================================================================

/// Handle to one piece of component state.
///
/// Cloning the handle shares the state.
pub struct State<T: Clone + PartialEq + 'static> {
    signal: Signal<T>,
}

impl<T: Clone + PartialEq + 'static> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> State<T> {
    /// Current value.
    pub fn get(&self) -> T {
        self.signal.get()
    }

    /// Replace the value. Setting an equal value schedules nothing.
    pub fn set(&self, value: T) {
        if self.signal.get() != value {
            self.signal.set(value);
        }
    }

    /// Derive the next value from the current one.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.signal.get());
        self.set(next);
    }
}

/// Claim the next state slot of the rendering component.
///
/// On first render the slot is initialised with `init()`; on later renders the
/// stored value is returned and `init` is not called. Hooks must be called in
/// the same order on every render. Outside any component (or under a string
/// renderer) the state is detached: it holds a value but schedules nothing.
pub fn use_state<T: Clone + PartialEq + 'static>(init: impl FnOnce() -> T) -> State<T> {
    let claimed = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let frame = frames.last_mut()?;
        let index = frame.cursor;
        frame.cursor += 1;
        let existing = frame
            .slots
            .get(index)
            .and_then(|slot| slot.value.downcast_ref::<State<T>>())
            .cloned();
        Some((index, existing, frame.scheduler.clone()))
    });

    let Some((index, existing, scheduler)) = claimed else {
        return State {
            signal: signal(init()),
        };
    };
    if let Some(state) = existing {
        return state;
    }

    let state = State {
        signal: signal(init()),
    };
    let cleanup = scheduler.map(|scheduler| watch(&state, scheduler));
    let slot = HookSlot {
        value: Rc::new(state.clone()),
        cleanup,
    };

    let replaced = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let frame = frames.last_mut()?;
        if index < frame.slots.len() {
            Some(std::mem::replace(&mut frame.slots[index], slot))
        } else {
            frame.slots.push(slot);
            None
        }
    });
    // Hook order changed under us: the old slot's type no longer matches.
    if let Some(old) = replaced {
        old.dispose();
    }

    state
}

/// Enqueue the scheduler's target whenever `state` changes.
fn watch<T: Clone + PartialEq + 'static>(state: &State<T>, scheduler: Scheduler) -> Box<dyn FnOnce()> {
    let watched = state.signal.clone();
    let initial_run = Cell::new(true);
    let stop = effect(move || {
        let _ = watched.get();
        if initial_run.replace(false) {
            return;
        }
        scheduler.schedule();
    });
    Box::new(stop)
}
