//! Property patching on host elements.
//!
//! Given the old and new property maps of one element:
//!
//! - removed: handler -> listener released, `style` -> cleared, anything
//!   else -> attribute removed
//! - unchanged (`==`): skipped, so re-rendering an identical tree writes
//!   nothing
//! - handler: the previous token for that property is released before the
//!   new handler is attached; a property never holds two listeners
//! - `style` object: replaced wholesale
//! - scalar: written as an attribute; `true` is a bare attribute, `false` and
//!   null mean absent
//!
//! `children` and `key` never reach the host node.

use crate::engine::{FiberEffects, FiberId, HostId};
use crate::types::{PropValue, Props, event_name};

use super::reconciler::Reconciler;

/// How a property value lands on the host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Listener,
    Style,
    Attribute,
}

fn slot_of(value: &PropValue) -> Slot {
    match value {
        PropValue::Handler(_) => Slot::Listener,
        PropValue::Style(_) => Slot::Style,
        _ => Slot::Attribute,
    }
}

impl Reconciler<'_> {
    /// Bring `fiber`'s element from `old` to `new` properties.
    pub fn patch_props(&mut self, fiber: FiberId, old: &Props, new: &Props) {
        let Some(element) = self.fibers.get(fiber).and_then(|f| f.host) else {
            return;
        };
        let before = self.host.stats();

        for (name, value) in old.host_props() {
            if !new.contains_key(name) {
                self.release_prop(fiber, element, name, slot_of(value));
            }
        }

        for (name, value) in new.host_props() {
            let previous = old.get(name);
            if previous == Some(value) {
                continue;
            }
            if let Some(previous) = previous {
                if slot_of(previous) != slot_of(value) {
                    self.release_prop(fiber, element, name, slot_of(previous));
                }
            }

            match value {
                PropValue::Handler(handler) => {
                    if let Some(token) = self.fibers.get_mut(fiber).and_then(|f| f.listeners.remove(name)) {
                        self.host.remove_listener(token);
                    }
                    let token = self.host.add_listener(element, &event_name(name), handler.clone());
                    if let (Some(token), Some(f)) = (token, self.fibers.get_mut(fiber)) {
                        f.listeners.insert(name.to_string(), token);
                    }
                }
                PropValue::Style(style) => self.host.set_style(element, style.clone()),
                other => match other.attribute() {
                    Some(attr) => self.host.set_attribute(element, name, attr),
                    None => {
                        self.host.remove_attribute(element, name);
                    }
                },
            }
        }

        if self.host.stats().since(&before).property_mutations() > 0 {
            if let Some(f) = self.fibers.get_mut(fiber) {
                f.effects |= FiberEffects::PROPS;
            }
        }
    }

    fn release_prop(&mut self, fiber: FiberId, element: HostId, name: &str, slot: Slot) {
        match slot {
            Slot::Listener => {
                if let Some(token) = self.fibers.get_mut(fiber).and_then(|f| f.listeners.remove(name)) {
                    self.host.remove_listener(token);
                }
            }
            Slot::Style => self.host.clear_style(element),
            Slot::Attribute => {
                self.host.remove_attribute(element, name);
            }
        }
    }
}
