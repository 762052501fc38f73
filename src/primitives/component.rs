//! Component references.
//!
//! A component is a named render function. Identity is the function
//! reference: clones of one [`Component`] are the same component, two
//! `Component::new` calls are different components even with the same name.
//! The reconciler patches in place only when identities match.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::types::Props;

use super::vnode::Child;

/// Render function signature.
pub type RenderFn = dyn Fn(&Props) -> Result<Child>;

/// A named component function.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    render: Rc<RenderFn>,
}

impl Component {
    pub fn new(name: &str, render: impl Fn(&Props) -> Result<Child> + 'static) -> Self {
        Self {
            name: Rc::from(name),
            render: Rc::new(render),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the render function.
    ///
    /// Callers that want component state to work wrap this in a hook frame
    /// (see `state::hooks`).
    pub fn render(&self, props: &Props) -> Result<Child> {
        (self.render)(props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::VNode;

    #[test]
    fn test_identity_is_reference() {
        let a = Component::new("Label", |_| Ok("x".into()));
        let b = a.clone();
        let c = Component::new("Label", |_| Ok("x".into()));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_render_receives_props() {
        let greet = Component::new("Greet", |props| {
            let name = props.get("name").and_then(|v| v.as_str()).unwrap_or("nobody");
            Ok(VNode::element("span").child(format!("hi {name}")).into())
        });

        let out = greet.render(&Props::new().with("name", "ada")).unwrap();
        let node = out.as_node().unwrap();
        assert_eq!(node.child_nodes()[0].text_content(), Some("hi ada".into()));
    }
}
