//! End-to-end reconciliation scenarios.
//!
//! Every scenario drives a real `Renderer` and observes the host tree and its
//! mutation counters, never fiber internals.
//!
//! Run with: cargo test --test reconciliation

use std::cell::Cell;
use std::rc::Rc;

use spark_vdom::{
    Child, Component, DiffStrategy, Event, HostId, Props, Renderer, VNode, host_children_to_string,
    host_to_string, render_to_string, use_state,
};

// =============================================================================
// HELPERS
// =============================================================================

fn setup() -> (Renderer, HostId) {
    let mut renderer = Renderer::new();
    let target = renderer.host_mut().create_element("main");
    (renderer, target)
}

fn keyed_list(items: &[&str]) -> VNode {
    VNode::element("ul")
        .key("list")
        .children(items.iter().map(|i| VNode::element("li").key(*i).child(*i)))
}

fn plain_list(items: &[&str]) -> VNode {
    VNode::element("ul").children(items.iter().map(|i| VNode::element("li").child(*i)))
}

fn list_items(renderer: &Renderer, target: HostId) -> Vec<HostId> {
    let ul = renderer.host().children(target)[0];
    renderer.host().children(ul).to_vec()
}

// =============================================================================
// IDENTITY PRESERVATION
// =============================================================================

#[test]
fn same_tag_keeps_host_nodes_across_patches() {
    let (mut renderer, target) = setup();
    let view = |n: i64, class: &str| -> Child {
        VNode::element("section")
            .attr("class", class.to_string())
            .child(VNode::element("input").attr("value", n))
            .child(VNode::group([Child::from(n), Child::from("items")]))
            .into()
    };

    renderer.render(view(0, "a"), target).unwrap();
    let section = renderer.host().children(target)[0];
    let input = renderer.host().children(section)[0];

    for n in 1..5 {
        renderer.render(view(n, if n % 2 == 0 { "a" } else { "b" }), target).unwrap();
        assert_eq!(renderer.host().children(target), &[section]);
        assert_eq!(renderer.host().children(section)[0], input);
    }
    assert_eq!(
        host_children_to_string(renderer.host(), target),
        r#"<section class="a"><input value="4">4items</section>"#
    );
}

// =============================================================================
// KEYED REORDER MINIMALITY
// =============================================================================

#[test]
fn reversing_keyed_list_moves_n_minus_one() {
    let (mut renderer, target) = setup();
    let items = ["a", "b", "c", "d", "e", "f"];
    renderer.render_with(keyed_list(&items), target, DiffStrategy::Keyed).unwrap();
    let before = list_items(&renderer, target);

    let mut reversed = items;
    reversed.reverse();
    let stats = renderer.render_with(keyed_list(&reversed), target, DiffStrategy::Keyed).unwrap();

    assert_eq!(stats.moves, items.len() - 1);
    assert_eq!(stats.inserts, 0);
    assert_eq!(stats.removals, 0);
    assert_eq!(stats.text_writes, 0);

    let mut expected = before;
    expected.reverse();
    assert_eq!(list_items(&renderer, target), expected);
}

#[test]
fn keyed_insert_and_remove_reuse_survivors() {
    let (mut renderer, target) = setup();
    renderer.render(keyed_list(&["a", "b", "c"]), target).unwrap();
    let before = list_items(&renderer, target);

    let stats = renderer.render(keyed_list(&["x", "a", "c"]), target).unwrap();
    let after = list_items(&renderer, target);

    assert_eq!(stats.moves, 0);
    assert_eq!(stats.removals, 1);
    assert_eq!(after[1], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(
        host_children_to_string(renderer.host(), target),
        "<ul><li>x</li><li>a</li><li>c</li></ul>"
    );
}

#[test]
fn duplicate_keys_first_occurrence_wins() {
    let (mut renderer, target) = setup();
    fn list(items: &[(&str, &str)]) -> VNode {
        VNode::element("ul")
            .children(items.iter().map(|(k, text)| VNode::element("li").key(*k).child(*text)))
    }

    renderer.render(list(&[("a", "1"), ("b", "2")]), target).unwrap();
    let before = list_items(&renderer, target);

    renderer.render(list(&[("a", "3"), ("a", "4"), ("b", "5")]), target).unwrap();
    let after = list_items(&renderer, target);

    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[0], "first `a` is paired with the old `a`");
    assert!(!before.contains(&after[1]), "duplicate `a` is mounted fresh");
    assert_eq!(after[2], before[1]);
    assert_eq!(
        host_children_to_string(renderer.host(), target),
        "<ul><li>3</li><li>4</li><li>5</li></ul>"
    );
}

// =============================================================================
// SEQUENTIAL VS KEYED
// =============================================================================

#[test]
fn sequential_and_keyed_agree_on_content_not_cost() {
    let (mut seq, seq_target) = setup();
    seq.render_with(plain_list(&["a", "b", "c"]), seq_target, DiffStrategy::Sequential)
        .unwrap();
    let seq_before = list_items(&seq, seq_target);
    let seq_stats = seq
        .render_with(plain_list(&["c", "a", "b"]), seq_target, DiffStrategy::Sequential)
        .unwrap();

    assert_eq!(seq_stats.text_writes, 3);
    assert_eq!(seq_stats.moves, 0);
    assert_eq!(list_items(&seq, seq_target), seq_before);

    let (mut keyed, keyed_target) = setup();
    keyed
        .render_with(keyed_list(&["a", "b", "c"]), keyed_target, DiffStrategy::Keyed)
        .unwrap();
    let keyed_before = list_items(&keyed, keyed_target);
    let keyed_stats = keyed
        .render_with(keyed_list(&["c", "a", "b"]), keyed_target, DiffStrategy::Keyed)
        .unwrap();

    assert_eq!(keyed_stats.text_writes, 0);
    assert_eq!(keyed_stats.moves, 1);
    assert_eq!(keyed_stats.inserts, 0);
    let keyed_after = list_items(&keyed, keyed_target);
    assert_eq!(
        keyed_after,
        vec![keyed_before[2], keyed_before[0], keyed_before[1]]
    );

    assert_eq!(
        host_children_to_string(seq.host(), seq_target),
        host_children_to_string(keyed.host(), keyed_target)
    );
}

#[test]
fn replace_strategy_remounts_everything() {
    let (mut renderer, target) = setup();
    renderer.render(plain_list(&["a", "b"]), target).unwrap();
    let ul = renderer.host().children(target)[0];

    let stats = renderer
        .render_with(plain_list(&["a", "b"]), target, DiffStrategy::Replace)
        .unwrap();
    assert_ne!(renderer.host().children(target)[0], ul);
    assert!(!renderer.host().contains(ul));
    assert_eq!(stats.removals, 1);
}

// =============================================================================
// IDEMPOTENCE AND LISTENERS
// =============================================================================

#[test]
fn identical_rerender_writes_nothing() {
    let (mut renderer, target) = setup();
    let tree: Child = VNode::element("form")
        .attr("id", "f")
        .attr("novalidate", true)
        .on("submit", |_| {})
        .child(VNode::element("input").attr("value", "x").on("input", |_| {}))
        .child(
            VNode::element("ul")
                .children(["a", "b"].map(|k| VNode::element("li").key(k).child(k))),
        )
        .into();

    renderer.render(tree.clone(), target).unwrap();
    let stats = renderer.render(tree, target).unwrap();

    assert_eq!(stats.property_mutations(), 0);
    assert_eq!(stats.total(), 0);
}

#[test]
fn listeners_track_current_handlers() {
    let (mut renderer, target) = setup();
    let clicks = Rc::new(Cell::new(0));

    for round in 0..5 {
        let clicks = clicks.clone();
        let mut button = VNode::element("button").on("click", move |_| clicks.set(clicks.get() + 1));
        if round % 2 == 0 {
            button = button.on("focus", |_| {});
        }
        renderer.render(button, target).unwrap();

        let node = renderer.host().children(target)[0];
        let expected = if round % 2 == 0 { 2 } else { 1 };
        assert_eq!(renderer.host().listeners(node).len(), expected);
        assert_eq!(renderer.host().listener_count(), expected);
        let fiber = renderer.root_fibers(target)[0];
        assert_eq!(renderer.fibers().get(fiber).unwrap().listeners().len(), expected);
    }

    let node = renderer.host().children(target)[0];
    assert_eq!(renderer.dispatch(node, &Event::new("click")), 1);
    assert_eq!(clicks.get(), 1);

    renderer.unmount(target);
    assert_eq!(renderer.host().listener_count(), 0);
}

// =============================================================================
// SERVER ROUND TRIP
// =============================================================================

#[test]
fn server_and_host_serializers_agree() {
    let (mut renderer, target) = setup();
    let tree: Child = VNode::element("input")
        .attr("disabled", true)
        .attr("value", "a<b")
        .on("change", |_| {})
        .into();

    renderer.render(tree.clone(), target).unwrap();
    let input = renderer.host().children(target)[0];

    let server = render_to_string(&tree).unwrap();
    let client = host_to_string(renderer.host(), input);
    assert_eq!(server, r#"<input disabled value="a&lt;b">"#);
    assert_eq!(server, client);
}

#[test]
fn serializers_agree_on_a_larger_tree() {
    let (mut renderer, target) = setup();
    let card = Component::new("Card", |props: &Props| {
        let title = props.get("title").and_then(|v| v.as_str()).unwrap_or("").to_string();
        Ok(VNode::element("article")
            .attr("data-kind", "card")
            .child(VNode::element("h2").child(title))
            .child(VNode::element("hr"))
            .child(VNode::group([Child::from("Tom & \"Jerry\""), Child::Null, Child::from(3)]))
            .into())
    });
    let tree: Child = VNode::element("div")
        .attr("hidden", false)
        .child(VNode::component(&card, Props::new().with("title", "<hi>")))
        .into();

    renderer.render(tree.clone(), target).unwrap();
    assert_eq!(
        render_to_string(&tree).unwrap(),
        host_children_to_string(renderer.host(), target)
    );
}

// =============================================================================
// COMPONENT STATE
// =============================================================================

#[test]
fn component_state_survives_parent_rerenders() {
    let (mut renderer, target) = setup();
    let counter = Component::new("Counter", |_props: &Props| {
        let count = use_state(|| 0i64);
        let inc = count.clone();
        Ok(VNode::element("button")
            .on("click", move |_| inc.update(|n| n + 1))
            .child(count.get())
            .into())
    });
    let page = |title: &str| -> Child {
        VNode::element("div")
            .child(VNode::element("h1").child(title.to_string()))
            .child(VNode::component(&counter, Props::new()))
            .into()
    };

    renderer.render(page("one"), target).unwrap();
    let div = renderer.host().children(target)[0];
    let button = renderer.host().children(div)[1];

    renderer.dispatch(button, &Event::new("click"));
    renderer.flush().unwrap();
    renderer.render(page("two"), target).unwrap();

    assert_eq!(
        host_children_to_string(renderer.host(), target),
        "<div><h1>two</h1><button>1</button></div>"
    );
}

#[test]
fn failing_component_empties_target_and_reports() {
    let (mut renderer, target) = setup();
    let fragile = Component::new("Fragile", |props: &Props| {
        if props.get("fail").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(spark_vdom::RenderError::component("Fragile", "asked to fail"));
        }
        Ok("ok".into())
    });

    renderer
        .render(VNode::component(&fragile, Props::new()), target)
        .unwrap();
    let err = renderer
        .render(VNode::component(&fragile, Props::new().with("fail", true)), target)
        .unwrap_err();

    assert_eq!(err.code(), "ERR_COMPONENT");
    assert!(renderer.host().children(target).is_empty());
    assert!(renderer.fibers().is_empty());
    assert!(!renderer.is_mounted(target));
}
