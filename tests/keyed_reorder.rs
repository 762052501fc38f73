//! Property tests for keyed reordering.
//!
//! For any permutation of a keyed list, the keyed strategy must produce the
//! new order, keep every host node, and move exactly `n - LIS` of them.
//!
//! Run with: cargo test --test keyed_reorder

use proptest::prelude::*;

use spark_vdom::strategy::longest_increasing_subsequence;
use spark_vdom::{DiffStrategy, HostId, Renderer, VNode, host_children_to_string};

fn list(keys: &[usize]) -> VNode {
    VNode::element("ol")
        .key("root")
        .children(keys.iter().map(|k| VNode::element("li").key(*k).child(k.to_string())))
}

fn expected_markup(keys: &[usize]) -> String {
    let items: String = keys.iter().map(|k| format!("<li>{k}</li>")).collect();
    format!("<ol>{items}</ol>")
}

fn items(renderer: &Renderer, target: HostId) -> Vec<HostId> {
    let ol = renderer.host().children(target)[0];
    renderer.host().children(ol).to_vec()
}

proptest! {
    #[test]
    fn keyed_permutation_moves_minimum(order in (1usize..24).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())) {
        let n = order.len();
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");

        let initial: Vec<usize> = (0..n).collect();
        renderer.render_with(list(&initial), target, DiffStrategy::Keyed).unwrap();
        let before = items(&renderer, target);

        let stats = renderer.render_with(list(&order), target, DiffStrategy::Keyed).unwrap();

        // Old positions are the keys themselves, so the LIS of `order` is the
        // set of items that can stay put.
        let stable = longest_increasing_subsequence(&order).len();
        prop_assert_eq!(stats.moves, n - stable);
        prop_assert_eq!(stats.inserts, 0);
        prop_assert_eq!(stats.removals, 0);
        prop_assert_eq!(stats.text_writes, 0);

        let after = items(&renderer, target);
        let expected: Vec<HostId> = order.iter().map(|&k| before[k]).collect();
        prop_assert_eq!(after, expected);
        prop_assert_eq!(host_children_to_string(renderer.host(), target), expected_markup(&order));
    }

    #[test]
    fn keyed_edit_matches_fresh_render(
        old in prop::collection::btree_set(0usize..40, 0..16),
        new in prop::collection::btree_set(0usize..40, 0..16).prop_map(|s| s.into_iter().collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let old: Vec<usize> = old.into_iter().collect();
        let mut renderer = Renderer::new();
        let target = renderer.host_mut().create_element("main");

        renderer.render(list(&old), target).unwrap();
        let before = items(&renderer, target);
        renderer.render(list(&new), target).unwrap();
        let after = items(&renderer, target);

        prop_assert_eq!(host_children_to_string(renderer.host(), target), expected_markup(&new));
        for (j, key) in new.iter().enumerate() {
            if let Some(i) = old.iter().position(|k| k == key) {
                prop_assert_eq!(after[j], before[i], "key {} kept its node", key);
            }
        }
    }
}
