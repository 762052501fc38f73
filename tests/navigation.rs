//! Document swaps with persisted component instances.
//!
//! A page embeds a stateful player through a placeholder. Navigating to a
//! page that embeds the same id must carry the very same storage element,
//! with its state, into the new document.
//!
//! Run with: cargo test --test navigation

use spark_vdom::hangar::STORAGE_TAG;
use spark_vdom::hangar::placeholder::placeholder;
use spark_vdom::{
    Child, Component, Event, Hangar, HostId, Immediate, KeepForSwaps, Navigator, Props, Renderer,
    VNode, host_children_to_string, use_state,
};

// =============================================================================
// FIXTURES
// =============================================================================

fn player() -> Component {
    Component::new("Player", |props: &Props| {
        let track = props.get("track").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let plays = use_state(|| 0i64);
        let next = plays.clone();
        Ok(VNode::element("button")
            .attr("data-track", track)
            .on("click", move |_| next.update(|n| n + 1))
            .child(plays.get())
            .into())
    })
}

fn page(title: &str, players: &[(&str, &str)]) -> Child {
    VNode::element("main")
        .child(VNode::element("h1").child(title.to_string()))
        .children(
            players
                .iter()
                .map(|(id, track)| placeholder(id, "Player", &Props::new().with("track", *track))),
        )
        .into()
}

fn setup() -> (Renderer, Hangar, Navigator, HostId) {
    let mut renderer = Renderer::new();
    let body = renderer.host_mut().create_element("body");
    let mut hangar = Hangar::new();
    hangar.register(player());
    (renderer, hangar, Navigator::new(), body)
}

fn button_of(renderer: &Renderer, storage: HostId) -> HostId {
    renderer.host().children(storage)[0]
}

// =============================================================================
// RELOCATION
// =============================================================================

#[test]
fn player_survives_navigation_with_state() {
    let (mut renderer, mut hangar, mut nav, body) = setup();

    let first = nav
        .navigate(
            &mut renderer,
            &mut hangar,
            body,
            page("Home", &[("player-1", "intro")]),
            &mut Immediate,
        )
        .unwrap();
    assert_eq!(first.hydrated, vec!["player-1".to_string()]);

    let storage = hangar.entry("player-1").unwrap().storage();
    let old_placeholder = hangar.entry("player-1").unwrap().placement(renderer.host()).unwrap();
    assert_eq!(renderer.host().tag(storage), Some(STORAGE_TAG));

    renderer.dispatch(button_of(&renderer, storage), &Event::new("click"));
    renderer.dispatch(button_of(&renderer, storage), &Event::new("click"));
    renderer.flush().unwrap();

    let second = nav
        .navigate(
            &mut renderer,
            &mut hangar,
            body,
            page("About", &[("player-1", "intro")]),
            &mut Immediate,
        )
        .unwrap();
    assert_eq!(second.relocated, vec!["player-1".to_string()]);
    assert!(second.hydrated.is_empty());

    let entry = hangar.entry("player-1").unwrap();
    assert_eq!(entry.storage(), storage, "same storage element");
    let placement = entry.placement(renderer.host()).unwrap();
    assert!(renderer.host().is_ancestor(body, placement));
    assert!(!renderer.host().contains(old_placeholder), "old document released");

    assert_eq!(
        host_children_to_string(renderer.host(), body),
        format!(
            r#"<main><h1>About</h1><div data-hangar-id="player-1" data-hangar-props="{}"><hangar-storage><button data-track="intro">2</button></hangar-storage></div></main>"#,
            spark_vdom::renderer::escape_attr(&spark_vdom::hangar::placeholder::encode_payload(
                "Player",
                &Props::new().with("track", "intro")
            ))
        )
    );
    assert_eq!(nav.navigations(), 2);
}

#[test]
fn changed_props_rerender_without_losing_state() {
    let (mut renderer, mut hangar, mut nav, body) = setup();
    nav.navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "one")]), &mut Immediate)
        .unwrap();
    let storage = hangar.entry("p").unwrap().storage();
    renderer.dispatch(button_of(&renderer, storage), &Event::new("click"));
    renderer.flush().unwrap();

    nav.navigate(&mut renderer, &mut hangar, body, page("B", &[("p", "two")]), &mut Immediate)
        .unwrap();

    let button = button_of(&renderer, storage);
    assert_eq!(
        spark_vdom::host_to_string(renderer.host(), button),
        r#"<button data-track="two">1</button>"#
    );
    assert_eq!(
        hangar.entry("p").unwrap().live_props().get("track").and_then(|v| v.as_str()),
        Some("two")
    );
}

// =============================================================================
// QUARANTINE
// =============================================================================

#[test]
fn absent_player_is_quarantined_then_restored() {
    let (mut renderer, mut hangar, mut nav, body) = setup();
    nav.navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "x")]), &mut Immediate)
        .unwrap();
    let storage = hangar.entry("p").unwrap().storage();
    renderer.dispatch(button_of(&renderer, storage), &Event::new("click"));
    renderer.flush().unwrap();

    let away = nav
        .navigate(&mut renderer, &mut hangar, body, page("B", &[]), &mut Immediate)
        .unwrap();
    assert_eq!(away.quarantined, vec!["p".to_string()]);
    assert!(hangar.is_quarantined("p"));
    assert!(renderer.host().parent(storage).is_none(), "storage is off-document");
    assert!(hangar.entry("p").unwrap().placement(renderer.host()).is_none());

    let back = nav
        .navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "x")]), &mut Immediate)
        .unwrap();
    assert_eq!(back.relocated, vec!["p".to_string()]);
    assert!(hangar.is_live("p"));
    assert_eq!(hangar.entry("p").unwrap().storage(), storage);
    assert_eq!(
        spark_vdom::host_to_string(renderer.host(), button_of(&renderer, storage)),
        r#"<button data-track="x">1</button>"#
    );
}

#[test]
fn bounded_retention_evicts_after_swaps() {
    let mut renderer = Renderer::new();
    let body = renderer.host_mut().create_element("body");
    let mut hangar = Hangar::with_policy(KeepForSwaps(2));
    hangar.register(player());
    let mut nav = Navigator::new();

    nav.navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "x")]), &mut Immediate)
        .unwrap();
    let storage = hangar.entry("p").unwrap().storage();

    let one = nav
        .navigate(&mut renderer, &mut hangar, body, page("B", &[]), &mut Immediate)
        .unwrap();
    assert!(one.evicted.is_empty());
    let two = nav
        .navigate(&mut renderer, &mut hangar, body, page("C", &[]), &mut Immediate)
        .unwrap();
    assert!(two.evicted.is_empty());
    let three = nav
        .navigate(&mut renderer, &mut hangar, body, page("D", &[]), &mut Immediate)
        .unwrap();

    assert_eq!(three.evicted, vec!["p".to_string()]);
    assert!(hangar.entry("p").is_none());
    assert!(!renderer.host().contains(storage));
    assert!(!renderer.is_mounted(storage));
    assert_eq!(renderer.host().listener_count(), 0);
}

#[test]
fn unknown_component_fails_navigation() {
    let (mut renderer, mut hangar, mut nav, body) = setup();
    let page = VNode::element("main").child(placeholder("w", "Weather", &Props::new()));

    let err = nav
        .navigate(&mut renderer, &mut hangar, body, page, &mut Immediate)
        .unwrap_err();
    assert_eq!(err.code(), "ERR_UNKNOWN_COMPONENT");
    assert!(hangar.is_empty());
}

// =============================================================================
// FAILED NAVIGATION
// =============================================================================

#[test]
fn bad_payload_leaves_document_and_player_in_place() {
    let (mut renderer, mut hangar, mut nav, body) = setup();
    nav.navigate(
        &mut renderer,
        &mut hangar,
        body,
        page("Home", &[("player-1", "intro")]),
        &mut Immediate,
    )
    .unwrap();
    let before = host_children_to_string(renderer.host(), body);
    let storage = hangar.entry("player-1").unwrap().storage();

    let broken = VNode::element("main").child(
        VNode::element("div")
            .attr(spark_vdom::hangar::placeholder::ID_ATTR, "player-1")
            .attr(spark_vdom::hangar::placeholder::PROPS_ATTR, "{bad"),
    );
    let err = nav
        .navigate(&mut renderer, &mut hangar, body, broken, &mut Immediate)
        .unwrap_err();

    assert_eq!(err.code(), "ERR_PLACEHOLDER_PAYLOAD");
    assert_eq!(host_children_to_string(renderer.host(), body), before);
    assert!(hangar.is_live("player-1"));
    let placement = hangar.entry("player-1").unwrap().placement(renderer.host()).unwrap();
    assert_eq!(renderer.host().parent(storage), Some(placement));
    assert_eq!(nav.navigations(), 1);
}

#[test]
fn failure_after_swap_quarantines_lifted_players() {
    let (mut renderer, mut hangar, mut nav, body) = setup();
    nav.navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "x")]), &mut Immediate)
        .unwrap();
    let storage = hangar.entry("p").unwrap().storage();

    // The bad placeholder only exists once the component has rendered.
    let embed = Component::new("Embed", |_props: &Props| {
        Ok(placeholder("w", "Weather", &Props::new()).into())
    });
    let next = VNode::element("main").child(VNode::component(&embed, Props::new()));
    let err = nav
        .navigate(&mut renderer, &mut hangar, body, next, &mut Immediate)
        .unwrap_err();

    assert_eq!(err.code(), "ERR_UNKNOWN_COMPONENT");
    assert!(!hangar.is_live("p"));
    assert!(hangar.is_quarantined("p"));
    assert!(renderer.host().parent(storage).is_none());

    let back = nav
        .navigate(&mut renderer, &mut hangar, body, page("A", &[("p", "x")]), &mut Immediate)
        .unwrap();
    assert_eq!(back.relocated, vec!["p".to_string()]);
    assert_eq!(hangar.entry("p").unwrap().storage(), storage);
}
