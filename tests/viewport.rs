mod common;

use std::collections::HashSet;

use common::three_generations;
use genealogy_tui::{
    family::{build_tree_view, LayoutConfig, ViewFilter, ViewMode},
    geometry::{Point, Size},
    viewport::{
        Gesture, Minimap, TreeEvent, ViewportAction, ViewportConfig, ViewportState, ZoomLevel,
    },
};

fn close(a: Point, b: Point) -> bool {
    a.distance(b) < 1e-9
}

fn run(
    state: ViewportState,
    actions: impl IntoIterator<Item = ViewportAction>,
) -> (ViewportState, Vec<TreeEvent>) {
    let config = ViewportConfig::default();
    actions
        .into_iter()
        .fold((state, Vec::new()), |(state, mut events), action| {
            let (state, new) = state.apply(action, &config);
            events.extend(new);
            (state, events)
        })
}

#[test]
fn test_centering_on_a_card_puts_it_mid_screen() {
    let layout = LayoutConfig::default();
    let view = build_tree_view(
        &three_generations(),
        &ViewFilter::default(),
        &HashSet::new(),
        &layout,
    );
    let node = view.layout.find_node("T3").unwrap();
    let center = node.card(&layout).center() + Point::new(view.layout.x_offset, 0.0);

    let state = ViewportState::new(Size::new(1200.0, 800.0), &ViewportConfig::default());
    let (state, _) = run(state, [ViewportAction::ZoomIn, ViewportAction::CenterOn(center)]);

    assert!(close(state.to_screen(center), Point::new(600.0, 400.0)));
    assert!(state.view_box().contains(center));
}

#[test]
fn test_minimap_click_recenters_on_clicked_content() {
    let state = ViewportState::new(Size::new(1000.0, 600.0), &ViewportConfig::default());
    let minimap = Minimap::new(Size::new(200.0, 120.0), Size::new(2000.0, 900.0));
    let point = Point::new(50.0, 40.0);

    let (state, events) = run(state, [ViewportAction::MinimapClick { point, minimap }]);

    let content = minimap.to_content(point).unwrap();
    assert!(close(state.to_screen(content), Point::new(500.0, 300.0)));
    assert!(events.is_empty());
}

#[test]
fn test_drag_then_pinch_session() {
    let state = ViewportState::new(Size::new(1000.0, 600.0), &ViewportConfig::default());
    let (state, _) = run(
        state,
        [
            ViewportAction::PointerDown(Point::new(100.0, 100.0)),
            ViewportAction::PointerMove(Point::new(160.0, 70.0)),
            ViewportAction::PointerUp,
        ],
    );
    assert_eq!(state.pan, Point::new(60.0, -30.0));
    assert_eq!(state.gesture, Gesture::Idle);

    let (state, _) = run(
        state,
        [
            ViewportAction::TouchStart(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)]),
            ViewportAction::TouchMove(vec![Point::new(0.0, 0.0), Point::new(1000.0, 0.0)]),
            ViewportAction::TouchEnd,
        ],
    );
    assert!((state.scale - 2.0).abs() < 1e-9, "pinch clamps at max_scale");
    assert_eq!(state.zoom_level(), ZoomLevel::Full);
    assert_eq!(state.pan, Point::new(60.0, -30.0), "pinch keeps the pan");
}

#[test]
fn test_mode_and_collapse_events_reach_the_host() {
    let state = ViewportState::new(Size::new(1000.0, 600.0), &ViewportConfig::default());
    let (state, events) = run(
        state,
        [
            ViewportAction::SetViewMode {
                mode: ViewMode::Descendants,
                fallback_focus: Some("G".to_string()),
            },
            ViewportAction::ToggleCollapse("S1".to_string()),
            ViewportAction::SetBranchRoot(Some("S2".to_string())),
            ViewportAction::SetBranchRoot(Some("S2".to_string())),
        ],
    );

    assert_eq!(
        events,
        vec![
            TreeEvent::ViewModeChanged(ViewMode::Descendants),
            TreeEvent::CollapseToggled("S1".to_string()),
            TreeEvent::BranchRootChanged(Some("S2".to_string())),
        ]
    );
    let filter = state.filter();
    assert_eq!(filter.focus.as_deref(), Some("G"));
    assert_eq!(filter.branch_root.as_deref(), Some("S2"));
    assert!(state.collapsed.contains("S1"));
}
