use super::*;

fn go_button() -> ButtonSpec {
    ButtonSpec::new(
        Rect::new(0, 0, 50, 50),
        Some("go".to_string()),
        Some(ButtonAction::StartRecording),
        None,
    )
    .unwrap()
}

#[test]
fn test_rect_edges_are_inclusive() {
    let rect = Rect::new(0, 0, 50, 50);

    assert!(rect.contains(Point::new(0, 0)));
    assert!(rect.contains(Point::new(49, 49)));
    assert!(!rect.contains(Point::new(50, 50)));
    assert!(!rect.contains(Point::new(50, 0)));
    assert!(!rect.contains(Point::new(-1, 10)));
}

#[test]
fn test_rect_center() {
    assert_eq!(Rect::new(270, 0, 50, 50).center(), Point::new(295, 25));
}

#[test]
fn test_spec_rejects_empty_rect() {
    assert!(ButtonSpec::new(Rect::new(0, 0, 0, 10), None, None, None).is_err());
    assert!(ButtonSpec::new(Rect::new(0, 0, 10, 0), None, None, None).is_err());
}

#[test]
fn test_icon_position_centers_icon() {
    let button = go_button();
    assert_eq!(button.icon_position(30, 20), Point::new(10, 15));
    // Oversized icons spill evenly over the edges
    assert_eq!(button.icon_position(60, 60), Point::new(-5, -5));
}

#[test]
fn test_hit_test_prefers_first_registered() {
    let mut registry = ButtonRegistry::new();
    registry.register(
        ButtonSpec::new(
            Rect::new(0, 0, 100, 100),
            None,
            Some(ButtonAction::NoOp),
            Some("first".to_string()),
        )
        .unwrap(),
    );
    registry.register(go_button());

    let hit = registry.hit_test(Point::new(10, 10)).unwrap();
    assert_eq!(hit.param.as_deref(), Some("first"));
    assert!(registry.hit_test(Point::new(200, 200)).is_none());
}

#[test]
fn test_dispatch_passes_action_and_param() {
    let mut registry = ButtonRegistry::new();
    registry.register(go_button());
    registry.register(
        ButtonSpec::new(
            Rect::new(100, 100, 20, 20),
            None,
            Some(ButtonAction::NoOp),
            Some("hello".to_string()),
        )
        .unwrap(),
    );

    let mut calls: Vec<(ButtonAction, Option<String>)> = Vec::new();

    assert!(registry.dispatch(Point::new(25, 25), |action, param| {
        calls.push((action, param.map(str::to_string)))
    }));
    assert!(registry.dispatch(Point::new(110, 110), |action, param| {
        calls.push((action, param.map(str::to_string)))
    }));
    assert!(!registry.dispatch(Point::new(300, 200), |action, param| {
        calls.push((action, param.map(str::to_string)))
    }));

    assert_eq!(
        calls,
        vec![
            (ButtonAction::StartRecording, None),
            (ButtonAction::NoOp, Some("hello".to_string())),
        ]
    );
}

#[test]
fn test_dispatch_without_action_is_a_hit_but_no_call() {
    let mut registry = ButtonRegistry::new();
    registry.register(ButtonSpec::new(Rect::new(0, 0, 10, 10), None, None, None).unwrap());

    let mut called = false;
    assert!(registry.dispatch(Point::new(5, 5), |_, _| called = true));
    assert!(!called);
}

#[test]
fn test_registry_from_default_configs() {
    let config = crate::config::DashcamConfig::default();
    let registry = ButtonRegistry::from_configs(&config.buttons).unwrap();

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.hit_test(Point::new(0, 0)).unwrap().action,
        Some(ButtonAction::StartRecording)
    );
    assert_eq!(
        registry.hit_test(Point::new(319, 49)).unwrap().action,
        Some(ButtonAction::Shutdown)
    );
    assert!(registry.hit_test(Point::new(160, 120)).is_none());

    // Icons are named by file stem, as IconSet keys them
    assert_eq!(registry.buttons()[0].icon, go_button().icon);
}
