use tour_engine::{
    modal_layout, world_to_screen_px, InputAction, InputSnapshot, OverlayContent, SceneSequence,
    StageTransition, TickReport, Vec2,
};

use super::benefits::zone_debug_name;
use super::build_stages;
use super::build_steps::SIGNPOST_NAMES;
use super::content::{benefit_overlay, BUILD_STEP_COUNT};
use super::examples::station_debug_name;
use super::session::{BenefitKey, SessionState, StationKey};
use super::stage::{Stage, StagePhase};
use super::stations::sha256_hex;
use crate::app::settings::TourSettings;

const DT: f32 = 1.0 / 60.0;
const WINDOW: (u32, u32) = (960, 540);

const TITLE: usize = 0;
const BENEFITS: usize = 1;
const BRIDGE: usize = 2;
const BUILD_STEPS: usize = 3;
const EXAMPLES: usize = 4;
const CONCLUSION: usize = 5;

type Tour = SceneSequence<Stage, SessionState>;

fn tour_with(settings: TourSettings) -> Tour {
    let mut tour =
        SceneSequence::new(build_stages(&settings), SessionState::default()).expect("stages");
    tour.load_active();
    tour
}

fn tour() -> Tour {
    tour_with(TourSettings::default())
}

fn tour_at(stage: usize) -> Tour {
    let mut tour = tour();
    for _ in 0..stage {
        tour.advance().expect("advance");
    }
    assert_eq!(tour.active_index(), stage);
    tour
}

fn idle() -> InputSnapshot {
    InputSnapshot::empty().with_window_size(WINDOW)
}

fn confirm() -> InputSnapshot {
    idle().with_confirm_pressed(true)
}

fn progress() -> InputSnapshot {
    idle().with_progress_pressed(true)
}

fn click_px(x: i32, y: i32) -> InputSnapshot {
    idle()
        .with_cursor_position_px(Some(Vec2::new(x as f32, y as f32)))
        .with_left_click_pressed(true)
}

fn click_world(position: Vec2) -> InputSnapshot {
    let (x, y) = world_to_screen_px(WINDOW, position);
    click_px(x, y)
}

fn step(tour: &mut Tour, input: InputSnapshot) -> TickReport {
    tour.tick(DT, &input)
}

fn teleport_actor_to(tour: &mut Tour, debug_name: &str) {
    let world = tour.active_world_mut();
    let target = world
        .find_by_debug_name(debug_name)
        .unwrap_or_else(|| panic!("missing entity {debug_name}"))
        .transform
        .position;
    let actor = world.find_by_debug_name("actor").expect("actor").id;
    world.find_entity_mut(actor).expect("actor").transform.position = target;
}

fn overlay_title(tour: &Tour) -> Option<String> {
    tour.active_world()
        .overlay()
        .active_content()
        .map(|content| content.title.clone())
}

fn advance_visible(tour: &Tour) -> bool {
    tour.active_world()
        .find_by_debug_name("advance_button")
        .expect("advance button")
        .visible
}

fn advance_button_position(tour: &Tour) -> Vec2 {
    tour.active_world()
        .find_by_debug_name("advance_button")
        .expect("advance button")
        .transform
        .position
}

/// Touches `debug_name`, expects an overlay, and dismisses it with Enter.
fn trigger_and_dismiss(tour: &mut Tour, debug_name: &str) -> String {
    teleport_actor_to(tour, debug_name);
    step(tour, idle());
    let title = overlay_title(tour).unwrap_or_else(|| panic!("no overlay for {debug_name}"));
    let report = step(tour, confirm());
    assert!(report.dismissed.is_some());
    assert_eq!(report.transition, None, "dismissal must not advance");
    title
}

fn phase(tour: &Tour) -> StagePhase {
    tour.active_scene().frame().phase()
}

#[test]
fn full_tour_end_to_end_then_replay() {
    let mut tour = tour();
    assert_eq!(tour.active_debug_name(), "title");
    assert!(advance_visible(&tour));

    let report = step(&mut tour, confirm());
    assert_eq!(
        report.transition,
        Some(StageTransition {
            from: TITLE,
            to: BENEFITS,
            replay: false
        })
    );

    let order = [
        BenefitKey::Portability,
        BenefitKey::Performance,
        BenefitKey::Ecosystem,
        BenefitKey::MemorySafety,
        BenefitKey::Concurrency,
    ];
    for key in order {
        assert!(!advance_visible(&tour));
        let title = trigger_and_dismiss(&mut tour, zone_debug_name(key));
        assert_eq!(title, benefit_overlay(key).title);
    }
    assert!(tour.context().all_benefits_collected());
    assert!(advance_visible(&tour));
    step(&mut tour, confirm());
    assert_eq!(tour.active_index(), BRIDGE);

    let mut overlays = 0;
    for press in 1..=20 {
        step(&mut tour, progress());
        if tour.active_world().overlay().is_blocking() {
            overlays += 1;
            assert_eq!(press, 20, "overlay before max");
        }
    }
    assert_eq!(overlays, 1);
    assert_eq!(overlay_title(&tour).as_deref(), Some("Bridge built"));
    step(&mut tour, confirm());
    assert!(advance_visible(&tour));
    step(&mut tour, confirm());
    assert_eq!(tour.active_index(), BUILD_STEPS);

    let mut step_overlays = 0;
    for name in SIGNPOST_NAMES {
        assert!(!advance_visible(&tour));
        trigger_and_dismiss(&mut tour, name);
        step_overlays += 1;
    }
    assert_eq!(step_overlays, BUILD_STEP_COUNT);
    assert!(advance_visible(&tour));
    step(&mut tour, confirm());
    assert_eq!(tour.active_index(), EXAMPLES);

    for key in [
        StationKey::Checksum,
        StationKey::Sha256,
        StationKey::RandomId,
        StationKey::HexEncode,
    ] {
        assert!(!advance_visible(&tour));
        trigger_and_dismiss(&mut tour, station_debug_name(key));
    }
    assert!(tour.context().all_stations_visited());
    assert!(advance_visible(&tour));
    step(&mut tour, confirm());
    assert_eq!(tour.active_index(), CONCLUSION);
    assert!(tour.is_last_stage());

    let replay = advance_button_position(&tour);
    let report = step(&mut tour, click_world(replay));
    assert_eq!(
        report.transition,
        Some(StageTransition {
            from: CONCLUSION,
            to: TITLE,
            replay: true
        })
    );
    assert!(tour.context().is_empty());
    assert_eq!(tour.active_debug_name(), "title");
}

#[test]
fn benefits_advance_stays_hidden_until_all_five_collected() {
    let mut tour = tour_at(BENEFITS);
    for key in &BenefitKey::ALL[..4] {
        trigger_and_dismiss(&mut tour, zone_debug_name(*key));
    }
    assert!(!advance_visible(&tour));
    assert_eq!(step(&mut tour, confirm()).transition, None);
    assert_eq!(tour.active_index(), BENEFITS);

    trigger_and_dismiss(&mut tour, zone_debug_name(BenefitKey::Portability));
    assert!(advance_visible(&tour));
    assert_eq!(phase(&tour), StagePhase::Complete);
}

#[test]
fn completion_unlocks_even_when_overlay_cannot_be_shown() {
    let mut tour = tour_at(BENEFITS);
    for key in &BenefitKey::ALL[..4] {
        trigger_and_dismiss(&mut tour, zone_debug_name(*key));
    }
    tour.active_world_mut()
        .overlay_mut()
        .present(OverlayContent::new("Busy", "Someone else's overlay"))
        .expect("present");

    teleport_actor_to(&mut tour, zone_debug_name(BenefitKey::Portability));
    step(&mut tour, idle());
    assert!(tour.context().all_benefits_collected());
    assert_eq!(overlay_title(&tour).as_deref(), Some("Busy"));
    assert_eq!(phase(&tour), StagePhase::Complete);
    assert!(advance_visible(&tour));

    let report = step(&mut tour, confirm());
    assert!(report.dismissed.is_some());
    assert_eq!(report.transition, None);
    assert_eq!(step(&mut tour, confirm()).transition.map(|t| t.to), Some(BRIDGE));
}

#[test]
fn collected_benefit_never_shows_a_second_overlay() {
    let mut tour = tour_at(BENEFITS);
    let zone = zone_debug_name(BenefitKey::Concurrency);
    trigger_and_dismiss(&mut tour, zone);

    teleport_actor_to(&mut tour, zone);
    for _ in 0..10 {
        step(&mut tour, idle());
        assert!(!tour.active_world().overlay().is_blocking());
    }
    assert_eq!(tour.context().benefits_collected_count(), 1);
}

#[test]
fn triggers_do_not_fire_while_overlay_is_open() {
    let mut tour = tour_at(BENEFITS);
    teleport_actor_to(&mut tour, zone_debug_name(BenefitKey::Performance));
    step(&mut tour, idle());
    let blocked_on = phase(&tour);
    assert!(matches!(blocked_on, StagePhase::OverlayBlocked(_)));

    teleport_actor_to(&mut tour, zone_debug_name(BenefitKey::Ecosystem));
    step(&mut tour, idle());
    assert_eq!(phase(&tour), blocked_on);
    assert!(!tour.context().is_benefit_collected(BenefitKey::Ecosystem));

    step(&mut tour, confirm());
    step(&mut tour, idle());
    assert!(tour.context().is_benefit_collected(BenefitKey::Ecosystem));
}

#[test]
fn directional_input_still_moves_actor_under_overlay() {
    let mut tour = tour_at(BENEFITS);
    teleport_actor_to(&mut tour, zone_debug_name(BenefitKey::Performance));
    step(&mut tour, idle());
    assert!(tour.active_world().overlay().is_blocking());

    let before = tour
        .active_world()
        .find_by_debug_name("actor")
        .expect("actor")
        .transform
        .position
        .x;
    step(
        &mut tour,
        idle().with_action_down(InputAction::MoveRight, true),
    );
    let after = tour
        .active_world()
        .find_by_debug_name("actor")
        .expect("actor")
        .transform
        .position
        .x;
    assert!(after > before);
}

#[test]
fn clicking_dismiss_button_closes_last_overlay_without_advancing() {
    let mut tour = tour_at(BENEFITS);
    for key in &BenefitKey::ALL[..4] {
        trigger_and_dismiss(&mut tour, zone_debug_name(*key));
    }
    teleport_actor_to(&mut tour, zone_debug_name(BenefitKey::Portability));
    step(&mut tour, idle());
    assert!(tour.active_world().overlay().is_blocking());

    let (x, y) = modal_layout(WINDOW).dismiss_button.center();
    let report = step(&mut tour, click_px(x, y));
    assert!(report.dismissed.is_some());
    assert_eq!(report.transition, None);
    assert!(advance_visible(&tour));

    let next = advance_button_position(&tour);
    let report = step(&mut tour, click_world(next));
    assert_eq!(report.transition.map(|transition| transition.to), Some(BRIDGE));
}

#[test]
fn bridge_overlay_fires_once_at_first_press_reaching_max() {
    let mut tour = tour_with(TourSettings {
        progress_step: 0.3,
        ..TourSettings::default()
    });
    for _ in 0..BRIDGE {
        tour.advance().expect("advance");
    }
    for _ in 0..3 {
        step(&mut tour, progress());
        assert!(!tour.active_world().overlay().is_blocking());
    }
    assert_eq!(
        tour.active_world().hud_lines().get(1).map(String::as_str),
        Some("Bridge 90%")
    );

    step(&mut tour, progress());
    assert_eq!(overlay_title(&tour).as_deref(), Some("Bridge built"));
    step(&mut tour, progress());
    step(&mut tour, confirm());
    assert!(advance_visible(&tour));

    for _ in 0..5 {
        step(&mut tour, progress());
        assert!(!tour.active_world().overlay().is_blocking());
    }
    let Stage::Bridge(bridge) = tour.active_scene() else {
        panic!("expected bridge stage");
    };
    assert_eq!(bridge.meter().value_bp(), 10_000);
}

#[test]
fn bridge_lays_planks_in_proportion_to_progress() {
    let mut tour = tour_at(BRIDGE);
    for _ in 0..9 {
        step(&mut tour, progress());
    }
    let laid = tour
        .active_world()
        .entities()
        .iter()
        .filter(|entity| entity.renderable.debug_name == "bridge.plank" && entity.visible)
        .count();
    assert_eq!(laid, 4);
    assert_eq!(
        tour.debug_title_active().as_deref(),
        Some("Bindings Tour | Bridge 45%")
    );
}

#[test]
fn out_of_order_signpost_changes_nothing() {
    let mut tour = tour_at(BUILD_STEPS);
    teleport_actor_to(&mut tour, SIGNPOST_NAMES[2]);
    for _ in 0..5 {
        step(&mut tour, idle());
        assert!(!tour.active_world().overlay().is_blocking());
    }
    let Stage::BuildSteps(stage) = tour.active_scene() else {
        panic!("expected build steps stage");
    };
    assert_eq!(stage.next_step(), 0);

    let title = trigger_and_dismiss(&mut tour, SIGNPOST_NAMES[0]);
    assert!(title.starts_with("1."));
    teleport_actor_to(&mut tour, SIGNPOST_NAMES[0]);
    step(&mut tour, idle());
    assert!(!tour.active_world().overlay().is_blocking());
}

#[test]
fn revisiting_station_shows_nothing_and_output_is_computed() {
    let mut tour = tour_at(EXAMPLES);
    let station = station_debug_name(StationKey::Sha256);
    teleport_actor_to(&mut tour, station);
    step(&mut tour, idle());
    let output = tour
        .active_world()
        .overlay()
        .active_content()
        .and_then(|content| content.output.clone());
    assert_eq!(output, Some(sha256_hex(b"bindings")));
    step(&mut tour, confirm());

    teleport_actor_to(&mut tour, station_debug_name(StationKey::HexEncode));
    teleport_actor_to(&mut tour, station);
    step(&mut tour, idle());
    assert!(!tour.active_world().overlay().is_blocking());
    assert_eq!(tour.context().stations_visited_count(), 1);
    assert!(!advance_visible(&tour));
}

#[test]
fn title_and_hud_follow_the_active_stage() {
    let mut tour = tour_at(BENEFITS);
    assert_eq!(
        tour.debug_title_active().as_deref(),
        Some("Bindings Tour | Benefits 0/5")
    );
    trigger_and_dismiss(&mut tour, zone_debug_name(BenefitKey::Ecosystem));
    assert_eq!(
        tour.active_world().hud_lines().get(1).map(String::as_str),
        Some("Benefits 1/5")
    );

    let title = tour_at(TITLE);
    assert_eq!(
        title.debug_title_active().as_deref(),
        Some("Bindings Tour | Title")
    );
    assert_eq!(
        title.active_world().hud_lines().last().map(String::as_str),
        Some("Press Enter or click Start.")
    );
}

#[test]
fn replay_mid_tour_resets_session_and_stage_state() {
    let mut tour = tour_at(BENEFITS);
    trigger_and_dismiss(&mut tour, zone_debug_name(BenefitKey::Performance));
    assert!(!tour.context().is_empty());

    tour.replay();
    assert!(tour.context().is_empty());
    assert_eq!(tour.active_index(), TITLE);

    tour.advance().expect("advance");
    let zone = tour
        .active_world()
        .find_by_debug_name(zone_debug_name(BenefitKey::Performance))
        .expect("zone");
    assert!(zone.visible);
}
