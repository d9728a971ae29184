use std::cell::RefCell;
use std::rc::Rc;

use glide_core::config::{AutoplayConfig, AutoplayDirection, EngineConfig, SpringParams};
use glide_core::motion::boundary::{self, Bounds};
use glide_core::motion::{GestureState, MotionEngine, PointerSample};
use glide_core::Error;

const EXTENT: f64 = 400.0;
const FRAME_MS: f64 = 16.0;

fn engine_with(config: EngineConfig) -> (MotionEngine, Rc<RefCell<Vec<usize>>>) {
    let mut engine = MotionEngine::new(config).expect("valid config");
    engine.set_extent(EXTENT);
    let fired = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fired);
    engine.on_index_change(move |index| sink.borrow_mut().push(index));
    (engine, fired)
}

fn settle(engine: &mut MotionEngine) {
    for _ in 0..1000 {
        if engine.state() != GestureState::Settling {
            return;
        }
        engine.tick(FRAME_MS);
    }
    panic!("engine did not settle: {:?}", engine);
}

/// Settle frame by frame, handing every intermediate position to `check`
fn settle_checked(engine: &mut MotionEngine, mut check: impl FnMut(usize, f64)) {
    for tick in 1..=1000 {
        if engine.state() != GestureState::Settling {
            return;
        }
        engine.tick(FRAME_MS);
        check(tick, engine.position());
    }
    panic!("engine did not settle: {:?}", engine);
}

/// Drag along `path` of (x px, t ms) and release 16ms after the last point
fn fling(engine: &mut MotionEngine, path: &[(f64, f64)]) {
    let (x0, t0) = path[0];
    assert!(engine.drag_start(PointerSample::at(x0, t0)));
    for &(x, t) in &path[1..] {
        engine.drag_update(PointerSample::at(x, t));
    }
    let &(x, t) = path.last().unwrap();
    assert!(engine.drag_end(PointerSample::at(x, t + 16.0)));
}

/// Drag by `fraction` of a slide toward higher indices and release at rest
fn slow_drag(engine: &mut MotionEngine, fraction: f64) {
    let start = 350.0;
    let end = start - fraction * EXTENT;
    assert!(engine.drag_start(PointerSample::at(start, 0.0)));
    assert!(engine.drag_update(PointerSample::at(end, 100.0)));
    // Held still well past the velocity window before lifting
    assert!(engine.drag_update(PointerSample::at(end, 600.0)));
    assert!(engine.drag_end(PointerSample::at(end, 700.0)));
}

fn bounded_three() -> EngineConfig {
    EngineConfig {
        item_count: 3,
        default_index: 1,
        loop_mode: false,
        stuck_at_boundary: true,
        ..EngineConfig::default()
    }
}

#[test]
fn test_scenario_a_short_drag_stays() {
    let (mut engine, fired) = engine_with(bounded_three());
    slow_drag(&mut engine, 0.4);
    assert_eq!(engine.target_index(), 1);
    settle(&mut engine);
    assert_eq!(engine.position(), 1.0);
    assert!(fired.borrow().is_empty());
}

#[test]
fn test_scenario_b_long_drag_advances() {
    let (mut engine, fired) = engine_with(bounded_three());
    slow_drag(&mut engine, 0.6);
    assert_eq!(engine.target_index(), 2);
    assert_eq!(*fired.borrow(), vec![2], "index reported at release");
    settle(&mut engine);
    assert_eq!(engine.position(), 2.0);
    assert_eq!(*fired.borrow(), vec![2]);
}

fn looping_autoplay() -> EngineConfig {
    EngineConfig {
        item_count: 5,
        loop_mode: true,
        autoplay: AutoplayConfig {
            direction: AutoplayDirection::Forward,
            interval_ms: 3000,
        },
        ..EngineConfig::default()
    }
}

#[test]
fn test_scenario_c_external_autoplay_timer() {
    let (mut engine, fired) = engine_with(looping_autoplay());
    let mut targets = Vec::new();
    for _ in 0..3 {
        assert!(engine.autoplay_tick());
        targets.push(engine.target_index());
        settle(&mut engine);
    }
    assert_eq!(targets, vec![1, 2, 3]);
    assert_eq!(*fired.borrow(), vec![1, 2, 3]);
    assert_eq!(engine.position(), 3.0);
}

#[test]
fn test_scenario_c_frame_driven_autoplay() {
    let (mut engine, fired) = engine_with(looping_autoplay());
    // Each cycle: 3000ms idle, then well under 2000ms of settling
    let mut elapsed = 0.0;
    while fired.borrow().len() < 3 && elapsed < 20_000.0 {
        engine.tick(FRAME_MS);
        elapsed += FRAME_MS;
    }
    assert_eq!(*fired.borrow(), vec![1, 2, 3]);
    assert!(elapsed > 9000.0, "advanced too early: {}ms", elapsed);
}

#[test]
fn test_autoplay_wraps_in_loop_mode() {
    let (mut engine, fired) = engine_with(EngineConfig {
        default_index: 4,
        ..looping_autoplay()
    });
    assert!(engine.autoplay_tick());
    settle(&mut engine);
    assert_eq!(*fired.borrow(), vec![0]);
    assert_eq!(engine.position(), 0.0);
    assert_eq!(engine.raw_position(), 0.0);
}

#[test]
fn test_scenario_d_cancel_restores_exactly() {
    let (mut engine, fired) = engine_with(bounded_three());
    assert!(engine.drag_start(PointerSample::at(350.0, 0.0)));
    engine.drag_update(PointerSample::at(250.0, 16.0));
    engine.drag_update(PointerSample::at(170.0, 32.0));
    assert!(engine.position() > 1.4);

    assert!(engine.drag_cancel());
    assert_eq!(engine.state(), GestureState::Settling);
    settle(&mut engine);
    assert_eq!(engine.position(), 1.0);
    assert_eq!(engine.position().fract(), 0.0);
    assert!(fired.borrow().is_empty());
}

#[test]
fn test_loop_swipe_to_uses_modulus() {
    for n in [-11_i64, -6, -5, -1, 0, 3, 4, 5, 9, 12] {
        let (mut engine, _) = engine_with(EngineConfig {
            item_count: 5,
            loop_mode: true,
            ..EngineConfig::default()
        });
        assert!(engine.swipe_to(n));
        let expected = (((n % 5) + 5) % 5) as usize;
        assert_eq!(engine.target_index(), expected, "swipe_to({})", n);
        settle(&mut engine);
        assert_eq!(engine.position(), expected as f64, "swipe_to({})", n);
    }
}

#[test]
fn test_swipe_to_current_is_idempotent() {
    let (mut engine, fired) = engine_with(EngineConfig::default());
    assert!(engine.swipe_to(2));
    settle(&mut engine);
    let first = engine.position();

    for _ in 0..2 {
        assert!(engine.swipe_to(2));
        settle(&mut engine);
        assert_eq!(engine.position(), first);
    }
    assert_eq!(*fired.borrow(), vec![2]);
}

#[test]
fn test_hard_stop_keeps_release_inside_range() {
    let config = EngineConfig {
        item_count: 4,
        rubberband: false,
        ..EngineConfig::default()
    };
    // Pointer paths that shove past both ends at varying speeds
    let paths: [&[(f64, f64)]; 5] = [
        &[(0.0, 0.0), (900.0, 16.0), (1400.0, 32.0)],
        &[(0.0, 0.0), (-2000.0, 10.0), (-2600.0, 20.0)],
        &[(0.0, 0.0), (-150.0, 16.0), (-300.0, 32.0)],
        &[(0.0, 0.0), (60.0, 200.0)],
        &[(0.0, 0.0), (-5000.0, 1.0)],
    ];
    for (start_index, path) in [0_i64, 3, 1, 0, 2].into_iter().zip(paths) {
        let (mut engine, _) = engine_with(EngineConfig {
            default_index: start_index,
            ..config.clone()
        });
        let (x0, t0) = path[0];
        assert!(engine.drag_start(PointerSample::at(x0, t0)));
        for &(x, t) in &path[1..] {
            engine.drag_update(PointerSample::at(x, t));
            assert!((0.0..=3.0).contains(&engine.position()));
        }
        let &(x, t) = path.last().unwrap();
        engine.drag_end(PointerSample::at(x, t + 16.0));
        assert!((0.0..=3.0).contains(&engine.position()), "{:?}", path);
        settle_checked(&mut engine, |tick, position| {
            assert!(
                (0.0..=3.0).contains(&position),
                "{:?}: tick {} at {}",
                path,
                tick,
                position
            );
        });
        assert_eq!(engine.position().fract(), 0.0);
    }
}

#[test]
fn test_rubberband_release_only_heads_back_in() {
    let overshoot = SpringParams::default().overshoot_limit;
    let cases: [(i64, &[(f64, f64)]); 2] = [
        (4, &[(0.0, 0.0), (-300.0, 10.0), (-600.0, 20.0)]),
        (0, &[(0.0, 0.0), (300.0, 10.0), (600.0, 20.0)]),
    ];
    for (start_index, path) in cases {
        let (mut engine, fired) = engine_with(EngineConfig {
            default_index: start_index,
            ..EngineConfig::default()
        });
        fling(&mut engine, path);
        let outside = |position: f64| (position - 4.0).max(-position).max(0.0);
        let mut last_outside = outside(engine.position());
        assert!(last_outside > 0.0, "release should be past the bound");

        settle_checked(&mut engine, |tick, position| {
            let now = outside(position);
            assert!(
                now <= last_outside + 1e-12,
                "tick {}: moved further out to {}",
                tick,
                position
            );
            last_outside = now;
            // Coming back in, the spring may pass the bound by the overshoot limit only
            let inward = if start_index == 0 { position } else { 4.0 - position };
            assert!(
                inward <= overshoot + 1e-9,
                "tick {}: overshot the bound to {}",
                tick,
                position
            );
        });
        assert_eq!(engine.position(), start_index as f64);
        assert!(fired.borrow().is_empty());
    }
}

#[test]
fn test_fling_overshoot_is_bounded() {
    let overshoot = SpringParams::default().overshoot_limit;
    for loop_mode in [false, true] {
        let (mut engine, fired) = engine_with(EngineConfig {
            default_index: 1,
            loop_mode,
            ..EngineConfig::default()
        });
        // 0.3 of a slide in 24ms: fast enough to commit to the next slide
        fling(&mut engine, &[(0.0, 0.0), (-40.0, 8.0), (-80.0, 16.0), (-120.0, 24.0)]);
        assert_eq!(engine.target_index(), 2);
        let mut peak = f64::MIN;
        settle_checked(&mut engine, |_, position| peak = peak.max(position));
        assert!(
            peak <= 2.0 + overshoot + 1e-9,
            "loop {}: overshoot to {}",
            loop_mode,
            peak
        );
        assert_eq!(engine.position(), 2.0);
        assert_eq!(*fired.borrow(), vec![2]);
    }
}

#[test]
fn test_rubberband_resists_but_returns() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    engine.drag_start(PointerSample::at(0.0, 0.0));
    engine.drag_update(PointerSample::at(200.0, 16.0));
    let overscroll = engine.position();
    assert!(overscroll < 0.0 && overscroll > -0.5, "{}", overscroll);
    engine.drag_end(PointerSample::at(200.0, 500.0));
    settle(&mut engine);
    assert_eq!(engine.position(), 0.0);
}

#[test]
fn test_resistance_curve() {
    assert_eq!(boundary::resistance(0.0, 0.55), 1.0);
    let mut last = 1.0;
    for step in 1..50 {
        let r = boundary::resistance(step as f64 * 0.1, 0.55);
        assert!(r < last);
        last = r;
    }
    let bounds = Bounds::new(0.0, 2.0);
    assert_eq!(boundary::clamp(-1.0, bounds, false, 0.55), 0.0);
}

#[test]
fn test_empty_track_is_permanently_idle() {
    let (mut engine, fired) = engine_with(EngineConfig {
        item_count: 0,
        autoplay: AutoplayConfig {
            direction: AutoplayDirection::Forward,
            interval_ms: 100,
        },
        ..EngineConfig::default()
    });
    assert!(!engine.drag_start(PointerSample::at(0.0, 0.0)));
    assert!(!engine.drag_update(PointerSample::at(50.0, 16.0)));
    assert!(!engine.drag_end(PointerSample::at(50.0, 32.0)));
    assert!(!engine.drag_cancel());
    assert!(!engine.swipe_to(3));
    assert!(!engine.swipe_next());
    assert!(!engine.swipe_prev());
    assert!(!engine.autoplay_tick());
    for _ in 0..100 {
        engine.tick(FRAME_MS);
    }
    assert_eq!(engine.state(), GestureState::Idle);
    assert_eq!(engine.position(), 0.0);
    assert!(fired.borrow().is_empty());
}

#[test]
fn test_drag_ignored_until_layout_measured() {
    let mut engine = MotionEngine::new(EngineConfig::default()).unwrap();
    engine.set_extent(-10.0);
    assert!(engine.drag_start(PointerSample::at(300.0, 0.0)));
    assert!(!engine.drag_update(PointerSample::at(100.0, 16.0)));
    assert_eq!(engine.position(), 0.0);

    engine.set_extent(EXTENT);
    assert!(engine.drag_update(PointerSample::at(100.0, 32.0)));
    assert!((engine.position() - 0.5).abs() < 1e-9);
}

#[test]
fn test_second_drag_start_rejected() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    assert!(engine.drag_start(PointerSample::at(300.0, 0.0)));
    engine.drag_update(PointerSample::at(200.0, 16.0));
    assert!(!engine.drag_start(PointerSample::at(10.0, 20.0)));
    // The original gesture continues from its own origin
    engine.drag_update(PointerSample::at(100.0, 32.0));
    assert!((engine.position() - 0.5).abs() < 1e-9);
}

#[test]
fn test_dispose_silences_everything() {
    let (mut engine, fired) = engine_with(looping_autoplay());
    assert!(engine.swipe_next());
    engine.tick(FRAME_MS);
    engine.dispose();
    engine.dispose();

    for _ in 0..500 {
        engine.tick(FRAME_MS);
    }
    assert!(!engine.autoplay_tick());
    assert!(!engine.swipe_to(4));
    assert!(!engine.drag_start(PointerSample::at(0.0, 0.0)));
    assert_eq!(*fired.borrow(), vec![1]);
    assert!(engine.is_disposed());
}

#[test]
fn test_invalid_spring_fails_construction() {
    let result = MotionEngine::new(EngineConfig {
        spring: SpringParams {
            stiffness: 0.0,
            ..SpringParams::default()
        },
        ..EngineConfig::default()
    });
    match result {
        Err(Error::InvalidConfig { field, .. }) => assert_eq!(field, "spring.stiffness"),
        other => panic!("expected invalid config, got {:?}", other),
    }
}
