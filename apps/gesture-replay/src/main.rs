use panwheel_canvas::{CanvasTransform, CanvasView, RotationGesture, WheelPanZoom};
use panwheel_gestures::{WheelEventData, WheelEventTarget, WheelGestures, WheelGesturesOptions};
use panwheel_testing::{
    generate_events, insert_finger_lift, record_phases, GestureRecorder, PhaseRange, SwipeTrace,
};
use std::cell::RefCell;
use std::rc::Rc;

fn main() {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format_timestamp_millis()
        .init();

    println!("=== panwheel gesture replay ===");
    println!("Set RUST_LOG=trace to see every engine transition.");
    println!();

    replay("trackpad swipe", &SwipeTrace::default().events());
    replay(
        "mouse wheel, 500px over one second",
        &generate_events([0.0, 500.0, 0.0], 1000.0),
    );

    let mut lifted = SwipeTrace::default().events();
    insert_finger_lift(&mut lifted, 5);
    replay("swipe with finger lift", &lifted);

    replay_momentum_cancel();
    replay_pan_zoom();
}

fn replay(title: &str, events: &[WheelEventData]) {
    println!("-- {title} ({} events)", events.len());
    for phase in record_phases(events) {
        print_phase(&phase);
    }
    println!();
}

fn print_phase(phase: &PhaseRange) {
    println!(
        "   {:?} events {}..={}: movement {:?}, cancel {}",
        phase.wheel_type,
        phase.range[0],
        phase.range[1],
        phase.axis_movement,
        phase.is_momentum_cancel
    );
}

/// A hard flick while the previous swipe is still coasting.
fn replay_momentum_cancel() {
    let trace = SwipeTrace::default().with_momentum_events(12);
    let mut recorder = GestureRecorder::new();
    recorder.feed_events_pending(&trace.events(), |_, _| {});
    let coasting = recorder.gestures().is_momentum();

    let flick = WheelEventData::pixels(0.0, 120.0, trace.end_ms() + 16.0);
    recorder.feed_events(&[flick]);

    println!("-- momentum cancel (coasting before flick: {coasting})");
    for state in recorder.endings() {
        println!(
            "   ending: momentum {}, cancel {}, movement {:?}",
            state.is_momentum, state.is_momentum_cancel, state.axis_movement
        );
    }
    println!();
}

/// Canvas of 800x600 filling its wrapper. Coordinate conversions ignore
/// rotation; `rotate_canvas` keeps the pivot in place.
struct FullViewCanvas;

impl FullViewCanvas {
    const SIZE: [f64; 2] = [800.0, 600.0];

    /// Client position of canvas pixel `point` under scale and rotation.
    fn place(scale: f64, rotation: f64, point: [f64; 2]) -> [f64; 2] {
        let (sin, cos) = rotation.sin_cos();
        [
            scale * (point[0] * cos - point[1] * sin),
            scale * (point[0] * sin + point[1] * cos),
        ]
    }
}

impl CanvasTransform for FullViewCanvas {
    fn relative_wrapper_coordinates(&self, client: [f64; 2]) -> [f64; 2] {
        [client[0] / Self::SIZE[0], client[1] / Self::SIZE[1]]
    }

    fn normalize_matrix_coordinates(&self, view: &CanvasView, client: [f64; 2]) -> [f64; 2] {
        [
            (client[0] - view.translate[0]) / (Self::SIZE[0] * view.scale),
            (client[1] - view.translate[1]) / (Self::SIZE[1] * view.scale),
        ]
    }

    fn projection_translate(
        &self,
        new_scale: f64,
        wrapper_position: [f64; 2],
        canvas_position: [f64; 2],
        _rotation: Option<f64>,
    ) -> [f64; 2] {
        [
            wrapper_position[0] * Self::SIZE[0] - canvas_position[0] * Self::SIZE[0] * new_scale,
            wrapper_position[1] * Self::SIZE[1] - canvas_position[1] * Self::SIZE[1] * new_scale,
        ]
    }

    fn rotate_canvas(
        &self,
        view: &CanvasView,
        canvas_position: [f64; 2],
        rotation: f64,
    ) -> CanvasView {
        let pivot = [
            canvas_position[0] * Self::SIZE[0],
            canvas_position[1] * Self::SIZE[1],
        ];
        let before = Self::place(view.scale, view.rotation, pivot);
        let after = Self::place(view.scale, rotation, pivot);
        CanvasView {
            translate: [
                view.translate[0] + before[0] - after[0],
                view.translate[1] + before[1] - after[1],
            ],
            rotation,
            ..*view
        }
    }
}

/// Routes one target into both a gesture engine and a pan/zoom controller.
fn replay_pan_zoom() {
    let target = Rc::new(WheelEventTarget::new());
    let gestures = WheelGestures::new(WheelGesturesOptions::new());
    let _unobserve = gestures.observe(target.clone());

    let pan_zoom = match WheelPanZoom::new(FullViewCanvas, 0.25, 8.0) {
        Ok(controller) => Rc::new(RefCell::new(controller)),
        Err(err) => {
            log::error!("{err}");
            return;
        }
    };
    WheelPanZoom::attach(&pan_zoom, target.as_ref());

    println!("-- pan/zoom");
    let inputs = [
        WheelEventData::pixels(0.0, 40.0, 16.0),
        WheelEventData::pixels(25.0, 0.0, 32.0),
        WheelEventData::pixels(0.0, -20.0, 48.0)
            .with_ctrl_key(true)
            .with_client_position(400.0, 300.0),
    ];
    for event in inputs {
        let prevented = target.dispatch(&event);
        println!(
            "   view {:?} (default prevented: {prevented})",
            pan_zoom.borrow().view()
        );
    }
    println!("   gesture active: {}", gestures.is_started());
    gestures.dispose();

    let mut pan_zoom = pan_zoom.borrow_mut();
    pan_zoom.mouse_down([400.0, 300.0]);
    pan_zoom.mouse_move([360.0, 280.0]);
    pan_zoom.mouse_up();
    println!("   after drag: {:?}", pan_zoom.view());

    pan_zoom.gesture_start();
    for degrees in [10.0, 25.0, 45.0] {
        pan_zoom.gesture_change(&RotationGesture::new(degrees, 400.0, 300.0));
    }
    println!("   after rotate: {:?}", pan_zoom.view());
}
