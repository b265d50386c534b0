use bevy::prelude::*;
use rand::Rng;
use super::CameraFocus;

/// Peak shake offset in pixels.
const SHAKE_AMPLITUDE: f32 = 6.0;
const LERP_SPEED: f32 = 5.0;

/// Glide the camera towards the focused island, jittering while a shake
/// is in progress.
pub fn follow_focus(
    time: Res<Time>,
    focus: Res<CameraFocus>,
    mut camera_query: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(mut cam_tf) = camera_query.get_single_mut() else {
        return;
    };

    let target = focus.target();
    let current = cam_tf.translation.truncate();
    let t = (LERP_SPEED * time.delta_secs()).min(1.0);
    let mut next = current + (target - current) * t;

    let strength = focus.shake_strength();
    if strength > 0.0 {
        let mut rng = rand::thread_rng();
        let amp = SHAKE_AMPLITUDE * strength;
        next += Vec2::new(rng.gen_range(-amp..=amp), rng.gen_range(-amp..=amp));
    }

    cam_tf.translation.x = next.x;
    cam_tf.translation.y = next.y;
}
