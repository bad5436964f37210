use std::f32::consts::FRAC_PI_4;

use atoll_geom::Vec3;
use atoll_render_raylib::conv::vec3_to_rl;
use raylib::prelude::*;

/// Radians per pixel of mouse travel.
const LOOK_RATE: f32 = 0.0018;
const PITCH_LIMIT: f32 = 1.55;
const BOOST: f32 = 5.0;
const FOV_DEG: f32 = 70.0;

/// Movement keys as weights on (forward, right, up).
const MOVE_KEYS: [(KeyboardKey, [f32; 3]); 6] = [
    (KeyboardKey::KEY_W, [1.0, 0.0, 0.0]),
    (KeyboardKey::KEY_S, [-1.0, 0.0, 0.0]),
    (KeyboardKey::KEY_D, [0.0, 1.0, 0.0]),
    (KeyboardKey::KEY_A, [0.0, -1.0, 0.0]),
    (KeyboardKey::KEY_E, [0.0, 0.0, 1.0]),
    (KeyboardKey::KEY_Q, [0.0, 0.0, -1.0]),
];

/// Free-flying observer. `position` is what the streamer sees each frame.
pub struct FlyCamera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    captured: bool,
}

impl FlyCamera {
    pub fn new(position: Vec3, speed: f32) -> Self {
        Self {
            position,
            yaw: -FRAC_PI_4,
            pitch: -0.35,
            speed,
            captured: true,
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cy * cp, sp, sy * cp)
    }

    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D::perspective(
            vec3_to_rl(self.position),
            vec3_to_rl(self.position + self.forward()),
            vec3_to_rl(Vec3::UP),
            FOV_DEG,
        )
    }

    pub fn update(&mut self, rl: &mut RaylibHandle, dt: f32) {
        if rl.is_key_pressed(KeyboardKey::KEY_TAB) {
            self.captured = !self.captured;
            if self.captured {
                rl.disable_cursor();
            } else {
                rl.enable_cursor();
            }
        }
        if self.captured {
            let md = rl.get_mouse_delta();
            self.yaw += md.x * LOOK_RATE;
            self.pitch = (self.pitch - md.y * LOOK_RATE).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        let fwd = self.forward();
        let right = fwd.cross(Vec3::UP).normalized();
        let mut wish = Vec3::ZERO;
        for (key, [f, r, u]) in MOVE_KEYS {
            if rl.is_key_down(key) {
                wish += fwd * f + right * r + Vec3::UP * u;
            }
        }
        if wish.length() > 0.0 {
            let boost = if rl.is_key_down(KeyboardKey::KEY_LEFT_SHIFT) { BOOST } else { 1.0 };
            self.position += wish.normalized() * (self.speed * boost * dt);
        }
    }
}
