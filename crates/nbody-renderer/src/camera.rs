//! Orbit camera for 3D visualization

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// Surface size in pixels
    pub viewport: [f32; 2],
    /// Pixels per world unit at depth 1, see [`Camera::camera_scale`]
    pub camera_scale: f32,
    pub _padding: f32,
}

/// Camera orbiting `target` at `distance`
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub width: u32,
    pub height: u32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            distance: 1.0,
            rotation: Quat::IDENTITY,
            target: Vec3::ZERO,
            width: width.max(1),
            height: height.max(1),
            fovy: 50.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1.0e7,
        };
        camera.frame_space(1000.0);
        camera
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    /// Point the camera at the origin from `(1.5R, 1.5R, 3R)`
    pub fn frame_space(&mut self, space_radius: f32) {
        let eye = Vec3::new(1.5, 1.5, 3.0) * space_radius;
        self.look_at(eye, Vec3::ZERO);
    }

    /// Place the eye at `eye`, keeping +Y up
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        self.rotation = Quat::from_mat3(&Mat3::from_mat4(view).transpose()).normalize();
        self.distance = eye.distance(target);
        self.target = target;
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        let up = self.rotation * Vec3::Y;
        let yaw_rotation = Quat::from_axis_angle(up, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        self.rotation = yaw_rotation * pitch_rotation * self.rotation;
        self.rotation = self.rotation.normalize();
    }

    /// Multiplicative zoom; positive `delta` moves closer
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta * 0.1)).clamp(1.0, self.zfar * 0.1);
    }

    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position());
        rotation_matrix * translation_matrix
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fovy, self.aspect(), self.znear, self.zfar);
        proj * self.view_matrix()
    }

    /// Pixels covered by one world unit at view depth 1, for a surface `height` pixels tall
    pub fn camera_scale(&self) -> f32 {
        self.height as f32 / (self.fovy * 0.5).tan()
    }

    pub fn to_uniform(&self, camera_scale: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            view: self.view_matrix().to_cols_array_2d(),
            viewport: [self.width as f32, self.height as f32],
            camera_scale,
            _padding: 0.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 144);
    }

    #[test]
    fn test_camera_scale_from_fov() {
        let camera = Camera::new(1600, 900);
        let expected = 900.0 / 25.0_f32.to_radians().tan();
        assert!((camera.camera_scale() - expected).abs() < 1e-2);
    }

    #[test]
    fn test_frame_space_places_eye() {
        let mut camera = Camera::new(800, 600);
        camera.frame_space(100.0);

        let position = camera.position();
        assert!((position - Vec3::new(150.0, 150.0, 300.0)).length() < 1e-2);

        // Origin projects to the centre of the screen
        let clip = camera.build_view_projection_matrix() * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }

    #[test]
    fn test_frame_space_keeps_up_vector() {
        let mut camera = Camera::new(800, 600);
        camera.frame_space(10.0);
        let up = camera.rotation * Vec3::Y;
        let right = camera.rotation * Vec3::X;

        assert!(up.y > 0.0);
        assert!(right.y.abs() < 1e-5);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new(800, 600);
        for _ in 0..200 {
            camera.zoom(5.0);
        }
        assert_eq!(camera.distance, 1.0);
    }
}
