// ── Software matrix stack ─────────────────────────────────────────────────────
//
// Replaces the fixed-function `glMatrixMode` / `glLoadIdentity` / `glRotatef`
// state with explicit fields.  A renderer owns one `MatrixStack` and uploads
// `get(mode).to_cols_array()` to its shaders; nothing here touches GL.

pub mod matrix;

pub use self::matrix::Mat4;

use crate::error::{Error, Result};

/// Which of the two matrices an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixMode {
    ModelView,
    Projection,
}

impl MatrixMode {
    /// `modelview`/`mv` or `projection`/`proj`, any case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "modelview" | "mv" => Some(Self::ModelView),
            "projection" | "proj" => Some(Self::Projection),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModelView => "modelview",
            Self::Projection => "projection",
        }
    }
}

/// Current model-view and projection matrices plus one save stack per mode.
#[derive(Debug, Clone, Default)]
pub struct MatrixStack {
    model_view: Mat4,
    projection: Mat4,
    saved_model_view: Vec<Mat4>,
    saved_projection: Vec<Mat4>,
}

impl MatrixStack {
    /// Both matrices identity, nothing saved.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current matrix for `mode`.
    pub fn get(&self, mode: MatrixMode) -> Mat4 {
        match mode {
            MatrixMode::ModelView => self.model_view,
            MatrixMode::Projection => self.projection,
        }
    }

    /// The current matrix for `mode`, for in-place edits.
    pub fn get_mut(&mut self, mode: MatrixMode) -> &mut Mat4 {
        match mode {
            MatrixMode::ModelView => &mut self.model_view,
            MatrixMode::Projection => &mut self.projection,
        }
    }

    /// Replace the current matrix for `mode`.
    pub fn set(&mut self, mode: MatrixMode, m: Mat4) {
        *self.get_mut(mode) = m;
    }

    pub fn model_view(&self) -> &Mat4 {
        &self.model_view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn identity_model_view(&mut self) {
        self.model_view = Mat4::IDENTITY;
    }

    pub fn identity_projection(&mut self) {
        self.projection = Mat4::IDENTITY;
    }

    // ── Projection setup ──────────────────────────────────────────────────────

    /// Load a 2D orthographic projection.
    ///
    /// `top` and `bottom` are passed to the glOrtho formula in swapped
    /// positions, so `(0, width, height, 0)` yields a projection whose y axis
    /// points down the screen with the origin at the top-left corner.  The
    /// projection is replaced, not multiplied.
    pub fn orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::orthographic(left, right, top, bottom, near, far);
    }

    /// `P = P · glFrustum(left, right, bottom, top, near, far)`.
    pub fn frustum(&mut self, left: f64, right: f64, bottom: f64, top: f64, near: f64, far: f64) {
        self.projection = self.projection * Mat4::frustum(left, right, bottom, top, near, far);
    }

    // ── Transforms ────────────────────────────────────────────────────────────

    pub fn rotate(&mut self, mode: MatrixMode, angle_degrees: f32, x: f32, y: f32, z: f32) {
        self.get_mut(mode).rotate(angle_degrees, x, y, z);
    }

    pub fn translate(&mut self, mode: MatrixMode, x: f32, y: f32, z: f32) {
        self.get_mut(mode).translate(x, y, z);
    }

    pub fn scale(&mut self, mode: MatrixMode, x: f32, y: f32, z: f32) {
        self.get_mut(mode).scale(x, y, z);
    }

    // ── Save / restore ────────────────────────────────────────────────────────

    /// Save the current matrix for `mode`.
    pub fn push(&mut self, mode: MatrixMode) {
        let current = self.get(mode);
        self.saved_mut(mode).push(current);
    }

    /// Restore the most recently pushed matrix for `mode`.
    ///
    /// On an empty stack the current matrix is left as it is.
    pub fn pop(&mut self, mode: MatrixMode) -> Result<()> {
        let saved = self.saved_mut(mode).pop().ok_or(Error::MatrixStackUnderflow)?;
        self.set(mode, saved);
        Ok(())
    }

    /// Number of matrices currently saved for `mode`.
    pub fn depth(&self, mode: MatrixMode) -> usize {
        match mode {
            MatrixMode::ModelView => self.saved_model_view.len(),
            MatrixMode::Projection => self.saved_projection.len(),
        }
    }

    fn saved_mut(&mut self, mode: MatrixMode) -> &mut Vec<Mat4> {
        match mode {
            MatrixMode::ModelView => &mut self.saved_model_view,
            MatrixMode::Projection => &mut self.saved_projection,
        }
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    /// Log `label` followed by the four rows of the `mode` matrix.
    pub fn debug_matrix(&self, mode: MatrixMode, label: &str) {
        log::debug!("{label} ({}):\n{}", mode.as_str(), self.get(mode));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn starts_as_identity() {
        let s = MatrixStack::new();
        assert_eq!(*s.model_view(), Mat4::IDENTITY);
        assert_eq!(*s.projection(), Mat4::IDENTITY);
        assert_eq!(s.depth(MatrixMode::ModelView), 0);
    }

    #[test]
    fn modes_are_independent() {
        let mut s = MatrixStack::new();
        s.translate(MatrixMode::ModelView, 1.0, 2.0, 3.0);
        assert_eq!(*s.projection(), Mat4::IDENTITY);
        assert_eq!(s.model_view()[12], 1.0);

        s.scale(MatrixMode::Projection, 2.0, 2.0, 2.0);
        assert_eq!(s.projection()[0], 2.0);
        assert_eq!(s.model_view()[0], 1.0);
    }

    #[test]
    fn push_pop_restores_saved_matrix() {
        let mut s = MatrixStack::new();
        s.translate(MatrixMode::ModelView, 5.0, 0.0, 0.0);
        let before = s.get(MatrixMode::ModelView);

        s.push(MatrixMode::ModelView);
        s.rotate(MatrixMode::ModelView, 45.0, 0.0, 1.0, 0.0);
        assert_ne!(s.get(MatrixMode::ModelView), before);

        s.pop(MatrixMode::ModelView).expect("pop");
        assert_eq!(s.get(MatrixMode::ModelView), before);
        assert_eq!(s.depth(MatrixMode::ModelView), 0);
    }

    #[test]
    fn pop_on_empty_stack_is_an_error() {
        let mut s = MatrixStack::new();
        s.translate(MatrixMode::Projection, 1.0, 1.0, 1.0);
        let before = s.get(MatrixMode::Projection);

        let err = s.pop(MatrixMode::Projection).unwrap_err();
        assert!(matches!(err, Error::MatrixStackUnderflow));
        assert_eq!(s.get(MatrixMode::Projection), before);
    }

    #[test]
    fn orthographic_projection_replaces_and_flips_y() {
        let mut s = MatrixStack::new();
        s.scale(MatrixMode::Projection, 9.0, 9.0, 9.0);
        s.orthographic_projection(0.0, 320.0, 200.0, 0.0, -99999.0, 99999.0);

        let p = *s.projection();
        assert_eq!(p, Mat4::orthographic(0.0, 320.0, 200.0, 0.0, -99999.0, 99999.0));

        let origin = p.transform_point(0.0, 0.0, 0.0);
        assert_relative_eq!(origin[0], -1.0, epsilon = 1e-5);
        assert_relative_eq!(origin[1], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn frustum_multiplies_into_projection() {
        let mut s = MatrixStack::new();
        s.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        assert_eq!(*s.projection(), Mat4::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0));

        let mut s = MatrixStack::new();
        s.scale(MatrixMode::Projection, 2.0, 1.0, 1.0);
        s.frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        let expected = Mat4::from_scale(2.0, 1.0, 1.0) * Mat4::frustum(-1.0, 1.0, -1.0, 1.0, 1.0, 100.0);
        assert_eq!(*s.projection(), expected);
    }

    #[test]
    fn identity_resets_only_its_mode() {
        let mut s = MatrixStack::new();
        s.translate(MatrixMode::ModelView, 1.0, 0.0, 0.0);
        s.translate(MatrixMode::Projection, 1.0, 0.0, 0.0);
        s.identity_model_view();
        assert_eq!(*s.model_view(), Mat4::IDENTITY);
        assert_ne!(*s.projection(), Mat4::IDENTITY);
        s.identity_projection();
        assert_eq!(*s.projection(), Mat4::IDENTITY);
    }

    #[test]
    fn mode_names() {
        assert_eq!(MatrixMode::parse("ModelView"), Some(MatrixMode::ModelView));
        assert_eq!(MatrixMode::parse("proj"), Some(MatrixMode::Projection));
        assert_eq!(MatrixMode::parse("texture"), None);
        assert_eq!(MatrixMode::Projection.as_str(), "projection");
    }
}
