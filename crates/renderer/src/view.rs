/// Starting view and the step sizes used by the input handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSettings {
    pub center: [f64; 2],
    pub zoom: f64,
    /// Scrolling never takes zoom below this floor.
    pub min_zoom: f64,
    pub iterations: u32,
    /// Pan distance per frame at zoom 1.
    pub pan_step: f64,
    pub iteration_step: u32,
    /// Relative zoom change per scroll line.
    pub scroll_factor: f64,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 0.5,
            min_zoom: 0.1,
            iterations: 256,
            pan_step: 0.1,
            iteration_step: 10,
            scroll_factor: 0.1,
        }
    }
}

/// Where the viewer looks in the complex plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub center: [f64; 2],
    pub zoom: f64,
    pub iterations: u32,
    settings: ViewSettings,
}

impl ViewState {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            center: settings.center,
            zoom: settings.zoom.max(settings.min_zoom),
            iterations: settings.iterations,
            settings,
        }
    }

    /// Moves the center by whole pan steps, scaled down as zoom grows.
    pub fn pan(&mut self, steps_x: f64, steps_y: f64) {
        let distance = self.settings.pan_step / self.zoom;
        self.center[0] += steps_x * distance;
        self.center[1] += steps_y * distance;
    }

    /// Raises or lowers the iteration count by whole steps, stopping at zero.
    pub fn adjust_iterations(&mut self, steps: i32) {
        let delta = self.settings.iteration_step.saturating_mul(steps.unsigned_abs());
        self.iterations = if steps >= 0 {
            self.iterations.saturating_add(delta)
        } else {
            self.iterations.saturating_sub(delta)
        };
    }

    /// Multiplicative zoom for `lines` scroll lines, floored at `min_zoom`.
    pub fn scroll(&mut self, lines: f64) {
        self.zoom += lines * self.settings.scroll_factor * self.zoom;
        self.zoom = self.zoom.max(self.settings.min_zoom);
    }

    /// Moves the center halfway toward a clicked window position.
    ///
    /// `cursor` is in physical pixels with a top-left origin.
    pub fn recenter(&mut self, cursor: [f64; 2], window: [f64; 2]) {
        if window[0] <= 0.0 || window[1] <= 0.0 {
            return;
        }
        let xr = 2.0 * (cursor[0] / window[0] - 0.5);
        let yr = 2.0 * (cursor[1] / window[1] - 0.5);
        self.center[0] += (xr - self.center[0]) / self.zoom / 2.0;
        self.center[1] -= (yr - self.center[1]) / self.zoom / 2.0;
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(ViewSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_never_drops_below_floor() {
        let mut view = ViewState::default();
        let mut previous = view.zoom;
        for _ in 0..200 {
            view.scroll(-3.0);
            assert!(view.zoom >= 0.1);
            assert!(view.zoom <= previous);
            previous = view.zoom;
        }
        assert_eq!(view.zoom, 0.1);
    }

    #[test]
    fn scroll_up_grows_by_factor() {
        let mut view = ViewState::default();
        view.scroll(1.0);
        assert!((view.zoom - 0.55).abs() < 1e-12);
    }

    #[test]
    fn iterations_floor_at_zero() {
        let mut view = ViewState::default();
        for _ in 0..100 {
            view.adjust_iterations(-1);
        }
        assert_eq!(view.iterations, 0);
        view.adjust_iterations(1);
        assert_eq!(view.iterations, 10);
    }

    #[test]
    fn pan_is_linear_in_steps_at_zoom_one() {
        let mut view = ViewState::new(ViewSettings {
            zoom: 1.0,
            ..ViewSettings::default()
        });
        let mut previous = view.center[0];
        for frame in 1..=20 {
            view.pan(1.0, 0.0);
            assert!(view.center[0] > previous);
            assert!((view.center[0] - 0.1 * f64::from(frame)).abs() < 1e-9);
            previous = view.center[0];
        }
        assert_eq!(view.center[1], 0.0);
    }

    #[test]
    fn pan_shrinks_with_zoom() {
        let mut view = ViewState::new(ViewSettings {
            zoom: 4.0,
            ..ViewSettings::default()
        });
        view.pan(0.0, -1.0);
        assert!((view.center[1] + 0.025).abs() < 1e-12);
    }

    #[test]
    fn recenter_moves_toward_click() {
        let mut view = ViewState::new(ViewSettings {
            zoom: 1.0,
            ..ViewSettings::default()
        });
        // right edge, top edge of a 640x480 window
        view.recenter([640.0, 0.0], [640.0, 480.0]);
        assert!((view.center[0] - 0.5).abs() < 1e-12);
        assert!((view.center[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn recenter_ignores_empty_window() {
        let mut view = ViewState::default();
        view.recenter([10.0, 10.0], [0.0, 480.0]);
        assert_eq!(view.center, [0.0, 0.0]);
    }
}
