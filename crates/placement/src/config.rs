/// Default edge length of one ground cell, in world units.
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Smallest per-axis scale a scale handle may drag a target down to.
pub const MIN_HANDLE_SCALE: f32 = 0.1;

/// Minimum mass given to a rigid body added at spawn time.
pub const MIN_SPAWNED_BODY_MASS: f32 = 0.01;

/// Lower bound for the preview ray length.
pub const MIN_PREVIEW_RAY_DISTANCE: f32 = 0.5;

/// How far the preview ghost's colour is pulled towards the tint (0 = keep, 1 = replace).
pub const PREVIEW_TINT_BLEND: f32 = 0.65;

/// Default preview tint (RGBA, linear-ish sRGB components).
pub const DEFAULT_PREVIEW_TINT: [f32; 4] = [0.25, 0.75, 1.0, 0.45];

/// Gravity applied by the proxy integrator, in world units per second squared.
pub const GRAVITY: f32 = -9.81;

/// Grid lines are drawn this far above the grid plane to avoid z-fighting.
pub const GRID_LINE_LIFT: f32 = 0.01;

/// Scale components at or below this are treated as zero when dividing.
pub const SCALE_EPSILON: f32 = 1e-6;
