/// Basis points per whole unit of progress.
pub(crate) const BASIS_POINTS_PER_UNIT: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressAdvance {
    Increased,
    /// This press was the first to reach the maximum.
    ReachedMax,
    AlreadyFull,
}

/// A clamped meter stored in integer basis points so repeated fractional
/// steps land on the maximum exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ProgressMeter {
    value_bp: u32,
    step_bp: u32,
    max_bp: u32,
}

impl ProgressMeter {
    pub(crate) fn new(step: f32, max: f32) -> Self {
        let max_bp = to_basis_points(max).max(1);
        let step_bp = to_basis_points(step).clamp(1, max_bp);
        Self {
            value_bp: 0,
            step_bp,
            max_bp,
        }
    }

    pub(crate) fn press(&mut self) -> ProgressAdvance {
        if self.is_full() {
            return ProgressAdvance::AlreadyFull;
        }
        self.value_bp = self.value_bp.saturating_add(self.step_bp).min(self.max_bp);
        if self.is_full() {
            ProgressAdvance::ReachedMax
        } else {
            ProgressAdvance::Increased
        }
    }

    pub(crate) fn value_bp(&self) -> u32 {
        self.value_bp
    }

    pub(crate) fn max_bp(&self) -> u32 {
        self.max_bp
    }

    /// Share of the maximum reached, in `0.0..=1.0`.
    pub(crate) fn fraction(&self) -> f32 {
        self.value_bp as f32 / self.max_bp as f32
    }

    pub(crate) fn percent(&self) -> u32 {
        (u64::from(self.value_bp) * 100 / u64::from(self.max_bp)) as u32
    }

    pub(crate) fn is_full(&self) -> bool {
        self.value_bp >= self.max_bp
    }

    pub(crate) fn reset(&mut self) {
        self.value_bp = 0;
    }
}

fn to_basis_points(value: f32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value * BASIS_POINTS_PER_UNIT as f32).round().min(u32::MAX as f32) as u32
}
