// src/pid/filter.rs

//! First-order low-pass filter applied to the derivative term.

use crate::Number;

/// State of a first-order low-pass filter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LowPassFilterState<T> {
    /// The previous filter output.
    pub previous: T,
}

/// First-order low-pass filter.
///
/// Blends `input` with the previous output using the smoothing factor
/// `alpha`. An `alpha` of one passes the input through unchanged, an
/// `alpha` of zero holds the previous output.
///
/// # Arguments
/// * `state` - The current filter state.
/// * `input` - The new raw value.
/// * `alpha` - The smoothing factor in `[0, 1]`.
///
/// # Returns
/// The updated filter state and the filtered value.
pub fn low_pass_filter<T: Number>(
    state: LowPassFilterState<T>,
    input: T,
    alpha: T,
) -> (LowPassFilterState<T>, T) {
    let filtered = alpha * input + (T::one() - alpha) * state.previous;
    (LowPassFilterState { previous: filtered }, filtered)
}
