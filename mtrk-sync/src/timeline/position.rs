//! Position model
//!
//! Pure arithmetic mapping the single global playhead onto per-track
//! local time. Every track derives its local clock as
//! `local = global - start_position`; nothing here holds state.

/// Drift allowed between a resource's clock and its target before the
/// resource is forced back into place (seconds)
pub const DEFAULT_SYNC_TOLERANCE: f64 = 0.3;

/// Local time of a track starting at `start_position` when the global
/// playhead is at `global_position`
///
/// May be negative (track has not started yet).
#[inline]
pub fn local_time(global_position: f64, start_position: f64) -> f64 {
    global_position - start_position
}

/// A track is in range iff `0 <= local < duration`
///
/// A zero duration (resource not loaded, or failed) is never in range.
#[inline]
pub fn is_in_range(local_time: f64, duration: f64) -> bool {
    local_time >= 0.0 && local_time < duration
}

/// True if a resource reporting `resource_time` must be re-seeked to
/// `target` under the given tolerance
#[inline]
pub fn needs_correction(resource_time: f64, target: f64, tolerance: f64) -> bool {
    (resource_time - target).abs() > tolerance
}

/// Seek target for a resource: local time, never before the media start
#[inline]
pub fn seek_target(local_time: f64) -> f64 {
    local_time.max(0.0)
}

/// Seek target for a resource whose media length is known
///
/// A finished lane parks at its end instead of chasing a local time the
/// media can never reach.
#[inline]
pub fn seek_target_within(local_time: f64, duration: f64) -> f64 {
    seek_target(local_time).min(duration.max(0.0))
}

/// Timeline length: `max(start_i + duration_i)`, never below zero
///
/// An empty iterator yields 0.
pub fn max_duration<I>(spans: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    spans
        .into_iter()
        .map(|(start, duration)| start + duration)
        .fold(0.0, f64::max)
}

/// Convert a normalized timeline fraction to seconds
///
/// The fraction is clamped to `[0, 1]`.
#[inline]
pub fn fraction_to_time(fraction: f64, max_duration: f64) -> f64 {
    fraction.clamp(0.0, 1.0) * max_duration
}

/// Convert seconds to a normalized timeline fraction
///
/// An empty timeline maps everything to 0.
#[inline]
pub fn time_to_fraction(time: f64, max_duration: f64) -> f64 {
    if max_duration > 0.0 {
        time / max_duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_time_is_global_minus_start() {
        assert_eq!(local_time(7.5, 0.0), 7.5);
        assert_eq!(local_time(7.5, 5.0), 2.5);
        assert_eq!(local_time(1.0, 5.0), -4.0);
        assert_eq!(local_time(3.0, -2.0), 5.0);
    }

    #[test]
    fn test_in_range_is_half_open() {
        assert!(is_in_range(0.0, 10.0));
        assert!(is_in_range(9.999, 10.0));
        assert!(!is_in_range(10.0, 10.0));
        assert!(!is_in_range(-0.001, 10.0));
    }

    #[test]
    fn test_unloaded_track_never_in_range() {
        assert!(!is_in_range(0.0, 0.0));
        assert!(!is_in_range(5.0, 0.0));
    }

    #[test]
    fn test_correction_tolerance_is_exclusive() {
        assert!(!needs_correction(5.0, 5.2, 0.3));
        assert!(!needs_correction(5.0, 5.3, 0.3));
        assert!(needs_correction(5.0, 5.31, 0.3));
        assert!(needs_correction(5.5, 5.0, 0.3));
    }

    #[test]
    fn test_seek_target_clamps_negative() {
        assert_eq!(seek_target(-3.0), 0.0);
        assert_eq!(seek_target(2.5), 2.5);
    }

    #[test]
    fn test_seek_target_within_parks_at_the_end() {
        assert_eq!(seek_target_within(-1.0, 2.0), 0.0);
        assert_eq!(seek_target_within(1.5, 2.0), 1.5);
        assert_eq!(seek_target_within(7.0, 2.0), 2.0);
        assert_eq!(seek_target_within(7.0, 0.0), 0.0);
    }

    #[test]
    fn test_max_duration() {
        assert_eq!(max_duration(vec![(0.0, 10.0), (5.0, 10.0)]), 15.0);
        assert_eq!(max_duration(vec![(-4.0, 3.0)]), 0.0);
        assert_eq!(max_duration(Vec::<(f64, f64)>::new()), 0.0);
    }

    #[test]
    fn test_fraction_conversions() {
        assert_eq!(fraction_to_time(0.5, 15.0), 7.5);
        assert_eq!(fraction_to_time(1.5, 15.0), 15.0);
        assert_eq!(fraction_to_time(-0.2, 15.0), 0.0);
        assert_eq!(time_to_fraction(7.5, 15.0), 0.5);
        assert_eq!(time_to_fraction(3.0, 0.0), 0.0);
    }
}
