//! Cooperative countdown timers on the virtual clock

/// Run `timer` down by `dt`, rearming it every `interval` seconds.
///
/// Returns how many times the timer came due during the step. The count is
/// computed directly, so a very long step costs the same as a single tick.
pub(crate) fn elapse(timer: &mut f32, dt: f32, interval: f32) -> u64 {
    *timer -= dt;
    if *timer > 0.0 {
        return 0;
    }

    let due = (-*timer / interval).floor() + 1.0;
    let rest = timer.rem_euclid(interval);
    *timer = if rest > 0.0 { rest } else { interval };
    due as u64
}
