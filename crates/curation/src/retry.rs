use std::time::Duration;

/// Per-request timeout that lets every attempt, and the sleeps between them,
/// fit inside `budget`.
///
/// When the sleeps alone exceed the budget, the budget is split evenly.
pub fn attempt_timeout(
    budget: Duration,
    attempts: u32,
    backoff: impl Fn(u32) -> Duration,
) -> Duration {
    let attempts = attempts.max(1);
    let sleeping: Duration = (0..attempts - 1).map(backoff).sum();

    match budget.checked_sub(sleeping) {
        Some(usable) if !usable.is_zero() => usable / attempts,
        _ => budget / attempts,
    }
}
