//! Bounded retry combinator.

/// Outcome of [`retry_bounded`].
#[derive(Debug, Clone, PartialEq)]
pub enum Retried<T, E> {
    /// `attempt` is 1-based.
    Succeeded { value: T, attempt: u32 },
    /// Every attempt failed; `last_error` is the error of the final one.
    Exhausted { attempts: u32, last_error: E },
}

impl<T, E> Retried<T, E> {
    pub fn into_result(self) -> Result<T, (u32, E)> {
        match self {
            Retried::Succeeded { value, .. } => Ok(value),
            Retried::Exhausted {
                attempts,
                last_error,
            } => Err((attempts, last_error)),
        }
    }
}

/// Call `op` with the 1-based attempt number until it succeeds or
/// `max_attempts` calls have failed. A zero budget still makes one call.
pub fn retry_bounded<T, E, F>(max_attempts: u32, mut op: F) -> Retried<T, E>
where
    F: FnMut(u32) -> Result<T, E>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Retried::Succeeded { value, attempt },
            Err(last_error) if attempt >= max_attempts => {
                return Retried::Exhausted {
                    attempts: attempt,
                    last_error,
                }
            }
            Err(_) => attempt += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_success_stops() {
        let mut calls = 0;
        let out: Retried<i32, String> = retry_bounded(3, |_| {
            calls += 1;
            Ok(7)
        });
        assert_eq!(out, Retried::Succeeded { value: 7, attempt: 1 });
        assert_eq!(calls, 1);
    }

    #[test]
    fn succeeds_on_a_later_attempt() {
        let out = retry_bounded(3, |n| if n < 3 { Err(n) } else { Ok("ok") });
        assert_eq!(out, Retried::Succeeded { value: "ok", attempt: 3 });
    }

    #[test]
    fn exhaustion_reports_last_error() {
        let mut calls = 0;
        let out: Retried<(), u32> = retry_bounded(4, |n| {
            calls += 1;
            Err(n * 10)
        });
        assert_eq!(
            out,
            Retried::Exhausted {
                attempts: 4,
                last_error: 40
            }
        );
        assert_eq!(calls, 4);
    }

    #[test]
    fn zero_budget_still_tries_once() {
        let out: Retried<(), &str> = retry_bounded(0, |_| Err("no"));
        assert_eq!(out.into_result(), Err((1, "no")));
    }
}
