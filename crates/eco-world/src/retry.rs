//! Bounded retry helper.

/// Call `attempt` up to `attempts` times and return its first `Some`.
pub fn retry<T>(attempts: usize, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    (0..attempts).find_map(|_| attempt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_stops_at_first_success() {
        let mut calls = 0;
        let result = retry(10, || {
            calls += 1;
            (calls == 3).then_some(calls)
        });
        assert_eq!(result, Some(3));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let result: Option<()> = retry(5, || {
            calls += 1;
            None
        });
        assert_eq!(result, None);
        assert_eq!(calls, 5);
    }
}
