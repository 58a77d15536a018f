#![forbid(unsafe_code)]

use wshim_core::Step;

/// Timer delay before the next tick, or `None` once polling is over.
///
/// `Advanced` maps to a zero delay so the next state probes on the following
/// macrotask rather than recursing.
#[must_use]
pub fn next_delay_ms(step: Step, now_ms: u64) -> Option<i32> {
    match step {
        Step::Ready => None,
        Step::Advanced => Some(0),
        Step::Retry { at_ms } => {
            let delay = at_ms.saturating_sub(now_ms);
            Some(i32::try_from(delay).unwrap_or(i32::MAX))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ready_stops_polling() {
        assert_eq!(next_delay_ms(Step::Ready, 5), None);
    }

    #[test]
    fn advanced_polls_on_next_turn() {
        assert_eq!(next_delay_ms(Step::Advanced, 5), Some(0));
    }

    #[test]
    fn retry_waits_until_deadline() {
        assert_eq!(next_delay_ms(Step::Retry { at_ms: 30 }, 20), Some(10));
        // Timer fired late: probe immediately.
        assert_eq!(next_delay_ms(Step::Retry { at_ms: 30 }, 45), Some(0));
    }

    #[test]
    fn huge_delay_saturates() {
        assert_eq!(
            next_delay_ms(Step::Retry { at_ms: u64::MAX }, 0),
            Some(i32::MAX)
        );
    }
}
