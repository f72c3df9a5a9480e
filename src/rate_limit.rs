//! Token-bucket admission gate for `/extract`.

use std::num::NonZeroU32;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

pub const DEFAULT_PER_SECOND: u32 = 1;
pub const DEFAULT_BURST: u32 = 3;

/// Process-wide limiter shared by every request. Never waits: a request
/// either takes a token now or is turned away.
pub struct RequestLimiter<C: Clock = DefaultClock> {
    limiter: RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<C::Instant>>,
    per_second: u32,
    burst: u32,
}

fn non_zero(value: u32, default: u32) -> NonZeroU32 {
    NonZeroU32::new(value)
        .or_else(|| NonZeroU32::new(default))
        .unwrap_or(NonZeroU32::MIN)
}

impl RequestLimiter<DefaultClock> {
    pub fn new(per_second: u32, burst: u32) -> Self {
        Self::with_clock(per_second, burst, &DefaultClock::default())
    }
}

impl Default for RequestLimiter<DefaultClock> {
    fn default() -> Self {
        Self::new(DEFAULT_PER_SECOND, DEFAULT_BURST)
    }
}

impl<C: Clock> RequestLimiter<C> {
    /// `per_second` is the refill rate and `burst` the bucket capacity.
    /// Zero falls back to the defaults.
    pub fn with_clock(per_second: u32, burst: u32, clock: &C) -> Self {
        let per_second = non_zero(per_second, DEFAULT_PER_SECOND);
        let burst = non_zero(burst, DEFAULT_BURST);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Self {
            limiter: RateLimiter::direct_with_clock(quota, clock),
            per_second: per_second.get(),
            burst: burst.get(),
        }
    }

    /// Take one token if available.
    pub fn allow(&self) -> bool {
        self.limiter.check().is_ok()
    }

    pub fn per_second(&self) -> u32 {
        self.per_second
    }

    pub fn burst(&self) -> u32 {
        self.burst
    }
}
