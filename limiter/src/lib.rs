use middleware::{global::GlobalLimiter, login::LoginRateLimiter, write_guard::WriteGuard};

pub mod middleware {
    pub mod global;
    pub mod login;
    pub mod write_guard;
}

pub fn global_middleware(permits_per_second: u32) -> GlobalLimiter {
    GlobalLimiter::new(permits_per_second)
}

/// Build once and clone into every worker so all of them share the counters.
pub fn login_middleware(attempts_per_minute: u32) -> LoginRateLimiter {
    LoginRateLimiter::new(attempts_per_minute)
}

/// Subscription guard for the tenant scope. Writes to `exempt` path suffixes
/// are let through even when the tenant is read-only.
pub fn write_guard(exempt: &'static [&'static str]) -> WriteGuard {
    WriteGuard::new(exempt)
}
