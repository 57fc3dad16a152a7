use middleware::extractor::ExtractionMiddleware;

pub mod middleware {
    pub mod extractor;
}

/// Session key holding the token of a web login.
pub const SESSION_TOKEN_KEY: &str = "token";
/// Session key holding the serialized user of a web login.
pub const SESSION_USER_KEY: &str = "user";

pub fn middleware() -> ExtractionMiddleware {
    ExtractionMiddleware::new()
}
