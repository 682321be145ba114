//! Rate limit inputs. `/health` is not wrapped.

use std::time::Duration;

use actix_extensible_rate_limit::backend::SimpleInputFunctionBuilder;

/// `/api/auth`: 5 requests per minute per client IP.
pub fn auth_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 5).real_ip_key()
}

/// Everything else under `/api`: 100 requests per minute per client IP.
pub fn api_rate_limit_config() -> SimpleInputFunctionBuilder {
    SimpleInputFunctionBuilder::new(Duration::from_secs(60), 100).real_ip_key()
}
