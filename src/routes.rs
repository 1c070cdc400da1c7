use crate::{api::leave_request, config::Config};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub type ApiLimiter = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer-IP limiter shared by every worker.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<ApiLimiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("invalid rate limit: {requests_per_min}/min"))
}

/// Mount the leave API under `API_PREFIX/v1`.
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: &ApiLimiter) {
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(Governor::new(limiter)) // rate limiting
            .service(web::scope("/v1").configure(leave_request::configure)),
    );
}
