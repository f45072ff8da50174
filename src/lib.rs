//! Static-site auditing: internal link resolution, inbound-link graph,
//! external link probing, orphan detection and a 0-100 health score.
//!
//! The binary in `main.rs` is a thin CLI over [`audit::run_audit`] and
//! [`site::fix::fix_links`].

pub mod audit;
pub mod checker;
pub mod config;
pub mod site;
