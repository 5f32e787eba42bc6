mod acl;
mod approval;
mod hmac;
mod jwt;

pub use acl::{AclMiddlewareFactory, AclMiddlewareService};
pub use approval::{ApprovalGateFactory, ApprovalGateService};
pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService};
pub use jwt::{JwtMiddlewareFactory, JwtMiddlewareService};
