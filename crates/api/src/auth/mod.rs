//! Access-token validation.
//!
//! Token issuance is owned by the external identity provider; this service
//! only validates the HS256 tokens it receives.

pub mod jwt;
