//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller-owned transaction take `&mut Transaction` instead.

pub mod activity_log_repo;
pub mod assessment_repo;
pub mod domain_event_repo;
pub mod innovation_repo;
pub mod notify_me_repo;
pub mod organisation_repo;
pub mod reassessment_repo;
pub mod statistics_repo;
pub mod support_repo;
pub mod user_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use assessment_repo::AssessmentRepo;
pub use domain_event_repo::DomainEventRepo;
pub use innovation_repo::InnovationRepo;
pub use notify_me_repo::NotifyMeRepo;
pub use organisation_repo::OrganisationRepo;
pub use reassessment_repo::ReassessmentRepo;
pub use statistics_repo::StatisticsRepo;
pub use support_repo::SupportRepo;
pub use user_repo::UserRepo;
