pub mod router;

pub use router::NotifyMeRouter;
