pub mod importer;
pub mod pipeline;
pub mod seeder;
pub mod verifier;

pub use importer::{ImportReport, RowOutcome, RowReport};
pub use pipeline::{RunStatus, SetupSummary};
pub use seeder::{CalendarGrid, SeedStats};
pub use verifier::VerificationReport;
