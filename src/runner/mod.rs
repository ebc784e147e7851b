pub mod executor;
pub mod preflight;
pub mod reporter;
pub mod types;
pub mod wait;

pub use executor::TestRunner;
pub use reporter::TestReporter;
pub use types::{RunOutcome, RunPhase, RunReport, Verdict};
pub use wait::{PollError, await_completion, poll_until};
