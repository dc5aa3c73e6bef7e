//! Use cases: validate, then act through the repositories.
//!
//! Every entry point validates its arguments against the use case's
//! registered signature before touching a repository, and turns repository
//! absence into the matching not-found error.

mod event;
mod session;
mod user;

pub use event::EventUseCases;
pub use session::SessionUseCases;
pub use user::UserUseCases;

use conference_constraints::{Argument, ConstraintEngine, UseCaseHandle};
use tracing::debug;

use crate::error::UseCaseError;

fn validate(
    engine: &ConstraintEngine,
    handle: UseCaseHandle,
    args: &[Argument<'_>],
) -> Result<(), UseCaseError> {
    let violations = engine.validate_parameters(handle, args);
    if !violations.is_empty() {
        debug!(
            target: "conference::usecase",
            use_case = %handle,
            violations = violations.len(),
            "rejected"
        );
    }
    Ok(violations.into_result()?)
}
