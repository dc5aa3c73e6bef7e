//! Rule tables for every command type, and the engine that holds them.

pub mod event;
pub mod identifier;
pub mod session;
pub mod use_cases;
pub mod user;

use crate::engine::ConstraintEngine;
use crate::error::ConstraintError;

/// Engine with every command rule set and use-case signature registered.
pub fn standard_engine() -> Result<ConstraintEngine, ConstraintError> {
    let mut builder = ConstraintEngine::builder()
        .register(identifier::id()?)
        .register(event::create_event()?)
        .register(event::update_event()?)
        .register(session::create_session()?)
        .register(session::update_session()?)
        .register(session::cast_vote()?)
        .register(user::create_user()?)
        .register(user::update_user()?)
        .register(user::login()?);
    for signature in use_cases::signatures()? {
        builder = builder.signature(signature);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_engine_builds_and_registers_every_command() {
        let engine = standard_engine().unwrap();
        assert_eq!(
            engine.registered_types(),
            [
                "Id",
                "CreateEvent",
                "UpdateEvent",
                "CreateSession",
                "UpdateSession",
                "CastVote",
                "CreateUser",
                "UpdateUser",
                "Login",
            ]
        );
    }
}
