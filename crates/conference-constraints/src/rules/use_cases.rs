//! Handles and parameter lists of the service's use cases.

use crate::engine::{ParamSpec, UseCaseHandle, UseCaseSignature};
use crate::error::ConstraintError;
use crate::rules::identifier::identifier_param;
use crate::value::FieldKind;

pub const CREATE_EVENT: UseCaseHandle = UseCaseHandle::new("create_event");
pub const GET_EVENT: UseCaseHandle = UseCaseHandle::new("get_event");
pub const UPDATE_EVENT: UseCaseHandle = UseCaseHandle::new("update_event");
pub const DELETE_EVENT: UseCaseHandle = UseCaseHandle::new("delete_event");

pub const CREATE_SESSION: UseCaseHandle = UseCaseHandle::new("create_session");
pub const GET_SESSION: UseCaseHandle = UseCaseHandle::new("get_session");
pub const GET_SESSION_DETAILS: UseCaseHandle = UseCaseHandle::new("get_session_details");
pub const LIST_SESSIONS: UseCaseHandle = UseCaseHandle::new("list_sessions");
pub const UPDATE_SESSION: UseCaseHandle = UseCaseHandle::new("update_session");
pub const DELETE_SESSION: UseCaseHandle = UseCaseHandle::new("delete_session");
pub const CAST_VOTE: UseCaseHandle = UseCaseHandle::new("cast_vote");

pub const REGISTER_USER: UseCaseHandle = UseCaseHandle::new("register_user");
pub const GET_USER: UseCaseHandle = UseCaseHandle::new("get_user");
pub const UPDATE_USER: UseCaseHandle = UseCaseHandle::new("update_user");
pub const DELETE_USER: UseCaseHandle = UseCaseHandle::new("delete_user");
pub const LOGIN: UseCaseHandle = UseCaseHandle::new("login");

fn id_param(name: &'static str) -> Result<ParamSpec, ConstraintError> {
    Ok(ParamSpec::value(name, FieldKind::Text, identifier_param()?))
}

fn command(handle: UseCaseHandle) -> UseCaseSignature {
    UseCaseSignature::new(handle, [ParamSpec::object("command")])
}

pub fn signatures() -> Result<Vec<UseCaseSignature>, ConstraintError> {
    Ok(vec![
        command(CREATE_EVENT),
        UseCaseSignature::new(GET_EVENT, [id_param("id")?]),
        command(UPDATE_EVENT),
        UseCaseSignature::new(DELETE_EVENT, [id_param("id")?]),
        command(CREATE_SESSION),
        UseCaseSignature::new(GET_SESSION, [id_param("event_id")?, id_param("session_id")?]),
        UseCaseSignature::new(
            GET_SESSION_DETAILS,
            [id_param("event_id")?, id_param("session_id")?],
        ),
        UseCaseSignature::new(LIST_SESSIONS, [id_param("event_id")?]),
        command(UPDATE_SESSION),
        UseCaseSignature::new(
            DELETE_SESSION,
            [id_param("event_id")?, id_param("session_id")?],
        ),
        command(CAST_VOTE),
        command(REGISTER_USER),
        UseCaseSignature::new(GET_USER, [id_param("id")?]),
        command(UPDATE_USER),
        UseCaseSignature::new(DELETE_USER, [id_param("id")?]),
        command(LOGIN),
    ])
}
