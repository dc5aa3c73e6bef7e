#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("malformed {kind} identifier: {raw:?}")]
    MalformedId { kind: &'static str, raw: String },
}
