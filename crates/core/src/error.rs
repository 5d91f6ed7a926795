#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote collaborator answered but refused the operation.
    #[error("Remote rejected the request: {0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    /// One readable sentence per failed rule, ordered by field name. Rules
    /// without a message fall back to `<field> is invalid`.
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        CoreError::Validation(messages.join("; "))
    }
}
