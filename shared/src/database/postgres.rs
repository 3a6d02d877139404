/// PostgreSQL-specific error classification
use sqlx::error::ErrorKind;

/// `true` when the error is a unique constraint violation (SQLSTATE 23505)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|e| e.kind()),
        Some(ErrorKind::UniqueViolation)
    )
}

/// `true` when the error is a foreign key violation (SQLSTATE 23503)
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(
        err.as_database_error().map(|e| e.kind()),
        Some(ErrorKind::ForeignKeyViolation)
    )
}

/// Name of the constraint a database error was raised for, if any
pub fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    err.as_database_error().and_then(|e| e.constraint())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_violations() {
        let err = sqlx::Error::RowNotFound;

        assert!(!is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert_eq!(violated_constraint(&err), None);
    }
}
