//! Test utilities for SQL emission validation.
//!
//! Uses sqlparser-rs to check that emitted queries parse as PostgreSQL.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Validates that a SQL string is syntactically valid PostgreSQL.
pub fn validate_sql(sql: &str) -> Result<(), String> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for postgres: {}\nSQL: {}", e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT obs.* FROM obs WHERE obs.datastreamid = 7").unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM obs");
        assert!(result.is_err());
    }
}
