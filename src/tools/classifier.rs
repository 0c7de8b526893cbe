//! Read/mutate classification of SQL statements.
//!
//! The classifier decides which execution path a statement takes. It is a
//! prefix heuristic, not a parser: anything that does not start with one of
//! [`READ_PREFIXES`] is executed for its effect, including `WITH ... SELECT`
//! and statements preceded by a comment.

/// Statement prefixes (case-insensitive) routed to the read path.
pub const READ_PREFIXES: &[&str] = &["SELECT", "SHOW", "DESCRIBE", "EXPLAIN"];

/// Execution path for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows; collected and rendered as a table.
    Read,
    /// Executed for its effect; reports affected rows and generated id.
    Mutate,
}

/// Chooses the execution path for a statement.
pub trait QueryClassifier: Send + Sync {
    /// Classify an already trimmed, non-empty statement.
    fn classify(&self, sql: &str) -> StatementKind;
}

/// Classifier matching the leading keyword against [`READ_PREFIXES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixClassifier;

impl QueryClassifier for PrefixClassifier {
    fn classify(&self, sql: &str) -> StatementKind {
        let upper = sql.trim().to_uppercase();
        if READ_PREFIXES.iter().any(|prefix| upper.starts_with(prefix)) {
            StatementKind::Read
        } else {
            StatementKind::Mutate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(sql: &str) -> StatementKind {
        PrefixClassifier.classify(sql)
    }

    #[test]
    fn test_read_prefixes() {
        assert_eq!(classify("SELECT 1"), StatementKind::Read);
        assert_eq!(classify("show tables"), StatementKind::Read);
        assert_eq!(classify("Describe users"), StatementKind::Read);
        assert_eq!(classify("EXPLAIN SELECT * FROM t"), StatementKind::Read);
        assert_eq!(classify("  select 1  "), StatementKind::Read);
    }

    #[test]
    fn test_mutations() {
        assert_eq!(classify("INSERT INTO t VALUES (1)"), StatementKind::Mutate);
        assert_eq!(classify("update t set a = 1"), StatementKind::Mutate);
        assert_eq!(classify("DELETE FROM t"), StatementKind::Mutate);
        assert_eq!(classify("CREATE TABLE t (id INT)"), StatementKind::Mutate);
        assert_eq!(classify("DROP TABLE t"), StatementKind::Mutate);
    }

    #[test]
    fn test_cte_is_not_a_read() {
        assert_eq!(
            classify("WITH x AS (SELECT 1) SELECT * FROM x"),
            StatementKind::Mutate
        );
    }

    #[test]
    fn test_leading_comment_is_not_a_read() {
        assert_eq!(classify("/* hint */ SELECT 1"), StatementKind::Mutate);
        assert_eq!(classify("(SELECT 1)"), StatementKind::Mutate);
    }

    #[test]
    fn test_prefix_match_is_not_word_bound() {
        // "SHOWCASE" starts with "SHOW"; matching is by prefix only.
        assert_eq!(classify("SHOWCASE"), StatementKind::Read);
    }
}
