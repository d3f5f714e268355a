//! End-to-end tests for the SQL front end.

use codemask_core::{Anonymize, FrontEndConfig};
use codemask_sql::{anonymize, anonymize_with, SqlAnonymizer};

const REPORT: &str = "-- Monthly revenue per customer segment
WITH paid AS (
    SELECT customer_id, SUM(amount_cents) AS revenue
    FROM billing.invoices
    WHERE status = 'paid' AND issued_at >= '2024-01-01'
    GROUP BY customer_id
)
SELECT c.segment, COUNT(*) AS customers, SUM(p.revenue) AS revenue
FROM customers c
JOIN paid p ON p.customer_id = c.id
WHERE c.email NOT LIKE '%@internal.example.com'
GROUP BY c.segment
ORDER BY revenue DESC
LIMIT 10;
";

#[test]
fn test_deterministic_output() {
    assert_eq!(anonymize(REPORT), anonymize(REPORT));
}

#[test]
fn test_idempotent() {
    let once = anonymize(REPORT);
    assert_eq!(anonymize(&once), once);
}

#[test]
fn test_sensitive_text_removed() {
    let output = anonymize(REPORT);
    for leaked in [
        "revenue",
        "billing",
        "invoices",
        "customer",
        "segment",
        "paid",
        "internal.example.com",
        "amount_cents",
        "Monthly",
    ] {
        assert!(!output.contains(leaked), "{leaked:?} leaked:\n{output}");
    }
}

#[test]
fn test_structure_survives() {
    let output = anonymize(REPORT);
    assert!(output.starts_with("WITH Alpha AS (\n    SELECT A, SUM(B) AS c1\n"));
    assert!(output.contains("    FROM Bravo.Charlie\n"));
    assert!(output.contains("'2024-01-01'"));
    assert!(output.contains("NOT LIKE '%lorem 2'"));
    assert!(output.contains("COUNT(*) AS c2"));
    assert!(output.contains("ORDER BY c1 DESC\nLIMIT 10;"));
    assert!(!output.ends_with('\n'));
}

#[test]
fn test_named_subquery_columns_resolve_through_alias() {
    let output = anonymize(REPORT);
    assert!(output.contains("JOIN Alpha t2 ON t2.A = t1."), "{output}");
    assert!(output.contains("SUM(t2.c1)"), "{output}");
}

#[test]
fn test_aliases_are_numbered_in_order() {
    let sql = "SELECT o.id, i.sku FROM orders o LEFT JOIN order_items i ON i.order_id = o.id";
    assert_eq!(
        anonymize(sql),
        "SELECT t1.A, t2.B FROM Alpha t1 LEFT JOIN Bravo t2 ON t2.C = t1.A"
    );
}

#[test]
fn test_correlated_subquery_sees_outer_alias() {
    let sql = "SELECT name FROM users u WHERE EXISTS (SELECT 1 FROM orders o WHERE o.user_id = u.id)";
    assert_eq!(
        anonymize(sql),
        "SELECT A FROM Alpha t1 WHERE EXISTS (SELECT 1 FROM Bravo t2 WHERE t2.B = t1.C)"
    );
}

#[test]
fn test_derived_table_columns_are_renamed() {
    assert_eq!(
        anonymize("SELECT d.region FROM (SELECT region, amount FROM sales WHERE amount > 5) d"),
        "SELECT t1.A FROM (SELECT A, B FROM Alpha WHERE B > 5) t1"
    );
    assert_eq!(
        anonymize("SELECT COUNT(*) FROM (SELECT DISTINCT customer_id FROM orders)"),
        "SELECT COUNT(*) FROM (SELECT DISTINCT A FROM Alpha)"
    );
}

#[test]
fn test_union_blocks() {
    let sql = "SELECT email FROM users UNION ALL SELECT email FROM leads";
    assert_eq!(anonymize(sql), "SELECT A FROM Alpha UNION ALL SELECT A FROM Bravo");
}

#[test]
fn test_literals_share_placeholders_by_content() {
    let sql = "SELECT id FROM users WHERE city = 'Paris' OR home = 'Paris' OR city = 'Oslo'";
    assert_eq!(
        anonymize(sql),
        "SELECT A FROM Alpha WHERE B = 'lorem ipsum' OR C = 'lorem ipsum' OR B = 'lorem 2'"
    );
}

#[test]
fn test_bind_parameters_and_numbers_kept() {
    let sql = "UPDATE accounts SET balance = balance - 12.5 WHERE id = $1 AND owner = :owner";
    assert_eq!(
        anonymize(sql),
        "UPDATE Alpha SET A = A - 12.5 WHERE B = $1 AND C = :owner"
    );
}

#[test]
fn test_casts_keep_their_type() {
    assert_eq!(
        anonymize("SELECT created::date FROM events"),
        "SELECT A::date FROM Alpha"
    );
}

#[test]
fn test_quoted_identifiers_keep_their_quotes() {
    assert_eq!(
        anonymize("SELECT `user name` FROM `app`.`people`"),
        "SELECT `A` FROM `Alpha`.`Bravo`"
    );
}

#[test]
fn test_custom_phrases() {
    let config = FrontEndConfig::sql().with_phrases(vec!["redacted".to_string()]);
    assert_eq!(
        anonymize_with("SELECT * FROM t WHERE a = 'x' AND b = 'y'", &config),
        "SELECT * FROM Alpha WHERE a = 'redacted' AND b = 'redacted 2'"
    );
}

#[test]
fn test_malformed_input_still_produces_output() {
    for sql in ["SELECT ((", "WITH AS", "'unterminated", "/* open", "SELECT a.b.c. FROM", ";;;", ""] {
        let _ = anonymize(sql);
    }
    assert_eq!(anonymize(""), "");
}

#[test]
fn test_trait_object_matches_function() {
    let front: Box<dyn Anonymize> = Box::new(SqlAnonymizer::default());
    assert_eq!(front.anonymize(REPORT), anonymize(REPORT));
}
