//! Rewrites the SQL files under `tests/fixtures` end to end.

use pgfilter::{
    FieldDescriptor, FieldKind, FilterModel, FilterRewriter, FilterValue, MarkerStyle,
    ModelDescriptor, RewriterConfig, placeholder_indices,
};
use std::collections::BTreeSet;

struct User;

impl FilterModel for User {
    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new()
            .field(FieldDescriptor::new("ID").column("id").kind(FieldKind::Int))
            .field(FieldDescriptor::new("Perm").column("perm").kind(FieldKind::Int))
            .field(FieldDescriptor::new("Name").column("name").kind(FieldKind::Text))
            .field(FieldDescriptor::new("Role").column("role").kind(FieldKind::Text))
            .field(FieldDescriptor::new("Group").column("-"))
    }
}

struct Fixture {
    sql: &'static str,
    args: Vec<FilterValue>,
}

impl Fixture {
    fn new(sql: &'static str) -> Self {
        Self {
            sql,
            args: Vec::new(),
        }
    }

    /// The `(0, "root", 0)` arguments shared by the three-placeholder fixtures.
    fn with_root_args(sql: &'static str) -> Self {
        Self {
            sql,
            args: vec![
                FilterValue::Int(0),
                FilterValue::from("root"),
                FilterValue::Int(0),
            ],
        }
    }
}

fn admin_filter() -> FilterRewriter {
    FilterRewriter::new::<User>("role = 'admin'")
}

fn assert_contiguous(sql: &str, args: usize) {
    let expected: BTreeSet<usize> = (1..=args).collect();
    assert_eq!(placeholder_indices(sql), expected, "{sql}");
}

#[test]
fn rewrites_statement_without_arguments() {
    let fixture = Fixture::new(include_str!("fixtures/000.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();

    assert_eq!(sql, "SELECT *\nFROM users\nWHERE role = $1\nORDER BY id\n");
    assert_eq!(args, vec![FilterValue::from("admin")]);
}

#[test]
fn unknown_column_fails_without_output() {
    let fixture = Fixture::new(include_str!("fixtures/000.sql"));
    let rewriter = FilterRewriter::new::<User>("company = 'IBM'");

    let err = rewriter.rewrite(fixture.sql, fixture.args).unwrap_err();
    let db = err.db_error().unwrap();
    assert_eq!(db.code, "42601");
    assert_eq!(db.where_, "company = 'IBM'");
    assert!(db.message.contains("company"));
    assert_eq!(db.internal_query, fixture.sql);
}

#[test]
fn excluded_group_column_is_rejected() {
    let fixture = Fixture::new(include_str!("fixtures/000.sql"));
    let rewriter = FilterRewriter::new::<User>("group = 'staff'");
    assert!(rewriter.rewrite(fixture.sql, fixture.args).is_err());
}

#[test]
fn marker_at_beginning() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/001.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();

    assert!(sql.contains("WHERE role = $4 AND\n"), "{sql}");
    assert_eq!(args.len(), 4);
    assert_eq!(args[3], FilterValue::from("admin"));
    assert_contiguous(&sql, args.len());
}

#[test]
fn marker_in_middle() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/010.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();

    assert!(sql.contains("AND role = $4\n  AND name <> $2"), "{sql}");
    assert_eq!(args.len(), 4);
    assert_contiguous(&sql, args.len());
}

#[test]
fn marker_at_end() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/100.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();

    assert!(sql.ends_with("AND role = $4\n"), "{sql}");
    assert_eq!(
        args,
        vec![
            FilterValue::Int(0),
            FilterValue::from("root"),
            FilterValue::Int(0),
            FilterValue::from("admin"),
        ]
    );
    assert_contiguous(&sql, args.len());
}

#[test]
fn compound_filter_keeps_numbering() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/010.sql"));
    let rewriter = FilterRewriter::new::<User>("role = admin and (perm >= 2 or name % bo)");
    let (sql, args) = rewriter.rewrite(fixture.sql, fixture.args).unwrap();

    assert!(
        sql.contains("(role = $4 AND (perm >= $5 OR name LIKE $6))"),
        "{sql}"
    );
    assert_eq!(
        &args[3..],
        &[
            FilterValue::from("admin"),
            FilterValue::Int(2),
            FilterValue::from("%bo%"),
        ]
    );
    assert_contiguous(&sql, args.len());
}

#[test]
fn empty_filter_is_true() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/100.sql"));
    let (sql, args) = FilterRewriter::new::<User>("")
        .rewrite(fixture.sql, fixture.args)
        .unwrap();

    assert!(sql.ends_with("AND TRUE\n"), "{sql}");
    assert_eq!(args.len(), 3);
    assert_contiguous(&sql, args.len());
}

#[test]
fn sentinel_statement() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/sentinel.sql"));
    let rewriter = admin_filter().with_marker_style(MarkerStyle::Sentinel);
    let (sql, args) = rewriter.rewrite(fixture.sql, fixture.args).unwrap();

    assert_eq!(
        sql,
        "SELECT *\nFROM users\nWHERE role = $4\n  AND perm > $1\n  AND name <> $2\n  AND id > $3\nORDER BY id\n"
    );
    assert_eq!(args.len(), 4);
    assert_contiguous(&sql, args.len());
}

#[test]
fn sentinel_ignored_in_comment_style() {
    let fixture = Fixture::with_root_args(include_str!("fixtures/sentinel.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();
    assert_eq!(sql, fixture.sql);
    assert_eq!(args.len(), 3);
}

#[test]
fn exclusion_block_is_not_live() {
    let fixture = Fixture::new(include_str!("fixtures/exclude.sql"));
    let (sql, args) = admin_filter().rewrite(fixture.sql, fixture.args).unwrap();

    assert_eq!(
        sql,
        "SELECT *\nFROM users\nWHERE deleted_at IS NULL AND role = $1\nORDER BY id\n"
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn exclusion_block_kept_when_configured() {
    let fixture = Fixture::new(include_str!("fixtures/exclude.sql"));
    let rewriter = admin_filter().with_config(RewriterConfig::new().keep_exclusions());
    let rewritten = rewriter.rewrite_sql(fixture.sql, 0).unwrap();

    // The documentation line is the first marker once the block is kept.
    assert!(rewritten.sql.starts_with("-- exclude\n"));
    assert!(rewritten.sql.contains("WHERE deleted_at IS NULL AND -- :condition"));
}

#[test]
fn config_from_json() {
    let config: RewriterConfig =
        serde_json::from_str(r#"{"marker_style": "sentinel", "strip_exclusions": false}"#).unwrap();
    assert_eq!(config.marker_style, MarkerStyle::Sentinel);
    assert!(!config.strip_exclusions);

    let config: RewriterConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, RewriterConfig::default());
}

#[test]
fn descriptor_from_json() {
    let descriptor: ModelDescriptor = serde_json::from_str(
        r#"[
            {"name": "id", "column": "id", "kind": "int"},
            {"name": "user_role", "column": "role", "expose": "role"},
            {"name": "secret"}
        ]"#,
    )
    .unwrap();
    let rewriter = FilterRewriter::from_descriptor("role = admin and id > 3", descriptor);

    let rewritten = rewriter
        .rewrite_sql(include_str!("fixtures/000.sql"), 0)
        .unwrap();
    assert!(rewritten.sql.contains("WHERE (role = $1 AND id > $2)"));
    assert_eq!(
        rewritten.params,
        vec![FilterValue::from("admin"), FilterValue::Int(3)]
    );
    assert!(rewriter.fields().ignored().contains("secret"));
}
