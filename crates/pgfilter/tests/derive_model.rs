//! `#[derive(FilterModel)]` against the runtime types.

use pgfilter::{FieldKind, FieldMap, FilterModel, FilterRewriter, FilterValue};

#[derive(FilterModel)]
#[allow(dead_code)]
struct User {
    #[filter(column = "id")]
    id: i64,
    #[filter(column = "perm")]
    perm: Option<i32>,
    #[filter(column = "name")]
    name: String,
    #[filter(column = "role")]
    role: String,
    #[filter(column = "-")]
    group: String,
    password_hash: String,
}

#[derive(FilterModel)]
#[filter(rename_all = "camelCase")]
#[allow(dead_code)]
struct Account {
    #[filter(column = "account_id", kind = "text")]
    account_id: i64,
    #[filter(column = "display_name")]
    display_name: String,
    #[filter(column = "is_active", expose = "active")]
    is_active: bool,
    #[filter(column = "balance")]
    balance: f64,
    #[filter(column = "meta")]
    meta: Vec<u8>,
}

#[derive(FilterModel)]
#[allow(dead_code)]
enum Status {
    Active,
    Disabled,
}

#[derive(FilterModel)]
#[allow(dead_code)]
struct Borrowed<'a> {
    #[filter(column = "label")]
    label: &'a str,
}

#[test]
fn derive_includes_annotated_fields_in_order() {
    let map = FieldMap::of::<User>();
    let keys: Vec<_> = map.fields().iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, vec!["id", "perm", "name", "role"]);

    let ignored: Vec<_> = map.ignored().iter().map(String::as_str).collect();
    assert_eq!(ignored, vec!["group", "password_hash"]);
}

#[test]
fn derive_infers_kinds() {
    let descriptor = User::descriptor();
    let kinds: Vec<_> = descriptor.fields().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Int,
            FieldKind::Int,
            FieldKind::Text,
            FieldKind::Text,
            FieldKind::Text,
            FieldKind::Text,
        ]
    );

    let descriptor = Account::descriptor();
    let kinds: Vec<_> = descriptor.fields().iter().map(|f| f.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldKind::Text,
            FieldKind::Text,
            FieldKind::Bool,
            FieldKind::Float,
            FieldKind::Any,
        ]
    );
}

#[test]
fn derive_rename_all_and_expose() {
    let map = FieldMap::of::<Account>();
    let included = map.included();
    assert_eq!(included.get("accountId").map(String::as_str), Some("account_id"));
    assert_eq!(included.get("displayName").map(String::as_str), Some("display_name"));
    assert_eq!(included.get("active").map(String::as_str), Some("is_active"));
    assert_eq!(map.columns().get("is_active").map(String::as_str), Some("is_active"));
}

#[test]
fn derive_non_struct_is_empty() {
    assert!(Status::descriptor().is_empty());
    assert!(FieldMap::of::<Status>().is_empty());
}

#[test]
fn derive_with_lifetime() {
    let map = FieldMap::of::<Borrowed<'static>>();
    assert_eq!(map.fields()[0].kind, FieldKind::Text);
}

#[test]
fn derived_model_drives_rewriter() {
    let rewriter = FilterRewriter::new::<User>("role = 'admin' and perm >= 2");
    let (sql, args) = rewriter
        .rewrite(
            "SELECT * FROM users WHERE id > $1 AND -- :condition",
            vec![FilterValue::Int(0)],
        )
        .unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM users WHERE id > $1 AND (role = $2 AND perm >= $3)"
    );
    assert_eq!(
        args,
        vec![
            FilterValue::Int(0),
            FilterValue::from("admin"),
            FilterValue::Int(2),
        ]
    );

    let err = FilterRewriter::new::<User>("password_hash = 'x'")
        .rewrite_sql("SELECT * FROM users WHERE -- :condition", 0)
        .unwrap_err();
    assert!(err.is_parse_error());
}

#[test]
fn derived_rename_used_in_expressions() {
    let rewriter = FilterRewriter::new::<Account>("displayName % 'ann' or active = true");
    let rewritten = rewriter
        .rewrite_sql("SELECT * FROM accounts WHERE -- :condition", 0)
        .unwrap();
    assert_eq!(
        rewritten.sql,
        "SELECT * FROM accounts WHERE (display_name LIKE $1 OR is_active = $2)"
    );
    assert_eq!(
        rewritten.params,
        vec![FilterValue::from("%ann%"), FilterValue::Bool(true)]
    );
}
