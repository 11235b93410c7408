use super::*;

fn post(id: PostId, problem: &str) -> Post {
    Post {
        id,
        timestamp: "2025-01-01 09:00".into(),
        category: Category::Academic,
        problem: problem.into(),
        status: Status::New,
        upvotes: 0,
    }
}

// =============================================================================
// Category / Status
// =============================================================================

#[test]
fn category_parse_accepts_every_variant_name() {
    for category in Category::ALL {
        assert_eq!(Category::parse(category.as_str()), Some(category));
    }
}

#[test]
fn category_parse_trims_whitespace() {
    assert_eq!(Category::parse("  Management "), Some(Category::Management));
}

#[test]
fn category_parse_rejects_unknown_and_wrong_case() {
    assert_eq!(Category::parse("Canteen"), None);
    assert_eq!(Category::parse("facilities"), None);
    assert_eq!(Category::parse(""), None);
}

#[test]
fn status_defaults_to_new() {
    assert_eq!(Status::default(), Status::New);
}

#[test]
fn status_parse_round_trips_names() {
    for status in Status::ALL {
        assert_eq!(Status::parse(status.as_str()), Some(status));
    }
    assert_eq!(Status::parse("Closed"), None);
}

#[test]
fn enums_serialize_as_variant_names() {
    assert_eq!(serde_json::to_value(Category::Suggestion).unwrap(), "Suggestion");
    assert_eq!(serde_json::to_value(Status::Reviewed).unwrap(), "Reviewed");
}

// =============================================================================
// AdminEdit
// =============================================================================

#[test]
fn admin_edit_defaults_delete_false() {
    let edit: AdminEdit = serde_json::from_str(r#"{"id":3,"status":"Solved"}"#).unwrap();
    assert_eq!(edit, AdminEdit::set_status(3, Status::Solved));
}

#[test]
fn admin_edit_delete_needs_no_status() {
    let edit: AdminEdit = serde_json::from_str(r#"{"id":5,"delete":true}"#).unwrap();
    assert_eq!(edit, AdminEdit::delete(5));
}

#[test]
fn admin_edit_rejects_immutable_fields() {
    let result = serde_json::from_str::<AdminEdit>(r#"{"id":1,"status":"New","upvotes":99}"#);
    assert!(result.is_err());
}

#[test]
fn admin_edit_rejects_unknown_status() {
    let result = serde_json::from_str::<AdminEdit>(r#"{"id":1,"status":"Closed"}"#);
    assert!(result.is_err());
}

// =============================================================================
// display_order
// =============================================================================

#[test]
fn display_order_is_newest_first() {
    let posts = vec![post(0, "A"), post(1, "B"), post(2, "C")];
    let shown: Vec<_> = display_order(posts).into_iter().map(|p| p.problem).collect();
    assert_eq!(shown, ["C", "B", "A"]);
}

#[test]
fn display_order_empty() {
    assert!(display_order(Vec::new()).is_empty());
}
