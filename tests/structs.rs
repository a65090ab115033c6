use test_utils::{lower, lower_err};

#[test]
fn field_access_indexes_the_literal_struct() {
    let ir = lower(
        r#"
struct point { int x; int y; };

int norm(void) {
    struct point p;
    p.x = 3;
    p.y = 4;
    return p.x * p.y;
}
"#,
    );

    assert!(ir.contains("%p = alloca { i32, i32 }"), "{ir}");
    assert!(
        ir.contains("getelementptr { i32, i32 }, { i32, i32 }* %p, i32 0, i32 0"),
        "{ir}"
    );
    assert!(
        ir.contains("getelementptr { i32, i32 }, { i32, i32 }* %p, i32 0, i32 1"),
        "{ir}"
    );
    assert!(ir.contains("mul i32"), "{ir}");
}

#[test]
fn mixed_field_types() {
    let ir = lower(
        r#"
struct entry { char *name; int value; };

int value_of(void) {
    struct entry e;
    e.value = 7;
    return e.value;
}
"#,
    );

    assert!(ir.contains("alloca { i8*, i32 }"), "{ir}");
    assert!(
        ir.contains("getelementptr { i8*, i32 }, { i8*, i32 }* %e, i32 0, i32 1"),
        "{ir}"
    );
}

#[test]
fn unknown_field_is_rejected() {
    let err = lower_err(
        r#"
struct point { int x; int y; };

int f(void) {
    struct point p;
    return p.z;
}
"#,
    );
    assert!(err.contains("no field 'z' in struct 'point'"), "{err}");
}

#[test]
fn arrow_access_is_rejected() {
    let err = lower_err(
        r#"
struct point { int x; int y; };

int f(void) {
    struct point *p;
    return p->x;
}
"#,
    );
    assert!(err.contains("the '->' operator is not supported"), "{err}");
}
