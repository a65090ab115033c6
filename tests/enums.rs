use test_utils::lower;

#[test]
fn enumerators_number_from_zero() {
    let ir = lower(
        r#"
enum color { RED, GREEN, BLUE };

int favorite(void) {
    return BLUE;
}
"#,
    );

    // Enumerator uses are constants, not loads.
    assert!(ir.contains("ret i32 2"), "{ir}");
    assert!(!ir.contains("load"), "{ir}");
}

#[test]
fn enumerators_work_as_case_labels() {
    let ir = lower(
        r#"
enum color { RED, GREEN, BLUE };

int tag(int c) {
    switch (c) {
    case RED:
        return 0;
    case GREEN:
        return 1;
    }
    return 2;
}
"#,
    );

    assert!(
        ir.contains("i32 0, label %switch.case0 i32 1, label %switch.case1"),
        "{ir}"
    );
}

#[test]
fn enumerator_initializes_a_local() {
    let ir = lower(
        r#"
enum color { RED, GREEN, BLUE };

int f(void) {
    int c = GREEN;
    return c;
}
"#,
    );

    assert!(ir.contains("store i32 1, i32* %c"), "{ir}");
}
