use test_utils::lower;

#[test]
fn logical_and_joins_with_a_phi() {
    let ir = lower("int any(int a, int b) { return a > 0 && b > 0; }");

    assert!(
        ir.contains("br i1 %t2, label %and.rhs, label %and.end"),
        "{ir}"
    );
    assert!(ir.contains("and.rhs:"), "{ir}");
    assert!(ir.contains("and.end:"), "{ir}");
    assert!(
        ir.contains("%t5 = phi i1 [ %t2, %entry ], [ %t4, %and.rhs ]"),
        "{ir}"
    );
}

#[test]
fn logical_or_branches_the_other_way() {
    let ir = lower("int any(int a, int b) { return a > 0 || b > 0; }");

    assert!(
        ir.contains("br i1 %t2, label %or.end, label %or.rhs"),
        "{ir}"
    );
    assert!(
        ir.contains("%t5 = phi i1 [ %t2, %entry ], [ %t4, %or.rhs ]"),
        "{ir}"
    );
}

#[test]
fn nested_and_uses_the_block_after_the_lhs() {
    let ir = lower("int all(int a, int b, int c) { return a > 0 && b > 0 && c > 0; }");

    // The φ of the outer && must name the end block of the inner one as
    // the lhs predecessor, not the function entry.
    assert!(
        ir.contains("phi i1 [ %t5, %and.end ], [ %t7, %and.rhs.1 ]"),
        "{ir}"
    );
}

#[test]
fn condition_can_short_circuit() {
    let ir = lower(
        r#"
int f(int a, int b) {
    if (a > 0 && b > 0)
        return 1;
    return 0;
}
"#,
    );

    assert!(ir.contains("and.end:"), "{ir}");
    assert!(ir.contains("if.then:"), "{ir}");
    assert!(ir.contains("label %if.then, label %if.end"), "{ir}");
}
