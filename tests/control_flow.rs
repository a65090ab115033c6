use test_utils::lower;

#[test]
fn if_else_with_returns_strips_the_continuation() {
    let ir = lower("int f(int x) { if (x > 0) return x; else return -x; }");

    assert!(ir.contains("define i32 @f(i32 %x) {"), "{ir}");
    assert!(ir.contains("%x.addr = alloca i32"), "{ir}");
    assert!(ir.contains("store i32 %x, i32* %x.addr"), "{ir}");
    assert!(ir.contains("icmp sgt i32"), "{ir}");
    assert!(
        ir.contains("br i1 %t2, label %if.then, label %if.else"),
        "{ir}"
    );
    // Negation of a non-constant subtracts from zero.
    assert!(ir.contains("sub i32 0,"), "{ir}");
    // Both arms return, so the continuation block is unreachable and
    // stripped, along with the dead blocks.
    assert!(!ir.contains("if.end"), "{ir}");
    assert!(!ir.contains("dead"), "{ir}");
}

#[test]
fn if_without_else_falls_through() {
    let ir = lower("int f(int x) { if (x > 0) x = 0; return x; }");

    assert!(ir.contains("if.then:"), "{ir}");
    assert!(ir.contains("if.end:"), "{ir}");
    assert!(!ir.contains("if.else"), "{ir}");
}

#[test]
fn for_loop_shape() {
    let ir = lower(
        r#"
int sum(int n) {
    int s = 0;
    for (int i = 0; i < n; i = i + 1)
        s = s + i;
    return s;
}
"#,
    );

    for block in ["for.cond:", "for.body:", "for.inc:", "for.end:"] {
        assert!(ir.contains(block), "missing {block}:\n{ir}");
    }
    assert!(ir.contains("icmp slt i32"), "{ir}");
    assert!(ir.contains("br label %for.cond"), "{ir}");
    // The induction variable is stored again each iteration.
    assert!(ir.contains(", i32* %i"), "{ir}");
}

#[test]
fn for_loop_without_condition() {
    let ir = lower(
        r#"
int f(void) {
    for (;;)
        break;
    return 0;
}
"#,
    );

    assert!(ir.contains("br label %for.body"), "{ir}");
    assert!(ir.contains("br label %for.end"), "{ir}");
}

#[test]
fn break_leaves_a_while_loop() {
    let ir = lower(
        r#"
int count(int n) {
    int i = 0;
    while (1) {
        if (i > n)
            break;
        i = i + 1;
    }
    return i;
}
"#,
    );

    for block in ["while.cond:", "while.body:", "while.end:"] {
        assert!(ir.contains(block), "missing {block}:\n{ir}");
    }
    assert!(ir.contains("br label %while.end"), "{ir}");
    assert!(!ir.contains("dead"), "{ir}");
}

#[test]
fn switch_lowers_to_a_switch_instruction() {
    let ir = lower(
        r#"
int pick(int n) {
    switch (n) {
    case 0:
        return 10;
    case 1:
        return 11;
    }
    return -1;
}
"#,
    );

    assert!(
        ir.contains(
            "switch i32 %t1, label %switch.end [ i32 0, label %switch.case0 i32 1, label %switch.case1 ]"
        ),
        "{ir}"
    );
    assert!(ir.contains("switch.case0:"), "{ir}");
    assert!(ir.contains("switch.case1:"), "{ir}");
    assert!(ir.contains("ret i32 -1"), "{ir}");
}

#[test]
fn switch_case_with_break() {
    let ir = lower(
        r#"
int pick(int n) {
    int r = 0;
    switch (n) {
    case 1:
        r = 10;
        break;
    case 2:
        r = 20;
        break;
    }
    return r;
}
"#,
    );

    assert!(ir.contains("br label %switch.end"), "{ir}");
    assert!(!ir.contains("dead"), "{ir}");
}

#[test]
fn every_block_ends_in_exactly_one_terminator() {
    let ir = lower(
        r#"
int f(int x) {
    int s = 0;
    while (x > 0) {
        if (s > 100)
            break;
        s = s + x;
        x = x - 1;
    }
    return s;
}
"#,
    );

    let mut terminators = 0;
    let mut since_label = 0;
    for line in ir.lines() {
        let trimmed = line.trim();
        if trimmed.ends_with(':') {
            since_label = 0;
        }
        let is_terminator = trimmed.starts_with("br ")
            || trimmed.starts_with("ret ")
            || trimmed == "ret void"
            || trimmed.starts_with("switch ")
            || trimmed == "unreachable";
        if is_terminator {
            terminators += 1;
            since_label += 1;
            assert!(since_label <= 1, "two terminators in one block:\n{ir}");
        }
    }
    assert!(terminators > 0, "{ir}");
}
