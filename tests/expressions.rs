use test_utils::lower;

#[test]
fn post_increment_yields_the_old_value() {
    let ir = lower(
        r#"
int bump(int x) {
    int y = x++;
    return y;
}
"#,
    );

    assert!(ir.contains("%t2 = add i32 %t1, 1"), "{ir}");
    assert!(ir.contains("store i32 %t2, i32* %x.addr"), "{ir}");
    // The old value is what lands in y.
    assert!(ir.contains("store i32 %t1, i32* %y"), "{ir}");
}

#[test]
fn pre_increment_yields_the_new_value() {
    let ir = lower(
        r#"
int bump(int x) {
    int y = ++x;
    return y;
}
"#,
    );

    assert!(ir.contains("%t2 = add i32 %t1, 1"), "{ir}");
    assert!(ir.contains("store i32 %t2, i32* %x.addr"), "{ir}");
    assert!(ir.contains("store i32 %t2, i32* %y"), "{ir}");
}

#[test]
fn integer_literal_bases() {
    let ir = lower("int f(void) { return 0x10 + 010; }");
    assert!(ir.contains("add i32 16, 8"), "{ir}");
}

#[test]
fn negated_constant_folds() {
    let ir = lower("int f(void) { return -5; }");
    assert!(ir.contains("ret i32 -5"), "{ir}");
    assert!(!ir.contains("sub"), "{ir}");
}

#[test]
fn arithmetic_operators() {
    let ir = lower("int f(int a, int b) { return (a + b) - a * (b / a); }");

    assert!(ir.contains("add i32"), "{ir}");
    assert!(ir.contains("sub i32"), "{ir}");
    assert!(ir.contains("mul i32"), "{ir}");
    assert!(ir.contains("sdiv i32"), "{ir}");
}

#[test]
fn comparisons_are_signed() {
    let ir = lower("int f(int a, int b) { if (a < b) return a == b; return a != b; }");

    assert!(ir.contains("icmp slt i32"), "{ir}");
    assert!(ir.contains("icmp eq i32"), "{ir}");
    assert!(ir.contains("icmp ne i32"), "{ir}");
}

#[test]
fn pointer_cast_is_a_bitcast() {
    let ir = lower(
        r#"
extern int puts(const char*);

int f(char *s) {
    puts((char*)s);
    return 0;
}
"#,
    );

    assert!(ir.contains("bitcast i8* %t1 to i8*"), "{ir}");
}

#[test]
fn address_of_an_identifier() {
    let ir = lower(
        r#"
int f(void) {
    int x = 1;
    int *p;
    p = &x;
    return p[0];
}
"#,
    );

    assert!(ir.contains("store i32* %x, i32** %p"), "{ir}");
}

#[test]
fn assignment_is_an_expression() {
    let ir = lower(
        r#"
int f(void) {
    int a;
    int b;
    a = b = 5;
    return a;
}
"#,
    );

    assert!(ir.contains("store i32 5, i32* %b"), "{ir}");
    assert!(ir.contains("store i32 5, i32* %a"), "{ir}");
}
