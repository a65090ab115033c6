use test_utils::{lower, lower_err};

#[test]
fn array_subscript_on_an_array_decays_with_a_bitcast() {
    let ir = lower(
        r#"
int first(void) {
    int a[3] = {1, 2, 3};
    return a[0];
}
"#,
    );

    assert!(ir.contains("%a = alloca [3 x i32]"), "{ir}");
    // The initializer stores element by element.
    assert!(
        ir.contains("getelementptr [3 x i32], [3 x i32]* %a, i32 0, i32 0"),
        "{ir}"
    );
    assert!(
        ir.contains("getelementptr [3 x i32], [3 x i32]* %a, i32 0, i32 2"),
        "{ir}"
    );
    // The subscript decays the array base to an element pointer.
    assert!(ir.contains("bitcast [3 x i32]* %a to i32*"), "{ir}");
    assert!(ir.contains("getelementptr i32, i32*"), "{ir}");
}

#[test]
fn array_subscript_on_a_pointer_loads_the_base() {
    let ir = lower("int get(int *p, int i) { return p[i]; }");

    assert!(ir.contains("load i32*, i32** %p.addr"), "{ir}");
    assert!(ir.contains("getelementptr i32, i32* %t1, i32 %t2"), "{ir}");
    assert!(!ir.contains("bitcast"), "{ir}");
}

#[test]
fn unsized_array_parameter_is_a_pointer() {
    let ir = lower("int first_of(int a[]) { return a[0]; }");

    assert!(ir.contains("define i32 @first_of(i32* %a) {"), "{ir}");
}

#[test]
fn array_argument_decays_at_the_call_site() {
    let ir = lower(
        r#"
extern int puts(const char*);

int main(void) {
    char buf[4];
    puts(buf);
    return 0;
}
"#,
    );

    assert!(ir.contains("%buf = alloca [4 x i8]"), "{ir}");
    assert!(ir.contains("bitcast [4 x i8]* %buf to i8*"), "{ir}");
    assert!(ir.contains("call i32 @puts(i8* %t1)"), "{ir}");
}

#[test]
fn assignment_through_a_subscript() {
    let ir = lower(
        r#"
int f(void) {
    int a[2] = {0, 0};
    a[1] = 5;
    return a[1];
}
"#,
    );

    assert!(ir.contains("store i32 5, i32*"), "{ir}");
}

#[test]
fn initializer_count_must_match() {
    let err = lower_err("int f(void) { int a[3] = {1, 2}; return 0; }");
    assert!(err.contains("expected 3 initializers, found 2"), "{err}");
}
