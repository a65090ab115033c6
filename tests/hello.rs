use test_utils::lower;

#[test]
fn return_zero() {
    let ir = lower("int main(void) { return 0; }");

    assert!(ir.contains("define i32 @main() {"), "{ir}");
    assert!(ir.contains("ret i32 0"), "{ir}");
    assert!(!ir.contains("dead"), "{ir}");
}

#[test]
fn hello_world() {
    let ir = lower(
        r#"
extern int printf(const char*, ...);

int main(void) {
    printf("hi\n");
    return 0;
}
"#,
    );

    assert!(ir.contains("declare i32 @printf(i8*, ...)"), "{ir}");
    assert!(
        ir.contains(r#"@str1 = constant [4 x i8] c"hi\0A\00""#),
        "{ir}"
    );
    assert!(
        ir.contains("call i32 (i8*, ...) @printf(i8* bitcast ([4 x i8]* @str1 to i8*))"),
        "{ir}"
    );
    assert!(ir.contains("ret i32 0"), "{ir}");
}

#[test]
fn string_literals_are_numbered_in_source_order() {
    let ir = lower(
        r#"
extern int printf(const char*, ...);

int main(void) {
    printf("a\n");
    printf("b\n");
    return 0;
}
"#,
    );

    let first = ir.find(r#"@str1 = constant [3 x i8] c"a\0A\00""#);
    let second = ir.find(r#"@str2 = constant [3 x i8] c"b\0A\00""#);
    assert!(first.is_some() && second.is_some(), "{ir}");
    assert!(first < second, "{ir}");
}

#[test]
fn void_function_returns_void() {
    let ir = lower(
        r#"
extern int puts(const char*);

void greet(void) {
    puts("hey");
}
"#,
    );

    assert!(ir.contains("define void @greet() {"), "{ir}");
    assert!(ir.contains("ret void"), "{ir}");
    assert!(ir.contains("call i32 @puts(i8*"), "{ir}");
}
