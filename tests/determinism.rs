use test_utils::lower;

const SOURCE: &str = r#"
extern int printf(const char*, ...);

enum color { RED, GREEN, BLUE };

struct point { int x; int y; };

int classify(int n) {
    switch (n) {
    case RED:
        return 1;
    case GREEN:
        return 2;
    }
    return 0;
}

int main(void) {
    struct point p;
    int total = 0;
    p.x = 0;
    for (int i = 0; i < 10; i = i + 1) {
        if (i > 5 && classify(i) == 0)
            total = total + i;
    }
    printf("%d\n", total);
    return p.x;
}
"#;

/// Lowering the same AST twice produces byte-identical IR.
#[test]
fn lowering_is_deterministic() {
    let first = lower(SOURCE);
    let second = lower(SOURCE);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}
