//! End-to-end scenarios run against the full parse → execute pipeline.

use smali_ir::parser::{parse, EntrySelector};
use smali_ir::source::Source;
use smali_vm::executor::ExecutionLimits;
use smali_vm::{run_entry, Cell};

fn run(src: &str) -> Cell {
    let source = Source::from_str(src);
    let program = parse(&source, EntrySelector::First).expect("parse failed");
    run_entry(&program, Vec::new(), ExecutionLimits::unbounded())
        .expect("execution failed")
        .expect("no return value")
}

#[test]
fn constant_return() {
    let src = r#"
        const/4 v0, 0x5
        return v0
    "#;
    assert_eq!(run(src).as_int().unwrap(), 5);
}

#[test]
fn arithmetic() {
    let src = r#"
        const/4 v0, 0x3
        const/4 v1, 0x4
        add-int v2, v0, v1
        mul-int/lit8 v2, v2, 0x2
        return v2
    "#;
    assert_eq!(run(src).as_int().unwrap(), 14);
}

#[test]
fn conditional_branch() {
    let src = r#"
        const/4 v0, 0x0
        if-eqz v0, :L
        const/4 v1, 0x1
        return v1
        :L
        const/4 v1, 0x2
        return v1
    "#;
    assert_eq!(run(src).as_int().unwrap(), 2);
}

#[test]
fn packed_switch_falls_through() {
    let src = r#"
        const/4 v0, 0x5
        packed-switch v0, :T
        const/4 v1, 0xF
        return v1
        :T
        .packed-switch 0
            :A
            :B
        .end packed-switch
        :A
        const/4 v1, 0x1
        return v1
        :B
        const/4 v1, 0x2
        return v1
    "#;
    assert_eq!(run(src).as_int().unwrap(), 15);
}

#[test]
fn packed_switch_jumps_to_case() {
    let src = r#"
        const/4 v0, 0x1
        packed-switch v0, :T
        const/4 v1, 0xF
        return v1
        :T
        .packed-switch 0
            :A
            :B
        .end packed-switch
        :A
        const/4 v1, 0x1
        return v1
        :B
        const/4 v1, 0x2
        return v1
    "#;
    assert_eq!(run(src).as_int().unwrap(), 2);
}

#[test]
fn array_fill_and_aget() {
    let src = r#"
        const/4 v0, 0x3
        new-array v1, v0, [B
        fill-array-data v1, :D
        const/4 v2, 0x1
        aget-byte v3, v1, v2
        return v3
        :D
        .array-data 1
            0x0at 0x2at 0x4at
        .end array-data
    "#;
    assert_eq!(run(src).as_int().unwrap(), 2);
}

#[test]
fn division_by_zero_routed_to_catch() {
    let src = r#"
        :try_start
        const/4 v0, 0x1
        const/4 v1, 0x0
        div-int v2, v0, v1
        :try_end
        .catch Ljava/lang/ArithmeticException; {:try_start .. :try_end} :H
        :H
        move-exception v3
        const/4 v2, 0x2A
        return v2
    "#;
    assert_eq!(run(src).as_int().unwrap(), 42);
}

#[test]
fn array_index_out_of_bounds_is_uncaught_error() {
    let src = r#"
        const/4 v0, 0x2
        new-array v1, v0, [B
        const/4 v2, 0x9
        aget-byte v3, v1, v2
        return v3
    "#;
    let source = Source::from_str(src);
    let program = parse(&source, EntrySelector::First).unwrap();
    let result = run_entry(&program, Vec::new(), ExecutionLimits::unbounded());
    assert!(result.is_err());
}
