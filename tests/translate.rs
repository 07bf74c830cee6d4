//! Integration tests driving the public `driver` API over the fixtures in
//! `tests/fixtures/`, checked structurally (stack deltas, label shape, frame
//! order) rather than by running the output on a CPU model.
use std::path::{Path, PathBuf};

use hack_vm::driver::{self, Mode};

fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(rel)
}

#[test]
fn single_file_add_program_matches_expected_assembly() {
    let plan = driver::plan(fixture("add.vm")).unwrap();
    assert_eq!(plan.mode, Mode::Single);

    let mut out = Vec::new();
    driver::translate(&plan, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    // written on one physical line so insta's inline-snapshot dedent logic
    // has nothing to normalize away.
    insta::assert_snapshot!(out, @"// push constant 7\n@7\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n// push constant 8\n@8\nD=A\n@SP\nA=M\nM=D\n@SP\nM=M+1\n// add\n@SP\nAM=M-1\nD=M\n\n@SP\nA=M-1\nM=M+D\n(END)\n@END\n0;JMP\n");
}

#[test]
fn single_unit_mode_has_no_bootstrap_but_has_terminator() {
    let plan = driver::plan(fixture("add.vm")).unwrap();
    let mut out = Vec::new();
    driver::translate(&plan, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(!out.contains("Sys.init"));
    assert!(out.ends_with("(END)\n@END\n0;JMP\n"));
}

#[test]
fn multi_unit_mode_has_bootstrap_and_no_terminator() {
    let plan = driver::plan(fixture("multi")).unwrap();
    assert_eq!(plan.mode, Mode::Multi);

    let mut out = Vec::new();
    driver::translate(&plan, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.starts_with("@256\nD=A\n@SP\nM=D"));
    assert!(out.contains("@Sys.init\n0;JMP"));
    assert!(!out.contains("(END)"));
}

#[test]
fn static_variables_are_isolated_per_unit() {
    let plan = driver::plan(fixture("multi")).unwrap();
    let mut out = Vec::new();
    driver::translate(&plan, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    // two units both using `static 0` must not alias each other's cell.
    assert!(out.contains("@Foo.0"));
    assert!(out.contains("@Bar.0"));
}

#[test]
fn each_unit_defines_its_own_function_entry_label() {
    let plan = driver::plan(fixture("multi")).unwrap();
    let mut out = Vec::new();
    driver::translate(&plan, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();

    assert!(out.contains("(Foo.run)"));
    assert!(out.contains("(Bar.run)"));
}

#[test]
fn directory_units_are_visited_in_lexicographic_order() {
    let plan = driver::plan(fixture("multi")).unwrap();
    assert_eq!(plan.units.len(), 2);
    assert_eq!(plan.units[0].base_name, "Bar");
    assert_eq!(plan.units[1].base_name, "Foo");
}

#[test]
fn malformed_command_is_reported_and_aborts_translation() {
    let dir = std::env::temp_dir().join(format!(
        "hack-vm-integration-test-{}-bogus",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("Bogus.vm");
    std::fs::write(&file, "push constant\n").unwrap();

    let plan = driver::plan(&file).unwrap();
    let mut out = Vec::new();
    let err = driver::translate(&plan, &mut out).unwrap_err();
    assert!(err.to_string().contains("Bogus"));

    std::fs::remove_dir_all(&dir).ok();
}
