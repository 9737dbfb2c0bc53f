//! End-to-end tests driving the public crate surface: DIMACS text in,
//! verdict text out (spec §8 concrete scenarios).

use std::io::Cursor;

use cdcl_sat::run_single_instance;
use cdcl_sat::solver::Config;

fn run(dimacs: &str) -> String {
    let mut input = Cursor::new(dimacs.as_bytes());
    let mut out = Vec::new();
    run_single_instance(&mut input, &mut out, Config::default()).expect("solve should not error");
    String::from_utf8(out).unwrap()
}

#[test]
fn scenario_1_unit_clause_is_sat() {
    let out = run("p cnf 1 1\n1 0\n");
    assert_eq!(out, "SAT\n1 0\n");
}

#[test]
fn scenario_2_conflicting_units_are_unsat() {
    let out = run("p cnf 1 2\n1 0\n-1 0\n");
    assert_eq!(out, "UNSAT\n");
}

#[test]
fn scenario_3_three_clause_instance_is_sat() {
    let out = run("p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n");
    assert!(out.starts_with("SAT\n"));
    let model = parse_model(&out);
    assert!(satisfies(&model, &[&[1, 2], &[-1, 3], &[-2, -3]]));
}

#[test]
fn scenario_4_pigeonhole_php_3_2_is_unsat() {
    // 3 pigeons into 2 holes, the standard 12-clause/6-variable encoding.
    // Variable id = pigeon * 2 + hole + 1.
    let v = |p: i64, h: i64| p * 2 + h + 1;
    let mut text = String::from("p cnf 6 9\n");
    for p in 0..3 {
        text.push_str(&format!("{} {} 0\n", v(p, 0), v(p, 1)));
    }
    for h in 0..2 {
        for p1 in 0..3 {
            for p2 in (p1 + 1)..3 {
                text.push_str(&format!("-{} -{} 0\n", v(p1, h), v(p2, h)));
            }
        }
    }
    let out = run(&text);
    assert_eq!(out, "UNSAT\n");
}

#[test]
fn scenario_5_four_clause_instance_is_sat() {
    let out = run("p cnf 4 4\n1 2 0\n-1 3 0\n-2 4 0\n-3 -4 0\n");
    assert!(out.starts_with("SAT\n"));
    let model = parse_model(&out);
    assert!(satisfies(&model, &[&[1, 2], &[-1, 3], &[-2, 4], &[-3, -4]]));
}

#[test]
fn scenario_6_empty_clause_is_unsat() {
    let out = run("p cnf 1 1\n0\n");
    assert_eq!(out, "UNSAT\n");
}

#[test]
fn property_p7_clause_permutation_does_not_change_verdict() {
    let a = run("p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n");
    let b = run("p cnf 3 3\n-2 -3 0\n-1 3 0\n1 2 0\n");
    assert_eq!(a.lines().next(), b.lines().next());
}

#[test]
fn property_p6_restart_idempotence() {
    // Same seed, same input: rerunning must reach the same verdict both times.
    let text = "p cnf 6 9\n\
        1 2 0\n3 4 0\n5 6 0\n\
        -1 -3 0\n-1 -5 0\n-3 -5 0\n\
        -2 -4 0\n-2 -6 0\n-4 -6 0\n";
    assert_eq!(run(text).lines().next(), run(text).lines().next());
}

fn parse_model(out: &str) -> Vec<i64> {
    out.lines()
        .nth(1)
        .expect("SAT output carries a model line")
        .split_whitespace()
        .map(|t| t.parse().unwrap())
        .filter(|&lit| lit != 0)
        .collect()
}

fn satisfies(model: &[i64], clauses: &[&[i64]]) -> bool {
    clauses.iter().all(|clause| clause.iter().any(|lit| model.contains(lit)))
}
