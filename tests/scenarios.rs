mod common;

use common::{append, entries, new_log, run, test_case, Tracer};
use trellis::{
    errors::Error,
    executor::{Computer, SuiteRunner, TestCaseRunner},
    manipulation::{self, Sorter},
    model::{RuleField, TestClass},
    Runner,
};

fn suite_of_abc(log: &common::Log) -> Box<dyn Runner> {
    let suite = TestClass::builder("S")
        .suite_class(test_case("T", &["a", "b", "c"], log))
        .build();
    Computer::serial().runner_for(&suite).unwrap()
}

#[test]
fn declaration_order_without_filter_or_sort() {
    let log = new_log();
    let result = run(suite_of_abc(&log).as_ref());
    assert_eq!(entries(&log), ["a", "b", "c"]);
    assert_eq!(result.run_count(), 3);
    assert!(result.was_successful());
}

#[test]
fn reverse_name_sorter_reverses_methods() {
    let log = new_log();
    let runner = suite_of_abc(&log);
    runner.sort(Sorter::by_name().reversed());
    run(runner.as_ref());
    assert_eq!(entries(&log), ["c", "b", "a"]);
}

#[test]
fn class_hooks_surround_the_test() {
    let log = std::sync::Arc::new(std::sync::Mutex::new(String::new()));
    let push = |text: &'static str| {
        let log = log.clone();
        move || {
            log.lock().unwrap().push_str(text);
            Ok::<(), Error>(())
        }
    };
    let class = TestClass::builder("T")
        .before_all("setup", push("before "))
        .after_all("teardown", push("after "))
        .test("one", push("test "))
        .build();
    let runner = TestCaseRunner::test_case(class).unwrap();
    run(&runner);
    assert_eq!(*log.lock().unwrap(), "before test after ");
}

#[test]
fn propagated_suite_rule_enters_nested_suites() {
    let log = new_log();
    let leaf = TestClass::builder("L")
        .suite_class(test_case("T", &["test"], &log))
        .build();
    let nested = TestClass::builder("N")
        .suite_class(leaf)
        .rule(RuleField::suite("tracer", Tracer::new("N", &log)).propagate())
        .build();
    let runner = Computer::serial().runner_for(&nested).unwrap();
    run(runner.as_ref());
    assert_eq!(entries(&log), ["N>N", "N>L", "test", "N<L", "N<N"]);
}

#[test]
fn filter_rejecting_leaf_suite_leaves_nothing() {
    let log = new_log();
    let leaf = TestClass::builder("L")
        .suite_class(test_case("T", &["a", "b"], &log))
        .build();
    let nested = TestClass::builder("N").suite_class(leaf).build();
    let runner = Computer::serial().runner_for(&nested).unwrap();

    let nothing = manipulation::name_pattern(
        None,
        Some(regex::Regex::new(".*").unwrap()),
    );
    assert_eq!(runner.filter(nothing), Err(Error::NoTestsRemain));
    assert!(entries(&log).is_empty());
}

#[test]
fn suite_runner_can_be_built_by_hand() {
    let log = new_log();
    let class = test_case("T", &["x"], &log);
    let member: Box<dyn Runner> =
        Box::new(TestCaseRunner::test_case(class).unwrap());
    let suite =
        SuiteRunner::suite(TestClass::builder("Hand").build(), vec![member])
            .unwrap();
    let result = run(&suite);
    assert_eq!(result.run_count(), 1);
    assert_eq!(entries(&log), ["x"]);
}

#[test]
fn appended_hooks_log_in_order() {
    let log = new_log();
    let class = TestClass::builder("T")
        .before_each("before", append(&log, "before"))
        .test("only", append(&log, "only"))
        .build();
    run(&TestCaseRunner::test_case(class).unwrap());
    assert_eq!(entries(&log), ["before", "only"]);
}
