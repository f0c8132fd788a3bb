//! Drives a three-test suite plus a measuring test through the adapter and
//! prints the console stream followed by the end-of-run listing.
//!
//! RUST_LOG=testline_core=debug cargo run --example basic_suite

use testline_core::{
    ErrorInfo, MeasuredCase, MeasurementCarrier, NativeResult, ResultAdapter, RunTally,
    TestIdentity,
};
use tracing_subscriber::EnvFilter;

type Body = fn(&mut MeasuredCase) -> Result<(), ErrorInfo>;

fn expect_eq(expected: i64, actual: i64) -> Result<(), ErrorInfo> {
    if expected == actual {
        Ok(())
    } else {
        Err(ErrorInfo::failure(format!("{} != {}", expected, actual)))
    }
}

fn test_something(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    expect_eq(4, 2 * 2)
}

fn test_something_failed(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    expect_eq(5, 2 * 2)
}

fn test_something_error(_: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    Err(ErrorInfo::error("oops"))
}

fn test_car(case: &mut MeasuredCase) -> Result<(), ErrorInfo> {
    let measure = |case: &mut MeasuredCase, name: &str, value: i64| {
        case.record_measurement(name, value)
            .map_err(|e| ErrorInfo::error(e.to_string()))
    };
    measure(case, "speed", 66)?;
    measure(case, "gas", 42)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let suite: [(&str, Body); 4] = [
        ("testSomething", test_something),
        ("testSomethingFailed", test_something_failed),
        ("testSomethingError", test_something_error),
        ("testCar", test_car),
    ];

    let mut result = ResultAdapter::new(RunTally::new(false), std::io::stdout());
    for (name, body) in suite {
        let mut case = MeasuredCase::new(TestIdentity::new(format!("{} (demo.BasicTest)", name)));
        case.set_up_measurements();
        result.start_test(&case);
        match body(&mut case) {
            Ok(()) => result.add_success(&mut case),
            Err(e) if e.is_failure() => result.add_failure(&mut case, &e),
            Err(e) => result.add_error(&mut case, &e),
        }
    }

    result.print_errors()?;
    println!(
        "Ran {} tests: {}",
        result.native().tests_run(),
        if result.native().was_successful() { "OK" } else { "FAILED" }
    );
    Ok(())
}
