//! The everyday ways to consume a result: inspect the flag, branch on it,
//! retry a fixed number of times, or retry only for a specific failure.

use faultless::prelude::*;
use faultless_cookbook::alerting;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("sql error getting all the people in the world")]
    Sql,
    #[error("web api error getting some cities")]
    WebApi,
    #[error("the cloud is not answering")]
    Cloud,
    #[error("file check timed out")]
    Timeout,
}

fn people(fail: bool) -> Result<Vec<&'static str>, DemoError> {
    if fail {
        return Err(DemoError::Sql);
    }
    Ok(vec!["you", "me", "them"])
}

fn cities(fail: bool) -> Result<Vec<&'static str>, DemoError> {
    if fail {
        return Err(DemoError::WebApi);
    }
    Ok(vec!["City A", "City B", "City D"])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();
    println!("=== faultless: sample flows ===\n");

    // collects what a UI would show in its error list
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    let executor: Executor<DemoError> = alerting(move |e: &ExecutionError<DemoError>| {
        sink.lock().unwrap_or_else(|p| p.into_inner()).push(e.to_string())
    })?;

    // inspect the flag directly
    let people_result = executor.try_execute(|| people(true));
    if people_result.was_successful() {
        println!("people: {:?}", people_result.return_value());
    } else {
        println!("people failed: {:?}", people_result.error().map(|e| e.to_string()));
    }

    // branch on success or failure
    let _ = executor
        .try_execute(|| cities(false))
        .on_exception(|r| println!("cities failed: {:?}", r.error()))
        .on_success(|r| println!("cities: {:?}", r.return_value()));

    // retry a fixed number of times
    let cloud_calls = Arc::new(AtomicUsize::new(0));
    let counter = cloud_calls.clone();
    let answers = executor
        .with_message("asking the cloud, call {}")
        .arg("get_all_the_answers")
        .try_execute(move || match counter.fetch_add(1, Ordering::SeqCst) {
            0 | 1 => Err(DemoError::Cloud),
            _ => Ok(42),
        })
        .retry(3)
        .on_exception(|r| println!("cloud gave up: {:?}", r.error()));
    println!(
        "answers: {:?} after {} calls",
        answers.return_value(),
        cloud_calls.load(Ordering::SeqCst)
    );

    // retry once, but only when the failure is a timeout
    let _ = executor
        .try_execute_action(|| Err(DemoError::Timeout))
        .retry_once_if(|r| matches!(r.error().and_then(|e| e.as_inner()), Some(DemoError::Timeout)))
        .on_exception(|r| println!("file check still failing: {:?}", r.error()));

    println!("\nerror list:");
    for message in errors.lock().unwrap_or_else(|p| p.into_inner()).iter() {
        println!("  - {}", message);
    }
    Ok(())
}
