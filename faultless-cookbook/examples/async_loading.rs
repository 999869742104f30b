//! Sequential async loading that stops at the first failed step, with a
//! deadline on every step.

use faultless::prelude::*;
use faultless_cookbook::with_deadline;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct LoadError(&'static str);

async fn load_people() -> Result<Vec<&'static str>, LoadError> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Ok(vec!["you", "me", "them"])
}

async fn load_cities() -> Result<Vec<&'static str>, LoadError> {
    tokio::time::sleep(Duration::from_millis(100)).await;
    Err(LoadError("web api error getting some cities"))
}

async fn load_answers() -> Result<Vec<u32>, LoadError> {
    // slower than the deadline on purpose
    tokio::time::sleep(Duration::from_secs(5)).await;
    Ok(vec![42])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).init();
    println!("=== faultless: async loading ===\n");

    let executor: Executor<LoadError> = with_deadline(Duration::from_millis(500))?;

    let people = executor.try_execute_async(load_people).await;
    if !people.was_successful() {
        return Ok(());
    }
    println!("people: {:?}", people.return_value());

    let answers = executor
        .with_message("loading answers")
        .try_execute_async(load_answers)
        .on_exception(|r| println!("answers: {}", r.error().map(|e| e.to_string()).unwrap_or_default()))
        .await;
    println!("answers timed out: {}", answers.error().map(|e| e.is_timeout()).unwrap_or(false));

    let cities = executor
        .try_execute_async(load_cities)
        .retry(2)
        .await;
    if !cities.was_successful() {
        println!("cities failed, stopping here");
        return Ok(());
    }
    println!("cities: {:?}", cities.return_value());
    Ok(())
}
