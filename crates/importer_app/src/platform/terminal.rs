use std::io::{self, BufRead, Write};

use importer_engine::{Decision, Escalation, Operator};
use importer_logging::{importer_error, importer_info};

/// Asks the person at the terminal. Blocks the pipeline until they answer.
pub struct TerminalOperator;

#[async_trait::async_trait]
impl Operator for TerminalOperator {
    async fn decide(&self, escalation: &Escalation) -> Decision {
        importer_info!("Waiting for operator: {}", escalation);
        let prompt = prompt_for(escalation);
        let answer = tokio::task::spawn_blocking(move || read_answer(&prompt)).await;

        let decision = match answer {
            Ok(Ok(Some(line))) => parse_answer(&line),
            Ok(Ok(None)) => {
                importer_error!("Standard input closed, aborting");
                Decision::Abort
            }
            Ok(Err(err)) => {
                importer_error!("Could not read operator input: {}", err);
                Decision::Abort
            }
            Err(err) => {
                importer_error!("Operator prompt failed: {}", err);
                Decision::Abort
            }
        };
        importer_info!("Operator answered {:?}", decision);
        decision
    }
}

fn prompt_for(escalation: &Escalation) -> String {
    if escalation.allows_retry() {
        format!("\n{escalation}\n[Enter] continue, [r] retry, [a] abort: ")
    } else {
        format!("\n{escalation}\n[Enter] continue, [a] abort: ")
    }
}

/// `None` on end of input.
fn read_answer(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;
    drop(stdout);

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn parse_answer(line: &str) -> Decision {
    match line.trim().to_ascii_lowercase().as_str() {
        "a" | "abort" | "q" | "quit" => Decision::Abort,
        "r" | "retry" => Decision::Retry,
        _ => Decision::Proceed,
    }
}
