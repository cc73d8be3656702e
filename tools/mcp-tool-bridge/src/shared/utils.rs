use anyhow::{Result, anyhow};
use std::time::{Duration, Instant};

pub async fn measure_latency<F, Fut, T>(f: F) -> (T, Duration)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let start = Instant::now();
    let res = f().await;
    (res, start.elapsed())
}

pub fn parse_command(cmd: &str) -> Result<(String, Vec<String>)> {
    let shell_words =
        shell_words::split(cmd).map_err(|e| anyhow!("failed to parse command '{}': {}", cmd, e))?;
    if shell_words.is_empty() {
        return Err(anyhow!("empty command"));
    }
    Ok((shell_words[0].clone(), shell_words[1..].to_vec()))
}
