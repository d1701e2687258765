//! Runtime settings read from the environment.
use std::{str::FromStr, sync::LazyLock};

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Width of one column of the state dump.
    pub dump_cell_width: usize,
    /// Log filter directive used by the command line runner.
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { dump_cell_width: 10, log_filter: "warn".to_string() }
    }
}

fn parse_env_opt<T>(key: &str) -> Option<T>
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    let val = std::env::var(key).ok()?;
    if val.is_empty() {
        return None;
    }
    match val.parse::<T>() {
        Ok(v) => Some(v),
        Err(err) => {
            warn!("Ignoring env var {key} with value {val}: {err}");
            None
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr, <T as FromStr>::Err: std::fmt::Display
{
    parse_env_opt(key).unwrap_or(default)
}

fn create_config() -> RuntimeConfig {
    let defaults = RuntimeConfig::default();
    let dump_cell_width = parse_env("RATSTACK_DUMP_WIDTH", defaults.dump_cell_width);
    RuntimeConfig {
        dump_cell_width: if dump_cell_width == 0 { defaults.dump_cell_width } else { dump_cell_width },
        log_filter: parse_env("RATSTACK_LOG", defaults.log_filter),
    }
}

static CELL: LazyLock<RuntimeConfig> = LazyLock::new(create_config);

pub fn get_config() -> &'static RuntimeConfig {
    &CELL
}

#[test]
fn parse_env_falls_back() {
    std::env::set_var("RATSTACK_TEST_WIDTH_BAD", "wide");
    assert_eq!(parse_env("RATSTACK_TEST_WIDTH_BAD", 10usize), 10);
    std::env::set_var("RATSTACK_TEST_WIDTH_GOOD", "14");
    assert_eq!(parse_env("RATSTACK_TEST_WIDTH_GOOD", 10usize), 14);
    assert_eq!(parse_env_opt::<usize>("RATSTACK_TEST_WIDTH_MISSING"), None);
}
