use crate::report::ReportFormat;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub config: Option<String>,
    pub database: Option<String>,
    pub trials: Option<u32>,
    pub max_failures: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub format: ReportFormat,
    pub color: bool,
    pub verbose: bool,
}

impl Default for CommandLineConfig {
    fn default() -> Self {
        Self {
            config: None,
            database: None,
            trials: None,
            max_failures: None,
            timeout_ms: None,
            format: ReportFormat::Text,
            color: true,
            verbose: false,
        }
    }
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut config = Self::default();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--config" => {
                    config.config = Some(required(iter.next(), "--config")?.to_string());
                }
                "--db" | "--database" => {
                    config.database = Some(required(iter.next(), "--db")?.to_string());
                }
                "--trials" | "-n" => {
                    config.trials = Some(parse_number(
                        required(iter.next(), "--trials")?,
                        "--trials",
                    )?);
                }
                "--max-failures" => {
                    config.max_failures = Some(parse_number(
                        required(iter.next(), "--max-failures")?,
                        "--max-failures",
                    )?);
                }
                "--timeout-ms" => {
                    config.timeout_ms = Some(parse_number(
                        required(iter.next(), "--timeout-ms")?,
                        "--timeout-ms",
                    )?);
                }
                "--format" => {
                    config.format = ReportFormat::parse(required(iter.next(), "--format")?)?;
                }
                "--no-color" => config.color = false,
                "--verbose" | "-v" => config.verbose = true,
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                other => {
                    if config.config.is_some() {
                        return Err(format!("unexpected argument {other}"));
                    }
                    config.config = Some(other.to_string());
                }
            }
        }
        Ok(config)
    }

    pub fn help() -> &'static str {
        "Usage: planbench [--config PATH] [--db memory|PATH] [--trials N] [--max-failures N]\n\
         \x20                [--timeout-ms MS] [--format text|json] [--no-color] [--verbose]\n\
         \n\
         The config path falls back to $PLANBENCH_CONFIG, then ./planbench.json.\n"
    }
}

fn required<'a>(value: Option<&&'a str>, flag: &str) -> Result<&'a str, String> {
    value
        .copied()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got {value}"))
}
