//! Output formatting shared by every command: one `Output` impl per result type,
//! selected by the `--format` flag.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, one result per line
    Human,
    /// JSON, for scripting
    Json,
    /// YAML
    Yaml,
}

pub trait Output {
    fn write_human<W: Write>(&self, writer: W) -> anyhow::Result<()>;

    fn write_json<W: Write>(&self, writer: W) -> anyhow::Result<()>
    where
        Self: Serialize,
    {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    fn write_yaml<W: Write>(&self, writer: W) -> anyhow::Result<()>
    where
        Self: Serialize,
    {
        Ok(serde_yaml::to_writer(writer, self)?)
    }
}

impl OutputFormat {
    pub fn print<T: Output + Serialize>(self, data: &T) -> anyhow::Result<()> {
        let stdout = io::stdout();
        match self {
            OutputFormat::Human => data.write_human(stdout),
            OutputFormat::Json => data.write_json(stdout),
            OutputFormat::Yaml => data.write_yaml(stdout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Greeting {
        name: String,
    }

    impl Output for Greeting {
        fn write_human<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
            writeln!(writer, "hello, {}", self.name)?;
            Ok(())
        }
    }

    #[test]
    fn human_uses_the_custom_format() {
        let mut buf = Vec::new();
        Greeting { name: "world".to_string() }.write_human(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "hello, world\n");
    }

    #[test]
    fn json_round_trips() {
        let mut buf = Vec::new();
        Greeting { name: "world".to_string() }.write_json(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["name"], "world");
    }
}
