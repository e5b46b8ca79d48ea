//! Audio stream enumeration through `pactl list sink-inputs`

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::strategy::WindowKey;
use super::{AudioSessionSource, ResolutionError};
use crate::process::CommandRunner;

const PROCESS_ID: &str = "application.process.id";
const PROCESS_BINARY: &str = "application.process.binary";
const APPLICATION_NAME: &str = "application.name";

/// One sink input block, as `key = value` properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioStream {
    properties: Vec<(String, String)>,
}

impl AudioStream {
    fn parse_block(block: &str) -> Self {
        let properties = block
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), unquote(value)))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Self { properties }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Executable name of the process owning the stream
    pub fn process_binary(&self) -> Option<&str> {
        self.get(PROCESS_BINARY).filter(|binary| !binary.is_empty())
    }

    pub fn matches(&self, key: &WindowKey) -> bool {
        match key {
            WindowKey::ProcessId(pid) => self.get(PROCESS_ID) == Some(pid.to_string().as_str()),
            WindowKey::Class(class) => [PROCESS_BINARY, APPLICATION_NAME]
                .iter()
                .filter_map(|field| self.get(field))
                .any(|value| value.eq_ignore_ascii_case(class)),
        }
    }
}

/// Split `pactl` output into blank-line separated stream blocks.
pub fn parse_streams(output: &str) -> Vec<AudioStream> {
    let mut streams = Vec::new();
    let mut block = String::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                streams.push(AudioStream::parse_block(&block));
                block.clear();
            }
            continue;
        }
        block.push_str(line);
        block.push('\n');
    }
    if !block.is_empty() {
        streams.push(AudioStream::parse_block(&block));
    }

    streams
}

fn unquote(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

pub struct PulseAudio {
    runner: Arc<dyn CommandRunner>,
}

impl PulseAudio {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl AudioSessionSource for PulseAudio {
    async fn streams(&self) -> Result<Vec<AudioStream>, ResolutionError> {
        let output = self.runner.output("pactl", &["list", "sink-inputs"]).await?;
        let streams = parse_streams(&output);
        debug!("Found {} audio streams", streams.len());
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINK_INPUTS: &str = r#"Sink Input #42
	Driver: protocol-native.c
	Sink: 1
	Volume: front-left: 65536 / 100% / 0.00 dB
	Properties:
		application.name = "Firefox"
		application.process.id = "1234"
		application.process.binary = "firefox"

Sink Input #43
	Driver: protocol-native.c
	Properties:
		application.name = "Wine"
		application.process.id = "999"
		application.process.binary = " wine64-preloader "
"#;

    #[test]
    fn test_parse_streams() {
        let streams = parse_streams(SINK_INPUTS);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].process_binary(), Some("firefox"));
        assert_eq!(streams[0].get(PROCESS_ID), Some("1234"));
        assert_eq!(streams[1].process_binary(), Some("wine64-preloader"));
    }

    #[test]
    fn test_matches_by_pid() {
        let streams = parse_streams(SINK_INPUTS);
        assert!(streams[0].matches(&WindowKey::ProcessId(1234)));
        assert!(!streams[0].matches(&WindowKey::ProcessId(123)));
        assert!(streams[1].matches(&WindowKey::ProcessId(999)));
    }

    #[test]
    fn test_matches_by_class() {
        let streams = parse_streams(SINK_INPUTS);
        assert!(streams[0].matches(&WindowKey::Class("firefox".to_string())));
        assert!(streams[1].matches(&WindowKey::Class("wine".to_string())));
        assert!(!streams[1].matches(&WindowKey::Class("steam".to_string())));
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_streams("").is_empty());
        assert!(parse_streams("\n\n").is_empty());
    }
}
