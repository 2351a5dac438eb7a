use std::fmt;

use cpal::traits::{DeviceTrait, HostTrait};

use crate::{error::Direction, logging};

/// Descriptor of one host API as reported by the native library.
#[derive(Clone, Debug)]
pub struct HostApiInfo {
    /// Position in enumeration order.
    pub index: usize,
    pub id: cpal::HostId,
    pub name: String,
    pub device_count: usize,
    pub default_input: Option<String>,
    pub default_output: Option<String>,
}

impl HostApiInfo {
    fn from_id(index: usize, id: cpal::HostId) -> Self {
        let mut info = Self {
            index,
            id,
            name: id.name().to_owned(),
            device_count: 0,
            default_input: None,
            default_output: None,
        };

        // An API that cannot be brought up is still listed, just without devices.
        if let Ok(host) = cpal::host_from_id(id) {
            info.device_count = host.devices().map(Iterator::count).unwrap_or(0);
            info.default_input = host.default_input_device().and_then(|d| d.name().ok());
            info.default_output = host.default_output_device().and_then(|d| d.name().ok());
        }
        info
    }
}

impl fmt::Display for HostApiInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "deviceCount: {}", self.device_count)?;
        writeln!(
            f,
            "defaultInputDevice: {}",
            self.default_input.as_deref().unwrap_or("none")
        )?;
        write!(
            f,
            "defaultOutputDevice: {}",
            self.default_output.as_deref().unwrap_or("none")
        )
    }
}

/// Cached descriptor of an input or output device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_sample_rate: Option<u32>,
}

impl DeviceInfo {
    /// Describes `device` as used for `direction`; the default sample rate
    /// comes from that direction's default config when it has one.
    pub fn from_device(device: &cpal::Device, direction: Direction) -> Self {
        let max_input_channels = device
            .supported_input_configs()
            .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
            .unwrap_or(0);
        let max_output_channels = device
            .supported_output_configs()
            .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
            .unwrap_or(0);
        let input_rate = device.default_input_config().map(|c| c.sample_rate().0).ok();
        let output_rate = device.default_output_config().map(|c| c.sample_rate().0).ok();

        Self {
            name: device.name().unwrap_or_else(|_| "<unknown>".to_owned()),
            max_input_channels,
            max_output_channels,
            default_sample_rate: default_rate_for(direction, input_rate, output_rate),
        }
    }
}

fn default_rate_for(
    direction: Direction,
    input_rate: Option<u32>,
    output_rate: Option<u32>,
) -> Option<u32> {
    match direction {
        Direction::Input => input_rate.or(output_rate),
        Direction::Output => output_rate.or(input_rate),
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name: {}", self.name)?;
        writeln!(f, "maxInputChannels: {}", self.max_input_channels)?;
        writeln!(f, "maxOutputChannels: {}", self.max_output_channels)?;
        match self.default_sample_rate {
            Some(rate) => write!(f, "defaultSampleRate: {rate}"),
            None => write!(f, "defaultSampleRate: unknown"),
        }
    }
}

/// Every host API compiled into the native library, in enumeration order.
pub fn enumerate_host_apis() -> Vec<HostApiInfo> {
    cpal::available_hosts()
        .into_iter()
        .enumerate()
        .map(|(index, id)| {
            let info = HostApiInfo::from_id(index, id);
            logging::log(format_args!("available API index: {index}\n{info}"));
            info
        })
        .collect()
}

/// Position of the platform default host within `apis`.
pub fn default_host_index(apis: &[HostApiInfo]) -> usize {
    let default_id = cpal::default_host().id();
    apis.iter()
        .position(|api| api.id == default_id)
        .unwrap_or(0)
}

/// Picks the host API to open.
///
/// Starts from `default_index`; every API whose name matches one of
/// `preferred` replaces the current choice, so the last match wins.
pub fn select_host_api<'a, I>(names: I, default_index: usize, preferred: &[String]) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .enumerate()
        .filter(|(_, name)| {
            preferred
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
        })
        .map(|(index, _)| index)
        .last()
        .unwrap_or(default_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preferred(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    #[test]
    fn test_default_is_kept_without_preferred_match() {
        let names = ["JACK", "PulseAudio"];
        let selected = select_host_api(names, 1, &preferred(&["ALSA"]));
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_preferred_host_overrides_default() {
        let names = ["JACK", "ALSA"];
        let selected = select_host_api(names, 0, &preferred(&["ALSA", "WASAPI"]));
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_last_preferred_match_wins() {
        let names = ["WASAPI", "ASIO", "ALSA"];
        let selected = select_host_api(names, 1, &preferred(&["ALSA", "WASAPI"]));
        assert_eq!(selected, 2);
    }

    #[test]
    fn test_match_ignores_case() {
        let names = ["CoreAudio", "alsa"];
        let selected = select_host_api(names, 0, &preferred(&["ALSA"]));
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_empty_preference_list_keeps_default() {
        let names = ["ALSA", "JACK"];
        assert_eq!(select_host_api(names, 1, &[]), 1);
    }

    #[test]
    fn test_enumeration_indexes_follow_order() {
        let apis = enumerate_host_apis();
        for (position, api) in apis.iter().enumerate() {
            assert_eq!(api.index, position);
        }
        if !apis.is_empty() {
            assert!(default_host_index(&apis) < apis.len());
        }
    }

    #[test]
    fn test_input_device_prefers_input_rate() {
        assert_eq!(
            default_rate_for(Direction::Input, Some(16_000), Some(48_000)),
            Some(16_000)
        );
        assert_eq!(
            default_rate_for(Direction::Output, Some(16_000), Some(48_000)),
            Some(48_000)
        );
    }

    #[test]
    fn test_rate_falls_back_to_other_direction() {
        assert_eq!(default_rate_for(Direction::Input, None, Some(44_100)), Some(44_100));
        assert_eq!(default_rate_for(Direction::Output, Some(22_050), None), Some(22_050));
        assert_eq!(default_rate_for(Direction::Input, None, None), None);
    }

    #[test]
    fn test_device_info_display_lists_fields() {
        let info = DeviceInfo {
            name: "Built-in".to_owned(),
            max_input_channels: 2,
            max_output_channels: 2,
            default_sample_rate: Some(48_000),
        };
        let text = info.to_string();
        assert!(text.contains("name: Built-in"));
        assert!(text.contains("defaultSampleRate: 48000"));
    }
}
