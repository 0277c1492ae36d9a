//! Microphone input using cpal
//!
//! Opens the default (or a named) input device and feeds 16-bit little-endian
//! PCM chunks through a channel, ready for [`super::CaptureSession`] to
//! buffer. Device failures map to distinct user-facing messages by category,
//! mirroring the taxonomy of browser microphone errors (absent, unreadable,
//! unsupported).
//!
//! cpal streams are not `Send`; a `MicrophoneInput` must be created and used
//! on one thread for the lifetime of the capture session.

use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, info, warn};

/// Live microphone stream delivering PCM chunks
pub struct MicrophoneInput {
    stream: Stream,
    rx: Receiver<Vec<u8>>,
    sample_rate: u32,
    channels: u16,
}

impl MicrophoneInput {
    /// List available input device names
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let devices: Vec<String> = host
            .input_devices()
            .map_err(|e| Error::Device(format!("Could not enumerate microphones: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} input devices", devices.len());
        Ok(devices)
    }

    /// Open an input device and build the capture stream (not yet running)
    ///
    /// `device_name = None` selects the default input device. A named device
    /// that has gone missing falls back to the default with a warning.
    pub fn open(device_name: Option<String>) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(name) = device_name.as_ref() {
            let mut devices = host
                .input_devices()
                .map_err(|e| Error::Device(format!("Could not enumerate microphones: {}", e)))?;

            match devices.find(|d| d.name().ok().as_ref() == Some(name)) {
                Some(dev) => {
                    info!("Found requested microphone: {}", name);
                    dev
                }
                None => {
                    warn!("Microphone '{}' not found, falling back to default", name);
                    host.default_input_device()
                        .ok_or_else(|| Error::Device(no_device_message()))?
                }
            }
        } else {
            host.default_input_device()
                .ok_or_else(|| Error::Device(no_device_message()))?
        };

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Device(format!("Could not read microphone settings: {}", e)))?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        debug!(
            "Microphone config: sample_rate={}, channels={}, format={:?}",
            sample_rate, channels, sample_format
        );

        let (tx, rx) = channel();
        let stream = build_stream(&device, &config, sample_format, tx)?;

        Ok(Self {
            stream,
            rx,
            sample_rate,
            channels,
        })
    }

    /// Start delivering chunks
    pub fn start(&self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| Error::Device(format!("Could not start the microphone: {}", e)))
    }

    /// Stop delivering chunks (the device stays open)
    pub fn pause(&self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| Error::Device(format!("Could not pause the microphone: {}", e)))
    }

    /// Take every chunk that has arrived since the last call
    pub fn drain_chunks(&self) -> Vec<Vec<u8>> {
        self.rx.try_iter().collect()
    }

    /// MIME type describing the delivered payload
    pub fn mime_type(&self) -> String {
        format!(
            "audio/L16;rate={};channels={}",
            self.sample_rate, self.channels
        )
    }
}

fn no_device_message() -> String {
    "No microphone was found. Connect a microphone and try again.".to_string()
}

fn build_stream(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    tx: Sender<Vec<u8>>,
) -> Result<Stream> {
    let err_fn = |e| warn!("Microphone stream error: {}", e);

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let mut chunk = Vec::with_capacity(data.len() * 2);
                for sample in data {
                    let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    chunk.extend_from_slice(&value.to_le_bytes());
                }
                let _ = tx.send(chunk);
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let mut chunk = Vec::with_capacity(data.len() * 2);
                for sample in data {
                    chunk.extend_from_slice(&sample.to_le_bytes());
                }
                let _ = tx.send(chunk);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(Error::Device(format!(
                "The microphone sample format {:?} is not supported",
                other
            )))
        }
    };

    stream.map_err(|e| Error::Device(build_error_message(&e)))
}

/// Map stream-construction failures to distinct user-facing messages
fn build_error_message(err: &cpal::BuildStreamError) -> String {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => {
            "The microphone is no longer available. It may be in use by another application."
                .to_string()
        }
        cpal::BuildStreamError::StreamConfigNotSupported => {
            "The microphone does not support the required recording settings.".to_string()
        }
        other => format!("Could not open the microphone: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_errors_have_distinct_messages() {
        let busy = build_error_message(&cpal::BuildStreamError::DeviceNotAvailable);
        let unsupported = build_error_message(&cpal::BuildStreamError::StreamConfigNotSupported);
        assert!(busy.contains("no longer available"));
        assert!(unsupported.contains("does not support"));
        assert_ne!(busy, unsupported);
    }

    #[test]
    fn open_succeeds_or_reports_a_device_error() {
        // Headless machines have no input device; either outcome is valid,
        // but a failure must be a user-facing Device error.
        match MicrophoneInput::open(None) {
            Ok(input) => assert!(input.mime_type().starts_with("audio/L16")),
            Err(Error::Device(message)) => assert!(!message.is_empty()),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
}
