//! Haptic feedback: the alert waveform and the device interface.
//!
//! The engine never touches a motor. The driver asks the [`Haptic`] device
//! for its capability once, then hands it the alert waveform in the form the
//! device understands:
//!
//! - `Waveform`: timings plus per-segment amplitudes and a repeat index
//! - `Legacy`:   timings only, alternating off/on, plus a repeat index

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};

/// Full motor strength.
pub const MAX_AMPLITUDE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticCapability {
    /// Amplitude-aware waveforms.
    Waveform,
    /// On/off timings only.
    Legacy,
    /// No motor available.
    None,
}

/// A vibration pattern. Segment `i` holds `amplitudes[i]` for `timings_ms[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    pub timings_ms: Vec<u64>,
    pub amplitudes: Vec<u8>,
    /// Index to loop back to after the last segment; `None` plays once.
    pub repeat: Option<usize>,
}

impl Waveform {
    /// Phase-finished alert: wait 0, pulse 500 ms, pause 500 ms, forever.
    pub fn alert() -> Self {
        Self {
            timings_ms: vec![0, 500, 500],
            amplitudes: vec![0, MAX_AMPLITUDE, 0],
            repeat: Some(0),
        }
    }

    /// Express the pattern in the form `capability` accepts.
    pub fn request_for(&self, capability: HapticCapability) -> Option<HapticRequest> {
        match capability {
            HapticCapability::Waveform => Some(HapticRequest::Waveform {
                timings_ms: self.timings_ms.clone(),
                amplitudes: self.amplitudes.clone(),
                repeat: self.repeat,
            }),
            HapticCapability::Legacy => Some(HapticRequest::Legacy {
                timings_ms: self.timings_ms.clone(),
                repeat: self.repeat,
            }),
            HapticCapability::None => None,
        }
    }
}

/// What is actually sent to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum HapticRequest {
    Waveform {
        timings_ms: Vec<u64>,
        amplitudes: Vec<u8>,
        repeat: Option<usize>,
    },
    Legacy {
        timings_ms: Vec<u64>,
        repeat: Option<usize>,
    },
}

impl HapticRequest {
    /// (amplitude, duration) pairs. Legacy timings alternate off/on,
    /// starting with off.
    pub fn segments(&self) -> Vec<(u8, u64)> {
        match self {
            HapticRequest::Waveform {
                timings_ms,
                amplitudes,
                ..
            } => timings_ms
                .iter()
                .enumerate()
                .map(|(i, &ms)| (amplitudes.get(i).copied().unwrap_or(0), ms))
                .collect(),
            HapticRequest::Legacy { timings_ms, .. } => timings_ms
                .iter()
                .enumerate()
                .map(|(i, &ms)| (if i % 2 == 1 { MAX_AMPLITUDE } else { 0 }, ms))
                .collect(),
        }
    }

    pub fn repeat(&self) -> Option<usize> {
        match self {
            HapticRequest::Waveform { repeat, .. } | HapticRequest::Legacy { repeat, .. } => {
                *repeat
            }
        }
    }
}

/// A vibration device. Only one pattern is active at a time; `vibrate`
/// replaces whatever was playing.
pub trait Haptic: Send + 'static {
    fn capability(&self) -> HapticCapability;
    fn vibrate(&mut self, request: HapticRequest);
    fn cancel(&mut self);
}

/// Device without a motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHaptic;

impl Haptic for NullHaptic {
    fn capability(&self) -> HapticCapability {
        HapticCapability::None
    }

    fn vibrate(&mut self, _request: HapticRequest) {}

    fn cancel(&mut self) {}
}

/// Drive a motor through `request`, calling `set_amplitude` on every segment.
///
/// A repeating request never returns; abort the task running it to stop.
/// A one-shot request ends with the motor off.
pub async fn play<F>(request: &HapticRequest, mut set_amplitude: F)
where
    F: FnMut(u8),
{
    let segments = request.segments();
    if segments.is_empty() {
        set_amplitude(0);
        return;
    }
    let mut index = 0;
    loop {
        let (amplitude, ms) = segments[index];
        set_amplitude(amplitude);
        sleep(Duration::from_millis(ms)).await;
        index += 1;
        if index == segments.len() {
            match request.repeat() {
                Some(start) if start < segments.len() && segments[start..].iter().any(|s| s.1 > 0) => {
                    index = start;
                }
                _ => break,
            }
        }
    }
    set_amplitude(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_prefers_waveform_form() {
        let req = Waveform::alert().request_for(HapticCapability::Waveform).unwrap();
        assert_eq!(
            req,
            HapticRequest::Waveform {
                timings_ms: vec![0, 500, 500],
                amplitudes: vec![0, 255, 0],
                repeat: Some(0),
            }
        );
    }

    #[test]
    fn legacy_form_drops_amplitudes() {
        let req = Waveform::alert().request_for(HapticCapability::Legacy).unwrap();
        assert_eq!(
            req,
            HapticRequest::Legacy {
                timings_ms: vec![0, 500, 500],
                repeat: Some(0),
            }
        );
        assert_eq!(req.segments(), vec![(0, 0), (255, 500), (0, 500)]);
    }

    #[test]
    fn no_motor_no_request() {
        assert!(Waveform::alert().request_for(HapticCapability::None).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_pattern_ends_with_motor_off() {
        let req = HapticRequest::Waveform {
            timings_ms: vec![100, 200],
            amplitudes: vec![128, 255],
            repeat: None,
        };
        let mut seen = Vec::new();
        play(&req, |a| seen.push(a)).await;
        assert_eq!(seen, vec![128, 255, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_pattern_keeps_pulsing() {
        let req = Waveform::alert().request_for(HapticCapability::Waveform).unwrap();
        let pulses = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = pulses.clone();
        let task = tokio::spawn(async move {
            play(&req, move |a| {
                if a > 0 {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            })
            .await;
        });
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        task.abort();
        let _ = task.await;
        assert!(pulses.load(std::sync::atomic::Ordering::SeqCst) >= 3);
    }
}
