//! Terminal bell standing in for a vibration motor.

use std::io::Write;

use pomowatch_core::haptics::{self, Haptic, HapticCapability, HapticRequest};
use tokio::task::JoinHandle;

/// Rings the terminal bell on every rising edge of the pattern.
#[derive(Debug)]
pub struct BellHaptic {
    capability: HapticCapability,
    player: Option<JoinHandle<()>>,
}

impl BellHaptic {
    pub fn new(enabled: bool, prefer_waveform: bool) -> Self {
        let capability = match (enabled, prefer_waveform) {
            (false, _) => HapticCapability::None,
            (true, true) => HapticCapability::Waveform,
            (true, false) => HapticCapability::Legacy,
        };
        Self {
            capability,
            player: None,
        }
    }
}

impl Haptic for BellHaptic {
    fn capability(&self) -> HapticCapability {
        self.capability
    }

    fn vibrate(&mut self, request: HapticRequest) {
        self.cancel();
        self.player = Some(tokio::spawn(async move {
            let mut last = 0u8;
            haptics::play(&request, move |amplitude| {
                if amplitude > 0 && last == 0 {
                    ring();
                }
                last = amplitude;
            })
            .await;
        }));
    }

    fn cancel(&mut self) {
        if let Some(player) = self.player.take() {
            player.abort();
        }
    }
}

impl Drop for BellHaptic {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn ring() {
    let mut err = std::io::stderr();
    let _ = err.write_all(b"\x07");
    let _ = err.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_follows_config() {
        assert_eq!(BellHaptic::new(false, true).capability(), HapticCapability::None);
        assert_eq!(BellHaptic::new(true, true).capability(), HapticCapability::Waveform);
        assert_eq!(BellHaptic::new(true, false).capability(), HapticCapability::Legacy);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_player() {
        let mut bell = BellHaptic::new(true, true);
        let request = pomowatch_core::Waveform::alert()
            .request_for(HapticCapability::Waveform)
            .unwrap();
        bell.vibrate(request);
        assert!(bell.player.is_some());
        bell.cancel();
        assert!(bell.player.is_none());
    }
}
