use crate::events::AppEvent;
use async_channel::Sender;
use orbit::touch::{SOCKET_PATH, TouchPhase, TouchSample};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

/// Tracks the single touch contact shared by every client connection so the
/// host only ever sees `down`, any number of `move`, then `up`.
#[derive(Debug, Default)]
pub struct Contact {
    down: bool,
}

impl Contact {
    /// Returns the sample if it continues the current sequence.
    pub fn accept(&mut self, sample: TouchSample) -> Option<TouchSample> {
        match (sample.phase, self.down) {
            (TouchPhase::Down, false) => {
                self.down = true;
                Some(sample)
            }
            (TouchPhase::Move, true) => Some(sample),
            (TouchPhase::Up, true) => {
                self.down = false;
                Some(sample)
            }
            (TouchPhase::Down, true) => {
                log::warn!("Dropping '{}': a touch is already down", sample);
                None
            }
            (_, false) => {
                log::warn!("Dropping '{}': no touch is down", sample);
                None
            }
        }
    }

    pub fn is_down(&self) -> bool {
        self.down
    }
}

pub async fn run_server(tx: Sender<AppEvent>) {
    // Cleanup old socket if it exists
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };

    // `orbit` opens one connection per sample, so sequencing happens here
    // rather than per connection.
    let (sample_tx, sample_rx) = async_channel::unbounded::<TouchSample>();
    tokio::spawn(async move {
        let mut contact = Contact::default();
        while let Ok(sample) = sample_rx.recv().await {
            let Some(sample) = contact.accept(sample) else {
                continue;
            };
            if tx.send(AppEvent::Touch(sample)).await.is_err() {
                break;
            }
        }
    });

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let sample_tx = sample_tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match line.parse::<TouchSample>() {
                            Ok(sample) => {
                                if sample_tx.send(sample).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => log::warn!("Bad touch line '{}': {}", line.trim(), e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit::geom::Point;

    fn sample(phase: TouchPhase) -> TouchSample {
        TouchSample::new(phase, Point::new(10.0, 20.0))
    }

    #[test]
    fn test_contact_forwards_well_formed_sequence() {
        let mut contact = Contact::default();
        for phase in [TouchPhase::Down, TouchPhase::Move, TouchPhase::Move, TouchPhase::Up] {
            assert_eq!(contact.accept(sample(phase)), Some(sample(phase)));
        }
        assert!(!contact.is_down());
    }

    #[test]
    fn test_contact_drops_out_of_order_samples() {
        let mut contact = Contact::default();
        assert_eq!(contact.accept(sample(TouchPhase::Move)), None);
        assert_eq!(contact.accept(sample(TouchPhase::Up)), None);

        assert!(contact.accept(sample(TouchPhase::Down)).is_some());
        assert_eq!(contact.accept(sample(TouchPhase::Down)), None);
        assert!(contact.is_down());

        assert!(contact.accept(sample(TouchPhase::Up)).is_some());
        assert!(contact.accept(sample(TouchPhase::Down)).is_some());
    }
}
