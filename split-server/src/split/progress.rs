//! Progress reporting.
//!
//! A scan produces zero or more progress events followed by exactly one
//! terminal event. The reporter is the only producer; the terminal
//! methods consume it, so a second terminal event cannot be sent.

use tokio::sync::mpsc;

use crate::domain::Station;

use super::rank::RankedOption;

/// Running count of pricing calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub checked: usize,
    pub total: usize,
    /// Display name of the station being checked.
    pub current_station: String,
    pub message: String,
}

/// An event in a scan's output stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress(Progress),
    /// Terminal: the ranked options to present.
    Complete(Vec<RankedOption>),
    /// Terminal: the scan aborted.
    Error(String),
}

impl ScanEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanEvent::Progress(_))
    }
}

/// The consumer stopped listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("event receiver dropped")]
pub struct Cancelled;

/// Producer side of a scan's event stream.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: mpsc::Sender<ScanEvent>,
    checked: usize,
    total: usize,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        Self {
            tx,
            checked: 0,
            total: 0,
        }
    }

    /// A reporter and the receiving end of its event stream.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ScanEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// True once the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the consumer has gone away.
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    pub fn checked(&self) -> usize {
        self.checked
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Announce how many calls the scan will make.
    ///
    /// Sends an initial event with nothing checked yet, unless there is
    /// nothing to check.
    pub async fn start(&mut self, total: usize, station: &Station) -> Result<(), Cancelled> {
        self.total = total;
        self.checked = 0;

        if total == 0 {
            return Ok(());
        }

        let message = format!("Checking {total} segments");
        self.send_progress(station, message).await
    }

    /// Record one finished call.
    ///
    /// `checked` never exceeds the announced total.
    pub async fn advance(
        &mut self,
        station: &Station,
        message: impl Into<String>,
    ) -> Result<(), Cancelled> {
        self.checked = (self.checked + 1).min(self.total);
        self.send_progress(station, message.into()).await
    }

    /// Finish with the options to present.
    pub async fn complete(self, options: Vec<RankedOption>) -> Result<(), Cancelled> {
        self.tx
            .send(ScanEvent::Complete(options))
            .await
            .map_err(|_| Cancelled)
    }

    /// Abort the scan.
    pub async fn fail(self, message: impl Into<String>) -> Result<(), Cancelled> {
        self.tx
            .send(ScanEvent::Error(message.into()))
            .await
            .map_err(|_| Cancelled)
    }

    async fn send_progress(&self, station: &Station, message: String) -> Result<(), Cancelled> {
        let event = ScanEvent::Progress(Progress {
            checked: self.checked,
            total: self.total,
            current_station: station.display_name().to_string(),
            message,
        });
        self.tx.send(event).await.map_err(|_| Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::testing::station;

    async fn drain(mut rx: mpsc::Receiver<ScanEvent>) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn progress_then_complete() {
        let (mut reporter, rx) = ProgressReporter::channel(16);
        let nue = station("NUE");

        reporter.start(2, &nue).await.unwrap();
        reporter.advance(&nue, "Checking NUE → MUC").await.unwrap();
        reporter.advance(&nue, "Checking NUE → AUG").await.unwrap();
        reporter.complete(vec![]).await.unwrap();

        let events = drain(rx).await;
        assert_eq!(events.len(), 4);

        let checked: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Progress(p) => Some(p.checked),
                _ => None,
            })
            .collect();
        assert_eq!(checked, vec![0, 1, 2]);

        match &events[1] {
            ScanEvent::Progress(p) => {
                assert_eq!(p.total, 2);
                assert_eq!(p.current_station, "NUE Hbf");
                assert_eq!(p.message, "Checking NUE → MUC");
            }
            other => panic!("expected progress, got {other:?}"),
        }

        assert!(events[3].is_terminal());
        assert_eq!(events[3], ScanEvent::Complete(vec![]));
    }

    #[tokio::test]
    async fn nothing_to_check_sends_no_progress() {
        let (mut reporter, rx) = ProgressReporter::channel(4);
        reporter.start(0, &station("BER")).await.unwrap();
        reporter.fail("boom").await.unwrap();

        assert_eq!(drain(rx).await, vec![ScanEvent::Error("boom".into())]);
    }

    #[tokio::test]
    async fn checked_never_exceeds_total() {
        let (mut reporter, _rx) = ProgressReporter::channel(8);
        let s = station("NUE");
        reporter.start(1, &s).await.unwrap();
        reporter.advance(&s, "a").await.unwrap();
        reporter.advance(&s, "b").await.unwrap();
        assert_eq!(reporter.checked(), 1);
    }

    #[tokio::test]
    async fn dropped_receiver_is_cancellation() {
        let (mut reporter, rx) = ProgressReporter::channel(4);
        drop(rx);

        assert!(reporter.is_closed());
        assert_eq!(reporter.start(3, &station("NUE")).await, Err(Cancelled));
    }
}
