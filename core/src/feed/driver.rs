use crate::display::DisplaySnapshot;
use crate::feed::session::FeedSession;
use std::time::Instant;
use tokio::sync::{mpsc, watch};

/// Transport-neutral frame handed to the ingest loop.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedFrame {
    Opened,
    Text(String),
    Ignored,
    Closed,
    Failed(String),
}

/// Runs the ingest loop until every frame sender is gone.
///
/// Frames are applied strictly in arrival order. A fresh snapshot is published
/// after each frame and again when an out-of-bounds warning expires, so the
/// display clears it without waiting for the next message.
pub async fn drive(
    mut frames: mpsc::Receiver<FeedFrame>,
    mut session: FeedSession,
    publisher: watch::Sender<DisplaySnapshot>,
) -> FeedSession {
    publisher.send_replace(session.snapshot(Instant::now()));

    loop {
        let deadline = session.display().warning_deadline(Instant::now());
        let frame = match deadline {
            Some(deadline) => {
                tokio::select! {
                    frame = frames.recv() => frame,
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                        publisher.send_replace(session.snapshot(Instant::now()));
                        continue;
                    }
                }
            }
            None => frames.recv().await,
        };

        let Some(frame) = frame else {
            break;
        };
        session.handle(frame, Instant::now());
        publisher.send_replace(session.snapshot(Instant::now()));
    }

    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ConnectionStatus;
    use crate::target::TargetGeometry;
    use std::time::Duration;

    #[tokio::test]
    async fn publishes_snapshot_per_frame() {
        let (tx, rx) = mpsc::channel(8);
        let (publisher, mut snapshots) = watch::channel(DisplaySnapshot::default());
        let session = FeedSession::new(TargetGeometry::reference()).unwrap();
        let handle = tokio::spawn(drive(rx, session, publisher));

        tx.send(FeedFrame::Opened).await.unwrap();
        tx.send(FeedFrame::Text("{}".into())).await.unwrap();
        tx.send(FeedFrame::Text(r#"{"laser_position": {"x": 512, "y": 384}}"#.into()))
            .await
            .unwrap();
        drop(tx);

        let session = handle.await.unwrap();
        snapshots.changed().await.ok();
        let latest = snapshots.borrow().clone();
        assert_eq!(latest.score, Some(10));
        assert_eq!(latest.connection, ConnectionStatus::Connected);
        assert_eq!(session.metrics().skipped, 1);
    }

    #[tokio::test]
    async fn republishes_when_warning_expires() {
        let (tx, rx) = mpsc::channel(8);
        let (publisher, mut snapshots) = watch::channel(DisplaySnapshot::default());
        let session = FeedSession::with_warning_lifetime(
            TargetGeometry::reference(),
            Duration::from_millis(40),
        )
        .unwrap();
        let handle = tokio::spawn(drive(rx, session, publisher));

        tx.send(FeedFrame::Text(r#"{"laser_position": {"x": 900, "y": 384}}"#.into()))
            .await
            .unwrap();

        let cleared = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if snapshots.changed().await.is_err() {
                    return false;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if snapshot.in_bounds == Some(false) && snapshot.warning.is_none() {
                    return true;
                }
            }
        })
        .await
        .unwrap_or(false);
        assert!(cleared);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn transport_failure_is_reported_separately() {
        let (tx, rx) = mpsc::channel(8);
        let (publisher, snapshots) = watch::channel(DisplaySnapshot::default());
        let session = FeedSession::new(TargetGeometry::reference()).unwrap();
        let handle = tokio::spawn(drive(rx, session, publisher));

        tx.send(FeedFrame::Failed("connection reset".into()))
            .await
            .unwrap();
        drop(tx);
        handle.await.unwrap();

        let latest = snapshots.borrow().clone();
        assert_eq!(latest.score, None);
        assert_eq!(latest.warning, None);
        assert_eq!(
            latest.connection,
            ConnectionStatus::Failed {
                reason: "connection reset".into()
            }
        );
        assert_eq!(latest.metrics.transport_errors, 1);
    }
}
