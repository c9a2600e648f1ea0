use crate::generator::shots::ShotGenerator;
use crate::gui_bridge::model::IngestReply;
use futures::StreamExt;
use lasercore::display::DisplaySnapshot;
use lasercore::feed::{drive, FeedFrame, FeedSession};
use lasercore::target::TargetGeometry;
use log::{info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use warp::ws::{Message, WebSocket, Ws};
use warp::{http::StatusCode, Filter, Rejection, Reply};

const FRAME_QUEUE: usize = 256;

#[derive(Debug)]
struct FeedUnavailable;

impl warp::reject::Reject for FeedUnavailable {}

/// Hosts the tracker feed and the display endpoint on top of one ingest loop.
pub struct GuiBridge {
    frames: mpsc::Sender<FeedFrame>,
    snapshots: watch::Receiver<DisplaySnapshot>,
    geometry: TargetGeometry,
    ingest: JoinHandle<FeedSession>,
}

impl GuiBridge {
    /// Spawns the ingest loop; must be called from inside a tokio runtime.
    pub fn start(session: FeedSession) -> Self {
        let geometry = *session.geometry();
        let (frames, receiver) = mpsc::channel(FRAME_QUEUE);
        let (publisher, snapshots) = watch::channel(DisplaySnapshot::default());
        let ingest = tokio::spawn(drive(receiver, session, publisher));
        Self {
            frames,
            snapshots,
            geometry,
            ingest,
        }
    }

    pub fn frames(&self) -> mpsc::Sender<FeedFrame> {
        self.frames.clone()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let snapshots = self.snapshots.clone();
        let display_route = warp::path("display")
            .and(warp::path::end())
            .and(warp::get())
            .map(move || warp::reply::json(&*snapshots.borrow()));

        let geometry = self.geometry;
        let geometry_route = warp::path("geometry")
            .and(warp::path::end())
            .and(warp::get())
            .map(move || warp::reply::json(&geometry));

        let frames = self.frames.clone();
        let frames_filter = warp::any().map(move || frames.clone());

        let ingest_route = warp::path("ingest")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::bytes())
            .and(frames_filter.clone())
            .and_then(
                |body: warp::hyper::body::Bytes, frames: mpsc::Sender<FeedFrame>| async move {
                    let raw = String::from_utf8_lossy(&body).into_owned();
                    match frames.send(FeedFrame::Text(raw)).await {
                        Ok(()) => Ok::<_, Rejection>(warp::reply::with_status(
                            warp::reply::json(&IngestReply::queued()),
                            StatusCode::ACCEPTED,
                        )),
                        Err(_) => Err(warp::reject::custom(FeedUnavailable)),
                    }
                },
            );

        let feed_route = warp::path("feed")
            .and(warp::path::end())
            .and(warp::ws())
            .and(frames_filter)
            .map(|ws: Ws, frames: mpsc::Sender<FeedFrame>| {
                ws.on_upgrade(move |socket| pump_socket(socket, frames))
            });

        display_route
            .or(geometry_route)
            .or(ingest_route)
            .or(feed_route)
    }

    /// Serves until `shutdown` resolves and returns the last published snapshot.
    pub async fn serve(
        self,
        address: SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<DisplaySnapshot> {
        let (bound, server) =
            warp::serve(self.routes()).try_bind_with_graceful_shutdown(address, shutdown)?;
        info!("tracking server listening on {bound} (ws://{bound}/feed)");
        server.await;

        // Upgraded sockets and the demo tracker may still hold senders, so the
        // loop is stopped here rather than drained.
        self.ingest.abort();
        Ok(self.snapshot())
    }
}

/// Forwards one tracker connection into the ingest loop.
async fn pump_socket(mut socket: WebSocket, frames: mpsc::Sender<FeedFrame>) {
    if frames.send(FeedFrame::Opened).await.is_err() {
        return;
    }

    while let Some(result) = socket.next().await {
        let frame = match result {
            Ok(message) if message.is_close() => break,
            Ok(message) if message.is_ping() || message.is_pong() => continue,
            Ok(message) => frame_for(&message),
            Err(err) => {
                warn!("tracker socket error: {err}");
                let _ = frames.send(FeedFrame::Failed(err.to_string())).await;
                return;
            }
        };
        if frames.send(frame).await.is_err() {
            return;
        }
    }

    let _ = frames.send(FeedFrame::Closed).await;
}

fn frame_for(message: &Message) -> FeedFrame {
    match message.to_str() {
        Ok(text) => FeedFrame::Text(text.to_string()),
        Err(()) => FeedFrame::Ignored,
    }
}

/// Drives the synthetic tracker into the ingest loop at its tick interval.
pub fn spawn_demo(mut generator: ShotGenerator, frames: mpsc::Sender<FeedFrame>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(generator.interval_ms().max(1)));
        if frames.send(FeedFrame::Opened).await.is_err() {
            return;
        }
        info!("demo tracker running");
        loop {
            ticker.tick().await;
            let frame = match generator.next_message() {
                Ok(message) => FeedFrame::Text(message.to_json()),
                Err(err) => {
                    warn!("demo tracker frame dropped: {err:#}");
                    FeedFrame::Ignored
                }
            };
            if frames.send(frame).await.is_err() {
                break;
            }
        }
    })
}
