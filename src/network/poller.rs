use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::common::{NetworkEvent, SessionEvent, SessionId};

use super::api::TrackerApi;
use super::transport::Transport;

/// Handle huỷ của poller; gắn với đúng một phiên. Drop cũng dừng poller.
pub struct PollHandle {
    session: SessionId,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn cancel(self) {
        // Drop làm phần việc còn lại.
        log::info!("Stopping poller for {}", self.session);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Khởi chạy vòng poll định kỳ: lấy lịch sử kênh rồi làm mới danh sách peer.
/// Tick đầu tiên chạy ngay lập tức.
pub fn spawn_poller<T: Transport>(
    api: TrackerApi<T>,
    session: SessionId,
    channel: String,
    every: Duration,
    events: mpsc::Sender<NetworkEvent>,
) -> PollHandle {
    log::info!("Polling channel `{channel}` every {every:?} for {session}");
    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !poll_once(&api, session, &channel, &events).await {
                log::debug!("Event receiver closed; poller for {session} exits");
                break;
            }
        }
    });
    PollHandle { session, task }
}

/// Một chu kỳ poll. Trả về `false` khi phía UI đã đóng kênh sự kiện.
async fn poll_once<T: Transport>(
    api: &TrackerApi<T>,
    session: SessionId,
    channel: &str,
    events: &mpsc::Sender<NetworkEvent>,
) -> bool {
    match api.get_messages(channel).await {
        Ok(messages) => {
            let event = NetworkEvent::session(session, SessionEvent::History(messages));
            if events.send(event).await.is_err() {
                return false;
            }
        }
        Err(err) => log::debug!("History poll failed, retrying next tick: {err}"),
    }

    match api.get_list().await {
        Ok(peers) => {
            let event = NetworkEvent::session(session, SessionEvent::PeersUpdated(peers));
            if events.send(event).await.is_err() {
                return false;
            }
        }
        Err(err) => log::debug!("Peer list poll failed, retrying next tick: {err}"),
    }

    true
}
