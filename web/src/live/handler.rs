use axum::extract::ws::{CloseFrame, Message, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use domain::users;
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::*;
use push::{InboundMessage, OutboundEvent};
use serde::Deserialize;
use service::AppState;
use tokio::sync::mpsc;

/// Application close code sent when the handshake carries no usable
/// credential, distinguishable from a normal closure by clients.
pub(crate) const CLOSE_UNAUTHENTICATED: u16 = 4401;

#[derive(Debug, Deserialize)]
pub(crate) struct LiveQuery {
    pub token: Option<String>,
}

/// Upgrade handler for the live notification channel. The credential is
/// resolved before the upgrade completes; an anonymous session is still
/// upgraded, but only so the close code can be delivered on the socket.
pub(crate) async fn live_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> impl IntoResponse {
    let member = match &query.token {
        Some(token) => {
            domain::user::resolve(app_state.db_conn_ref(), &app_state.config, token).await
        }
        None => None,
    };

    ws.on_upgrade(move |socket| handle_session(socket, app_state, member))
}

// Generic over the socket so the session logic runs against any frame
// transport, not only a live upgrade.
async fn handle_session<S>(mut socket: S, app_state: AppState, member: Option<users::Model>)
where
    S: Stream<Item = Result<Message, axum::Error>> + Sink<Message> + Unpin,
{
    let Some(member) = member else {
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: CLOSE_UNAUTHENTICATED,
                reason: "unauthenticated".into(),
            })))
            .await;
        return;
    };

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let session_id = app_state.push_manager.join(member.member_id.clone(), tx);
    debug!(
        "live session open for member {} ({} active)",
        member.member_id,
        app_state.push_manager.session_count()
    );

    loop {
        tokio::select! {
            routed = rx.recv() => {
                match routed {
                    Some(message) => {
                        if sink.send(message).await.is_err() {
                            break;
                        }
                    }
                    // The registry dropped our sender; the session is gone.
                    None => break,
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<InboundMessage>(text.as_str()) {
                            Ok(InboundMessage::Ping) => {
                                let Some(pong) = OutboundEvent::Pong.into_message() else {
                                    continue;
                                };
                                if sink.send(pong).await.is_err() {
                                    break;
                                }
                            }
                            Ok(InboundMessage::Other) => {
                                debug!("ignoring unrecognized inbound frame");
                            }
                            Err(_) => {
                                debug!("ignoring non-JSON inbound frame");
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    // Binary frames and protocol-level ping/pong are ignored.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        debug!("live session socket error: {err}");
                        break;
                    }
                }
            }
        }
    }

    // Every exit path lands here, so a dead socket always leaves the group.
    app_state.push_manager.leave(&session_id);
    debug!("live session closed for member {}", member.member_id);
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use clap::Parser;
    use futures::channel::mpsc as frame_mpsc;
    use push::Manager;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use service::config::Config;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    /// In-memory frame transport: the far end writes inbound frames and reads
    /// whatever the session sends.
    struct TestSocket {
        inbound: frame_mpsc::UnboundedReceiver<Result<Message, axum::Error>>,
        outbound: frame_mpsc::UnboundedSender<Message>,
    }

    fn socket_pair() -> (
        TestSocket,
        frame_mpsc::UnboundedSender<Result<Message, axum::Error>>,
        frame_mpsc::UnboundedReceiver<Message>,
    ) {
        let (in_tx, in_rx) = frame_mpsc::unbounded();
        let (out_tx, out_rx) = frame_mpsc::unbounded();

        (
            TestSocket {
                inbound: in_rx,
                outbound: out_tx,
            },
            in_tx,
            out_rx,
        )
    }

    impl Stream for TestSocket {
        type Item = Result<Message, axum::Error>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Pin::new(&mut self.inbound).poll_next(cx)
        }
    }

    impl Sink<Message> for TestSocket {
        type Error = frame_mpsc::SendError;

        fn poll_ready(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Pin::new(&mut self.outbound).poll_ready(cx)
        }

        fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
            Pin::new(&mut self.outbound).start_send(item)
        }

        fn poll_flush(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Pin::new(&mut self.outbound).poll_flush(cx)
        }

        fn poll_close(
            mut self: Pin<&mut Self>,
            cx: &mut Context<'_>,
        ) -> Poll<Result<(), Self::Error>> {
            Pin::new(&mut self.outbound).poll_close(cx)
        }
    }

    fn test_state() -> AppState {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let (queue, _job_rx) = dispatch::channel();

        AppState::new(
            Config::parse_from(["web-test"]),
            &Arc::new(db),
            Arc::new(Manager::new()),
            queue,
        )
    }

    fn member() -> users::Model {
        let now = chrono::Utc::now();
        users::Model {
            id: domain::Id::new_v4(),
            member_id: "SPC-20240915-a1b2c3".to_owned(),
            username: "alice".to_owned(),
            email: "alice@spcconnect.com".to_owned(),
            full_name: "Alice Liddell".to_owned(),
            contact: "+15550100".to_owned(),
            company_name: String::new(),
            password: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn anonymous_session_is_closed_with_4401_and_never_joins() {
        let state = test_state();
        let (socket, _in_tx, mut out_rx) = socket_pair();

        handle_session(socket, state.clone(), None).await;

        let frame = match out_rx.try_next() {
            Ok(Some(Message::Close(Some(frame)))) => frame,
            other => panic!("expected a close frame, got {other:?}"),
        };
        assert_eq!(frame.code, CLOSE_UNAUTHENTICATED);
        assert_eq!(frame.reason.as_str(), "unauthenticated");

        assert_eq!(state.push_manager.session_count(), 0);
    }

    #[tokio::test]
    async fn authenticated_session_joins_pongs_and_leaves() {
        let state = test_state();
        let (socket, in_tx, mut out_rx) = socket_pair();

        let session = tokio::spawn(handle_session(socket, state.clone(), Some(member())));

        in_tx
            .unbounded_send(Ok(Message::Text(r#"{"type":"ping"}"#.into())))
            .unwrap();
        let pong = match out_rx.next().await {
            Some(Message::Text(text)) => text,
            other => panic!("expected a pong frame, got {other:?}"),
        };
        assert_eq!(pong.as_str(), r#"{"type":"pong"}"#);

        // The pong proves the loop is live, so the member's group must route
        let delivered = state.push_manager.publish(
            "SPC-20240915-a1b2c3",
            OutboundEvent::Notification {
                data: serde_json::json!({"id": "n1"}),
            },
        );
        assert_eq!(delivered, 1);
        assert!(matches!(out_rx.next().await, Some(Message::Text(_))));

        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
        session.await.unwrap();

        assert_eq!(state.push_manager.session_count(), 0);
    }
}
