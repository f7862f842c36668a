//! The tab's event loop: commands in, events out, until the session or the
//! page goes away

use anyhow::{Context, Result};
use std::future::Future;
use std::time::Duration;
use timeout_api::{ErrorCode, ErrorInfo, Outbound, Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::tab::Tab;

/// Drive `tab` until the input closes, `shutdown` resolves or the session
/// ends. Every exit path writes a final `shutdown` event.
pub async fn serve<R, W, S>(
    tab: &mut Tab,
    input: R,
    output: &mut W,
    tick_interval: Duration,
    shutdown: S,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    let mut lines = input.lines();
    let mut tick_timer = tokio::time::interval(tick_interval);
    tokio::pin!(shutdown);

    let started = tab.start(timeout_util::now());
    emit(output, &started).await?;

    info!(
        tab_id = %tab.coordinator().tab_id(),
        logged_in = tab.coordinator().is_logged_in(),
        "Tab running"
    );

    while !tab.is_finished() {
        tokio::select! {
            _ = &mut shutdown => break,

            // Tick timer - fire due deadlines
            _ = tick_timer.tick() => {
                let outbound = tab.tick(timeout_util::now()).await;
                emit(output, &outbound).await?;
            }

            // Commands from the page
            line = lines.next_line() => {
                match line.context("Failed to read commands")? {
                    Some(line) => {
                        let outbound = handle_line(tab, line.trim()).await;
                        emit(output, &outbound).await?;
                    }
                    None => {
                        info!("Page closed its command stream, shutting down");
                        break;
                    }
                }
            }
        }
    }

    match tab.redirected_to() {
        Some(location) => info!(location = %location, "Redirect issued, exiting"),
        None if tab.is_finished() => warn!("Session ended without a redirect, exiting"),
        None => {}
    }

    let stopped = tab.stop(timeout_util::now());
    emit(output, &[stopped]).await?;
    Ok(())
}

async fn handle_line(tab: &mut Tab, line: &str) -> Vec<Outbound> {
    if line.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Request>(line) {
        Ok(request) => tab.handle_request(request, timeout_util::now()).await,
        Err(e) => {
            warn!(error = %e, "Invalid request");
            vec![Outbound::Response(Response::error(
                0,
                ErrorInfo::new(ErrorCode::InvalidRequest, e.to_string()),
            ))]
        }
    }
}

/// Write each outbound message as one JSON line
async fn emit<W: AsyncWrite + Unpin>(output: &mut W, outbound: &[Outbound]) -> Result<()> {
    if outbound.is_empty() {
        return Ok(());
    }
    for message in outbound {
        let mut line = serde_json::to_string(message).context("Failed to encode event")?;
        debug!(line = %line, "Emitting");
        line.push('\n');
        output
            .write_all(line.as_bytes())
            .await
            .context("Failed to write event")?;
    }
    output.flush().await.context("Failed to flush events")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use timeout_api::{
        Command, EventPayload, ResponsePayload, ResponseResult, SignOutReason,
    };
    use timeout_config::SessionTimings;
    use timeout_core::Coordinator;
    use timeout_host_api::MockHost;
    use timeout_store::{MemoryStore, Store};
    use timeout_util::TabId;

    const TICK: Duration = Duration::from_millis(50);

    fn make_tab(host: Arc<MockHost>) -> Tab {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let coordinator = Coordinator::new(
            TabId::new(),
            SessionTimings::default(),
            Some(timeout_util::now()),
            store.clone(),
        );
        Tab::new(coordinator, host, store, "/services/1")
    }

    fn request_line(request_id: u64, command: Command) -> String {
        let mut line = serde_json::to_string(&Request::new(request_id, command)).unwrap();
        line.push('\n');
        line
    }

    fn parse_output(output: &[u8]) -> Vec<Outbound> {
        String::from_utf8(output.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn events(outbound: &[Outbound]) -> Vec<&EventPayload> {
        outbound
            .iter()
            .filter_map(|o| match o {
                Outbound::Event(e) => Some(&e.payload),
                Outbound::Response(_) => None,
            })
            .collect()
    }

    fn responses(outbound: &[Outbound]) -> Vec<&Response> {
        outbound
            .iter()
            .filter_map(|o| match o {
                Outbound::Response(r) => Some(r),
                Outbound::Event(_) => None,
            })
            .collect()
    }

    async fn serve_until_done<R: AsyncBufRead + Unpin>(
        tab: &mut Tab,
        input: R,
        shutdown: impl Future<Output = ()>,
    ) -> Vec<Outbound> {
        let mut output = Vec::new();
        tokio::time::timeout(
            Duration::from_secs(5),
            serve(tab, input, &mut output, TICK, shutdown),
        )
        .await
        .expect("serve did not return")
        .unwrap();
        parse_output(&output)
    }

    #[tokio::test]
    async fn closed_input_shuts_down() {
        let mut tab = make_tab(Arc::new(MockHost::new()));

        let outbound = serve_until_done(&mut tab, &b""[..], std::future::pending()).await;
        let events = events(&outbound);

        assert!(matches!(events.first(), Some(EventPayload::StateChanged(_))));
        assert!(matches!(events.last(), Some(EventPayload::Shutdown)));
        assert!(!tab.is_finished());
    }

    #[tokio::test]
    async fn malformed_line_gets_invalid_request() {
        let mut tab = make_tab(Arc::new(MockHost::new()));
        let input = format!("not json\n\n{}", request_line(2, Command::Ping));

        let outbound =
            serve_until_done(&mut tab, input.as_bytes(), std::future::pending()).await;
        let responses = responses(&outbound);

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].request_id, 0);
        match &responses[0].result {
            ResponseResult::Err(e) => assert_eq!(e.code, ErrorCode::InvalidRequest),
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(responses[1].request_id, 2);
        assert!(matches!(
            responses[1].result,
            ResponseResult::Ok(ResponsePayload::Pong)
        ));
        assert!(matches!(events(&outbound).last(), Some(EventPayload::Shutdown)));
    }

    #[tokio::test]
    async fn exits_after_redirect_with_input_still_open() {
        let host = Arc::new(MockHost::new());
        let mut tab = make_tab(host.clone());
        let (mut page, input) = tokio::io::duplex(1024);
        page.write_all(request_line(7, Command::SignOutNow).as_bytes())
            .await
            .unwrap();

        let outbound = serve_until_done(
            &mut tab,
            tokio::io::BufReader::new(input),
            std::future::pending(),
        )
        .await;
        let events = events(&outbound);

        assert!(events.iter().any(|p| matches!(
            p,
            EventPayload::SigningOut {
                reason: SignOutReason::UserRequested
            }
        )));
        assert!(matches!(
            events[events.len() - 2],
            EventPayload::Redirect { location } if location == "/sign-in?next=%2Fservices%2F1"
        ));
        assert!(matches!(events.last(), Some(EventPayload::Shutdown)));
        assert_eq!(host.sign_out_count(), 1);
        drop(page);
    }

    #[tokio::test]
    async fn exits_when_session_ends_without_a_location() {
        let host = Arc::new(MockHost::new());
        *host.fail_location.lock().unwrap() = true;
        let mut tab = make_tab(host.clone());
        let (mut page, input) = tokio::io::duplex(1024);
        page.write_all(request_line(7, Command::SignOutNow).as_bytes())
            .await
            .unwrap();

        let outbound = serve_until_done(
            &mut tab,
            tokio::io::BufReader::new(input),
            std::future::pending(),
        )
        .await;
        let events = events(&outbound);

        assert!(!events
            .iter()
            .any(|p| matches!(p, EventPayload::Redirect { .. })));
        assert!(matches!(
            events[events.len() - 2],
            EventPayload::SignOutFailed { .. }
        ));
        assert!(matches!(events.last(), Some(EventPayload::Shutdown)));
        assert!(tab.is_finished());
        drop(page);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_loop() {
        let mut tab = make_tab(Arc::new(MockHost::new()));
        let (page, input) = tokio::io::duplex(1024);

        let outbound =
            serve_until_done(&mut tab, tokio::io::BufReader::new(input), async {}).await;

        assert!(matches!(events(&outbound).last(), Some(EventPayload::Shutdown)));
        assert_eq!(tab.redirected_to(), None);
        drop(page);
    }
}
