//! One tab: the coordinator plus the host round trips its events need

use chrono::{DateTime, Local};
use std::sync::Arc;
use timeout_api::{
    Command, ErrorCode, ErrorInfo, Event, EventPayload, HealthStatus, Outbound, Request,
    Response, ResponsePayload, SignOutReason, API_VERSION,
};
use timeout_core::{Coordinator, CoreEvent};
use timeout_host_api::SessionHost;
use timeout_store::Store;
use timeout_util::TimeoutError;
use tracing::{debug, error, info, warn};

pub struct Tab {
    coordinator: Coordinator,
    host: Arc<dyn SessionHost>,
    store: Arc<dyn Store>,
    current_page: String,
    redirected_to: Option<String>,
}

impl Tab {
    pub fn new(
        coordinator: Coordinator,
        host: Arc<dyn SessionHost>,
        store: Arc<dyn Store>,
        current_page: impl Into<String>,
    ) -> Self {
        Self {
            coordinator,
            host,
            store,
            current_page: current_page.into(),
            redirected_to: None,
        }
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Set once the session has ended, whether or not a redirect could be
    /// built; the process exits then
    pub fn is_finished(&self) -> bool {
        self.redirected_to.is_some() || self.coordinator.state().is_terminal()
    }

    pub fn redirected_to(&self) -> Option<&str> {
        self.redirected_to.as_deref()
    }

    pub fn start(&mut self, now: DateTime<Local>) -> Vec<Outbound> {
        self.coordinator.start(now);
        vec![self.state_changed(now)]
    }

    pub async fn tick(&mut self, now: DateTime<Local>) -> Vec<Outbound> {
        let events = self.coordinator.tick(now);
        self.handle_core_events(events, now).await
    }

    pub async fn handle_request(&mut self, request: Request, now: DateTime<Local>) -> Vec<Outbound> {
        let request_id = request.request_id;

        if request.api_version != API_VERSION {
            warn!(
                request_id,
                api_version = request.api_version,
                "Unsupported API version"
            );
            return vec![Outbound::Response(Response::error(
                request_id,
                ErrorInfo::new(
                    ErrorCode::UnsupportedVersion,
                    format!(
                        "API version {} not supported, expected {}",
                        request.api_version, API_VERSION
                    ),
                ),
            ))];
        }

        debug!(request_id, command = ?request.command, "Handling request");

        let (result, events) = match request.command {
            Command::GetState => (
                Ok(ResponsePayload::State(self.coordinator.snapshot())),
                Vec::new(),
            ),

            Command::StaySignedIn => acknowledged(self.coordinator.stay_signed_in(now)),

            Command::CloseWarning => acknowledged(self.coordinator.close_warning(now)),

            Command::ContinueSession => acknowledged(self.coordinator.continue_session(now)),

            Command::SignOutNow => match self.coordinator.sign_out_now(now) {
                Ok(events) => (Ok(ResponsePayload::SigningOut), events),
                Err(e) => (Err(e), Vec::new()),
            },

            Command::RecordActivity => (
                self.coordinator
                    .record_activity(now)
                    .map(|()| ResponsePayload::ActivityRecorded),
                Vec::new(),
            ),

            Command::GetHealth => (
                Ok(ResponsePayload::Health(HealthStatus {
                    live: !self.coordinator.state().is_terminal(),
                    logged_in: self.coordinator.is_logged_in(),
                    store_ok: self.store.is_healthy(),
                })),
                Vec::new(),
            ),

            Command::Ping => (Ok(ResponsePayload::Pong), Vec::new()),
        };

        let response = match result {
            Ok(payload) => Response::success(request_id, payload),
            Err(e) => {
                debug!(request_id, error = %e, "Request rejected");
                Response::error(request_id, error_info(&e))
            }
        };

        let mut outbound = vec![Outbound::Response(response)];
        outbound.extend(self.handle_core_events(events, now).await);
        outbound
    }

    /// Translate coordinator events into outbound events, performing the
    /// sign-out round trip when one is due
    async fn handle_core_events(
        &mut self,
        events: Vec<CoreEvent>,
        now: DateTime<Local>,
    ) -> Vec<Outbound> {
        let mut outbound = Vec::new();
        let mut transitioned = false;

        for event in events {
            match event {
                CoreEvent::DialogOpened { dialog, message } => {
                    transitioned = true;
                    outbound.push(event_line(EventPayload::DialogOpened { dialog, message }, now));
                }
                CoreEvent::DialogClosed { dialog } => {
                    transitioned = true;
                    outbound.push(event_line(EventPayload::DialogClosed { dialog }, now));
                }
                CoreEvent::DeadlineDeferred { timer, until } => {
                    outbound.push(event_line(
                        EventPayload::DeadlineDeferred { timer, until },
                        now,
                    ));
                }
                CoreEvent::InactivityReset => {
                    transitioned = true;
                }
                CoreEvent::SignOutDue { reason } => {
                    outbound.push(self.state_changed(now));
                    outbound.extend(self.sign_out(reason, now).await);
                    return outbound;
                }
            }
        }

        if transitioned {
            outbound.push(self.state_changed(now));
        }
        outbound
    }

    /// Invalidate the server session, then redirect. The redirect follows
    /// even when the request fails.
    async fn sign_out(&mut self, reason: SignOutReason, now: DateTime<Local>) -> Vec<Outbound> {
        let mut outbound = vec![event_line(EventPayload::SigningOut { reason }, now)];

        if let Err(e) = self.host.sign_out().await {
            warn!(error = %e, reason = ?reason, "Sign-out request failed");
            outbound.push(event_line(
                EventPayload::SignOutFailed {
                    error: e.to_string(),
                },
                now,
            ));
        }

        match self.host.sign_in_location(&self.current_page, reason) {
            Ok(location) => {
                info!(location = %location, reason = ?reason, "Redirecting to sign-in");
                self.redirected_to = Some(location.clone());
                outbound.push(event_line(EventPayload::Redirect { location }, now));
            }
            Err(e) => {
                error!(error = %e, "Failed to build sign-in location");
                outbound.push(event_line(
                    EventPayload::SignOutFailed {
                        error: e.to_string(),
                    },
                    now,
                ));
            }
        }

        outbound
    }

    fn state_changed(&self, now: DateTime<Local>) -> Outbound {
        event_line(EventPayload::StateChanged(self.coordinator.snapshot()), now)
    }

    pub fn stop(&mut self, now: DateTime<Local>) -> Outbound {
        self.coordinator.stop(now);
        event_line(EventPayload::Shutdown, now)
    }
}

fn acknowledged(
    result: timeout_util::Result<Vec<CoreEvent>>,
) -> (timeout_util::Result<ResponsePayload>, Vec<CoreEvent>) {
    match result {
        Ok(events) => (Ok(ResponsePayload::Acknowledged), events),
        Err(e) => (Err(e), Vec::new()),
    }
}

fn event_line(payload: EventPayload, now: DateTime<Local>) -> Outbound {
    Outbound::Event(Event::new(payload, now))
}

fn error_info(e: &TimeoutError) -> ErrorInfo {
    let code = match e {
        TimeoutError::NotLoggedIn => ErrorCode::NotLoggedIn,
        TimeoutError::SessionEnded => ErrorCode::SessionEnded,
        TimeoutError::InvalidCommand(_) => ErrorCode::DialogNotOpen,
        TimeoutError::StoreError(_) => ErrorCode::StoreError,
    };
    ErrorInfo::new(code, e.to_string())
}
