use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    client::ForecastTransport,
    error::FetchFailure,
    model::{DayForecast, Forecast},
    parser,
    request::RequestBuilder,
};

/// Presentation callbacks consumed by a display layer.
pub trait ForecastView {
    /// A fetch was dispatched; dismiss input focus and the like.
    fn on_request_started(&mut self);

    /// A new forecast replaced the previous one.
    fn on_forecast_ready(&mut self, days: &[DayForecast]);

    /// The display should jump back to the first day.
    fn on_scroll_to_top(&mut self);

    /// A fetch failed; the previous forecast is untouched.
    fn on_error(&mut self, failure: &FetchFailure);
}

/// Outcome of one background fetch, tagged with the generation of the
/// request that produced it.
struct Completion {
    generation: u64,
    outcome: Result<Vec<DayForecast>, FetchFailure>,
}

/// Orchestrates build → fetch → decode for one user action and owns the
/// current [`Forecast`].
///
/// The fetch and decode run on the tokio background pool; outcomes are
/// posted onto an internal channel and applied only from
/// [`process_completion`](Self::process_completion) on the caller's context,
/// which is therefore the sole writer of the owned forecast. Each dispatched
/// fetch carries a monotonically increasing generation; a completion older
/// than the last honored one is dropped, so overlapping fetches cannot
/// clobber newer state.
pub struct ForecastController<T, V> {
    builder: RequestBuilder,
    transport: Arc<T>,
    view: V,
    forecast: Forecast,
    next_generation: u64,
    honored_generation: u64,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<T, V> ForecastController<T, V>
where
    T: ForecastTransport + 'static,
    V: ForecastView,
{
    pub fn new(builder: RequestBuilder, transport: T, view: V) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        Self {
            builder,
            transport: Arc::new(transport),
            view,
            forecast: Forecast::default(),
            next_generation: 0,
            honored_generation: 0,
            completion_tx,
            completion_rx,
        }
    }

    /// Handle one user-triggered fetch request.
    ///
    /// Returns `true` when a fetch was dispatched. City text that cannot be
    /// turned into a valid URL reports `MalformedRequest` through the view
    /// and dispatches nothing. Must be called from within a tokio runtime.
    pub fn request_fetch(&mut self, city: &str) -> bool {
        let request = match self.builder.build(city) {
            Ok(request) => request,
            Err(failure) => {
                self.view.on_error(&failure);
                return false;
            }
        };

        self.view.on_request_started();

        self.next_generation += 1;
        let generation = self.next_generation;
        let transport = Arc::clone(&self.transport);
        let completion_tx = self.completion_tx.clone();

        tokio::spawn(async move {
            let outcome = match transport.fetch(&request).await {
                Ok(body) => parser::parse(&body),
                Err(failure) => Err(failure),
            };

            // The receiver only goes away together with the controller.
            let _ = completion_tx.send(Completion { generation, outcome });
        });

        true
    }

    /// Await the next fetch completion and apply it.
    ///
    /// Runs on the caller's context: state mutation and view callbacks only
    /// ever happen here once a fetch is in flight. Stale completions are
    /// dropped without touching state or view.
    pub async fn process_completion(&mut self) {
        while let Some(completion) = self.completion_rx.recv().await {
            if completion.generation <= self.honored_generation {
                debug!(
                    generation = completion.generation,
                    honored = self.honored_generation,
                    "dropping stale fetch completion"
                );
                continue;
            }
            self.honored_generation = completion.generation;

            match completion.outcome {
                Ok(days) => {
                    info!(days = days.len(), "forecast replaced");
                    self.forecast = Forecast::from_days(days);
                    self.view.on_forecast_ready(self.forecast.days());
                    self.view.on_scroll_to_top();
                }
                Err(failure) => self.view.on_error(&failure),
            }

            return;
        }
    }

    /// The most recently accepted forecast.
    pub fn forecast(&self) -> &Forecast {
        &self.forecast
    }

    /// Whether a dispatched fetch has not been honored yet. A front-end can
    /// use this to disable its trigger while a fetch is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.next_generation > self.honored_generation
    }

    /// The view, for callers that inspect what was presented.
    pub fn view(&self) -> &V {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ForecastClient;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Records every callback in invocation order.
    #[derive(Debug, Default)]
    struct RecordingView {
        events: Vec<String>,
    }

    impl ForecastView for RecordingView {
        fn on_request_started(&mut self) {
            self.events.push("started".to_string());
        }

        fn on_forecast_ready(&mut self, days: &[DayForecast]) {
            self.events.push(format!("ready:{}", days.len()));
        }

        fn on_scroll_to_top(&mut self) {
            self.events.push("scroll_to_top".to_string());
        }

        fn on_error(&mut self, failure: &FetchFailure) {
            let kind = match failure {
                FetchFailure::MalformedRequest(_) => "malformed_request".to_string(),
                FetchFailure::Network(_) => "network".to_string(),
                FetchFailure::Http(status) => format!("http:{}", status.as_u16()),
                FetchFailure::Decode(_) => "decode".to_string(),
            };
            self.events.push(format!("error:{kind}"));
        }
    }

    fn day_entry(dt: i64) -> serde_json::Value {
        json!({
            "dt": dt,
            "temp": { "min": 1.0, "max": 8.0 },
            "humidity": 70.0,
            "weather": [ { "description": "light rain", "icon": "10d" } ],
        })
    }

    fn sixteen_day_body() -> serde_json::Value {
        let mut entries = vec![json!({
            "dt": 1609459200,
            "temp": { "min": -5.0, "max": 2.0 },
            "humidity": 80.0,
            "weather": [ { "description": "clear sky", "icon": "01d" } ],
        })];
        entries.extend((1..16).map(|i| day_entry(1609459200 + i * 86_400)));
        json!({ "list": entries })
    }

    fn controller_for(
        server: &MockServer,
    ) -> ForecastController<ForecastClient, RecordingView> {
        let builder = RequestBuilder::new(
            format!("{}/data/2.5/forecast/daily?q=", server.uri()),
            "KEY",
        );
        let client = ForecastClient::new().expect("client should build");
        ForecastController::new(builder, client, RecordingView::default())
    }

    #[tokio::test]
    async fn valid_city_replaces_forecast_and_scrolls_to_top() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Boston"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sixteen_day_body()))
            .mount(&server)
            .await;

        let mut controller = controller_for(&server);

        assert!(controller.request_fetch("Boston"));
        assert!(controller.is_fetching());
        controller.process_completion().await;

        assert_eq!(
            controller.view().events,
            vec!["started", "ready:16", "scroll_to_top"]
        );
        assert!(!controller.is_fetching());

        let first = &controller.forecast().days()[0];
        assert_eq!(first.timestamp_seconds, 1609459200);
        assert_eq!(first.min_temperature_c, -5.0);
        assert_eq!(first.max_temperature_c, 2.0);
        assert_eq!(first.humidity_percent, 80.0);
        assert_eq!(first.condition_description, "clear sky");
        assert_eq!(first.icon_id, "01d");
    }

    #[tokio::test]
    async fn empty_city_is_fetched_and_http_rejection_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Nothing to geocode"))
            .mount(&server)
            .await;

        let mut controller = controller_for(&server);

        assert!(controller.request_fetch(""));
        controller.process_completion().await;

        assert_eq!(controller.view().events, vec!["started", "error:http:400"]);
        assert!(controller.forecast().is_empty());
    }

    #[tokio::test]
    async fn decode_failure_preserves_previous_forecast() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Boston"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "list": [day_entry(100), day_entry(200)] })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Glitch"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let mut controller = controller_for(&server);

        assert!(controller.request_fetch("Boston"));
        controller.process_completion().await;
        assert_eq!(controller.forecast().len(), 2);

        assert!(controller.request_fetch("Glitch"));
        controller.process_completion().await;

        assert_eq!(
            controller.view().events,
            vec!["started", "ready:2", "scroll_to_top", "started", "error:decode"]
        );
        assert_eq!(controller.forecast().len(), 2, "previous forecast must survive");
    }

    #[tokio::test]
    async fn unreachable_host_reports_a_network_failure() {
        // Port 9 (discard) is reserved; nothing listens there.
        let builder = RequestBuilder::new("http://127.0.0.1:9/forecast?q=", "KEY");
        let client = ForecastClient::new().expect("client should build");
        let mut controller = ForecastController::new(builder, client, RecordingView::default());

        assert!(controller.request_fetch("Boston"));
        controller.process_completion().await;

        assert_eq!(controller.view().events, vec!["started", "error:network"]);
    }

    #[tokio::test]
    async fn invalid_base_url_reports_malformed_request_without_fetching() {
        let builder = RequestBuilder::new("no-scheme/forecast?q=", "KEY");
        let client = ForecastClient::new().expect("client should build");
        let mut controller = ForecastController::new(builder, client, RecordingView::default());

        assert!(!controller.request_fetch("Boston"));
        assert!(!controller.is_fetching());
        assert_eq!(controller.view().events, vec!["error:malformed_request"]);
    }

    #[tokio::test]
    async fn stale_completion_cannot_clobber_a_newer_forecast() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "list": [day_entry(111)] }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("q", "Fast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "list": [day_entry(222), day_entry(333)] })),
            )
            .mount(&server)
            .await;

        let mut controller = controller_for(&server);

        assert!(controller.request_fetch("Slow"));
        assert!(controller.request_fetch("Fast"));

        // The fast fetch completes first and is honored.
        controller.process_completion().await;
        assert_eq!(controller.forecast().len(), 2);
        assert_eq!(controller.forecast().days()[0].timestamp_seconds, 222);

        // The slow completion arrives later with an older generation and is
        // dropped without invoking any callback.
        let waited = tokio::time::timeout(
            Duration::from_millis(800),
            controller.process_completion(),
        )
        .await;
        assert!(waited.is_err(), "stale completion must not be honored");

        assert_eq!(controller.forecast().len(), 2);
        assert_eq!(controller.forecast().days()[0].timestamp_seconds, 222);
        assert_eq!(
            controller.view().events,
            vec!["started", "started", "ready:2", "scroll_to_top"]
        );
    }
}
