use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indicatif::ProgressBar;
use pretty_assertions::assert_eq;
use reservations_client_instrumented::prelude::ReservationsClient;
use ticket_stress::{
    contend_for_group, contend_for_seat, load_seats, run_chaos, run_mixed, seat_group,
    sell_unique_seats,
};
use ticket_tunnel_runner::prelude::{
    ChaosConfig, HarnessConfig, LoadConfig, MixedConfig, Phase, ShutdownHandle, Verdict,
};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReservationsClient {
    ReservationsClient::new(&HarnessConfig::new(Url::parse(&server.uri()).unwrap())).unwrap()
}

/// The first reservation wins, everything after it conflicts.
async fn mount_single_winner(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(409))
        .mount(server)
        .await;
}

async fn mount_always(server: &MockServer, http_method: &str, status: u16) {
    Mock::given(method(http_method))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn posted_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.to_string() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn one_winner_among_fifty() {
    let server = MockServer::start().await;
    mount_single_winner(&server).await;
    let recorded = AtomicUsize::new(0);

    let contest = contend_for_seat(
        &client_for(&server),
        4821,
        50,
        &ProgressBar::hidden(),
        |_| {
            recorded.fetch_add(1, Ordering::Relaxed);
        },
    )
    .await
    .unwrap();

    assert_eq!(Some(&1), contest.summary.counts.get(&201));
    assert_eq!(Some(&49), contest.summary.counts.get(&409));
    assert_eq!(Verdict::Pass, contest.verdict);
    assert_eq!(50, recorded.load(Ordering::Relaxed));
    assert!(posted_bodies(&server)
        .await
        .iter()
        .all(|body| body["seat_numbers"] == serde_json::json!([4821])));
}

#[tokio::test(flavor = "multi_thread")]
async fn second_winner_is_critical() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_always(&server, "POST", 409).await;

    let contest = contend_for_seat(&client_for(&server), 9100, 20, &ProgressBar::hidden(), |_| {})
        .await
        .unwrap();

    assert_eq!(Verdict::Oversold { successes: 2 }, contest.verdict);
    assert!(contest.verdict.is_critical());
    assert_eq!(20, contest.summary.tally.total());
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_make_the_race_ambiguous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reservations"))
        .respond_with(ResponseTemplate::new(201))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_always(&server, "POST", 500).await;

    let contest = contend_for_seat(&client_for(&server), 9200, 10, &ProgressBar::hidden(), |_| {})
        .await
        .unwrap();

    assert_eq!(
        Verdict::Ambiguous {
            successes: 1,
            conflicts: 0,
            errors: 9
        },
        contest.verdict
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn taken_seat_has_no_winner() {
    let server = MockServer::start().await;
    mount_always(&server, "POST", 409).await;

    let contest = contend_for_seat(&client_for(&server), 9300, 10, &ProgressBar::hidden(), |_| {})
        .await
        .unwrap();

    assert_eq!(Verdict::NoWinner, contest.verdict);
    assert!(!contest.verdict.is_critical());
}

#[tokio::test(flavor = "multi_thread")]
async fn group_race_sends_the_whole_group() {
    let server = MockServer::start().await;
    mount_single_winner(&server).await;
    let group = seat_group(20_500, 3);

    let contest = contend_for_group(
        &client_for(&server),
        group.clone(),
        40,
        5,
        &ProgressBar::hidden(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(Verdict::Pass, contest.verdict);
    assert_eq!(group, contest.seats);
    let bodies = posted_bodies(&server).await;
    assert_eq!(40, bodies.len());
    assert!(bodies
        .iter()
        .all(|body| body["seat_numbers"] == serde_json::json!([20_500, 20_501, 20_502])));
}

#[tokio::test(flavor = "multi_thread")]
async fn oversold_group_is_critical() {
    let server = MockServer::start().await;
    mount_always(&server, "POST", 201).await;

    let contest = contend_for_group(
        &client_for(&server),
        seat_group(21_000, 3),
        10,
        5,
        &ProgressBar::hidden(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(Verdict::Oversold { successes: 10 }, contest.verdict);
}

#[tokio::test(flavor = "multi_thread")]
async fn healthy_backend_sells_every_seat() {
    let server = MockServer::start().await;
    mount_always(&server, "POST", 201).await;
    let config = LoadConfig {
        requests: 500,
        workers: 50,
        first_seat: 1000,
    };
    let seats = load_seats(&config);

    let outcome = sell_unique_seats(
        &client_for(&server),
        seats.clone(),
        config.workers,
        &ProgressBar::hidden(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(500, outcome.summary.tally.success);
    assert_eq!(Some(1.0), outcome.success_ratio());
    assert!(outcome.summary.throughput.is_some());
    assert!(outcome.summary.mean_write_latency.is_some());
    assert_eq!(None, outcome.summary.mean_read_latency);

    let mut sold: Vec<u32> = posted_bodies(&server)
        .await
        .iter()
        .map(|body| body["seat_numbers"][0].as_u64().unwrap() as u32)
        .collect();
    sold.sort_unstable();
    assert_eq!(seats, sold);
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_traffic_runs_for_its_duration() {
    let server = MockServer::start().await;
    mount_always(&server, "POST", 201).await;
    mount_always(&server, "GET", 200).await;
    let config = MixedConfig {
        duration: Duration::from_millis(300),
        workers: 4,
        write_ratio: 0.5,
        ..Default::default()
    };

    let dispatched = run_mixed(&client_for(&server), &config, |_| {})
        .await
        .unwrap();

    assert!(dispatched.elapsed >= config.duration);
    assert!(dispatched.records.len() >= config.workers);
    assert!(dispatched
        .records
        .iter()
        .all(|r| r.status_code() == 201 || r.status_code() == 200));
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        dispatched.records.len()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn read_only_mix_never_writes() {
    let server = MockServer::start().await;
    mount_always(&server, "GET", 200).await;
    let config = MixedConfig {
        duration: Duration::from_millis(100),
        workers: 2,
        write_ratio: 0.0,
        ..Default::default()
    };

    let dispatched = run_mixed(&client_for(&server), &config, |_| {})
        .await
        .unwrap();

    assert!(dispatched.records.iter().all(|r| r.phase() == Phase::Read));
}

#[tokio::test(flavor = "multi_thread")]
async fn chaos_accounts_for_every_request_after_cancel() {
    let server = MockServer::start().await;
    mount_always(&server, "POST", 201).await;
    mount_always(&server, "GET", 503).await;
    let config = ChaosConfig {
        workers: 4,
        batch_size: 10,
        write_ratio: 0.2,
        pause: Duration::from_millis(10),
        ..Default::default()
    };
    let handle = ShutdownHandle::new();

    let totals = run_chaos(
        &client_for(&server),
        &config,
        handle.new_listener(),
        |_| {},
        |totals| {
            if totals.batches == 3 {
                handle.shutdown();
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(3, totals.batches);
    assert_eq!(30, totals.dispatched);
    assert_eq!(6, totals.survived);
    assert_eq!(24, totals.failed);
    assert_eq!(totals.dispatched, totals.survived + totals.failed);
}

#[tokio::test(flavor = "multi_thread")]
async fn chaos_drains_the_batch_in_flight_when_cancelled() {
    let server = MockServer::start().await;
    for http_method in ["POST", "GET"] {
        let status = if http_method == "POST" { 201 } else { 200 };
        Mock::given(method(http_method))
            .and(path("/reservations"))
            .respond_with(ResponseTemplate::new(status).set_delay(Duration::from_millis(400)))
            .mount(&server)
            .await;
    }
    let config = ChaosConfig {
        workers: 10,
        batch_size: 10,
        write_ratio: 0.2,
        pause: Duration::from_millis(10),
        ..Default::default()
    };
    let handle = ShutdownHandle::new();
    let listener = handle.new_listener();

    // Lands while every request of the first batch is still waiting on the backend
    tokio::spawn({
        let handle = handle.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            handle.shutdown();
        }
    });

    let totals = run_chaos(&client_for(&server), &config, listener, |_| {}, |_| {})
        .await
        .unwrap();

    assert_eq!(1, totals.batches);
    assert_eq!(config.batch_size, totals.dispatched);
    assert_eq!(totals.dispatched, totals.survived + totals.failed);
    assert_eq!(10, totals.survived);
    assert_eq!(10, server.received_requests().await.unwrap().len());
}

#[tokio::test(flavor = "multi_thread")]
async fn chaos_counts_an_unreachable_backend_as_failed() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = ReservationsClient::new(&HarnessConfig::new(
        Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
    ))
    .unwrap();
    let config = ChaosConfig {
        workers: 5,
        batch_size: 5,
        pause: Duration::ZERO,
        ..Default::default()
    };
    let handle = ShutdownHandle::new();

    let totals = run_chaos(&client, &config, handle.new_listener(), |_| {}, |_| {
        handle.shutdown();
    })
    .await
    .unwrap();

    assert_eq!(1, totals.batches);
    assert_eq!(5, totals.failed);
    assert_eq!(0, totals.survived);
}

#[tokio::test(flavor = "multi_thread")]
async fn chaos_stops_before_starting_when_already_cancelled() {
    let server = MockServer::start().await;
    let handle = ShutdownHandle::new();
    let listener = handle.new_listener();
    handle.shutdown();

    let totals = run_chaos(
        &client_for(&server),
        &ChaosConfig::default(),
        listener,
        |_| {},
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(0, totals.dispatched);
    assert!(server.received_requests().await.unwrap().is_empty());
}
