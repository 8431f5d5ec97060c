//! Integration tests for active-server failover.

use playlist_failover::modules::failover::{
    Balancer, ManualClock, PlaylistResource, Server, Topology,
};
use std::sync::Arc;
use std::time::Duration;

const TOLERANCE: Duration = Duration::from_secs(8);

fn setup() -> (Arc<Balancer>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let balancer = Arc::new(Balancer::with_clock(TOLERANCE, clock.clone()));
    (balancer, clock)
}

fn s(id: &str) -> Server {
    Server::from(id)
}

fn actives(balancer: &Balancer) -> Vec<PlaylistResource> {
    balancer.actives().collect()
}

#[test]
fn test_error_then_staleness_walkthrough() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2", "S3"]));
    assert_eq!(actives(&balancer), vec![PlaylistResource::new(s("S1"), "/a")]);

    balancer.notify_error(&s("S1"), "/a");
    assert_eq!(actives(&balancer), vec![PlaylistResource::new(s("S2"), "/a")]);

    balancer.notify_modified(&s("S2"), "/a");
    clock.advance(Duration::from_secs(1));
    assert_eq!(actives(&balancer), vec![PlaylistResource::new(s("S2"), "/a")]);

    clock.advance(Duration::from_secs(8));
    assert_eq!(actives(&balancer), vec![PlaylistResource::new(s("S3"), "/a")]);
}

#[test]
fn test_errors_cycle_back_to_original() {
    let (balancer, _) = setup();
    let servers = ["S1", "S2", "S3", "S4"];
    balancer.update(&Topology::new().with_path("/a", servers));

    let mut seen = Vec::new();
    for _ in 0..servers.len() {
        let active = balancer.actives().next().unwrap().server;
        seen.push(active.to_string());
        assert!(balancer.notify_error(&active, "/a"));
    }

    assert_eq!(seen, servers);
    assert_eq!(balancer.active_for("/a"), Some(s("S1")));
}

#[test]
fn test_late_error_report_does_not_skip_server() {
    let (balancer, _) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2", "S3"]));

    // Two request handlers saw S1 fail; only the first report counts.
    assert!(balancer.notify_error(&s("S1"), "/a"));
    assert!(!balancer.notify_error(&s("S1"), "/a"));

    assert_eq!(balancer.active_for("/a"), Some(s("S2")));
}

#[test]
fn test_stale_server_needs_prior_confirmation() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2"]));

    clock.advance(Duration::from_secs(300));
    assert_eq!(balancer.actives().next().unwrap().server, s("S1"));

    balancer.notify_modified(&s("S1"), "/a");
    clock.advance(Duration::from_secs(7));
    assert_eq!(balancer.actives().next().unwrap().server, s("S1"));

    clock.advance(Duration::from_secs(2));
    assert_eq!(balancer.actives().next().unwrap().server, s("S2"));
}

#[test]
fn test_repeated_modifications_keep_server_active() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2"]));

    for _ in 0..10 {
        balancer.notify_modified(&s("S1"), "/a");
        clock.advance(Duration::from_secs(6));
        assert_eq!(balancer.actives().next().unwrap().server, s("S1"));
    }
}

#[test]
fn test_topology_change_keeping_active() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2", "S3"]));
    balancer.notify_error(&s("S1"), "/a");
    balancer.notify_modified(&s("S2"), "/a");

    clock.advance(Duration::from_secs(5));
    balancer.update(&Topology::new().with_path("/a", ["S3", "S2", "S5"]));
    assert_eq!(
        balancer.rotation_for("/a").unwrap(),
        vec![s("S2"), s("S3"), s("S5")]
    );

    // Freshness carried over: the old confirmation still expires on time.
    clock.advance(Duration::from_secs(4));
    assert_eq!(balancer.actives().next().unwrap().server, s("S3"));
}

#[test]
fn test_topology_change_dropping_active() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2"]));
    balancer.notify_modified(&s("S1"), "/a");

    balancer.update(&Topology::new().with_path("/a", ["S7", "S8"]));
    assert_eq!(balancer.active_for("/a"), Some(s("S7")));

    clock.advance(Duration::from_secs(60));
    assert_eq!(balancer.actives().next().unwrap().server, s("S7"));
}

#[test]
fn test_removed_path_forgets_history() {
    let (balancer, _) = setup();
    let full = Topology::new()
        .with_path("/a", ["S1", "S2"])
        .with_path("/b", ["S3", "S4"]);
    balancer.update(&full);
    balancer.notify_error(&s("S1"), "/a");
    balancer.notify_modified(&s("S2"), "/a");

    balancer.update(&Topology::new().with_path("/b", ["S3", "S4"]));
    assert!(!balancer.contains("/a"));
    assert!(balancer.fresh_at("/a").is_none());

    balancer.update(&full);
    assert_eq!(balancer.active_for("/a"), Some(s("S1")));
    assert!(balancer.fresh_at("/a").is_none());
}

#[test]
fn test_each_path_rotates_independently() {
    let (balancer, clock) = setup();
    balancer.update(
        &Topology::new()
            .with_path("/a", ["S1", "S2"])
            .with_path("/b", ["S1", "S2"]),
    );
    balancer.notify_modified(&s("S1"), "/a");
    balancer.notify_error(&s("S1"), "/b");

    clock.advance(Duration::from_secs(10));
    assert_eq!(
        actives(&balancer),
        vec![
            PlaylistResource::new(s("S2"), "/a"),
            PlaylistResource::new(s("S2"), "/b"),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_error_reports_rotate_once() {
    let (balancer, _) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2", "S3"]));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let balancer = Arc::clone(&balancer);
        handles.push(tokio::spawn(async move {
            balancer.notify_error(&Server::from("S1"), "/a")
        }));
    }

    let mut rotations = 0;
    for handle in handles {
        if handle.await.unwrap() {
            rotations += 1;
        }
    }

    assert_eq!(rotations, 1);
    assert_eq!(balancer.active_for("/a"), Some(s("S2")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_readers_rotate_stale_path_once() {
    let (balancer, clock) = setup();
    balancer.update(&Topology::new().with_path("/a", ["S1", "S2", "S3"]));
    balancer.notify_modified(&s("S1"), "/a");
    clock.advance(Duration::from_secs(9));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let balancer = Arc::clone(&balancer);
        handles.push(tokio::spawn(async move {
            balancer.actives().next().map(|r| r.server)
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(s("S2")));
    }
    assert_eq!(balancer.stats().total_rotations(), 1);
}
