#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{bridge_with, new_bridge, spawn_host};
use pollbridge_core::{BridgeConfig, BridgeError, Command, Reply};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

const INTERACTIVE: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct LuaRequest<'a> {
    code: &'a str,
}

#[tokio::test(start_paused = true)]
async fn test_lua_round_trip_scenario() {
    // Scenario: caller asks the host to evaluate `return 1+1`
    // Then: the host's reply result comes back to the caller before the deadline
    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        assert_eq!(cmd.body, json!({"code": "return 1+1"}));
        Some(Reply::success(cmd.command_type.clone(), json!(2)))
    });

    let started = Instant::now();
    let result: u32 = bridge
        .execute_command("lua", &LuaRequest { code: "return 1+1" }, INTERACTIVE)
        .await
        .unwrap();

    assert_eq!(result, 2);
    assert!(started.elapsed() < INTERACTIVE);
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_timeout_fires_at_deadline() {
    let bridge = new_bridge();
    let started = Instant::now();

    let err = bridge
        .execute_command::<_, Value>("lua", &(), INTERACTIVE)
        .await
        .unwrap_err();

    let elapsed = started.elapsed();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    assert!(elapsed >= INTERACTIVE);
    assert!(elapsed < INTERACTIVE + Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_remote_failure_is_not_a_timeout() {
    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        Some(Reply::failure(cmd.command_type.clone(), "attempt to call a nil value"))
    });

    let err = bridge
        .execute_command::<_, Value>("lua", &LuaRequest { code: "nope()" }, INTERACTIVE)
        .await
        .unwrap_err();

    assert!(err.is_remote());
    assert_eq!(
        err,
        BridgeError::RemoteExecution {
            command_type: "lua".into(),
            message: "attempt to call a nil value".into(),
        }
    );
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_response_shape_populated_from_result() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct BanStats {
        total: u32,
        banned: u32,
    }

    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        Some(Reply::success(
            cmd.command_type.clone(),
            json!({"total": 12, "banned": 3}),
        ))
    });

    let stats: BanStats = bridge
        .execute_command("lua", &LuaRequest { code: "..." }, INTERACTIVE)
        .await
        .unwrap();

    assert_eq!(stats, BanStats { total: 12, banned: 3 });
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_registration_removed_after_timeout() {
    let bridge = new_bridge();

    let _ = bridge
        .execute_command::<_, Value>("lua", &(), Duration::from_millis(200))
        .await;
    assert_eq!(bridge.router().waiters("lua"), 0);

    // A late reply finds nobody and is dropped
    let summary = bridge.submit(vec![Reply::success("lua", json!(1))]).await;
    assert_eq!(summary.unroutable, 1);
    assert_eq!(summary.delivered, 0);
}

#[tokio::test(start_paused = true)]
async fn test_registration_removed_after_success() {
    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        Some(Reply::success(cmd.command_type.clone(), Value::Null))
    });

    bridge
        .execute_command::<_, ()>("notify_mods_changed", &(), INTERACTIVE)
        .await
        .unwrap();

    assert_eq!(bridge.router().waiters("notify_mods_changed"), 0);
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_queue_full_fails_fast_and_deregisters() {
    let bridge = bridge_with(BridgeConfig {
        queue_capacity: 1,
        enqueue_timeout_ms: 10,
        ..BridgeConfig::default()
    });

    // Occupies the only slot; nobody polls
    let occupant = {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            bridge
                .execute_command::<_, Value>("first", &(), INTERACTIVE)
                .await
        })
    };
    while bridge.queue().pending() == 0 {
        tokio::task::yield_now().await;
    }

    let err = bridge
        .execute_command::<_, Value>("second", &(), INTERACTIVE)
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::QueueFull { .. }));
    assert_eq!(bridge.router().waiters("second"), 0);
    assert!(occupant.await.unwrap().unwrap_err().is_timeout());
}

#[tokio::test(start_paused = true)]
async fn test_full_queue_gives_up_within_call_timeout() {
    // Enqueue grace (1s default) is longer than the caller's timeout
    let bridge = bridge_with(BridgeConfig {
        queue_capacity: 1,
        ..BridgeConfig::default()
    });
    bridge
        .queue()
        .enqueue(Command::new("filler", Value::Null), Duration::ZERO)
        .await
        .unwrap();
    let timeout = Duration::from_millis(100);
    let started = Instant::now();

    let err = bridge
        .execute_command::<_, Value>("lua", &(), timeout)
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::QueueFull { .. }), "{:?}", err);
    assert!(started.elapsed() <= timeout, "waited {:?}", started.elapsed());
    assert_eq!(bridge.router().waiters("lua"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_time_spent_queueing_counts_against_timeout() {
    let bridge = bridge_with(BridgeConfig {
        queue_capacity: 1,
        ..BridgeConfig::default()
    });
    bridge
        .queue()
        .enqueue(Command::new("filler", Value::Null), Duration::ZERO)
        .await
        .unwrap();

    // The slot frees 80ms in; nobody ever replies
    let drainer = {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(80)).await;
            bridge
                .queue()
                .drain(Duration::from_millis(10), Duration::from_millis(1), 1)
                .await
        })
    };
    let timeout = Duration::from_millis(100);
    let started = Instant::now();

    let err = bridge
        .execute_command::<_, Value>("lua", &(), timeout)
        .await
        .unwrap_err();

    let elapsed = started.elapsed();
    assert!(err.is_timeout(), "{:?}", err);
    assert!(elapsed >= timeout);
    assert!(elapsed < timeout + Duration::from_millis(5), "waited {:?}", elapsed);
    assert_eq!(drainer.await.unwrap().len(), 1);
    assert_eq!(bridge.queue().pending(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_distinct_types_each_get_their_own_reply() {
    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        Some(Reply::success(
            cmd.command_type.clone(),
            json!(cmd.command_type.clone()),
        ))
    });

    let calls = (0..5).map(|i| {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            let command_type = format!("type-{}", i);
            let got: String = bridge
                .execute_command(&command_type, &(), INTERACTIVE)
                .await
                .unwrap();
            (command_type, got)
        })
    });

    for call in futures::future::join_all(calls).await {
        let (sent, got) = call.unwrap();
        assert_eq!(sent, got);
    }
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_same_type_calls_share_one_reply() {
    // Replies carry no call identifier: one reply of a type completes every
    // outstanding call of that type.
    let bridge = new_bridge();

    let calls: Vec<_> = (0..3)
        .map(|i| {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .execute_command::<_, Value>("lua", &json!({"call": i}), INTERACTIVE)
                    .await
            })
        })
        .collect();

    let batch = bridge.poll().await;
    assert_eq!(batch.len(), 3);
    assert_eq!(bridge.router().waiters("lua"), 3);

    let summary = bridge
        .submit(vec![Reply::success("lua", json!("shared"))])
        .await;
    assert_eq!(summary.delivered, 3);

    for call in calls {
        assert_eq!(call.await.unwrap().unwrap(), json!("shared"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_same_type_waiters_each_see_every_reply() {
    let bridge = bridge_with(BridgeConfig {
        reply_buffer: 4,
        ..BridgeConfig::default()
    });
    let mut first = bridge.router().register("lua");
    let mut second = bridge.router().register("lua");

    let summary = bridge
        .submit(vec![
            Reply::success("lua", json!("a")),
            Reply::success("lua", json!("b")),
        ])
        .await;
    assert_eq!(summary.delivered, 4);

    for sub in [&mut first, &mut second] {
        assert_eq!(sub.recv().await.unwrap().result, json!("a"));
        assert_eq!(sub.recv().await.unwrap().result, json!("b"));
    }
}

#[tokio::test(start_paused = true)]
async fn test_correlated_calls_of_same_type_are_point_to_point() {
    let bridge = new_bridge();
    let host = spawn_host(bridge.clone(), |cmd: &Command| {
        let token = cmd.id.clone().expect("correlated command carries a token");
        Some(Reply::success(cmd.command_type.clone(), cmd.body.clone()).with_token(token))
    });

    let calls: Vec<_> = (0..4u32)
        .map(|i| {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                let echoed: u32 = bridge
                    .execute_correlated("lua", &i, INTERACTIVE)
                    .await
                    .unwrap();
                (i, echoed)
            })
        })
        .collect();

    for call in calls {
        let (sent, echoed) = call.await.unwrap();
        assert_eq!(sent, echoed);
    }
    host.abort();
}

#[tokio::test(start_paused = true)]
async fn test_malformed_batch_dispatches_nothing() {
    let bridge = new_bridge();
    let mut sub = bridge.router().register("lua");

    let err = bridge.submit_raw(b"{not json").await.unwrap_err();

    assert!(matches!(err, BridgeError::MalformedBatch { .. }));
    assert!(sub.try_recv().is_none());
}
