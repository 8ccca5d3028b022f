//! Scheduler Flow Tests
//!
//! - Messages published on a node's receiving topic reach the node
//! - Results are published on the node's sending topic
//! - A failing handler deschedules its node
//! - Stopping the scheduler ends every node

use std::sync::Arc;
use std::time::Duration;

use nonobvious::entity::{EntityDef, Field};
use nonobvious::node::{Node, NodeError, Topics};
use nonobvious::scheduler::{MessageBus, Scheduler, SchedulerError};
use nonobvious::Value;
use tokio::sync::broadcast;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (MessageBus, Scheduler) {
    let bus = MessageBus::new(64);
    let scheduler = Scheduler::new(bus.clone());
    (bus, scheduler)
}

async fn next(rx: &mut broadcast::Receiver<Value>) -> Value {
    timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("bus closed")
}

async fn wait_until_descheduled(scheduler: &Scheduler, node_id: &str) {
    timeout(WAIT, async {
        while scheduler.is_scheduled(node_id) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("node was never descheduled");
}

fn doubler() -> Node {
    Node::new(Topics::new("in", "out"), |v: Value| {
        Value::Int(v.as_i64().unwrap_or(0) * 2)
    })
}

// =============================================================================
// Message Flow
// =============================================================================

/// A published message is processed and its result published.
#[tokio::test]
async fn test_message_round_trip() {
    let (bus, scheduler) = setup();
    let mut out = bus.subscribe("out").unwrap();

    scheduler.schedule_node(doubler()).unwrap();
    bus.publish("in", Value::Int(21)).unwrap();

    assert_eq!(next(&mut out).await, Value::Int(42));
    scheduler.stop().await;
}

/// Messages are processed in publication order.
#[tokio::test]
async fn test_order_preserved() {
    let (bus, scheduler) = setup();
    let mut out = bus.subscribe("out").unwrap();
    scheduler.schedule_node(doubler()).unwrap();

    for i in 1..=5 {
        bus.publish("in", Value::Int(i)).unwrap();
    }
    for i in 1..=5 {
        assert_eq!(next(&mut out).await, Value::Int(i * 2));
    }
    scheduler.stop().await;
}

/// Every node on a topic receives every message.
#[tokio::test]
async fn test_fan_out() {
    let (bus, scheduler) = setup();
    let mut upper = bus.subscribe("upper").unwrap();
    let mut lower = bus.subscribe("lower").unwrap();

    scheduler
        .schedule_node(Node::new(Topics::new("words", "upper"), |v: Value| {
            Value::from(v.as_str().unwrap_or_default().to_uppercase())
        }))
        .unwrap();
    scheduler
        .schedule_node(Node::new(Topics::new("words", "lower"), |v: Value| {
            Value::from(v.as_str().unwrap_or_default().to_lowercase())
        }))
        .unwrap();

    bus.publish("words", Value::from("MiXeD")).unwrap();

    assert_eq!(next(&mut upper).await, Value::from("MIXED"));
    assert_eq!(next(&mut lower).await, Value::from("mixed"));
    scheduler.stop().await;
}

/// Nodes chain through the bus.
#[tokio::test]
async fn test_pipeline() {
    let (bus, scheduler) = setup();
    let mut out = bus.subscribe("out").unwrap();

    scheduler
        .schedule_node(Node::new(Topics::new("raw", "in"), |v: Value| {
            Value::Int(v.as_i64().unwrap_or(0) + 1)
        }))
        .unwrap();
    scheduler.schedule_node(doubler()).unwrap();

    bus.publish("raw", Value::Int(4)).unwrap();
    assert_eq!(next(&mut out).await, Value::Int(10));
    scheduler.stop().await;
}

/// Validating nodes turn maps into entities.
#[tokio::test]
async fn test_validating_node() {
    let def: Arc<EntityDef> = EntityDef::builder("Ping")
        .field(Field::integer("seq").required())
        .build()
        .unwrap();

    let (bus, scheduler) = setup();
    let mut out = bus.subscribe("pings").unwrap();
    scheduler
        .schedule_node(Node::validating(Topics::new("raw", "pings"), def))
        .unwrap();

    let data = [("seq".to_string(), Value::Int(7))].into_iter().collect();
    bus.publish("raw", Value::Map(data)).unwrap();

    let ping = next(&mut out).await;
    assert_eq!(ping.as_entity().unwrap().get_i64("seq"), Some(7));
    scheduler.stop().await;
}

// =============================================================================
// Failure and Lifecycle
// =============================================================================

/// A handler error deschedules the node that raised it.
#[tokio::test]
async fn test_failing_handler_descheduled() {
    let (bus, scheduler) = setup();
    let node = Node::fallible(Topics::new("in", "out"), |v: Value| {
        v.as_str()
            .map(Value::from)
            .ok_or_else(|| NodeError::handler("expected a string"))
    });
    let node_id = scheduler.schedule_node(node).unwrap();
    assert!(scheduler.is_scheduled(&node_id));

    bus.publish("in", Value::Int(1)).unwrap();
    wait_until_descheduled(&scheduler, &node_id).await;

    assert_eq!(scheduler.node_count(), 0);
    scheduler.stop().await;
}

/// Descheduled nodes no longer receive messages.
#[tokio::test]
async fn test_deschedule_node() {
    let (_bus, scheduler) = setup();
    let node_id = scheduler.schedule_node(doubler()).unwrap();

    scheduler.deschedule_node(&node_id).unwrap();
    assert!(!scheduler.is_scheduled(&node_id));
    assert!(matches!(
        scheduler.deschedule_node(&node_id),
        Err(SchedulerError::NodeNotFound(_))
    ));

    let result = scheduler.dispatch("in", Value::Int(1));
    assert_eq!(result.matched, 0);
    scheduler.stop().await;
}

/// `stop` ends every node and releases `run_until_stopped`.
#[tokio::test]
async fn test_stop_releases_waiters() {
    let (_bus, scheduler) = setup();
    let scheduler = Arc::new(scheduler);
    scheduler.schedule_node(doubler()).unwrap();
    scheduler.schedule_node(doubler()).unwrap();
    assert_eq!(scheduler.node_count(), 2);

    let waiter = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run_until_stopped().await })
    };

    scheduler.stop().await;
    timeout(WAIT, waiter).await.unwrap().unwrap();

    assert!(!scheduler.is_running());
    assert_eq!(scheduler.node_count(), 0);

    // A second stop is a no-op
    scheduler.stop().await;
}
