//! # Scheduler
//!
//! Runs nodes as tokio tasks and moves messages between them and the bus:
//!
//! - one incoming pump per receiving topic forwards bus messages to the
//!   inboxes registered on that topic
//! - each node task feeds its inbox through the node and publishes results
//!   on the node's sending topic
//!
//! A node whose handler fails is logged and descheduled; the rest keep running.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::join_all;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::bus::MessageBus;
use super::errors::{SchedulerError, SchedulerResult};
use super::routing::{DispatchResult, InboxReceiver, RoutingTable};
use super::NodeId;
use crate::node::Node;
use crate::value::Value;

/// Schedules nodes against a message bus
#[derive(Debug)]
pub struct Scheduler {
    bus: MessageBus,
    routes: Arc<RoutingTable>,
    pumps: Mutex<HashMap<String, JoinHandle<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(bus: MessageBus) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            bus,
            routes: Arc::new(RoutingTable::new()),
            pumps: Mutex::new(HashMap::new()),
            tasks: Mutex::new(Vec::new()),
            running: AtomicBool::new(true),
            shutdown,
        }
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Schedules `node` and returns its id.
    ///
    /// Must be called from within a tokio runtime. Messages published on the
    /// node's receiving topic after this returns reach the node.
    pub fn schedule_node(&self, node: Node) -> SchedulerResult<NodeId> {
        if !self.is_running() {
            return Err(SchedulerError::Stopped);
        }

        let node_id = new_node_id();
        let receiving = node.topics().receiving.clone();

        let inbox = self
            .routes
            .insert(node_id.clone(), &receiving)
            .ok_or_else(|| SchedulerError::Internal("Lock poisoned".into()))?;
        self.ensure_pump(&receiving)?;

        let handle = tokio::spawn(run_node(
            node.clone(),
            node_id.clone(),
            inbox,
            self.bus.clone(),
            Arc::clone(&self.routes),
        ));
        let mut tasks = self
            .tasks
            .lock()
            .map_err(|_| SchedulerError::Internal("Lock poisoned".into()))?;
        // Reap nodes that were descheduled or failed
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
        drop(tasks);

        debug!(
            node_id = %node_id,
            receiving = %node.topics().receiving,
            sending = %node.topics().sending,
            "Scheduled node"
        );
        Ok(node_id)
    }

    /// Removes a node from routing; its task ends once its inbox drains.
    pub fn deschedule_node(&self, node_id: &str) -> SchedulerResult<()> {
        match self.routes.remove(node_id) {
            Some(topic) => {
                debug!(node_id, topic = %topic, "Descheduled node");
                Ok(())
            }
            None => Err(SchedulerError::NodeNotFound(node_id.to_string())),
        }
    }

    /// Delivers `value` to every node listening on `topic`, bypassing the bus.
    pub fn dispatch(&self, topic: &str, value: Value) -> DispatchResult {
        self.routes.dispatch(topic, &value)
    }

    pub fn is_scheduled(&self, node_id: &str) -> bool {
        self.routes.contains(node_id)
    }

    /// Number of nodes currently receiving messages
    pub fn node_count(&self) -> usize {
        self.routes.len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops every node and pump and waits for their tasks to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let stopped = self.routes.stop_all();
        self.shutdown.send_replace(true);

        let mut handles: Vec<JoinHandle<()>> = self
            .tasks
            .lock()
            .map(|mut tasks| std::mem::take(&mut *tasks))
            .unwrap_or_default();
        if let Ok(mut pumps) = self.pumps.lock() {
            handles.extend(pumps.drain().map(|(_, handle)| handle));
        }

        for result in join_all(handles).await {
            if let Err(e) = result {
                warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
        info!(nodes = stopped, "Scheduler stopped");
    }

    /// Resolves once `stop` has been called.
    pub async fn run_until_stopped(&self) {
        let mut shutdown = self.shutdown.subscribe();
        while !*shutdown.borrow_and_update() {
            if shutdown.changed().await.is_err() {
                return;
            }
        }
    }

    /// Node tasks not yet reaped
    #[cfg(test)]
    fn tracked_tasks(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }

    fn ensure_pump(&self, topic: &str) -> SchedulerResult<()> {
        let mut pumps = self
            .pumps
            .lock()
            .map_err(|_| SchedulerError::Internal("Lock poisoned".into()))?;

        if pumps.get(topic).is_some_and(|handle| !handle.is_finished()) {
            return Ok(());
        }

        let incoming = self.bus.subscribe(topic)?;
        let handle = tokio::spawn(run_pump(
            topic.to_string(),
            incoming,
            Arc::clone(&self.routes),
            self.shutdown.subscribe(),
        ));
        pumps.insert(topic.to_string(), handle);
        Ok(())
    }
}

/// Time-ordered UUIDv7 followed by a random UUIDv4, as 64 hex characters.
fn new_node_id() -> NodeId {
    format!("{}{}", Uuid::now_v7().simple(), Uuid::new_v4().simple())
}

async fn run_node(
    node: Node,
    node_id: NodeId,
    mut inbox: InboxReceiver,
    bus: MessageBus,
    routes: Arc<RoutingTable>,
) {
    while let Some(signal) = inbox.recv().await {
        match node.handle(signal) {
            Ok(Some(result)) => {
                let sending = &node.topics().sending;
                match bus.publish(sending, result) {
                    Ok(0) => debug!(node_id = %node_id, topic = %sending, "No subscribers for result"),
                    Ok(_) => {}
                    Err(e) => warn!(node_id = %node_id, error = %e, "Failed to publish result"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                error!(
                    node_id = %node_id,
                    receiving = %node.topics().receiving,
                    error = %e,
                    "Node handler failed"
                );
                break;
            }
        }
    }

    routes.remove(&node_id);
    debug!(node_id = %node_id, "Node finished");
}

async fn run_pump(
    topic: String,
    mut incoming: broadcast::Receiver<Value>,
    routes: Arc<RoutingTable>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            message = incoming.recv() => match message {
                Ok(value) => {
                    let result = routes.dispatch(&topic, &value);
                    if result.failed > 0 {
                        debug!(topic = %topic, failed = result.failed, "Dropped messages for finished nodes");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(topic = %topic, skipped, "Incoming pump lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    debug!(topic = %topic, "Incoming pump stopped");
}
