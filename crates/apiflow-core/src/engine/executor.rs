use crate::config::ExecutorConfig;
use crate::engine::context::{ResultSource, RunContext, resolve, resolve_optional};
use crate::engine::graph::{DependencyGraph, TopologicalOrder};
use crate::error::InvokeError;
use crate::http::{HttpInvoker, HttpRequest};
use apiflow_models::{ExecutionReport, Graph, Node, NodeId, NodeOutcome, NodeStatus};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Progress notifications for an external observer.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Started {
        run_id: String,
        order: Vec<NodeId>,
        cycle_detected: bool,
    },
    NodeStatus {
        node_id: NodeId,
        status: NodeStatus,
    },
    Finished {
        run_id: String,
        succeeded: usize,
        failed: usize,
    },
}

/// Walks a graph in dependency order and performs each node's call.
///
/// A failing node never aborts the run: its error is stored as
/// `{"error": message}` so downstream placeholders still see something.
pub struct Executor {
    invoker: Arc<dyn HttpInvoker>,
    config: ExecutorConfig,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl Executor {
    pub fn new(invoker: Arc<dyn HttpInvoker>) -> Self {
        Self {
            invoker,
            config: ExecutorConfig::default(),
            events: None,
        }
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_events(mut self, events: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run every reachable node once and report per-node outcomes.
    ///
    /// Only `status` and `last_result` of the graph's nodes are written.
    pub async fn run(&self, graph: &mut Graph) -> ExecutionReport {
        let plan = DependencyGraph::from_graph(graph);
        let TopologicalOrder {
            order,
            cycle_detected,
        } = plan.execution_order();

        let mut context = RunContext::new();
        let mut report = ExecutionReport {
            run_id: context.run_id.clone(),
            order: order.clone(),
            cycle_detected,
            ..Default::default()
        };

        let concurrency = self.config.effective_concurrency();
        info!(
            run_id = %report.run_id,
            nodes = graph.len(),
            ordered = order.len(),
            cycle_detected,
            concurrency,
            "Starting flow run"
        );
        self.emit(RunEvent::Started {
            run_id: report.run_id.clone(),
            order,
            cycle_detected,
        });

        if concurrency == 1 {
            self.run_sequential(graph, &mut context, &mut report).await;
        } else {
            self.run_concurrent(graph, &plan, concurrency, &mut context, &mut report)
                .await;
        }

        let (succeeded, failed) = (report.succeeded(), report.failed());
        info!(run_id = %report.run_id, succeeded, failed, skipped = report.skipped.len(), "Flow run finished");
        self.emit(RunEvent::Finished {
            run_id: report.run_id.clone(),
            succeeded,
            failed,
        });
        report
    }

    async fn run_sequential(
        &self,
        graph: &mut Graph,
        context: &mut RunContext,
        report: &mut ExecutionReport,
    ) {
        for id in report.order.clone() {
            let Some(node) = graph.node(&id) else {
                continue;
            };
            if !node.has_endpoint() {
                debug!(node_id = %id, "Skipping node without endpoint");
                report.skipped.push(id);
                continue;
            }

            self.set_status(graph, &id, NodeStatus::Loading);
            let Some(node) = graph.node(&id) else {
                continue;
            };
            let request = prepare_request(node, &*context);
            report.launched.push(id.clone());
            let result = self.invoker.invoke(request).await;
            self.record(graph, context, report, &id, result);
        }
    }

    async fn run_concurrent(
        &self,
        graph: &mut Graph,
        plan: &DependencyGraph,
        max_in_flight: usize,
        context: &mut RunContext,
        report: &mut ExecutionReport,
    ) {
        let mut remaining: HashMap<NodeId, usize> = plan.in_degrees().clone();
        let mut ready: VecDeque<NodeId> = plan.roots().into();
        let mut in_flight = FuturesUnordered::new();

        loop {
            while in_flight.len() < max_in_flight {
                let Some(id) = ready.pop_front() else {
                    break;
                };
                let runnable = graph.node(&id).map(Node::has_endpoint).unwrap_or(false);
                if !runnable {
                    debug!(node_id = %id, "Skipping node without endpoint");
                    release(plan, &mut remaining, &mut ready, &id);
                    report.skipped.push(id);
                    continue;
                }

                self.set_status(graph, &id, NodeStatus::Loading);
                let ancestors = plan.ancestors(&id);
                let Some(node) = graph.node(&id) else {
                    continue;
                };
                let request = prepare_request(node, &context.scoped(&ancestors));
                report.launched.push(id.clone());
                let invoker = Arc::clone(&self.invoker);
                in_flight.push(async move {
                    let result = invoker.invoke(request).await;
                    (id, result)
                });
            }

            let Some((id, result)) = in_flight.next().await else {
                break;
            };
            self.record(graph, context, report, &id, result);
            release(plan, &mut remaining, &mut ready, &id);
        }
    }

    fn record(
        &self,
        graph: &mut Graph,
        context: &mut RunContext,
        report: &mut ExecutionReport,
        id: &str,
        result: Result<Value, InvokeError>,
    ) {
        let outcome = match result {
            Ok(payload) => NodeOutcome::Success(payload),
            Err(err) => {
                warn!(node_id = %id, error = %err, "Node call failed");
                NodeOutcome::Error(err.to_string())
            }
        };

        context.set_result(id, outcome.as_result_value());
        let status = if let Some(node) = graph.node_mut(id) {
            match &outcome {
                NodeOutcome::Success(payload) => node.record_success(payload.clone()),
                NodeOutcome::Error(message) => node.record_error(message.clone()),
            }
            node.status()
        } else {
            NodeStatus::Error
        };
        report.outcomes.insert(id.to_string(), outcome);
        self.emit(RunEvent::NodeStatus {
            node_id: id.to_string(),
            status,
        });
    }

    fn set_status(&self, graph: &mut Graph, id: &str, status: NodeStatus) {
        if let Some(node) = graph.node_mut(id) {
            node.set_status(status);
            self.emit(RunEvent::NodeStatus {
                node_id: id.to_string(),
                status,
            });
        }
    }

    fn emit(&self, event: RunEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Materialize the request for `node` from its templates.
///
/// A body, and with it a JSON content type, is attached only for POST/PUT
/// nodes that define a body template.
pub fn prepare_request<R: ResultSource + ?Sized>(node: &Node, results: &R) -> HttpRequest {
    let url = resolve(node.endpoint_template(), results);
    let request = HttpRequest::new(node.method(), url);
    debug!(node_id = %node.id(), method = %node.method(), url = %request.url, "Prepared request");

    if !node.method().carries_body() {
        return request;
    }
    match resolve_optional(node.body_template(), results) {
        Some(body) => request.with_json_body(body),
        None => request,
    }
}

fn release(
    plan: &DependencyGraph,
    remaining: &mut HashMap<NodeId, usize>,
    ready: &mut VecDeque<NodeId>,
    id: &str,
) {
    for next in plan.dependents(id) {
        if let Some(degree) = remaining.get_mut(next) {
            *degree -= 1;
            if *degree == 0 {
                ready.push_back(next.clone());
            }
        }
    }
}
