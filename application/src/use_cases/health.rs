//! Health check use case
//!
//! Reports one line per component: the orchestrator itself, each agent and
//! the router. Agents are probed concurrently, each under the call timeout;
//! nothing is retried.

use crate::ports::agent::Agent;
use crate::use_cases::shared::with_timeout;
use std::sync::Arc;
use std::time::Duration;
use tandem_domain::RoutingThresholds;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHealth {
    pub component: String,
    pub healthy: bool,
    pub detail: String,
}

impl ComponentHealth {
    fn ok(component: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            healthy: true,
            detail: detail.into(),
        }
    }

    fn failed(component: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            healthy: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub components: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.components.iter().all(|c| c.healthy)
    }

    pub fn get(&self, component: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.component == component)
    }
}

pub struct HealthCheck {
    primary: Arc<dyn Agent>,
    auxiliary: Arc<dyn Agent>,
    thresholds: RoutingThresholds,
    timeout: Duration,
}

impl HealthCheck {
    pub fn new(
        primary: Arc<dyn Agent>,
        auxiliary: Arc<dyn Agent>,
        thresholds: RoutingThresholds,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            auxiliary,
            thresholds,
            timeout,
        }
    }

    pub async fn execute(&self) -> HealthReport {
        let (primary, auxiliary) = tokio::join!(
            self.probe(self.primary.as_ref()),
            self.probe(self.auxiliary.as_ref()),
        );

        let router = match self.thresholds.validate() {
            Ok(()) => ComponentHealth::ok(
                "router",
                format!(
                    "thresholds {} / {}",
                    self.thresholds.t_small, self.thresholds.t_large
                ),
            ),
            Err(e) => ComponentHealth::failed("router", e.to_string()),
        };

        HealthReport {
            components: vec![
                ComponentHealth::ok("orchestrator", "configured"),
                primary,
                auxiliary,
                router,
            ],
        }
    }

    async fn probe(&self, agent: &dyn Agent) -> ComponentHealth {
        let component = agent.role().as_str();
        match with_timeout(self.timeout, agent.health()).await {
            Ok(()) => {
                debug!("{} agent {} is reachable", component, agent.name());
                ComponentHealth::ok(component, agent.name())
            }
            Err(e) => ComponentHealth::failed(component, format!("{}: {}", agent.name(), e)),
        }
    }
}
