//! Advancing production orders and starting pipeline stages.

use std::sync::Arc;

use super::{InFlight, WorkflowResult};
use crate::api::{ClinicClient, Transport};
use crate::dashboard::{pdf_file_name, LogisticsDashboard};
use crate::models::{DirectAction, NewProductionOrder, PrescribedMedicine, ProductionOrder, Visit};
use crate::pipeline::{ProductionOrderStatus, StageAction};
use crate::session::Session;

/// What to re-fetch after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTarget {
    Visit(u64),
    Dashboard,
    Nothing,
}

/// Fresh server state after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Refreshed {
    Visit(Visit),
    Dashboard(LogisticsDashboard),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// The status is terminal or unrecognised; no request was made
    NoAction,
    /// An advance for this order is already running; no request was made
    AlreadyInFlight,
    Advanced {
        order_id: u64,
        from: ProductionOrderStatus,
        to: ProductionOrderStatus,
        /// `None` when the re-fetch failed; the advance itself succeeded
        refreshed: Option<Refreshed>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageActionOutcome {
    /// The medicine's latest order already reached this stage
    Disabled,
    AlreadyInFlight,
    Created {
        order: ProductionOrder,
        visit: Option<Visit>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectActionOutcome {
    /// The order is already at or past the shortcut's target, or its
    /// status is unknown; no mutation was made
    NoAction {
        current: Option<ProductionOrderStatus>,
    },
    AlreadyInFlight,
    Done {
        order_id: u64,
        from: ProductionOrderStatus,
        status: ProductionOrderStatus,
        /// Downloaded order sheet as `(file name, bytes)`
        pdf: Option<(String, Vec<u8>)>,
        /// `None` when the re-fetch failed
        refreshed: Option<LogisticsDashboard>,
    },
}

/// Serialises status mutations per production order and per medicine.
pub struct AdvanceCoordinator<T: Transport> {
    client: Arc<ClinicClient<T>>,
    orders: InFlight<u64>,
    medicines: InFlight<u64>,
}

impl<T: Transport> AdvanceCoordinator<T> {
    pub fn new(client: Arc<ClinicClient<T>>) -> Self {
        Self {
            client,
            orders: InFlight::new(),
            medicines: InFlight::new(),
        }
    }

    pub fn is_advancing(&self, order_id: u64) -> bool {
        self.orders.is_in_flight(&order_id)
    }

    /// Move `order` one step forward.
    ///
    /// Exactly one status update is sent; on failure the error is returned
    /// and nothing is retried.
    pub fn advance(
        &self,
        session: &Session,
        order: &ProductionOrder,
        refresh: RefreshTarget,
    ) -> WorkflowResult<AdvanceOutcome> {
        let Some(from) = order.status() else {
            log::warn!("Order {} has unknown status {:?}", order.id, order.status);
            return Ok(AdvanceOutcome::NoAction);
        };
        let Some(to) = from.next() else {
            return Ok(AdvanceOutcome::NoAction);
        };

        let Some(_guard) = self.orders.try_acquire(order.id) else {
            log::info!("Advance of order {} already in flight", order.id);
            return Ok(AdvanceOutcome::AlreadyInFlight);
        };

        log::info!("Advancing order {}: {} -> {}", order.id, from, to);
        self.client.update_order_status(session, order.id, to)?;

        Ok(AdvanceOutcome::Advanced {
            order_id: order.id,
            from,
            to,
            refreshed: self.refresh(session, refresh),
        })
    }

    /// Create the order that starts `action`'s stage for `medicine`.
    pub fn trigger_stage_action(
        &self,
        session: &Session,
        medicine: &PrescribedMedicine,
        action: StageAction,
        visit_id: u64,
    ) -> WorkflowResult<StageActionOutcome> {
        if medicine.is_action_disabled(action) {
            log::debug!("{} disabled for medicine {}", action, medicine.id);
            return Ok(StageActionOutcome::Disabled);
        }

        let Some(_guard) = self.medicines.try_acquire(medicine.id) else {
            log::info!("Stage action for medicine {} already in flight", medicine.id);
            return Ok(StageActionOutcome::AlreadyInFlight);
        };

        let request = NewProductionOrder {
            medicine: medicine.id,
            status: action.initial_status(),
        };
        log::info!("Starting {} for medicine {}", action, medicine.id);
        let order = self.client.create_production_order(session, &request)?;

        let visit = match self.refresh(session, RefreshTarget::Visit(visit_id)) {
            Some(Refreshed::Visit(visit)) => Some(visit),
            _ => None,
        };
        Ok(StageActionOutcome::Created { order, visit })
    }

    /// Run a notification shortcut on the order it links.
    ///
    /// The order's current status is read from the dashboard first; a
    /// shortcut that would not move the order forward does nothing.
    pub fn run_direct_action(
        &self,
        session: &Session,
        order_id: u64,
        action: DirectAction,
    ) -> WorkflowResult<DirectActionOutcome> {
        let Some(_guard) = self.orders.try_acquire(order_id) else {
            log::info!("Direct action on order {} already in flight", order_id);
            return Ok(DirectActionOutcome::AlreadyInFlight);
        };

        let target = action.target();
        let dashboard = self.client.logistic_stats(session)?;
        let current = dashboard
            .production_orders
            .iter()
            .find(|o| o.id == order_id)
            .and_then(|o| o.status());
        let from = match current {
            Some(from) if target > from => from,
            _ => {
                log::info!(
                    "Direct action on order {} skipped: {:?} does not precede {}",
                    order_id,
                    current,
                    target
                );
                return Ok(DirectActionOutcome::NoAction { current });
            }
        };

        let pdf = if action.downloads_pdf() {
            let bytes = self.client.download_order_pdf(session, order_id)?;
            Some((pdf_file_name(order_id), bytes))
        } else {
            None
        };

        log::info!("Direct action on order {}: {} -> {}", order_id, from, target);
        self.client.update_order_status(session, order_id, target)?;

        let refreshed = match self.refresh(session, RefreshTarget::Dashboard) {
            Some(Refreshed::Dashboard(dashboard)) => Some(dashboard),
            _ => None,
        };
        Ok(DirectActionOutcome::Done {
            order_id,
            from,
            status: target,
            pdf,
            refreshed,
        })
    }

    fn refresh(&self, session: &Session, target: RefreshTarget) -> Option<Refreshed> {
        let result = match target {
            RefreshTarget::Nothing => return None,
            RefreshTarget::Visit(id) => self.client.get_visit(session, id).map(Refreshed::Visit),
            RefreshTarget::Dashboard => self
                .client
                .logistic_stats(session)
                .map(Refreshed::Dashboard),
        };
        match result {
            Ok(fresh) => Some(fresh),
            Err(e) => {
                log::warn!("Re-fetch after mutation failed: {}", e);
                None
            }
        }
    }
}
