use std::{
    hash::{Hash, Hasher},
    sync::Mutex,
};

use fxhash::FxHasher64;
use tracing::{debug, info};

use drover_core::{
    delivery::Delivery,
    route::OptimizedRoute,
    store::{ChangeListener, Geolocator, RealtimeStore, Subscription, paths},
    vehicle::VehicleConstraints,
};
use drover_optimizer_client::{
    cuopt_api::OptimizationBackend, payload_builder::PayloadBuilder, translate::translate,
};

use crate::error::DispatchError;

struct LastPlan {
    fingerprint: u64,
    route: OptimizedRoute,
}

/// Runs the full planning pipeline for one trucker: read pending deliveries
/// and vehicle constraints from the store, build the routing request, submit
/// it, translate the terminal result, and persist the route.
///
/// Repeated calls over an unchanged delivery set and constraints return the
/// previous route without resubmitting, so a screen refresh cannot
/// double-solve (and double-charge for) the same problem.
pub struct Dispatcher<S, G, B> {
    store: S,
    geolocator: G,
    backend: B,
    builder: PayloadBuilder,
    last_plan: Mutex<Option<LastPlan>>,
}

impl<S, G, B> Dispatcher<S, G, B>
where
    S: RealtimeStore,
    G: Geolocator,
    B: OptimizationBackend,
{
    pub fn new(store: S, geolocator: G, backend: B, builder: PayloadBuilder) -> Self {
        Dispatcher {
            store,
            geolocator,
            backend,
            builder,
            last_plan: Mutex::new(None),
        }
    }

    pub async fn plan_route(&self, trucker_id: &str) -> Result<OptimizedRoute, DispatchError> {
        let deliveries = self.pending_deliveries().await?;
        let mut constraints = self.constraints_for(trucker_id).await?;

        if constraints.start.is_none() {
            constraints.start = Some(self.geolocator.current_coordinates().await?);
        }

        let fingerprint = plan_fingerprint(&deliveries, &constraints);
        if let Some(route) = self.cached_route(fingerprint) {
            debug!("plan inputs unchanged, reusing previous route");
            return Ok(route);
        }

        let (payload, index) = self.builder.build(&deliveries, &constraints).await?;
        let result = self.backend.solve(&payload).await?;
        let route = translate(&result, &index, trucker_id)?;

        self.store
            .set(
                &paths::trucker_route(trucker_id),
                serde_json::to_value(&route)?,
            )
            .await?;
        info!(
            "planned route for {trucker_id}: {} stops, feasible={}",
            route.stops.len(),
            route.feasible
        );

        let mut last_plan = self.last_plan.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *last_plan = Some(LastPlan {
            fingerprint,
            route: route.clone(),
        });

        Ok(route)
    }

    /// Forces the next `plan_route` call to resubmit even for unchanged
    /// inputs.
    pub fn invalidate(&self) {
        let mut last_plan = self.last_plan.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *last_plan = None;
    }

    /// Watches the pending-delivery list; the returned handle detaches the
    /// listener when dropped or cancelled.
    pub fn watch_pending(&self, on_change: ChangeListener) -> Subscription {
        self.store.subscribe(paths::PENDING_DELIVERIES, on_change)
    }

    async fn pending_deliveries(&self) -> Result<Vec<Delivery>, DispatchError> {
        let deliveries: Vec<Delivery> = match self.store.get(paths::PENDING_DELIVERIES).await? {
            Some(value) => serde_json::from_value(value)?,
            None => Vec::new(),
        };
        if deliveries.is_empty() {
            return Err(DispatchError::NoPendingDeliveries);
        }
        Ok(deliveries)
    }

    async fn constraints_for(
        &self,
        trucker_id: &str,
    ) -> Result<VehicleConstraints, DispatchError> {
        let value = self
            .store
            .get(&paths::trucker_constraints(trucker_id))
            .await?
            .ok_or_else(|| DispatchError::MissingConstraints {
                trucker_id: trucker_id.to_owned(),
            })?;
        Ok(serde_json::from_value(value)?)
    }

    fn cached_route(&self, fingerprint: u64) -> Option<OptimizedRoute> {
        let last_plan = self.last_plan.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        last_plan
            .as_ref()
            .filter(|plan| plan.fingerprint == fingerprint)
            .map(|plan| plan.route.clone())
    }
}

fn plan_fingerprint(deliveries: &[Delivery], constraints: &VehicleConstraints) -> u64 {
    let mut hasher = FxHasher64::default();

    let mut ids: Vec<&str> = deliveries.iter().map(|delivery| delivery.id.as_str()).collect();
    ids.sort_unstable();
    ids.hash(&mut hasher);

    serde_json::to_string(constraints)
        .unwrap_or_default()
        .hash(&mut hasher);

    hasher.finish()
}
