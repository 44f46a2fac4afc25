use crate::Result;
use crate::config::Config;
use crate::reconcile::{Delta, diff};
use crate::remote::TargetGroupApi;
use crate::snapshot::{TargetSnapshot, build_snapshot};
use crate::zone::{DesiredSet, InstanceZoneMap, filter_by_zone};

/// What a run saw and did.
#[derive(Debug)]
pub struct Report {
    pub current: TargetSnapshot,
    pub desired: DesiredSet,
    pub delta: Delta,
    /// Targets sent in the register call, zero if none was issued.
    pub registered: usize,
    /// Targets sent in the deregister call, zero if none was issued.
    pub deregistered: usize,
}

/// Run one convergence pass against `api`.
///
/// Every step awaits the previous one, the first error aborts the run. Nothing
/// is retried, the whole pass is safe to run again from scratch.
pub async fn converge(api: &dyn TargetGroupApi, config: &Config) -> Result<Report> {
    info!(
        message = "converging target group",
        region = %config.region,
        availability_zone = %config.availability_zone,
        source = %config.source,
        destination = %config.destination,
        dry_run = config.dry_run,
    );

    info!(message = "fetching destination target group health");
    let records = api.describe_target_health(&config.destination).await?;
    let current = build_snapshot(&records, false)?;
    info!(
        message = "fetched destination target group health",
        count = current.len(),
        targets = %current,
    );

    info!(message = "fetching source target group health");
    let records = api.describe_target_health(&config.source).await?;
    let reference = build_snapshot(&records, true)?;
    info!(
        message = "fetched source target group health",
        count = reference.len(),
        targets = %reference,
    );

    // an empty id filter would describe every instance in the region
    let zones = if reference.is_empty() {
        InstanceZoneMap::default()
    } else {
        info!(message = "fetching instance zones", count = reference.len());
        let statuses = api.describe_instance_zones(&reference.ids()).await?;
        let zones = InstanceZoneMap::from_statuses(&statuses)?;
        info!(message = "fetched instance zones", count = zones.len());
        zones
    };

    let desired = filter_by_zone(&reference, &zones, &config.availability_zone);
    let delta = diff(&desired, &current);

    let mut report = Report {
        current,
        desired,
        delta,
        registered: 0,
        deregistered: 0,
    };

    if config.dry_run {
        info!(
            message = "dry run, leaving destination untouched",
            to_register = %report.delta.to_register,
            to_deregister = %report.delta.to_deregister,
            after = %report.delta.apply_to(&report.current),
        );

        return Ok(report);
    }

    // register first, so a target moving between lifecycle states is never
    // absent from both
    if report.delta.to_register.is_empty() {
        info!(message = "no new targets to register");
    } else {
        let targets = report.delta.to_register.to_vec();
        info!(
            message = "registering new targets",
            count = targets.len(),
            targets = %report.delta.to_register,
        );
        api.register_targets(&config.destination, &targets).await?;
        report.registered = targets.len();
    }

    if report.delta.to_deregister.is_empty() {
        info!(message = "no targets to deregister");
    } else {
        let targets = report.delta.to_deregister.to_vec();
        info!(
            message = "deregistering removed targets",
            count = targets.len(),
            targets = %report.delta.to_deregister,
        );
        api.deregister_targets(&config.destination, &targets).await?;
        report.deregistered = targets.len();
    }

    Ok(report)
}
