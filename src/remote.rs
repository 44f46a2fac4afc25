use async_trait::async_trait;

use crate::snapshot::TargetIdentity;
use crate::{Error, Result};

/// One entry of a target group's health description.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetHealthRecord {
    pub id: Option<String>,
    pub port: Option<u16>,
}

/// One entry of an instance status response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceStatusRecord {
    pub instance_id: Option<String>,
    pub availability_zone: Option<String>,
}

/// The remote operations a convergence run depends on.
///
/// Mutations are never called with an empty target list.
#[async_trait]
pub trait TargetGroupApi: Send + Sync {
    async fn describe_target_health(
        &self,
        target_group: &str,
    ) -> Result<Vec<TargetHealthRecord>>;

    async fn describe_instance_zones(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<InstanceStatusRecord>>;

    async fn register_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()>;

    async fn deregister_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()>;
}

fn target_descriptions(targets: &[TargetIdentity]) -> Vec<aws::TargetDescription> {
    targets
        .iter()
        .map(|target| aws::TargetDescription {
            id: Some(target.id.clone()),
            port: target.port,
            availability_zone: None,
        })
        .collect()
}

#[async_trait]
impl TargetGroupApi for aws::Client {
    async fn describe_target_health(
        &self,
        target_group: &str,
    ) -> Result<Vec<TargetHealthRecord>> {
        let descriptions = aws::Client::describe_target_health(self, target_group)
            .await
            .map_err(|err| Error::remote("DescribeTargetHealth", err))?;

        Ok(descriptions
            .into_iter()
            .map(|description| {
                let target = description.target.unwrap_or_default();
                TargetHealthRecord {
                    id: target.id,
                    port: target.port,
                }
            })
            .collect())
    }

    async fn describe_instance_zones(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<InstanceStatusRecord>> {
        let statuses = self
            .describe_instance_status(instance_ids)
            .await
            .map_err(|err| Error::remote("DescribeInstanceStatus", err))?;

        Ok(statuses
            .into_iter()
            .map(|status| InstanceStatusRecord {
                instance_id: status.instance_id,
                availability_zone: status.availability_zone,
            })
            .collect())
    }

    async fn register_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()> {
        let targets = target_descriptions(targets);
        let metadata = aws::Client::register_targets(self, target_group, &targets)
            .await
            .map_err(|err| Error::remote("RegisterTargets", err))?;

        debug!(message = "targets registered", request_id = %metadata.request_id);

        Ok(())
    }

    async fn deregister_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()> {
        let targets = target_descriptions(targets);
        let metadata = aws::Client::deregister_targets(self, target_group, &targets)
            .await
            .map_err(|err| Error::remote("DeregisterTargets", err))?;

        debug!(message = "targets deregistered", request_id = %metadata.request_id);

        Ok(())
    }
}
