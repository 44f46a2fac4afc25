use serde::Deserialize;

use super::client::{Client, Error, ResponseMetadata};
use super::query::Query;

const API_VERSION: &str = "2015-12-01";

/// Information about a target.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TargetDescription {
    /// The ID of the target, for instance targets this is the instance ID.
    #[serde(rename = "Id")]
    pub id: Option<String>,

    /// The port on which the target is listening.
    #[serde(rename = "Port")]
    pub port: Option<u16>,

    #[serde(rename = "AvailabilityZone")]
    pub availability_zone: Option<String>,
}

/// The current health of a target.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TargetHealth {
    /// `initial`, `healthy`, `unhealthy`, `unused`, `draining` or `unavailable`
    #[serde(rename = "State")]
    pub state: Option<String>,

    #[serde(rename = "Reason")]
    pub reason: Option<String>,

    #[serde(rename = "Description")]
    pub description: Option<String>,
}

/// Information about the health of a target.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TargetHealthDescription {
    #[serde(rename = "Target")]
    pub target: Option<TargetDescription>,

    #[serde(rename = "HealthCheckPort")]
    pub health_check_port: Option<String>,

    #[serde(rename = "TargetHealth")]
    pub target_health: Option<TargetHealth>,
}

#[derive(Default, Deserialize)]
struct Members {
    #[serde(rename = "member", default)]
    members: Vec<TargetHealthDescription>,
}

#[derive(Deserialize)]
struct DescribeTargetHealthResult {
    #[serde(rename = "TargetHealthDescriptions", default)]
    target_health_descriptions: Members,
}

#[derive(Deserialize)]
struct DescribeTargetHealthResponse {
    #[serde(rename = "DescribeTargetHealthResult")]
    result: DescribeTargetHealthResult,
}

/// The response of `RegisterTargets` and `DeregisterTargets`, whose result
/// elements are empty.
#[derive(Deserialize)]
struct MutationResponse {
    #[serde(rename = "ResponseMetadata", default)]
    metadata: ResponseMetadata,
}

fn append_targets(query: &mut Query, targets: &[TargetDescription]) {
    for (index, target) in targets.iter().enumerate() {
        let prefix = format!("Targets.member.{}", index + 1);

        if let Some(id) = &target.id {
            query.append(&format!("{prefix}.Id"), id);
        }
        if let Some(port) = target.port {
            query.append(&format!("{prefix}.Port"), &port.to_string());
        }
        if let Some(zone) = &target.availability_zone {
            query.append(&format!("{prefix}.AvailabilityZone"), zone);
        }
    }
}

impl Client {
    /// Describes the health of every target registered in the target group.
    pub async fn describe_target_health(
        &self,
        target_group_arn: &str,
    ) -> Result<Vec<TargetHealthDescription>, Error> {
        let mut query = Query::new("DescribeTargetHealth", API_VERSION);
        query.append("TargetGroupArn", target_group_arn);

        let resp: DescribeTargetHealthResponse = self.call(&self.elbv2_endpoint, query).await?;

        Ok(resp.result.target_health_descriptions.members)
    }

    /// Registers the targets with the target group, targets already
    /// registered are left untouched by the API.
    pub async fn register_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetDescription],
    ) -> Result<ResponseMetadata, Error> {
        let mut query = Query::new("RegisterTargets", API_VERSION);
        query.append("TargetGroupArn", target_group_arn);
        append_targets(&mut query, targets);

        let resp: MutationResponse = self.call(&self.elbv2_endpoint, query).await?;

        Ok(resp.metadata)
    }

    /// Deregisters the targets from the target group.
    pub async fn deregister_targets(
        &self,
        target_group_arn: &str,
        targets: &[TargetDescription],
    ) -> Result<ResponseMetadata, Error> {
        let mut query = Query::new("DeregisterTargets", API_VERSION);
        query.append("TargetGroupArn", target_group_arn);
        append_targets(&mut query, targets);

        let resp: MutationResponse = self.call(&self.elbv2_endpoint, query).await?;

        Ok(resp.metadata)
    }
}
