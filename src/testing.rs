//! An in-memory `TargetGroupApi` that records every call.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use http::StatusCode;

use crate::remote::{InstanceStatusRecord, TargetGroupApi, TargetHealthRecord};
use crate::snapshot::TargetIdentity;
use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    DescribeTargetHealth(String),
    DescribeInstanceZones(Vec<String>),
    Register(String, Vec<(String, Option<u16>)>),
    Deregister(String, Vec<(String, Option<u16>)>),
}

fn api_error(op: &'static str, status: StatusCode, code: &str) -> Error {
    Error::remote(
        op,
        aws::Error::Api {
            status,
            response: aws::ErrorResponse {
                code: code.to_string(),
                message: format!("{op} rejected by fake api"),
            },
        },
    )
}

fn pairs(targets: &[TargetIdentity]) -> Vec<(String, Option<u16>)> {
    targets
        .iter()
        .map(|target| (target.id.clone(), target.port))
        .collect()
}

#[derive(Default)]
pub struct FakeApi {
    groups: Mutex<BTreeMap<String, Vec<TargetHealthRecord>>>,
    zones: BTreeMap<String, String>,
    fail_register: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn with_group(mut self, group: &str, targets: &[(&str, Option<u16>)]) -> Self {
        let records = targets
            .iter()
            .map(|(id, port)| TargetHealthRecord {
                id: Some(id.to_string()),
                port: *port,
            })
            .collect();

        self.groups
            .get_mut()
            .unwrap()
            .insert(group.to_string(), records);
        self
    }

    pub fn with_zones(mut self, zones: &[(&str, &str)]) -> Self {
        self.zones = zones
            .iter()
            .map(|(id, zone)| (id.to_string(), zone.to_string()))
            .collect();
        self
    }

    pub fn fail_register(mut self) -> Self {
        self.fail_register = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Register and deregister calls only.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Register(..) | Call::Deregister(..)))
            .collect()
    }

    /// Sorted ids currently registered in `group`.
    pub fn members(&self, group: &str) -> Vec<String> {
        let groups = self.groups.lock().unwrap();
        let mut ids: Vec<String> = groups
            .get(group)
            .map(|records| records.iter().filter_map(|r| r.id.clone()).collect())
            .unwrap_or_else(Vec::new);
        ids.sort();
        ids
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TargetGroupApi for FakeApi {
    async fn describe_target_health(
        &self,
        target_group: &str,
    ) -> Result<Vec<TargetHealthRecord>> {
        self.record(Call::DescribeTargetHealth(target_group.to_string()));

        self.groups
            .lock()
            .unwrap()
            .get(target_group)
            .cloned()
            .ok_or_else(|| {
                api_error(
                    "DescribeTargetHealth",
                    StatusCode::BAD_REQUEST,
                    "TargetGroupNotFound",
                )
            })
    }

    async fn describe_instance_zones(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<InstanceStatusRecord>> {
        self.record(Call::DescribeInstanceZones(instance_ids.to_vec()));

        Ok(instance_ids
            .iter()
            .filter_map(|id| {
                self.zones.get(id).map(|zone| InstanceStatusRecord {
                    instance_id: Some(id.clone()),
                    availability_zone: Some(zone.clone()),
                })
            })
            .collect())
    }

    async fn register_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()> {
        self.record(Call::Register(target_group.to_string(), pairs(targets)));

        if self.fail_register {
            return Err(api_error(
                "RegisterTargets",
                StatusCode::FORBIDDEN,
                "AccessDenied",
            ));
        }

        let mut groups = self.groups.lock().unwrap();
        let records = groups.entry(target_group.to_string()).or_default();
        for target in targets {
            if !records.iter().any(|r| r.id.as_deref() == Some(target.id.as_str())) {
                records.push(TargetHealthRecord {
                    id: Some(target.id.clone()),
                    port: target.port,
                });
            }
        }

        Ok(())
    }

    async fn deregister_targets(
        &self,
        target_group: &str,
        targets: &[TargetIdentity],
    ) -> Result<()> {
        self.record(Call::Deregister(target_group.to_string(), pairs(targets)));

        let mut groups = self.groups.lock().unwrap();
        if let Some(records) = groups.get_mut(target_group) {
            records.retain(|r| {
                !targets
                    .iter()
                    .any(|target| r.id.as_deref() == Some(target.id.as_str()))
            });
        }

        Ok(())
    }
}
