use serde::Deserialize;

use super::client::{Client, Error};
use super::query::Query;

const API_VERSION: &str = "2016-11-15";

/// The most instance ids `DescribeInstanceStatus` accepts in one request.
pub const MAX_INSTANCE_IDS: usize = 100;

/// The status of an instance, only the fields we care about.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub instance_id: Option<String>,
    pub availability_zone: Option<String>,
}

#[derive(Default, Deserialize)]
struct Items {
    #[serde(rename = "item", default)]
    items: Vec<InstanceStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeInstanceStatusResponse {
    #[serde(default)]
    instance_status_set: Items,
    next_token: Option<String>,
}

impl Client {
    /// Describes the status of the given instances. Ids are sent in batches
    /// of `MAX_INSTANCE_IDS`, one after another, and each batch follows
    /// `nextToken` until every page is read.
    ///
    /// An empty `instance_ids` means no filter, the API returns the status of
    /// every running instance in the region.
    pub async fn describe_instance_status(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<InstanceStatus>, Error> {
        if instance_ids.is_empty() {
            return self.describe_instance_status_batch(&[]).await;
        }

        let mut statuses = Vec::with_capacity(instance_ids.len());
        for batch in instance_ids.chunks(MAX_INSTANCE_IDS) {
            statuses.extend(self.describe_instance_status_batch(batch).await?);
        }

        Ok(statuses)
    }

    async fn describe_instance_status_batch(
        &self,
        instance_ids: &[String],
    ) -> Result<Vec<InstanceStatus>, Error> {
        let mut statuses = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = Query::new("DescribeInstanceStatus", API_VERSION);
            query.append_list("InstanceId", instance_ids.iter().map(String::as_str));
            if let Some(token) = &next_token {
                query.append("NextToken", token);
            }

            let resp: DescribeInstanceStatusResponse =
                self.call(&self.ec2_endpoint, query).await?;
            statuses.extend(resp.instance_status_set.items);

            match resp.next_token.filter(|token| !token.is_empty()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_instance_status() {
        let body = r#"<DescribeInstanceStatusResponse
    xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>3be1508e-c444-4fef-89cc-0b1223c4f02f</requestId>
  <instanceStatusSet>
    <item>
      <instanceId>i-1234567890abcdef0</instanceId>
      <availabilityZone>us-east-1d</availabilityZone>
      <instanceState>
        <code>16</code>
        <name>running</name>
      </instanceState>
      <systemStatus>
        <status>ok</status>
      </systemStatus>
      <instanceStatus>
        <status>ok</status>
      </instanceStatus>
    </item>
    <item>
      <instanceId>i-0598c7d356eba48d7</instanceId>
      <availabilityZone>us-east-1a</availabilityZone>
      <instanceState>
        <code>16</code>
        <name>running</name>
      </instanceState>
    </item>
  </instanceStatusSet>
  <nextToken/>
</DescribeInstanceStatusResponse>"#;

        let resp: DescribeInstanceStatusResponse = quick_xml::de::from_str(body).unwrap();
        let items = resp.instance_status_set.items;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].instance_id.as_deref(), Some("i-1234567890abcdef0"));
        assert_eq!(items[0].availability_zone.as_deref(), Some("us-east-1d"));
        assert_eq!(items[1].availability_zone.as_deref(), Some("us-east-1a"));
        assert!(resp.next_token.filter(|token| !token.is_empty()).is_none());
    }

    #[test]
    fn decode_empty_status_set() {
        let body = r#"<DescribeInstanceStatusResponse
    xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>3be1508e-c444-4fef-89cc-0b1223c4f02f</requestId>
  <instanceStatusSet/>
</DescribeInstanceStatusResponse>"#;

        let resp: DescribeInstanceStatusResponse = quick_xml::de::from_str(body).unwrap();
        assert!(resp.instance_status_set.items.is_empty());
        assert!(resp.next_token.is_none());
    }
}
