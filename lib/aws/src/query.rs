/// Builds the form encoded body of an AWS query protocol request.
///
/// Every request carries `Action` and `Version`, followed by the action
/// specific parameters. List parameters are flattened with 1-based indexes,
/// e.g. `Targets.member.1.Id` or `InstanceId.1`.
pub struct Query {
    // The encoded body is kept as a plain `String` (rather than a
    // `form_urlencoded::Serializer`, which is not `Send`) so that futures
    // holding a `Query` stay `Send`.
    body: String,
}

impl Query {
    pub fn new(action: &str, version: &str) -> Self {
        let mut query = Query {
            body: String::new(),
        };
        query.append("Action", action);
        query.append("Version", version);

        query
    }

    pub fn append(&mut self, key: &str, value: &str) -> &mut Self {
        form_urlencoded::Serializer::for_suffix(&mut self.body, 0).append_pair(key, value);
        self
    }

    /// Append `{prefix}.{n}` for every value.
    pub fn append_list<'a>(
        &mut self,
        prefix: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> &mut Self {
        for (index, value) in values.into_iter().enumerate() {
            let key = format!("{}.{}", prefix, index + 1);
            self.append(&key, value);
        }

        self
    }

    pub fn finish(self) -> String {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_and_version_first() {
        let mut query = Query::new("DescribeTargetHealth", "2015-12-01");
        query.append(
            "TargetGroupArn",
            "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/web/abc",
        );

        assert_eq!(
            query.finish(),
            "Action=DescribeTargetHealth&Version=2015-12-01&TargetGroupArn=arn%3Aaws%3Aelasticloadbalancing%3Aus-east-1%3A123456789012%3Atargetgroup%2Fweb%2Fabc"
        );
    }

    #[test]
    fn list_is_one_based() {
        let mut query = Query::new("DescribeInstanceStatus", "2016-11-15");
        query.append_list("InstanceId", ["i-1", "i-2"]);

        assert_eq!(
            query.finish(),
            "Action=DescribeInstanceStatus&Version=2016-11-15&InstanceId.1=i-1&InstanceId.2=i-2"
        );
    }
}
