use regex::Regex;

use ermap_core::Coordinates;

use crate::MapOracle;

/// Geocodes place names through the map oracle.
pub struct TextLocationResolver {
    reply_pair: Regex,
}

impl Default for TextLocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLocationResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            reply_pair: Regex::new(r"(-?[0-9]+\.[0-9]+)\s*[,，]\s*(-?[0-9]+\.[0-9]+)")
                .expect("valid reply coordinate regex"),
        }
    }

    /// Returns `"<lon>,<lat>"` for `name`, or `name` unchanged.
    ///
    /// Input already in coordinate form is returned as-is without touching
    /// the oracle. Otherwise one query is issued and the first decimal pair
    /// in the reply is taken. A reply without a pair, or an oracle error,
    /// falls back to the name so callers can still query by name.
    pub async fn resolve<O: MapOracle>(&self, oracle: &mut O, name: &str) -> String {
        if Coordinates::is_coordinate_form(name) {
            return name.trim().to_string();
        }

        let query = format!("请提供{name}的经纬度坐标");
        match oracle.process_query(&query).await {
            Ok(reply) => match self.reply_pair.captures(&reply) {
                Some(caps) => {
                    let resolved = format!("{},{}", &caps[1], &caps[2]);
                    tracing::debug!(name, coordinates = %resolved, "resolved location");
                    resolved
                }
                None => {
                    tracing::warn!(name, "no coordinates in oracle reply; querying by name");
                    name.to_string()
                }
            },
            Err(e) => {
                tracing::warn!(name, error = %e, "location lookup failed; querying by name");
                name.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OracleError, ToolDescriptor};

    struct CannedOracle {
        reply: Result<&'static str, &'static str>,
        queries: Vec<String>,
    }

    impl CannedOracle {
        fn replying(reply: Result<&'static str, &'static str>) -> Self {
            Self {
                reply,
                queries: Vec::new(),
            }
        }
    }

    impl MapOracle for CannedOracle {
        async fn connect(&mut self) -> Result<Vec<ToolDescriptor>, OracleError> {
            Ok(Vec::new())
        }

        async fn process_query(&mut self, query: &str) -> Result<String, OracleError> {
            self.queries.push(query.to_string());
            self.reply
                .map(str::to_string)
                .map_err(|e| OracleError::Transport(e.to_string()))
        }

        async fn disconnect(&mut self) {}
    }

    #[tokio::test]
    async fn coordinate_input_skips_the_oracle() {
        let mut oracle = CannedOracle::replying(Ok("unused"));
        let resolver = TextLocationResolver::new();

        let first = resolver.resolve(&mut oracle, "104.0657,30.6598").await;
        let second = resolver.resolve(&mut oracle, "104.0657,30.6598").await;

        assert_eq!(first, "104.0657,30.6598");
        assert_eq!(second, first);
        assert!(oracle.queries.is_empty());
    }

    #[tokio::test]
    async fn takes_first_pair_from_reply() {
        let mut oracle =
            CannedOracle::replying(Ok("省骨科医院位于 104.0431, 30.6412，附近还有 1.0,2.0"));
        let resolved = TextLocationResolver::new()
            .resolve(&mut oracle, "省骨科医院")
            .await;
        assert_eq!(resolved, "104.0431,30.6412");
        assert_eq!(oracle.queries, vec!["请提供省骨科医院的经纬度坐标".to_string()]);
    }

    #[tokio::test]
    async fn accepts_full_width_comma() {
        let mut oracle = CannedOracle::replying(Ok("坐标：104.08，30.66"));
        let resolved = TextLocationResolver::new().resolve(&mut oracle, "春熙路").await;
        assert_eq!(resolved, "104.08,30.66");
    }

    #[tokio::test]
    async fn reply_without_pair_falls_back_to_name() {
        let mut oracle = CannedOracle::replying(Ok("抱歉，未找到该地点"));
        let resolved = TextLocationResolver::new().resolve(&mut oracle, "不存在的地方").await;
        assert_eq!(resolved, "不存在的地方");
        assert_eq!(oracle.queries.len(), 1);
    }

    #[tokio::test]
    async fn oracle_error_falls_back_to_name() {
        let mut oracle = CannedOracle::replying(Err("connection reset"));
        let resolved = TextLocationResolver::new().resolve(&mut oracle, "天府广场").await;
        assert_eq!(resolved, "天府广场");
    }
}
