use serde::Deserialize;

/// Release metadata document served by a release image source.
#[derive(Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReleasePayloadDto {
    #[serde(default, alias = "pullspec", alias = "PullSpec")]
    pub pull_spec: Option<String>,
}

impl ReleasePayloadDto {
    /// Parses a release document. A `null` document or `pullSpec` counts as absent.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        Ok(serde_json::from_slice::<Option<Self>>(body)?.unwrap_or_default())
    }

    pub fn into_pull_spec(self) -> String {
        self.pull_spec.unwrap_or_default()
    }
}
